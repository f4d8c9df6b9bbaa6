use serde::{Deserialize, Serialize};

/// Role tag of a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
    Tool,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::System => "system",
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::Tool => "tool",
        }
    }
}

/// Tool invocation requested by the model inside an assistant turn.
///
/// `raw_arguments` is kept as the JSON text the model produced; decoding happens
/// per call during dispatch so that a malformed payload only fails that call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRequest {
    pub id: String,
    pub name: String,
    pub raw_arguments: String,
}

/// Outcome of one dispatched tool call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCallResult {
    pub for_request_id: String,
    pub output_text: String,
    pub succeeded: bool,
}

impl ToolCallResult {
    pub fn success(for_request_id: impl Into<String>, output_text: impl Into<String>) -> Self {
        Self {
            for_request_id: for_request_id.into(),
            output_text: output_text.into(),
            succeeded: true,
        }
    }

    pub fn failure(for_request_id: impl Into<String>, output_text: impl Into<String>) -> Self {
        Self {
            for_request_id: for_request_id.into(),
            output_text: output_text.into(),
            succeeded: false,
        }
    }

    /// Convert into the tool turn that is appended to the transcript
    pub fn into_turn(self) -> Turn {
        Turn {
            role: MessageRole::Tool,
            content: self.output_text,
            tool_calls: Vec::new(),
            tool_call_id: Some(self.for_request_id),
        }
    }
}

/// One entry in the transcript sent to the model each round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Ordered conversation history for a single orchestration run
pub type Transcript = Vec<Turn>;

impl Turn {
    fn plain(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a system turn
    pub fn system(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::System, content)
    }

    /// Create a user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::User, content)
    }

    /// Create an assistant turn
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::plain(MessageRole::Assistant, content)
    }

    /// Create an assistant turn that carries the model's tool-call requests
    pub fn assistant_with_tool_calls(
        content: impl Into<String>,
        tool_calls: Vec<ToolCallRequest>,
    ) -> Self {
        Self {
            tool_calls,
            ..Self::plain(MessageRole::Assistant, content)
        }
    }
}

/// One candidate completion
#[derive(Debug, Clone, PartialEq)]
pub struct Choice {
    pub index: usize,
    pub content: String,
    pub tool_calls: Vec<ToolCallRequest>,
    pub finish_reason: String,
}

impl Choice {
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Token accounting reported by the backend, when available
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

/// Normalized response from either backend wire format
#[derive(Debug, Clone, PartialEq)]
pub struct ChatResponse {
    pub id: String,
    pub model: String,
    pub choices: Vec<Choice>,
    pub usage: Usage,
}

impl ChatResponse {
    /// First candidate completion, which is the only one the agent reads
    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_serialization() {
        assert_eq!(serde_json::to_string(&MessageRole::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&MessageRole::Tool).unwrap(), "\"tool\"");
        assert_eq!(MessageRole::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_turn_constructors() {
        let system = Turn::system("You are helpful");
        assert_eq!(system.role, MessageRole::System);
        assert_eq!(system.content, "You are helpful");
        assert!(system.tool_calls.is_empty());
        assert!(system.tool_call_id.is_none());

        assert_eq!(Turn::user("hi").role, MessageRole::User);
        assert_eq!(Turn::assistant("hello").role, MessageRole::Assistant);
    }

    #[test]
    fn test_assistant_with_tool_calls_keeps_order() {
        let calls = vec![
            ToolCallRequest {
                id: "call_1".to_string(),
                name: "first".to_string(),
                raw_arguments: "{}".to_string(),
            },
            ToolCallRequest {
                id: "call_2".to_string(),
                name: "second".to_string(),
                raw_arguments: "{}".to_string(),
            },
        ];

        let turn = Turn::assistant_with_tool_calls("", calls);

        assert_eq!(turn.role, MessageRole::Assistant);
        assert_eq!(turn.tool_calls[0].name, "first");
        assert_eq!(turn.tool_calls[1].name, "second");
    }

    #[test]
    fn test_tool_call_result_into_turn() {
        let turn = ToolCallResult::failure("call_9", "Error executing tool: boom").into_turn();

        assert_eq!(turn.role, MessageRole::Tool);
        assert_eq!(turn.content, "Error executing tool: boom");
        assert_eq!(turn.tool_call_id.as_deref(), Some("call_9"));
    }

    #[test]
    fn test_turn_serialization_skips_empty_fields() {
        let json = serde_json::to_string(&Turn::user("test content")).unwrap();

        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"content\":\"test content\""));
        assert!(!json.contains("tool_calls"));
        assert!(!json.contains("tool_call_id"));
    }

    #[test]
    fn test_first_choice() {
        let response = ChatResponse {
            id: "resp".to_string(),
            model: "m".to_string(),
            choices: vec![],
            usage: Usage::default(),
        };
        assert!(response.first_choice().is_none());
    }
}
