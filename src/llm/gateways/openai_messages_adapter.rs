//! Adapter between transcript turns and the generic chat-completion wire format.

use crate::error::{Result, SwitchyardError};
use crate::llm::models::{ChatResponse, Choice, MessageRole, ToolCallRequest, Turn, Usage};
use serde_json::Value;

/// Finish reason recorded when the backend does not report one
pub const DEFAULT_FINISH_REASON: &str = "stop";

/// Adapt transcript turns to chat-completion messages.
pub fn adapt_messages_to_openai(turns: &[Turn]) -> Vec<Value> {
    turns
        .iter()
        .map(|turn| match turn.role {
            MessageRole::System | MessageRole::User => serde_json::json!({
                "role": turn.role.as_str(),
                "content": turn.content,
            }),
            MessageRole::Assistant => {
                let mut assistant_msg = serde_json::json!({
                    "role": "assistant",
                    "content": turn.content,
                });

                if !turn.tool_calls.is_empty() {
                    let formatted_calls: Vec<Value> = turn
                        .tool_calls
                        .iter()
                        .map(|tc| {
                            serde_json::json!({
                                "id": tc.id,
                                "type": "function",
                                "function": {
                                    "name": tc.name,
                                    "arguments": tc.raw_arguments,
                                }
                            })
                        })
                        .collect();
                    assistant_msg["tool_calls"] = Value::Array(formatted_calls);
                }

                assistant_msg
            }
            MessageRole::Tool => serde_json::json!({
                "role": "tool",
                "content": turn.content,
                "tool_call_id": turn.tool_call_id.as_deref().unwrap_or_default(),
            }),
        })
        .collect()
}

/// Convert tool calls from chat-completion format to requests.
///
/// Arguments arrive as JSON text; some servers send an object instead, which is
/// re-serialized so that every request carries raw text.
pub fn convert_tool_calls(tool_calls: &[Value]) -> Vec<ToolCallRequest> {
    tool_calls
        .iter()
        .enumerate()
        .filter_map(|(index, tc)| {
            let name = tc["function"]["name"].as_str()?.to_string();
            let id = tc["id"]
                .as_str()
                .filter(|id| !id.is_empty())
                .map(String::from)
                .unwrap_or_else(|| format!("call_{}", index));

            Some(ToolCallRequest {
                id,
                name,
                raw_arguments: raw_arguments(&tc["function"]["arguments"]),
            })
        })
        .collect()
}

/// Render an `arguments` field as JSON text, whatever shape the backend used
pub(crate) fn raw_arguments(arguments: &Value) -> String {
    match arguments {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Normalize a chat-completion response body.
pub fn parse_openai_response(body: &Value) -> Result<ChatResponse> {
    let choices = body["choices"].as_array().ok_or_else(|| {
        SwitchyardError::GatewayError("Malformed response: missing choices".to_string())
    })?;

    let choices = choices
        .iter()
        .enumerate()
        .map(|(position, choice)| {
            let message = &choice["message"];
            let tool_calls = message["tool_calls"]
                .as_array()
                .map(|calls| convert_tool_calls(calls))
                .unwrap_or_default();

            Choice {
                index: choice["index"].as_u64().map(|i| i as usize).unwrap_or(position),
                content: message["content"].as_str().unwrap_or_default().to_string(),
                tool_calls,
                finish_reason: choice["finish_reason"]
                    .as_str()
                    .filter(|reason| !reason.is_empty())
                    .unwrap_or(DEFAULT_FINISH_REASON)
                    .to_string(),
            }
        })
        .collect();

    Ok(ChatResponse {
        id: body["id"].as_str().unwrap_or_default().to_string(),
        model: body["model"].as_str().unwrap_or_default().to_string(),
        choices,
        usage: Usage {
            prompt_tokens: body["usage"]["prompt_tokens"].as_u64().unwrap_or(0),
            completion_tokens: body["usage"]["completion_tokens"].as_u64().unwrap_or(0),
            total_tokens: body["usage"]["total_tokens"].as_u64().unwrap_or(0),
        },
    })
}
