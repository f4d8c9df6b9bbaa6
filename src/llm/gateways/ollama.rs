use crate::config::LlmConfig;
use crate::error::{Result, SwitchyardError};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::gateways::openai_messages_adapter::{raw_arguments, DEFAULT_FINISH_REASON};
use crate::llm::models::{ChatResponse, Choice, MessageRole, ToolCallRequest, Turn, Usage};
use crate::llm::tools::ToolDescriptor;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for connecting to Ollama server
#[derive(Debug, Clone)]
pub struct OllamaConfig {
    pub host: String,
    pub timeout: Option<Duration>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            host: std::env::var("LLM_BASE_URL").unwrap_or_else(|_| LlmConfig::default().base_url),
            timeout: None,
        }
    }
}

/// Gateway for the native Ollama chat API
pub struct OllamaGateway {
    client: Client,
    config: OllamaConfig,
}

impl OllamaGateway {
    /// Create a new Ollama gateway with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(OllamaConfig::default())
    }

    /// Create a new Ollama gateway with custom configuration
    pub fn with_config(config: OllamaConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    /// Create gateway with custom host
    pub fn with_host(host: impl Into<String>) -> Result<Self> {
        Self::with_config(OllamaConfig {
            host: host.into(),
            ..Default::default()
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/{}", self.config.host.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl LlmGateway for OllamaGateway {
    async fn chat(
        &self,
        model: &str,
        transcript: &[Turn],
        tools: &[ToolDescriptor],
        config: &CompletionConfig,
    ) -> Result<ChatResponse> {
        info!("Delegating to Ollama for completion");
        debug!(model = model, turns = transcript.len(), tools = tools.len(), "Preparing request");

        let mut body = serde_json::json!({
            "model": model,
            "messages": adapt_messages_to_ollama(transcript),
            "options": extract_ollama_options(config),
            "stream": false
        });

        if !tools.is_empty() {
            body["tools"] = serde_json::to_value(tools)?;
        }

        let response = self.client.post(self.endpoint("chat")).json(&body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SwitchyardError::GatewayError(format!(
                "Ollama API error: {} - {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;
        parse_ollama_response(&response_body)
    }

    async fn get_available_models(&self) -> Result<Vec<String>> {
        debug!("Fetching available Ollama models");

        let response = self.client.get(self.endpoint("tags")).send().await?;

        if !response.status().is_success() {
            return Err(SwitchyardError::GatewayError(format!(
                "Failed to get models: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        let models = body["models"]
            .as_array()
            .ok_or_else(|| SwitchyardError::GatewayError("Invalid response format".to_string()))?
            .iter()
            .filter_map(|m| m["name"].as_str().map(String::from))
            .collect::<Vec<_>>();

        Ok(models)
    }

    async fn ping(&self) -> Result<()> {
        let response = self.client.get(self.endpoint("tags")).send().await?;

        if !response.status().is_success() {
            return Err(SwitchyardError::GatewayError(format!(
                "Ollama health check failed: {}",
                response.status()
            )));
        }

        Ok(())
    }
}

// Ollama expects tool-call arguments as objects rather than JSON text
fn adapt_messages_to_ollama(turns: &[Turn]) -> Vec<Value> {
    turns
        .iter()
        .map(|turn| {
            let mut ollama_msg = serde_json::json!({
                "role": turn.role.as_str(),
                "content": turn.content,
            });

            if turn.role == MessageRole::Assistant && !turn.tool_calls.is_empty() {
                let calls: Vec<_> = turn
                    .tool_calls
                    .iter()
                    .map(|tc| {
                        let arguments = serde_json::from_str::<Value>(&tc.raw_arguments)
                            .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
                        serde_json::json!({
                            "type": "function",
                            "function": {
                                "name": tc.name,
                                "arguments": arguments
                            }
                        })
                    })
                    .collect();
                ollama_msg["tool_calls"] = Value::Array(calls);
            }

            ollama_msg
        })
        .collect()
}

fn extract_ollama_options(config: &CompletionConfig) -> Value {
    let mut options = serde_json::json!({
        "temperature": config.temperature,
    });

    if config.max_tokens > 0 {
        options["num_predict"] = serde_json::json!(config.max_tokens);
    }

    options
}

// Ollama returns a single message; it becomes the only choice
fn parse_ollama_response(body: &Value) -> Result<ChatResponse> {
    let message = body.get("message").filter(|m| m.is_object()).ok_or_else(|| {
        SwitchyardError::GatewayError("Malformed response: missing message".to_string())
    })?;

    let tool_calls = message["tool_calls"]
        .as_array()
        .map(|calls| {
            calls
                .iter()
                .enumerate()
                .filter_map(|(index, call)| {
                    let name = call["function"]["name"].as_str()?.to_string();
                    Some(ToolCallRequest {
                        id: call["id"]
                            .as_str()
                            .filter(|id| !id.is_empty())
                            .map(String::from)
                            .unwrap_or_else(|| format!("call_{}", index)),
                        name,
                        raw_arguments: raw_arguments(&call["function"]["arguments"]),
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let prompt_tokens = body["prompt_eval_count"].as_u64().unwrap_or(0);
    let completion_tokens = body["eval_count"].as_u64().unwrap_or(0);

    Ok(ChatResponse {
        id: body["created_at"].as_str().unwrap_or_default().to_string(),
        model: body["model"].as_str().unwrap_or_default().to_string(),
        choices: vec![Choice {
            index: 0,
            content: message["content"].as_str().unwrap_or_default().to_string(),
            tool_calls,
            finish_reason: body["done_reason"]
                .as_str()
                .filter(|reason| !reason.is_empty())
                .unwrap_or(DEFAULT_FINISH_REASON)
                .to_string(),
        }],
        usage: Usage {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ollama_config_default_follows_llm_base_url() {
        let expected = std::env::var("LLM_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:11434".to_string());

        let config = OllamaConfig::default();

        assert_eq!(config.host, expected);
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn test_ollama_config_custom() {
        let config = OllamaConfig {
            host: "http://custom:11434".to_string(),
            timeout: Some(Duration::from_secs(30)),
        };

        assert_eq!(config.host, "http://custom:11434");
        assert_eq!(config.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_gateway_with_host() {
        let gateway = OllamaGateway::with_host("http://localhost:11434/").unwrap();
        assert_eq!(gateway.endpoint("chat"), "http://localhost:11434/api/chat");
    }

    #[test]
    fn test_adapt_messages_parses_arguments_into_objects() {
        let turns = vec![Turn::assistant_with_tool_calls(
            "",
            vec![ToolCallRequest {
                id: "call_0".to_string(),
                name: "devops_get_workitem".to_string(),
                raw_arguments: r#"{"id": 7}"#.to_string(),
            }],
        )];

        let result = adapt_messages_to_ollama(&turns);

        assert_eq!(result[0]["tool_calls"][0]["type"], "function");
        assert_eq!(result[0]["tool_calls"][0]["function"]["name"], "devops_get_workitem");
        assert_eq!(result[0]["tool_calls"][0]["function"]["arguments"]["id"], 7);
    }

    #[test]
    fn test_adapt_messages_tool_role() {
        let turn = crate::llm::models::ToolCallResult::success("call_0", "done").into_turn();

        let result = adapt_messages_to_ollama(&[turn]);

        assert_eq!(result[0]["role"], "tool");
        assert_eq!(result[0]["content"], "done");
        assert!(result[0].get("tool_calls").is_none());
    }

    #[test]
    fn test_extract_ollama_options() {
        let options = extract_ollama_options(&CompletionConfig {
            temperature: 0.5,
            max_tokens: 2048,
        });

        assert_eq!(options["temperature"], 0.5);
        assert_eq!(options["num_predict"], 2048);
    }

    #[test]
    fn test_extract_ollama_options_zero_max_tokens() {
        let options = extract_ollama_options(&CompletionConfig {
            temperature: 0.7,
            max_tokens: 0,
        });

        assert!(options.get("num_predict").is_none());
    }

    #[test]
    fn test_parse_response_defaults_finish_reason_and_ids() {
        let body = json!({
            "model": "llama3.2",
            "message": {
                "role": "assistant",
                "content": "",
                "tool_calls": [
                    {"function": {"name": "trello_list_boards", "arguments": {}}},
                    {"function": {"name": "trello_get_card", "arguments": {"card_id": "abc"}}}
                ]
            },
            "prompt_eval_count": 12,
            "eval_count": 3
        });

        let response = parse_ollama_response(&body).unwrap();
        let choice = response.first_choice().unwrap();

        assert_eq!(choice.finish_reason, "stop");
        assert_eq!(choice.tool_calls[0].id, "call_0");
        assert_eq!(choice.tool_calls[1].id, "call_1");
        assert_eq!(choice.tool_calls[0].raw_arguments, "{}");
        let args: Value = serde_json::from_str(&choice.tool_calls[1].raw_arguments).unwrap();
        assert_eq!(args["card_id"], "abc");
        assert_eq!(response.usage.total_tokens, 15);
    }

    #[test]
    fn test_parse_response_missing_message() {
        let result = parse_ollama_response(&json!({"error": "model not found"}));
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_chat_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(mockito::Matcher::PartialJson(json!({
                "model": "llama3.2",
                "stream": false,
                "options": {"num_predict": 4096}
            })))
            .with_status(200)
            .with_body(r#"{"model":"llama3.2","message":{"role":"assistant","content":"Hello!"},"done":true,"done_reason":"stop"}"#)
            .create();

        let gateway = OllamaGateway::with_host(server.url()).unwrap();
        let response = gateway
            .chat("llama3.2", &[Turn::user("Hi")], &[], &CompletionConfig::default())
            .await
            .unwrap();

        mock.assert();
        assert_eq!(response.choices.len(), 1);
        assert_eq!(response.choices[0].content, "Hello!");
    }

    #[tokio::test]
    async fn test_chat_error_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_body("boom")
            .create();

        let gateway = OllamaGateway::with_host(server.url()).unwrap();
        let result = gateway
            .chat("llama3.2", &[Turn::user("Hi")], &[], &CompletionConfig::default())
            .await;

        mock.assert();
        assert!(matches!(result, Err(SwitchyardError::GatewayError(_))));
    }

    #[tokio::test]
    async fn test_get_available_models() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models":[{"name":"llama3.2"},{"name":"qwen2.5"}]}"#)
            .create();

        let gateway = OllamaGateway::with_host(server.url()).unwrap();
        let models = gateway.get_available_models().await.unwrap();

        mock.assert();
        assert_eq!(models, vec!["llama3.2", "qwen2.5"]);
    }

    #[tokio::test]
    async fn test_ping() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/tags")
            .with_status(200)
            .with_body(r#"{"models":[]}"#)
            .create();

        let gateway = OllamaGateway::with_host(server.url()).unwrap();

        assert!(gateway.ping().await.is_ok());
    }
}
