//! Gateway for generic OpenAI-compatible chat-completion servers.
//!
//! Works against any server that exposes `/v1/chat/completions` (vLLM,
//! LM Studio, hosted providers). The bearer key is optional so that
//! unauthenticated local servers are supported.

use crate::error::{Result, SwitchyardError};
use crate::llm::gateway::{CompletionConfig, LlmGateway};
use crate::llm::gateways::openai_messages_adapter::{adapt_messages_to_openai, parse_openai_response};
use crate::llm::models::{ChatResponse, Turn};
use crate::llm::tools::ToolDescriptor;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for connecting to an OpenAI-compatible server.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Option<Duration>,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("LLM_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            api_key: std::env::var("LLM_API_KEY").ok().filter(|key| !key.is_empty()),
            timeout: None,
        }
    }
}

/// Gateway speaking the generic chat-completion wire format.
pub struct OpenAiGateway {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiGateway {
    /// Create a new gateway with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(OpenAiConfig::default())
    }

    /// Create a new gateway with custom configuration.
    pub fn with_config(config: OpenAiConfig) -> Result<Self> {
        let mut client_builder = Client::builder();

        if let Some(timeout) = config.timeout {
            client_builder = client_builder.timeout(timeout);
        }

        let client = client_builder.build()?;

        Ok(Self { client, config })
    }

    /// Create gateway against a base URL with an optional key.
    pub fn with_base_url(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self> {
        Self::with_config(OpenAiConfig {
            base_url: base_url.into(),
            api_key,
            timeout: None,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/v1/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header("Authorization", format!("Bearer {}", key)),
            None => request,
        }
    }
}

#[async_trait]
impl LlmGateway for OpenAiGateway {
    async fn chat(
        &self,
        model: &str,
        transcript: &[Turn],
        tools: &[ToolDescriptor],
        config: &CompletionConfig,
    ) -> Result<ChatResponse> {
        info!("Delegating to chat-completion server");
        debug!(model = model, turns = transcript.len(), tools = tools.len(), "Preparing request");

        let mut body = serde_json::json!({
            "model": model,
            "messages": adapt_messages_to_openai(transcript),
            "temperature": config.temperature,
            "max_tokens": config.max_tokens,
        });

        if !tools.is_empty() {
            body["tools"] = serde_json::to_value(tools)?;
        }

        let response = self
            .authorize(self.client.post(self.endpoint("chat/completions")))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(SwitchyardError::GatewayError(format!(
                "Chat completion API error: {} - {}",
                status, error_text
            )));
        }

        let response_body: Value = response.json().await?;
        parse_openai_response(&response_body)
    }

    async fn get_available_models(&self) -> Result<Vec<String>> {
        debug!("Fetching available models");

        let response = self.authorize(self.client.get(self.endpoint("models"))).send().await?;

        if !response.status().is_success() {
            return Err(SwitchyardError::GatewayError(format!(
                "Failed to get models: {}",
                response.status()
            )));
        }

        let body: Value = response.json().await?;

        let mut models = body["data"]
            .as_array()
            .ok_or_else(|| SwitchyardError::GatewayError("Invalid response format".to_string()))?
            .iter()
            .filter_map(|m| m["id"].as_str().map(String::from))
            .collect::<Vec<_>>();

        models.sort();
        Ok(models)
    }

    async fn ping(&self) -> Result<()> {
        let response = self.authorize(self.client.get(self.endpoint("models"))).send().await?;

        if !response.status().is_success() {
            return Err(SwitchyardError::GatewayError(format!(
                "Health check failed: {}",
                response.status()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_ignores_trailing_slash() {
        let gateway = OpenAiGateway::with_base_url("http://vllm:8000/", None).unwrap();
        assert_eq!(gateway.endpoint("chat/completions"), "http://vllm:8000/v1/chat/completions");
    }

    #[tokio::test]
    async fn test_chat_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "model": "qwen2.5",
                "max_tokens": 4096,
                "messages": [{"role": "user", "content": "Hi"}]
            })))
            .with_status(200)
            .with_body(r#"{"id":"c1","choices":[{"message":{"role":"assistant","content":"Hello!"},"finish_reason":"stop"}]}"#)
            .create();

        let gateway = OpenAiGateway::with_base_url(server.url(), Some("test-key".to_string())).unwrap();
        let result = gateway
            .chat("qwen2.5", &[Turn::user("Hi")], &[], &CompletionConfig::default())
            .await;

        mock.assert();
        let response = result.unwrap();
        assert_eq!(response.choices[0].content, "Hello!");
        assert_eq!(response.choices[0].finish_reason, "stop");
    }

    #[tokio::test]
    async fn test_chat_without_key_sends_no_authorization() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_header("authorization", mockito::Matcher::Missing)
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"ok"}}]}"#)
            .create();

        let gateway = OpenAiGateway::with_base_url(server.url(), None).unwrap();
        let result = gateway
            .chat("m", &[Turn::user("Hi")], &[], &CompletionConfig::default())
            .await;

        mock.assert();
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_chat_sends_tool_catalog_and_parses_calls() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .match_body(mockito::Matcher::PartialJson(serde_json::json!({
                "tools": [{"type": "function", "function": {"name": "devops_list_repos"}}]
            })))
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null,"tool_calls":[{"id":"call_1","type":"function","function":{"name":"devops_list_repos","arguments":"{}"}}]},"finish_reason":"tool_calls"}]}"#)
            .create();

        let tools = vec![ToolDescriptor::function(
            "devops_list_repos",
            "List repositories",
            serde_json::json!({"type": "object", "properties": {}}),
        )];
        let gateway = OpenAiGateway::with_base_url(server.url(), None).unwrap();
        let response = gateway
            .chat("m", &[Turn::user("repos?")], &tools, &CompletionConfig::default())
            .await
            .unwrap();

        mock.assert();
        let choice = response.first_choice().unwrap();
        assert!(choice.has_tool_calls());
        assert_eq!(choice.tool_calls[0].id, "call_1");
        assert_eq!(choice.tool_calls[0].raw_arguments, "{}");
    }

    #[tokio::test]
    async fn test_chat_error_status() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body("Unauthorized")
            .create();

        let gateway = OpenAiGateway::with_base_url(server.url(), Some("bad-key".to_string())).unwrap();
        let result = gateway
            .chat("m", &[Turn::user("Hi")], &[], &CompletionConfig::default())
            .await;

        mock.assert();
        match result {
            Err(SwitchyardError::GatewayError(message)) => assert!(message.contains("Unauthorized")),
            other => panic!("expected gateway error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_chat_malformed_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body("not json")
            .create();

        let gateway = OpenAiGateway::with_base_url(server.url(), None).unwrap();
        let result = gateway
            .chat("m", &[Turn::user("Hi")], &[], &CompletionConfig::default())
            .await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_get_available_models() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v1/models")
            .with_status(200)
            .with_body(r#"{"data":[{"id":"mistral"},{"id":"llama3.2"}]}"#)
            .create();

        let gateway = OpenAiGateway::with_base_url(server.url(), None).unwrap();
        let models = gateway.get_available_models().await.unwrap();

        mock.assert();
        assert_eq!(models, vec!["llama3.2", "mistral"]);
    }

    #[tokio::test]
    async fn test_configured_timeout_bounds_the_call() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            std::future::pending::<()>().await;
        });

        let gateway = OpenAiGateway::with_config(OpenAiConfig {
            base_url: format!("http://{}", addr),
            api_key: None,
            timeout: Some(Duration::from_millis(100)),
        })
        .unwrap();
        let err = gateway
            .chat("m", &[Turn::user("Hi")], &[], &CompletionConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, SwitchyardError::HttpError(ref e) if e.is_timeout()));
    }

    #[tokio::test]
    async fn test_ping() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server.mock("GET", "/v1/models").with_status(503).create();

        let gateway = OpenAiGateway::with_base_url(server.url(), None).unwrap();

        assert!(gateway.ping().await.is_err());
    }
}
