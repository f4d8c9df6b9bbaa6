//! Backend implementations of [`LlmGateway`](crate::llm::LlmGateway).

pub mod ollama;
pub mod openai;
pub mod openai_messages_adapter;

pub use ollama::{OllamaConfig, OllamaGateway};
pub use openai::{OpenAiConfig, OpenAiGateway};

use crate::config::LlmConfig;
use crate::error::Result;
use crate::llm::gateway::LlmGateway;
use std::sync::Arc;
use tracing::debug;

const OLLAMA_ENDPOINTS: &[&str] = &[
    "http://localhost:11434",
    "http://127.0.0.1:11434",
    "http://host.docker.internal:11434",
];

/// Whether a base URL is one of the well-known local Ollama addresses
pub fn is_ollama_endpoint(base_url: &str) -> bool {
    let normalized = base_url.trim_end_matches('/');
    OLLAMA_ENDPOINTS.contains(&normalized)
}

/// Pick the wire format for the configured endpoint
pub fn for_endpoint(config: &LlmConfig) -> Result<Arc<dyn LlmGateway>> {
    if is_ollama_endpoint(&config.base_url) {
        debug!(base_url = %config.base_url, "Using native Ollama wire format");
        Ok(Arc::new(OllamaGateway::with_config(OllamaConfig {
            host: config.base_url.clone(),
            timeout: Some(config.timeout),
        })?))
    } else {
        debug!(base_url = %config.base_url, "Using chat-completion wire format");
        Ok(Arc::new(OpenAiGateway::with_config(OpenAiConfig {
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            timeout: Some(config.timeout),
        })?))
    }
}
