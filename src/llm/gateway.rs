use crate::error::Result;
use crate::llm::models::{ChatResponse, Turn};
use crate::llm::tools::ToolDescriptor;
use async_trait::async_trait;

/// Sampling parameters forwarded with every chat request
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionConfig {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 4096,
        }
    }
}

/// One request/response contract over heterogeneous chat-completion backends.
///
/// Implementations translate the transcript and tool catalog into their wire
/// format and normalize the reply back into [`ChatResponse`]. They never retry;
/// a failed call is reported to the caller as-is.
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Send the transcript and tool catalog, returning the normalized completion
    async fn chat(
        &self,
        model: &str,
        transcript: &[Turn],
        tools: &[ToolDescriptor],
        config: &CompletionConfig,
    ) -> Result<ChatResponse>;

    /// Get list of available models
    async fn get_available_models(&self) -> Result<Vec<String>>;

    /// Check that the backend is reachable
    async fn ping(&self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_config_default() {
        let config = CompletionConfig::default();

        assert_eq!(config.temperature, 0.7);
        assert_eq!(config.max_tokens, 4096);
    }

    #[test]
    fn test_completion_config_custom() {
        let config = CompletionConfig {
            temperature: 0.2,
            max_tokens: 512,
        };

        assert_eq!(config.temperature, 0.2);
        assert_eq!(config.max_tokens, 512);
    }
}
