pub mod agent;
pub mod audit;
pub mod config;
pub mod error;
pub mod llm;
pub mod providers;
pub mod security;

pub use error::{Result, SwitchyardError};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::agent::{Orchestrator, MAX_ITERATIONS};
    pub use crate::audit::{AuditEvent, AuditLog};
    pub use crate::config::AppConfig;
    pub use crate::error::{Result, SwitchyardError};
    pub use crate::llm::gateways::{OllamaGateway, OpenAiGateway};
    pub use crate::llm::tools::{FunctionDescriptor, ToolDescriptor};
    pub use crate::llm::{CompletionConfig, LlmGateway, MessageRole, Turn};
    pub use crate::providers::{Dispatch, ToolProvider};
    pub use tokio_util::sync::CancellationToken;
}
