//! Message orchestration: system prompt assembly and the tool-call loop.

pub mod orchestrator;
pub mod prompt;

pub use orchestrator::{Orchestrator, OrchestratorBuilder, MAX_ITERATIONS};
pub use prompt::{build_system_prompt, DEFAULT_ASSISTANT_NAME};
