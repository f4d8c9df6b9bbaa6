//! Error types and result aliases for switchyard.
//!
//! This module defines the core error type [`SwitchyardError`] and the [`Result`] type alias
//! used throughout the crate. Callers of [`Orchestrator::process`](crate::agent::Orchestrator::process)
//! only ever observe [`SwitchyardError::ProcessingFailed`] or [`SwitchyardError::Cancelled`];
//! the remaining variants stay internal to the gateway, the providers and configuration.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SwitchyardError {
    #[error("LLM gateway error: {0}")]
    GatewayError(String),

    #[error("API error (status {status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("{0}")]
    ToolError(String),

    #[error("invalid arguments for {tool}: {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("operation cancelled")]
    Cancelled,

    #[error("failed to process message")]
    ProcessingFailed,
}

pub type Result<T> = std::result::Result<T, SwitchyardError>;
