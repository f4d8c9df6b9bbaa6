//! External systems the model can act on through tool calls.
//!
//! Each provider advertises a catalog of [`ToolDescriptor`]s and executes the
//! calls it recognises. Tool names are namespaced by provider (`devops_*`,
//! `trello_*`) so at most one provider claims any given name.

pub mod devops;
pub mod trello;

pub use devops::DevOpsProvider;
pub use trello::TrelloProvider;

use crate::error::{Result, SwitchyardError};
use crate::llm::tools::ToolDescriptor;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Outcome of offering a tool call to a provider
#[derive(Debug)]
pub enum Dispatch {
    /// The provider does not own this tool name
    NotMine,
    /// The provider ran the tool and produced formatted text
    Handled(String),
    /// The provider owns the tool but the call failed
    HandledError(SwitchyardError),
}

impl Dispatch {
    pub fn is_handled(&self) -> bool {
        !matches!(self, Dispatch::NotMine)
    }
}

impl From<Result<String>> for Dispatch {
    fn from(result: Result<String>) -> Self {
        match result {
            Ok(text) => Dispatch::Handled(text),
            Err(err) => Dispatch::HandledError(err),
        }
    }
}

/// An external system exposed to the model as a set of tools.
#[async_trait]
pub trait ToolProvider: Send + Sync {
    /// Short identifier used in logs and the audit trail
    fn key(&self) -> &str;

    /// One-line capability description for the system prompt
    fn capability_summary(&self) -> String;

    /// Optional provider-specific section appended to the system prompt
    fn prompt_section(&self) -> Option<String> {
        None
    }

    /// Tool catalog advertised to the model
    fn descriptors(&self) -> Vec<ToolDescriptor>;

    /// Tool names to whitelist for this provider
    fn allowed_operations(&self) -> Vec<String> {
        self.descriptors().iter().map(|d| d.name().to_string()).collect()
    }

    /// Execute a tool call whose arguments have already been parsed into a JSON object
    async fn execute(&self, name: &str, arguments: &Value) -> Dispatch;
}

/// Decode tool arguments into the typed struct for that tool.
pub fn decode_args<T: DeserializeOwned>(tool: &str, arguments: &Value) -> Result<T> {
    serde_json::from_value(arguments.clone()).map_err(|e| SwitchyardError::InvalidArguments {
        tool: tool.to_string(),
        reason: e.to_string(),
    })
}
