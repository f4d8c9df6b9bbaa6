//! Tool whitelist, prompt-injection screening and work item field checks.

pub mod injection;
pub mod registry;
pub mod work_items;

pub use injection::{detect, sanitize, REDACTION_MARKER};
pub use registry::{ToolRegistry, ValidationOutcome};
