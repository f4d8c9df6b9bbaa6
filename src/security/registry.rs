use std::collections::HashSet;

/// Result of checking one tool name against the whitelist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl ValidationOutcome {
    fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }
}

/// Grow-only whitelist of tool names the model may invoke.
///
/// Names are added once per enabled provider while the orchestrator is being
/// built; there is no removal operation.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    allowed: HashSet<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add names to the whitelist. Repeat registration is a no-op.
    pub fn register<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed.extend(names.into_iter().map(Into::into));
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowed.contains(name)
    }

    pub fn validate(&self, name: &str) -> ValidationOutcome {
        if self.is_allowed(name) {
            ValidationOutcome::allow()
        } else {
            ValidationOutcome::deny(format!("command not allowed: {}", name))
        }
    }

    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}
