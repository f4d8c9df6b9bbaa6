//! Audit event types recorded while processing a message.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// How a single tool call ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchOutcome {
    Succeeded,
    Failed,
    /// Name not in the registry
    Rejected,
    /// Arguments were not a JSON object
    MalformedArguments,
    /// Registered, but no provider claimed it
    Unclaimed,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Succeeded => "succeeded",
            DispatchOutcome::Failed => "failed",
            DispatchOutcome::Rejected => "rejected",
            DispatchOutcome::MalformedArguments => "malformed_arguments",
            DispatchOutcome::Unclaimed => "unclaimed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuditKind {
    MessageReceived {
        user_id: String,
        channel: String,
        length: usize,
    },
    InjectionDetected {
        user_id: String,
        channel: String,
    },
    ToolDispatched {
        tool: String,
        provider: Option<String>,
        outcome: DispatchOutcome,
    },
}

/// One audit record. Events from the same `process` call share a correlation id.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub correlation_id: Uuid,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub kind: AuditKind,
}

impl AuditEvent {
    pub fn new(correlation_id: Uuid, kind: AuditKind) -> Self {
        Self {
            correlation_id,
            timestamp: Utc::now(),
            kind,
        }
    }

    pub fn is_injection(&self) -> bool {
        matches!(self.kind, AuditKind::InjectionDetected { .. })
    }

    pub fn dispatch_outcome(&self) -> Option<DispatchOutcome> {
        match &self.kind {
            AuditKind::ToolDispatched { outcome, .. } => Some(*outcome),
            _ => None,
        }
    }

    pub fn printable_summary(&self) -> String {
        let when = self.timestamp.format("%H:%M:%S%.3f");
        match &self.kind {
            AuditKind::MessageReceived {
                user_id,
                channel,
                length,
            } => format!("[{}] message from {} via {} ({} chars)", when, user_id, channel, length),
            AuditKind::InjectionDetected { user_id, channel } => {
                format!("[{}] possible injection from {} via {}", when, user_id, channel)
            }
            AuditKind::ToolDispatched {
                tool,
                provider,
                outcome,
            } => format!(
                "[{}] tool {} -> {} ({})",
                when,
                tool,
                provider.as_deref().unwrap_or("-"),
                outcome.as_str()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_flat_with_kind_tag() {
        let event = AuditEvent::new(
            Uuid::new_v4(),
            AuditKind::ToolDispatched {
                tool: "devops_list_repos".to_string(),
                provider: Some("devops".to_string()),
                outcome: DispatchOutcome::Succeeded,
            },
        );

        let value = serde_json::to_value(&event).unwrap();

        assert_eq!(value["kind"], "tool_dispatched");
        assert_eq!(value["outcome"], "succeeded");
        assert_eq!(value["correlation_id"], event.correlation_id.to_string());
    }

    #[test]
    fn test_summary() {
        let event = AuditEvent::new(
            Uuid::new_v4(),
            AuditKind::ToolDispatched {
                tool: "rm_rf".to_string(),
                provider: None,
                outcome: DispatchOutcome::Rejected,
            },
        );

        assert!(event.printable_summary().ends_with("tool rm_rf -> - (rejected)"));
        assert_eq!(event.dispatch_outcome(), Some(DispatchOutcome::Rejected));
        assert!(!event.is_injection());
    }
}
