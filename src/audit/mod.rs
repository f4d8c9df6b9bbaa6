//! Audit trail for message processing.
//!
//! Every event is emitted through `tracing` under the `audit` target and, when
//! an [`AuditLog`] is attached, also kept in memory.

pub mod events;
pub mod log;

pub use events::{AuditEvent, AuditKind, DispatchOutcome};
pub use log::{AuditCallback, AuditLog};

use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

/// Per-invocation audit emitter. Holds the correlation id shared by every
/// event of one `process` call.
pub struct Auditor {
    correlation_id: Uuid,
    log: Option<Arc<AuditLog>>,
}

impl Auditor {
    pub fn new(log: Option<Arc<AuditLog>>) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            log,
        }
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    fn record(&self, kind: AuditKind) {
        if let Some(log) = &self.log {
            log.store(AuditEvent::new(self.correlation_id, kind));
        }
    }

    pub fn message_received(&self, user_id: &str, channel: &str, length: usize) {
        info!(
            target: "audit",
            correlation_id = %self.correlation_id,
            user_id,
            channel,
            length,
            "message received"
        );
        self.record(AuditKind::MessageReceived {
            user_id: user_id.to_string(),
            channel: channel.to_string(),
            length,
        });
    }

    pub fn injection_detected(&self, user_id: &str, channel: &str) {
        warn!(
            target: "audit",
            correlation_id = %self.correlation_id,
            user_id,
            channel,
            "potential prompt injection detected"
        );
        self.record(AuditKind::InjectionDetected {
            user_id: user_id.to_string(),
            channel: channel.to_string(),
        });
    }

    pub fn tool_dispatched(&self, tool: &str, provider: Option<&str>, outcome: DispatchOutcome) {
        match outcome {
            DispatchOutcome::Succeeded => info!(
                target: "audit",
                correlation_id = %self.correlation_id,
                tool,
                provider,
                outcome = outcome.as_str(),
                "tool dispatched"
            ),
            _ => warn!(
                target: "audit",
                correlation_id = %self.correlation_id,
                tool,
                provider,
                outcome = outcome.as_str(),
                "tool dispatched"
            ),
        }
        self.record(AuditKind::ToolDispatched {
            tool: tool.to_string(),
            provider: provider.map(str::to_string),
            outcome,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_share_correlation_id() {
        let log = Arc::new(AuditLog::new());
        let auditor = Auditor::new(Some(log.clone()));

        auditor.message_received("u1", "telegram", 12);
        auditor.injection_detected("u1", "telegram");
        auditor.tool_dispatched("devops_list_repos", Some("devops"), DispatchOutcome::Succeeded);

        let events = log.events();
        assert_eq!(events.len(), 3);
        assert!(events.iter().all(|e| e.correlation_id == auditor.correlation_id()));
    }

    #[test]
    fn test_without_log_only_traces() {
        let auditor = Auditor::new(None);

        auditor.tool_dispatched("rm", None, DispatchOutcome::Rejected);
    }

    #[test]
    fn test_separate_auditors_get_distinct_ids() {
        assert_ne!(Auditor::new(None).correlation_id(), Auditor::new(None).correlation_id());
    }
}
