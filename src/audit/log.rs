//! In-memory audit store with an optional on-store callback.

use super::events::AuditEvent;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub type AuditCallback = Arc<dyn Fn(&AuditEvent) + Send + Sync>;

/// Thread-safe append-only store of [`AuditEvent`]s.
///
/// Shared between orchestrator invocations through an `Arc`; embedders can
/// forward each event via the callback instead of polling.
#[derive(Default)]
pub struct AuditLog {
    events: Mutex<Vec<AuditEvent>>,
    on_store: Option<AuditCallback>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_callback(callback: AuditCallback) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            on_store: Some(callback),
        }
    }

    fn guard(&self) -> MutexGuard<'_, Vec<AuditEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn store(&self, event: AuditEvent) {
        if let Some(callback) = &self.on_store {
            callback(&event);
        }
        self.guard().push(event);
    }

    pub fn count(&self, filter: impl Fn(&AuditEvent) -> bool) -> usize {
        self.guard().iter().filter(|e| filter(e)).count()
    }

    pub fn filter(&self, filter: impl Fn(&AuditEvent) -> bool) -> Vec<AuditEvent> {
        self.guard().iter().filter(|e| filter(e)).cloned().collect()
    }

    pub fn events(&self) -> Vec<AuditEvent> {
        self.guard().clone()
    }

    /// Summaries of the most recent `n` events, oldest first
    pub fn last_summaries(&self, n: usize) -> Vec<String> {
        let events = self.guard();
        let skip = events.len().saturating_sub(n);
        events.iter().skip(skip).map(AuditEvent::printable_summary).collect()
    }

    pub fn len(&self) -> usize {
        self.guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard().is_empty()
    }

    pub fn clear(&self) {
        self.guard().clear();
    }
}
