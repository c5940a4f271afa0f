use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallCategory {
    Eligibility,
    Negotiation,
    Loadboard,
    System,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOutcome {
    Success,
    Rejected,
    Failed,
}

/// One audited step of a call flow. Session identity is supplied by the
/// caller that owns the flow; the decision engines never mint one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEvent {
    pub event_id: String,
    pub session_id: Option<String>,
    pub correlation_id: String,
    pub event_type: String,
    pub category: CallCategory,
    pub actor: String,
    pub outcome: EventOutcome,
    pub metadata: BTreeMap<String, String>,
    pub occurred_at: DateTime<Utc>,
}

impl CallEvent {
    pub fn record(
        event_type: impl Into<String>,
        category: CallCategory,
        actor: impl Into<String>,
        outcome: EventOutcome,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4().to_string(),
            session_id: None,
            correlation_id: "unassigned".to_string(),
            event_type: event_type.into(),
            category,
            actor: actor.into(),
            outcome,
            metadata: BTreeMap::new(),
            occurred_at: Utc::now(),
        }
    }

    pub fn in_session(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn correlated(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = correlation_id.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

pub trait AuditSink: Send + Sync {
    fn emit(&self, event: CallEvent);
}

#[derive(Clone, Default)]
pub struct InMemoryAuditSink {
    events: Arc<Mutex<Vec<CallEvent>>>,
}

impl InMemoryAuditSink {
    pub fn events(&self) -> Vec<CallEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl AuditSink for InMemoryAuditSink {
    fn emit(&self, event: CallEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}

/// Emits audit events onto the structured log stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn emit(&self, event: CallEvent) {
        let metadata = serde_json::to_string(&event.metadata).unwrap_or_default();
        tracing::info!(
            event_name = %event.event_type,
            event_id = %event.event_id,
            session_id = event.session_id.as_deref().unwrap_or("unknown"),
            correlation_id = %event.correlation_id,
            actor = %event.actor,
            outcome = ?event.outcome,
            metadata = %metadata,
            "call event recorded"
        );
    }
}
