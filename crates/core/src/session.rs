//! Session continuity is owned by the call-handling layer, not by the
//! decision engines. This module only defines the store seam that layer
//! injects, replacing the shared lock-guarded maps of earlier revisions.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The single piece of state a negotiation session carries between
/// rounds: which round is current and what we last quoted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationState {
    pub session_id: String,
    pub load_id: String,
    pub round: u32,
    pub prior_offer: Decimal,
}

pub trait SessionStore: Send + Sync {
    fn get(&self, session_id: &str) -> Option<NegotiationState>;
    fn put(&self, state: NegotiationState);
    fn remove(&self, session_id: &str);
}

#[derive(Default)]
pub struct InMemorySessionStore {
    sessions: RwLock<HashMap<String, NegotiationState>>,
}

impl SessionStore for InMemorySessionStore {
    fn get(&self, session_id: &str) -> Option<NegotiationState> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(session_id)
            .cloned()
    }

    fn put(&self, state: NegotiationState) {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(state.session_id.clone(), state);
    }

    fn remove(&self, session_id: &str) {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner).remove(session_id);
    }
}
