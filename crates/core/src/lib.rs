pub mod audit;
pub mod config;
pub mod domain;
pub mod eligibility;
pub mod errors;
pub mod loadboard;
pub mod pricing;
pub mod session;

pub use audit::{AuditSink, CallCategory, CallEvent, EventOutcome, InMemoryAuditSink, TracingAuditSink};
pub use domain::carrier::{
    CarrierVerdict, DotNumber, EligibilityStatus, McNumber, VerdictEvidence,
};
pub use domain::load::{EquipmentClass, Load, LoadFacts};
pub use domain::negotiation::{RationaleCode, RoundAction, RoundDecision, RoundInput};
pub use eligibility::{decide, CarrierFlags, EligibilityDecision, EligibilitySnapshot};
pub use errors::DomainError;
pub use loadboard::{search, LoadMatch, LoadQuery};
pub use pricing::{cap_rate, cap_with_breakdown, evaluate_round, CapBreakdown, CapPolicy, NegotiationPolicy};
pub use session::{InMemorySessionStore, NegotiationState, SessionStore};
