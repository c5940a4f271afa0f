pub mod cap;
pub mod engine;

pub use cap::{cap_rate, cap_with_breakdown, CapBreakdown, CapPolicy};
pub use engine::{evaluate_round, NegotiationPolicy};
