use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::load::LoadFacts;
use crate::errors::DomainError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundAction {
    Accept,
    Counter,
}

impl RoundAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Counter => "counter",
        }
    }
}

/// Machine-readable reason codes carried on every decision for audit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RationaleCode {
    AskAtOrBelowOffer,
    LateRoundWithinCap,
    GapWithinTolerance,
    ConcessionStep,
    CappedConcession,
}

impl RationaleCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AskAtOrBelowOffer => "ask_at_or_below_offer",
            Self::LateRoundWithinCap => "late_round_within_cap",
            Self::GapWithinTolerance => "gap_within_tolerance",
            Self::ConcessionStep => "concession_step",
            Self::CappedConcession => "capped_concession",
        }
    }
}

/// One negotiation round as supplied by the caller. The caller threads
/// `next_offer` from the previous decision into `prior_offer`; in round 1
/// `prior_offer` is the listed rate (or an explicit starting offer).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundInput {
    pub load_id: String,
    pub round: u32,
    pub carrier_ask: Decimal,
    pub prior_offer: Decimal,
    pub facts: LoadFacts,
}

impl RoundInput {
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.round == 0 {
            return Err(DomainError::invalid_input("round number must be at least 1"));
        }
        if self.carrier_ask < Decimal::ZERO {
            return Err(DomainError::invalid_input("carrier ask must not be negative"));
        }
        if self.prior_offer < Decimal::ZERO {
            return Err(DomainError::invalid_input("prior offer must not be negative"));
        }
        if self.facts.listed_rate < Decimal::ZERO {
            return Err(DomainError::invalid_input("listed rate must not be negative"));
        }
        Ok(())
    }
}

/// The decision for one round. `next_round` is handed back so the caller
/// can thread it into the next invocation; the engines hold no state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoundDecision {
    pub action: RoundAction,
    pub next_offer: Decimal,
    pub cap_rate: Decimal,
    pub next_round: u32,
    pub rationale: RationaleCode,
}

impl RoundDecision {
    pub fn is_accept(&self) -> bool {
        self.action == RoundAction::Accept
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{RationaleCode, RoundInput};
    use crate::domain::load::LoadFacts;
    use crate::errors::DomainError;

    fn input(round: u32, ask: i64, prior: i64) -> RoundInput {
        RoundInput {
            load_id: "L-1001".to_string(),
            round,
            carrier_ask: Decimal::from(ask),
            prior_offer: Decimal::from(prior),
            facts: LoadFacts::new(Decimal::from(2000)),
        }
    }

    #[test]
    fn round_zero_is_rejected() {
        let error = input(0, 2100, 2000).validate().expect_err("round 0 must fail");
        assert!(matches!(error, DomainError::InvalidInput(_)));
    }

    #[test]
    fn negative_ask_is_rejected() {
        let mut bad = input(1, 2100, 2000);
        bad.carrier_ask = Decimal::from(-5);
        assert!(bad.validate().is_err());
    }

    #[test]
    fn valid_round_passes_validation() {
        assert!(input(3, 2100, 2000).validate().is_ok());
    }

    #[test]
    fn rationale_codes_render_for_audit() {
        assert_eq!(RationaleCode::LateRoundWithinCap.as_str(), "late_round_within_cap");
        assert_eq!(RationaleCode::ConcessionStep.as_str(), "concession_step");
    }
}
