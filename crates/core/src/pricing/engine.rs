use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::negotiation::{RationaleCode, RoundAction, RoundDecision, RoundInput};
use crate::errors::DomainError;
use crate::pricing::cap::{self, CapPolicy};

/// Concession policy knobs, configuration like the cap policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NegotiationPolicy {
    /// Round at which acceptance criteria relax (inclusive).
    pub late_round: u32,
    /// Accept outright when the ask sits this close to our last offer.
    pub accept_tolerance: Decimal,
    /// Smallest concession we ever quote.
    pub min_step: Decimal,
    /// Fraction of the remaining gap conceded in round 1.
    pub concession_round1: Decimal,
    /// Fraction conceded in round 2.
    pub concession_round2: Decimal,
    /// Fraction conceded from `late_round` onward.
    pub concession_late: Decimal,
}

impl Default for NegotiationPolicy {
    fn default() -> Self {
        Self {
            late_round: 3,
            accept_tolerance: Decimal::from(50),
            min_step: Decimal::from(25),
            concession_round1: Decimal::new(50, 2),
            concession_round2: Decimal::new(35, 2),
            concession_late: Decimal::new(25, 2),
        }
    }
}

impl NegotiationPolicy {
    /// Front-loaded in the early rounds, flat afterwards.
    pub fn concession_fraction(&self, round: u32) -> Decimal {
        match round {
            0 | 1 => self.concession_round1,
            2 => self.concession_round2,
            _ => self.concession_late,
        }
    }
}

/// Decides accept vs. counter for a single round. Stateless: everything
/// the decision needs arrives in `input`, and the caller threads
/// `next_offer`/`next_round` into the following invocation.
pub fn evaluate_round(
    input: &RoundInput,
    cap_policy: &CapPolicy,
    policy: &NegotiationPolicy,
) -> Result<RoundDecision, DomainError> {
    input.validate()?;

    let cap_rate = cap::cap_rate(&input.facts, cap_policy)?;
    let ask = input.carrier_ask;
    let prior = input.prior_offer;
    let next_round = input.round + 1;

    // We never pay more than our own last quote once the carrier comes
    // under it.
    if ask <= prior {
        return Ok(accept(ask, cap_rate, next_round, RationaleCode::AskAtOrBelowOffer));
    }

    if ask <= cap_rate {
        if input.round >= policy.late_round {
            return Ok(accept(ask, cap_rate, next_round, RationaleCode::LateRoundWithinCap));
        }
        if ask - prior <= policy.accept_tolerance {
            return Ok(accept(ask, cap_rate, next_round, RationaleCode::GapWithinTolerance));
        }
    }

    let target = ask.min(cap_rate);
    let gap = (target - prior).max(Decimal::ZERO);
    let step = (gap * policy.concession_fraction(input.round)).max(policy.min_step);

    // Never counter past the target: the minimum step must not carry the
    // offer above what the carrier asked for.
    let mut next_offer = (prior + step).min(target.max(prior));
    let snapped = cap::floor_to_increment(next_offer, cap_policy.rounding_increment);
    if snapped - prior >= policy.min_step {
        next_offer = snapped;
    }

    // Monotonicity first, then the cap; the cap clamp wins if a caller
    // ever hands us a prior offer above the ceiling.
    let mut rationale = RationaleCode::ConcessionStep;
    if next_offer < prior {
        next_offer = prior;
    }
    if next_offer >= cap_rate {
        next_offer = cap_rate;
        rationale = RationaleCode::CappedConcession;
    }
    debug_assert!(
        next_offer <= cap_rate,
        "counter {next_offer} above cap {cap_rate} for load {}",
        input.load_id
    );

    Ok(RoundDecision {
        action: RoundAction::Counter,
        next_offer,
        cap_rate,
        next_round,
        rationale,
    })
}

fn accept(ask: Decimal, cap_rate: Decimal, next_round: u32, rationale: RationaleCode) -> RoundDecision {
    RoundDecision { action: RoundAction::Accept, next_offer: ask, cap_rate, next_round, rationale }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::{evaluate_round, NegotiationPolicy};
    use crate::domain::load::LoadFacts;
    use crate::domain::negotiation::{RationaleCode, RoundAction, RoundInput};
    use crate::errors::DomainError;
    use crate::pricing::cap::CapPolicy;

    fn round(round: u32, ask: i64, prior: i64) -> RoundInput {
        RoundInput {
            load_id: "L-1001".to_string(),
            round,
            carrier_ask: Decimal::from(ask),
            prior_offer: Decimal::from(prior),
            facts: LoadFacts::new(Decimal::from(2000)),
        }
    }

    fn evaluate(input: &RoundInput) -> super::RoundDecision {
        evaluate_round(input, &CapPolicy::default(), &NegotiationPolicy::default())
            .expect("valid round should evaluate")
    }

    #[test]
    fn ask_at_or_below_prior_offer_accepts_at_ask_in_any_round() {
        for round_number in [1, 2, 5, 9] {
            let decision = evaluate(&round(round_number, 1950, 2000));
            assert_eq!(decision.action, RoundAction::Accept);
            assert_eq!(decision.next_offer, Decimal::from(1950));
            assert_eq!(decision.rationale, RationaleCode::AskAtOrBelowOffer);
        }
    }

    #[test]
    fn round_one_counter_stays_between_offer_and_ask() {
        // Listed 2000 caps at 2325; ask 2200 in round 1 draws a counter.
        let decision = evaluate(&round(1, 2200, 2000));

        assert_eq!(decision.action, RoundAction::Counter);
        assert_eq!(decision.cap_rate, Decimal::from(2325));
        assert!(decision.next_offer > Decimal::from(2000));
        assert!(decision.next_offer < Decimal::from(2200));
        assert_eq!(decision.next_offer, Decimal::from(2100));
        assert_eq!(decision.next_round, 2);
    }

    #[test]
    fn late_round_within_cap_accepts_regardless_of_gap() {
        let decision = evaluate(&round(3, 2300, 2000));
        assert_eq!(decision.action, RoundAction::Accept);
        assert_eq!(decision.next_offer, Decimal::from(2300));
        assert_eq!(decision.rationale, RationaleCode::LateRoundWithinCap);
    }

    #[test]
    fn small_gap_accepts_early() {
        let decision = evaluate(&round(1, 2040, 2000));
        assert_eq!(decision.action, RoundAction::Accept);
        assert_eq!(decision.rationale, RationaleCode::GapWithinTolerance);
    }

    #[test]
    fn ask_above_cap_is_never_accepted_late() {
        let decision = evaluate(&round(4, 2600, 2200));
        assert_eq!(decision.action, RoundAction::Counter);
        assert!(decision.next_offer <= decision.cap_rate);
    }

    #[test]
    fn counter_never_exceeds_cap_when_prior_sits_at_cap() {
        let decision = evaluate(&round(2, 2600, 2325));
        assert_eq!(decision.action, RoundAction::Counter);
        assert_eq!(decision.next_offer, Decimal::from(2325));
        assert_eq!(decision.rationale, RationaleCode::CappedConcession);
    }

    #[test]
    fn offers_are_monotonic_and_capped_across_a_session() {
        let cap_policy = CapPolicy::default();
        let policy = NegotiationPolicy::default();
        let mut prior = Decimal::from(2000);

        for round_number in 1..=8 {
            let input = RoundInput {
                load_id: "L-1001".to_string(),
                round: round_number,
                carrier_ask: Decimal::from(2600),
                prior_offer: prior,
                facts: LoadFacts::new(Decimal::from(2000)),
            };
            let decision =
                evaluate_round(&input, &cap_policy, &policy).expect("session round evaluates");

            assert!(decision.next_offer >= prior, "offer regressed in round {round_number}");
            assert!(decision.next_offer <= decision.cap_rate);
            prior = decision.next_offer;
        }
    }

    #[test]
    fn concessions_shrink_after_the_early_rounds() {
        let policy = NegotiationPolicy::default();
        assert_eq!(policy.concession_fraction(1), Decimal::new(50, 2));
        assert_eq!(policy.concession_fraction(2), Decimal::new(35, 2));
        assert_eq!(policy.concession_fraction(3), policy.concession_fraction(7));
    }

    #[test]
    fn counters_land_on_the_quoting_grid() {
        let decision = evaluate(&round(2, 2280, 2100));
        assert_eq!(decision.next_offer % Decimal::from(25), Decimal::ZERO);
    }

    #[test]
    fn invalid_round_number_is_rejected() {
        let error = evaluate_round(
            &round(0, 2200, 2000),
            &CapPolicy::default(),
            &NegotiationPolicy::default(),
        )
        .expect_err("round 0 must fail");
        assert!(matches!(error, DomainError::InvalidInput(_)));
    }
}
