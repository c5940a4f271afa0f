use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::domain::load::LoadFacts;
use crate::errors::DomainError;

/// Cap policy knobs. One canonical variant of the historical formulas,
/// surfaced entirely as configuration so operators can retune without a
/// code change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapPolicy {
    /// Absolute ceiling on the allowance above the listed rate.
    pub max_allowance: Decimal,
    /// Allowance as a fraction of the listed rate; the lesser of the two
    /// bounds wins.
    pub allowance_pct: Decimal,
    /// Flat premium for specialized equipment (reefer, flatbed).
    pub equipment_premium: Decimal,
    /// Flat premium for hauls under `short_haul_miles`.
    pub short_haul_premium: Decimal,
    pub short_haul_miles: u32,
    /// Quoting granularity; caps and counters land on this grid.
    pub rounding_increment: Decimal,
}

impl Default for CapPolicy {
    fn default() -> Self {
        Self {
            max_allowance: Decimal::from(325),
            allowance_pct: Decimal::new(25, 2),
            equipment_premium: Decimal::from(100),
            short_haul_premium: Decimal::from(75),
            short_haul_miles: 300,
            rounding_increment: Decimal::from(25),
        }
    }
}

/// Per-component trace of a cap computation, kept for audit output.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapBreakdown {
    pub listed_rate: Decimal,
    pub base_allowance: Decimal,
    pub equipment_premium: Decimal,
    pub short_haul_premium: Decimal,
    pub unrounded: Decimal,
    pub cap: Decimal,
}

/// Maximum payable rate for a load. A pure function of the load facts and
/// policy only; the ask and round number never enter, so a carrier cannot
/// move the ceiling by negotiating harder.
pub fn cap_rate(facts: &LoadFacts, policy: &CapPolicy) -> Result<Decimal, DomainError> {
    cap_with_breakdown(facts, policy).map(|breakdown| breakdown.cap)
}

pub fn cap_with_breakdown(
    facts: &LoadFacts,
    policy: &CapPolicy,
) -> Result<CapBreakdown, DomainError> {
    if facts.listed_rate < Decimal::ZERO {
        return Err(DomainError::invalid_input("listed rate must not be negative"));
    }

    let base_allowance = (facts.listed_rate * policy.allowance_pct).min(policy.max_allowance);

    let equipment_premium = match facts.equipment {
        Some(equipment) if equipment.is_specialized() => policy.equipment_premium,
        _ => Decimal::ZERO,
    };

    // Unknown distance draws no premium; short hauls carry proportionally
    // higher fixed costs.
    let short_haul_premium = match facts.distance_miles {
        Some(miles) if miles < policy.short_haul_miles => policy.short_haul_premium,
        _ => Decimal::ZERO,
    };

    let unrounded = facts.listed_rate + base_allowance + equipment_premium + short_haul_premium;
    let cap = round_to_increment(unrounded, policy.rounding_increment);

    Ok(CapBreakdown {
        listed_rate: facts.listed_rate,
        base_allowance,
        equipment_premium,
        short_haul_premium,
        unrounded,
        cap,
    })
}

fn round_to_increment(value: Decimal, increment: Decimal) -> Decimal {
    if increment <= Decimal::ZERO {
        return value;
    }
    (value / increment).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        * increment
}

/// Snaps a value down onto the quoting grid.
pub(crate) fn floor_to_increment(value: Decimal, increment: Decimal) -> Decimal {
    if increment <= Decimal::ZERO {
        return value;
    }
    (value / increment).floor() * increment
}
