//! Pure eligibility decision rule. Registry payload shapes are messy; the
//! registry crate normalizes them into an [`EligibilitySnapshot`] before
//! this rule ever runs, so the decision itself stays trivially testable.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::domain::carrier::EligibilityStatus;

/// Operating flags lifted from the carrier record. `None` means the
/// upstream record omitted the field; unknown is treated as falsy, never
/// as an error.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CarrierFlags {
    pub allow_to_operate: Option<String>,
    pub out_of_service: Option<String>,
}

/// Everything the decision rule consumes: operating flags plus the union
/// of authority status values, uppercased by the decoder.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilitySnapshot {
    pub flags: CarrierFlags,
    pub authority_statuses: BTreeSet<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EligibilityDecision {
    pub eligible: bool,
    pub status: EligibilityStatus,
}

const ACTIVE_AUTHORITY_STATUSES: [&str; 2] = ["ACTIVE", "AUTHORIZED"];

/// Decision rule, evaluated in order:
/// 1. allowed to operate, not out of service, and an active authority
///    status present: authorized.
/// 2. out of service: out_of_service.
/// 3. anything else: not_authorized.
///
/// A failed identifier resolution short-circuits before this rule runs
/// (`not_found` is decided by the resolver, not here).
pub fn decide(snapshot: &EligibilitySnapshot) -> EligibilityDecision {
    let allow_ok = flag_is_yes(snapshot.flags.allow_to_operate.as_deref());
    let out_of_service = flag_is_yes(snapshot.flags.out_of_service.as_deref());
    let has_active_authority = snapshot
        .authority_statuses
        .iter()
        .any(|status| ACTIVE_AUTHORITY_STATUSES.contains(&status.as_str()));

    if allow_ok && !out_of_service && has_active_authority {
        return EligibilityDecision { eligible: true, status: EligibilityStatus::Authorized };
    }
    if out_of_service {
        return EligibilityDecision { eligible: false, status: EligibilityStatus::OutOfService };
    }
    EligibilityDecision { eligible: false, status: EligibilityStatus::NotAuthorized }
}

fn flag_is_yes(value: Option<&str>) -> bool {
    value.map(|flag| flag.trim().eq_ignore_ascii_case("y")).unwrap_or(false)
}
