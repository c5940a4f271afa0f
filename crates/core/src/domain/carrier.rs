use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::DomainError;

/// MC (docket) number normalized to digits only.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct McNumber(String);

impl McNumber {
    /// Strips every non-digit character from caller-supplied input.
    /// Callers pass whatever the phone channel captured ("MC-123456",
    /// "mc 123456", ...); an input with no digits at all is rejected.
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
        if digits.is_empty() {
            return Err(DomainError::invalid_input(format!(
                "carrier identifier `{raw}` contains no digits"
            )));
        }
        Ok(Self(digits))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for McNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// USDOT number resolved from a docket lookup.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DotNumber(pub String);

impl std::fmt::Display for DotNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EligibilityStatus {
    Authorized,
    NotAuthorized,
    OutOfService,
    NotFound,
    Unknown,
}

impl EligibilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authorized => "authorized",
            Self::NotAuthorized => "not_authorized",
            Self::OutOfService => "out_of_service",
            Self::NotFound => "not_found",
            Self::Unknown => "unknown",
        }
    }
}

/// Raw registry fragments retained per lookup step. Kept opaque
/// (`serde_json::Value`) so upstream schema drift never breaks audit.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VerdictEvidence {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docket_lookup: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carrier: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authority: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oos: Option<Value>,
}

/// One eligibility decision with its reason code and audit evidence.
/// Constructed once per verification call and never mutated.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CarrierVerdict {
    pub mc: McNumber,
    pub dot_number: Option<DotNumber>,
    pub eligible: bool,
    pub status: EligibilityStatus,
    pub evidence: VerdictEvidence,
    pub checked_at: DateTime<Utc>,
}

impl CarrierVerdict {
    pub fn new(
        mc: McNumber,
        dot_number: Option<DotNumber>,
        eligible: bool,
        status: EligibilityStatus,
        evidence: VerdictEvidence,
    ) -> Self {
        Self { mc, dot_number, eligible, status, evidence, checked_at: Utc::now() }
    }

    /// Terminal verdict for an identifier the registry does not know.
    pub fn not_found(mc: McNumber, evidence: VerdictEvidence) -> Self {
        Self::new(mc, None, false, EligibilityStatus::NotFound, evidence)
    }

    /// Best-effort verdict when registry lookups errored after resolution.
    pub fn unknown(mc: McNumber, dot_number: DotNumber, evidence: VerdictEvidence) -> Self {
        Self::new(mc, Some(dot_number), false, EligibilityStatus::Unknown, evidence)
    }
}
