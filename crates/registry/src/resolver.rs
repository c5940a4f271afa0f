use std::future::Future;

use freightdesk_core::{
    decide, CarrierVerdict, EligibilitySnapshot, McNumber, VerdictEvidence,
};
use serde_json::Value;
use tracing::{info, warn};

use crate::client::RegistryApi;
use crate::decode;
use crate::error::RegistryError;

/// Aggregates the registry lookups for one carrier into a single verdict.
/// Stateless; one `verify` call per inbound carrier, safe to share across
/// concurrent calls.
pub struct EligibilityResolver<C> {
    client: C,
}

impl<C: RegistryApi> EligibilityResolver<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    /// Verifies a caller-supplied MC number.
    ///
    /// Degradation ladder: a failed docket resolution answers `not_found`;
    /// failed carrier/authority fetches after resolution answer `unknown`.
    /// Only credential rejection and unusable input abort the call.
    pub async fn verify(&self, raw_mc: &str) -> Result<CarrierVerdict, RegistryError> {
        let mc = McNumber::parse(raw_mc)?;
        let mut evidence = VerdictEvidence::default();

        let docket = self.degradable(self.client.docket_lookup(&mc), "docket_lookup").await?;
        evidence.docket_lookup = docket.clone();

        let Some(dot) = docket.as_ref().and_then(decode::extract_dot) else {
            info!(mc = %mc, "carrier identifier did not resolve in the registry");
            return Ok(CarrierVerdict::not_found(mc, evidence));
        };

        let carrier = self.degradable(self.client.carrier_record(&dot), "carrier_record").await?;
        evidence.carrier = carrier.clone();

        let authority =
            self.degradable(self.client.authority_record(&dot), "authority_record").await?;
        evidence.authority = authority.clone();

        // Best effort: this record is frequently absent upstream and its
        // failure never affects the verdict.
        evidence.oos = self.client.oos_record(&dot).await.ok();

        if carrier.is_none() || authority.is_none() {
            return Ok(CarrierVerdict::unknown(mc, dot, evidence));
        }

        let snapshot = EligibilitySnapshot {
            flags: carrier.as_ref().map(decode::carrier_flags).unwrap_or_default(),
            authority_statuses: authority
                .as_ref()
                .map(decode::authority_statuses)
                .unwrap_or_default(),
        };
        let decision = decide(&snapshot);

        info!(
            mc = %mc,
            dot = %dot,
            status = decision.status.as_str(),
            eligible = decision.eligible,
            "eligibility verdict resolved"
        );
        Ok(CarrierVerdict::new(mc, Some(dot), decision.eligible, decision.status, evidence))
    }

    /// Runs one lookup, converting upstream trouble into a missing payload
    /// so the verdict can still be answered. Credential rejection is the
    /// exception: retrying other lookups with the same key cannot succeed.
    async fn degradable<F>(&self, lookup: F, step: &str) -> Result<Option<Value>, RegistryError>
    where
        F: Future<Output = Result<Value, RegistryError>>,
    {
        match lookup.await {
            Ok(payload) => Ok(Some(payload)),
            Err(RegistryError::Authentication) => Err(RegistryError::Authentication),
            Err(error) => {
                warn!(step, error = %error, "registry lookup degraded");
                Ok(None)
            }
        }
    }
}
