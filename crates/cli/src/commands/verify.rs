use chrono::{DateTime, Utc};
use freightdesk_core::config::{AppConfig, LoadOptions};
use freightdesk_core::{
    AuditSink, CallCategory, CallEvent, EventOutcome, TracingAuditSink, VerdictEvidence,
};
use freightdesk_registry::{EligibilityResolver, HttpRegistryClient, RegistryError};
use serde::Serialize;
use uuid::Uuid;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct VerifyReport {
    command: &'static str,
    status: &'static str,
    mc: String,
    dot: Option<String>,
    eligible: bool,
    eligibility_status: &'static str,
    checked_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    evidence: Option<VerdictEvidence>,
}

pub fn run(mc: &str, include_evidence: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("verify", "config_validation", error.to_string(), 2)
        }
    };
    super::init_logging(&config);

    let client = match HttpRegistryClient::from_config(&config.registry) {
        Ok(client) => client,
        Err(RegistryError::MissingWebKey) => {
            return CommandResult::failure(
                "verify",
                "registry_web_key_missing",
                "set registry.web_key in freightdesk.toml or FREIGHTDESK_REGISTRY_WEB_KEY",
                2,
            );
        }
        Err(error) => {
            return CommandResult::failure("verify", "registry_client", error.to_string(), 4)
        }
    };

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "verify",
                "runtime_init",
                format!("failed to initialize async runtime: {error}"),
                4,
            );
        }
    };

    let resolver = EligibilityResolver::new(client);
    let verdict = match runtime.block_on(resolver.verify(mc)) {
        Ok(verdict) => verdict,
        Err(RegistryError::Authentication) => {
            return CommandResult::failure(
                "verify",
                "registry_authentication",
                "registry rejected the configured web key",
                3,
            );
        }
        Err(RegistryError::Domain(error)) => {
            return CommandResult::failure("verify", "invalid_input", error.to_string(), 2)
        }
        Err(error) => {
            return CommandResult::failure("verify", "registry_unreachable", error.to_string(), 4)
        }
    };

    TracingAuditSink.emit(
        CallEvent::record(
            "eligibility.verdict",
            CallCategory::Eligibility,
            "eligibility-resolver",
            EventOutcome::Success,
        )
        .correlated(Uuid::new_v4().to_string())
        .with_metadata("mc", verdict.mc.as_str())
        .with_metadata("status", verdict.status.as_str())
        .with_metadata("eligible", verdict.eligible.to_string()),
    );

    CommandResult::data(
        0,
        &VerifyReport {
            command: "verify",
            status: "ok",
            mc: verdict.mc.to_string(),
            dot: verdict.dot_number.as_ref().map(|dot| dot.0.clone()),
            eligible: verdict.eligible,
            eligibility_status: verdict.status.as_str(),
            checked_at: verdict.checked_at,
            evidence: include_evidence.then_some(verdict.evidence),
        },
    )
}
