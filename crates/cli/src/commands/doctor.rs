use freightdesk_core::config::{AppConfig, ConfigError, LoadOptions};
use freightdesk_core::McNumber;
use freightdesk_registry::{HttpRegistryClient, RegistryApi, RegistryError};
use serde::Serialize;
use serde_json::json;

/// MC number used for the reachability probe; any registered carrier
/// works, the check only cares whether the registry answers at all.
const PROBE_MC: &str = "76667";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

impl CheckStatus {
    fn marker(self) -> &'static str {
        match self {
            Self::Pass => "ok",
            Self::Fail => "fail",
            Self::Skipped => "skip",
        }
    }
}

#[derive(Debug, Serialize)]
struct DoctorCheck {
    name: &'static str,
    status: CheckStatus,
    details: String,
}

impl DoctorCheck {
    fn pass(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Pass, details: details.into() }
    }

    fn fail(name: &'static str, details: impl Into<String>) -> Self {
        Self { name, status: CheckStatus::Fail, details: details.into() }
    }

    fn skipped(name: &'static str, reason: &str) -> Self {
        Self { name, status: CheckStatus::Skipped, details: format!("skipped because {reason}") }
    }
}

#[derive(Debug, Serialize)]
struct DoctorReport {
    overall_status: CheckStatus,
    summary: String,
    checks: Vec<DoctorCheck>,
}

impl DoctorReport {
    fn from_checks(checks: Vec<DoctorCheck>) -> Self {
        let all_pass = checks.iter().all(|check| check.status == CheckStatus::Pass);
        Self {
            overall_status: if all_pass { CheckStatus::Pass } else { CheckStatus::Fail },
            summary: if all_pass {
                "doctor: all readiness checks passed".to_string()
            } else {
                "doctor: one or more readiness checks failed".to_string()
            },
            checks,
        }
    }

    fn render_human(&self) -> String {
        let mut lines = vec![self.summary.clone()];
        for check in &self.checks {
            lines.push(format!("- [{}] {}: {}", check.status.marker(), check.name, check.details));
        }
        lines.join("\n")
    }
}

pub fn run(json_output: bool) -> String {
    let report = build_report(AppConfig::load(LoadOptions::default()));

    if json_output {
        serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            json!({
                "overall_status": "fail",
                "summary": "doctor serialization failed",
                "error": error.to_string(),
            })
            .to_string()
        })
    } else {
        report.render_human()
    }
}

fn build_report(config: Result<AppConfig, ConfigError>) -> DoctorReport {
    let config = match config {
        Ok(config) => config,
        Err(error) => {
            let reason = "configuration did not load";
            return DoctorReport::from_checks(vec![
                DoctorCheck::fail("config_validation", error.to_string()),
                DoctorCheck::skipped("web_key_presence", reason),
                DoctorCheck::skipped("registry_reachability", reason),
            ]);
        }
    };

    DoctorReport::from_checks(vec![
        DoctorCheck::pass("config_validation", "configuration loaded and validated"),
        check_web_key(&config),
        check_registry_reachability(&config),
    ])
}

fn check_web_key(config: &AppConfig) -> DoctorCheck {
    if config.has_web_key() {
        DoctorCheck::pass("web_key_presence", "registry web key is configured")
    } else {
        DoctorCheck::fail(
            "web_key_presence",
            "set registry.web_key in freightdesk.toml or FREIGHTDESK_REGISTRY_WEB_KEY",
        )
    }
}

fn check_registry_reachability(config: &AppConfig) -> DoctorCheck {
    const NAME: &str = "registry_reachability";

    if !config.has_web_key() {
        return DoctorCheck::skipped(NAME, "no web key is configured");
    }

    let client = match HttpRegistryClient::from_config(&config.registry) {
        Ok(client) => client,
        Err(error) => return DoctorCheck::fail(NAME, format!("failed to build registry client: {error}")),
    };
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return DoctorCheck::fail(NAME, format!("failed to initialize async runtime: {error}"))
        }
    };
    let probe = match McNumber::parse(PROBE_MC) {
        Ok(probe) => probe,
        Err(error) => return DoctorCheck::fail(NAME, format!("probe identifier rejected: {error}")),
    };

    match runtime.block_on(client.docket_lookup(&probe)) {
        Ok(_) => {
            DoctorCheck::pass(NAME, format!("registry answered at `{}`", config.registry.base_url))
        }
        // An HTTP-level error still proves the registry is reachable.
        Err(RegistryError::UpstreamStatus { status }) => {
            DoctorCheck::pass(NAME, format!("registry reachable (probe returned status {status})"))
        }
        Err(RegistryError::Authentication) => {
            DoctorCheck::fail(NAME, "registry reachable but rejected the configured web key")
        }
        Err(error) => DoctorCheck::fail(NAME, error.to_string()),
    }
}
