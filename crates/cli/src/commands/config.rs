use std::env;
use std::fs;
use std::path::PathBuf;

use freightdesk_core::config::{AppConfig, LoadOptions};
use toml::Value;

/// Renders every effective setting as `key = value (source: ...)`, where
/// the source is whichever layer won: env, file, or default. Secrets are
/// redacted before they reach the terminal.
pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let file = ConfigFile::detect();
    let cap = &config.pricing.cap;
    let negotiation = &config.pricing.negotiation;

    let web_key = if config.has_web_key() { "<redacted>" } else { "<unset>" }.to_string();
    let entries: Vec<(&str, String, Option<&str>)> = vec![
        ("registry.base_url", config.registry.base_url.clone(), Some("FREIGHTDESK_REGISTRY_BASE_URL")),
        ("registry.web_key", web_key, Some("FREIGHTDESK_REGISTRY_WEB_KEY")),
        (
            "registry.timeout_secs",
            config.registry.timeout_secs.to_string(),
            Some("FREIGHTDESK_REGISTRY_TIMEOUT_SECS"),
        ),
        (
            "registry.max_retries",
            config.registry.max_retries.to_string(),
            Some("FREIGHTDESK_REGISTRY_MAX_RETRIES"),
        ),
        (
            "registry.retry_base_delay_ms",
            config.registry.retry_base_delay_ms.to_string(),
            Some("FREIGHTDESK_REGISTRY_RETRY_BASE_DELAY_MS"),
        ),
        ("pricing.cap.max_allowance", cap.max_allowance.to_string(), None),
        ("pricing.cap.allowance_pct", cap.allowance_pct.to_string(), None),
        ("pricing.cap.equipment_premium", cap.equipment_premium.to_string(), None),
        ("pricing.cap.short_haul_premium", cap.short_haul_premium.to_string(), None),
        ("pricing.cap.short_haul_miles", cap.short_haul_miles.to_string(), None),
        ("pricing.cap.rounding_increment", cap.rounding_increment.to_string(), None),
        ("pricing.negotiation.late_round", negotiation.late_round.to_string(), None),
        ("pricing.negotiation.accept_tolerance", negotiation.accept_tolerance.to_string(), None),
        ("pricing.negotiation.min_step", negotiation.min_step.to_string(), None),
        ("logging.level", config.logging.level.clone(), Some("FREIGHTDESK_LOGGING_LEVEL")),
        ("logging.format", format!("{:?}", config.logging.format), Some("FREIGHTDESK_LOGGING_FORMAT")),
    ];

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for (key, value, env_key) in entries {
        lines.push(format!("- {key} = {value} (source: {})", file.source_of(key, env_key)));
    }
    lines.join("\n")
}

struct ConfigFile {
    path: Option<PathBuf>,
    document: Option<Value>,
}

impl ConfigFile {
    fn detect() -> Self {
        let path = ["freightdesk.toml", "config/freightdesk.toml"]
            .into_iter()
            .map(PathBuf::from)
            .find(|candidate| candidate.exists());
        let document = path
            .as_deref()
            .and_then(|path| fs::read_to_string(path).ok())
            .and_then(|raw| raw.parse::<Value>().ok());
        Self { path, document }
    }

    fn source_of(&self, key_path: &str, env_key: Option<&str>) -> String {
        if let Some(env_key) = env_key {
            if env::var_os(env_key).is_some() {
                return format!("env ({env_key})");
            }
        }

        if self.contains(key_path) {
            let display = self
                .path
                .as_ref()
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({display})");
        }

        "default".to_string()
    }

    fn contains(&self, key_path: &str) -> bool {
        let Some(document) = self.document.as_ref() else {
            return false;
        };
        let mut current = document;
        for key in key_path.split('.') {
            match current.get(key) {
                Some(next) => current = next,
                None => return false,
            }
        }
        true
    }
}
