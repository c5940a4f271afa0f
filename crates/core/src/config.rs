use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pricing::{CapPolicy, NegotiationPolicy};

const CONFIG_FILE_CANDIDATES: [&str; 2] = ["freightdesk.toml", "config/freightdesk.toml"];

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub registry: RegistryConfig,
    pub pricing: PricingConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct RegistryConfig {
    pub base_url: String,
    /// Registry web key, appended to every request. Held behind
    /// `SecretString` so Debug output and the config command never leak it.
    pub web_key: Option<SecretString>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
}

/// Pricing knobs are file-configured only; there is no env override for
/// them. Retuning the policy is a deliberate, reviewed change.
#[derive(Clone, Debug, Default)]
pub struct PricingConfig {
    pub cap: CapPolicy,
    pub negotiation: NegotiationPolicy,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub registry_base_url: Option<String>,
    pub registry_web_key: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("config file `{0}` does not exist")]
    MissingConfigFile(PathBuf),
    #[error("config file references undefined environment variable `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("config file has an unterminated interpolation expression")]
    UnterminatedInterpolation,
    #[error("environment override `{key}` has unusable value `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            registry: RegistryConfig {
                base_url: "https://mobile.fmcsa.dot.gov/qc/services".to_string(),
                web_key: None,
                timeout_secs: 10,
                max_retries: 2,
                retry_base_delay_ms: 500,
            },
            pricing: PricingConfig::default(),
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "log format must be compact, pretty, or json (got `{other}`)"
            ))),
        }
    }
}

/// Replaces `slot` when the layer being applied provides a value.
fn overlay<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

fn require(condition: bool, message: &str) -> Result<(), ConfigError> {
    if condition {
        Ok(())
    } else {
        Err(ConfigError::Validation(message.to_string()))
    }
}

impl AppConfig {
    /// Layering: defaults, then the TOML file, then `FREIGHTDESK_*`
    /// environment variables, then programmatic overrides; the merged
    /// result must validate.
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        match locate_config_file(options.config_path.as_deref()) {
            Some(path) => read_patch(&path)?.apply(&mut config),
            None if options.require_file => {
                let expected =
                    options.config_path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_CANDIDATES[0]));
                return Err(ConfigError::MissingConfigFile(expected));
            }
            None => {}
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        let registry = &mut self.registry;
        overlay(&mut registry.base_url, read_env("FREIGHTDESK_REGISTRY_BASE_URL"));
        overlay(&mut registry.web_key, read_env("FREIGHTDESK_REGISTRY_WEB_KEY").map(|k| Some(k.into())));
        overlay(
            &mut registry.timeout_secs,
            parse_env("FREIGHTDESK_REGISTRY_TIMEOUT_SECS")?,
        );
        overlay(&mut registry.max_retries, parse_env("FREIGHTDESK_REGISTRY_MAX_RETRIES")?);
        overlay(
            &mut registry.retry_base_delay_ms,
            parse_env("FREIGHTDESK_REGISTRY_RETRY_BASE_DELAY_MS")?,
        );

        let level = read_env("FREIGHTDESK_LOGGING_LEVEL").or_else(|| read_env("FREIGHTDESK_LOG_LEVEL"));
        overlay(&mut self.logging.level, level);
        let format =
            read_env("FREIGHTDESK_LOGGING_FORMAT").or_else(|| read_env("FREIGHTDESK_LOG_FORMAT"));
        if let Some(value) = format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        overlay(&mut self.registry.base_url, overrides.registry_base_url);
        overlay(&mut self.registry.web_key, overrides.registry_web_key.map(|k| Some(k.into())));
        overlay(&mut self.logging.level, overrides.log_level);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let registry = &self.registry;
        require(
            registry.base_url.trim().starts_with("http://")
                || registry.base_url.trim().starts_with("https://"),
            "registry.base_url must start with http:// or https://",
        )?;
        require(
            (1..=300).contains(&registry.timeout_secs),
            "registry.timeout_secs must be in range 1..=300",
        )?;
        require(
            registry.retry_base_delay_ms > 0,
            "registry.retry_base_delay_ms must be greater than zero",
        )?;

        let cap = &self.pricing.cap;
        require(
            cap.allowance_pct > Decimal::ZERO && cap.allowance_pct <= Decimal::ONE,
            "pricing.cap.allowance_pct must be in range (0, 1]",
        )?;
        require(cap.max_allowance >= Decimal::ZERO, "pricing.cap.max_allowance must not be negative")?;
        require(
            cap.equipment_premium >= Decimal::ZERO && cap.short_haul_premium >= Decimal::ZERO,
            "pricing.cap premiums must not be negative",
        )?;
        require(
            cap.rounding_increment > Decimal::ZERO,
            "pricing.cap.rounding_increment must be greater than zero",
        )?;

        let negotiation = &self.pricing.negotiation;
        require(negotiation.late_round >= 1, "pricing.negotiation.late_round must be at least 1")?;
        require(
            negotiation.min_step > Decimal::ZERO,
            "pricing.negotiation.min_step must be greater than zero",
        )?;
        require(
            negotiation.accept_tolerance >= Decimal::ZERO,
            "pricing.negotiation.accept_tolerance must not be negative",
        )?;
        for (name, fraction) in [
            ("concession_round1", negotiation.concession_round1),
            ("concession_round2", negotiation.concession_round2),
            ("concession_late", negotiation.concession_late),
        ] {
            if fraction <= Decimal::ZERO || fraction > Decimal::ONE {
                return Err(ConfigError::Validation(format!(
                    "pricing.negotiation.{name} must be in range (0, 1]"
                )));
            }
        }

        let level = self.logging.level.trim().to_ascii_lowercase();
        require(
            matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error"),
            "logging.level must be one of trace|debug|info|warn|error",
        )
    }

    /// Whether the registry client can be constructed at all. Offline
    /// commands (cap, evaluate, loads) work without a key.
    pub fn has_web_key(&self) -> bool {
        self.registry
            .web_key
            .as_ref()
            .map(|key| !key.expose_secret().trim().is_empty())
            .unwrap_or(false)
    }
}

fn locate_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then(|| path.to_path_buf());
    }
    CONFIG_FILE_CANDIDATES.into_iter().map(PathBuf::from).find(|candidate| candidate.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Expands `${VAR}` references in file contents before TOML parsing, so
/// secrets can live in the environment while the file stays committed.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let expression = &rest[start + 2..];
        let end = expression.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &expression[..end];
        let value =
            env::var(var).map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &expression[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn read_env(key: &str) -> Option<String> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

fn parse_env<T: FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    match read_env(key) {
        None => Ok(None),
        Some(value) => value.parse::<T>().map(Some).map_err(|_| {
            ConfigError::InvalidEnvOverride { key: key.to_string(), value }
        }),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    registry: Option<RegistryPatch>,
    pricing: Option<PricingPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct RegistryPatch {
    base_url: Option<String>,
    web_key: Option<String>,
    timeout_secs: Option<u64>,
    max_retries: Option<u32>,
    retry_base_delay_ms: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct PricingPatch {
    cap: Option<CapPatch>,
    negotiation: Option<NegotiationPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct CapPatch {
    max_allowance: Option<Decimal>,
    allowance_pct: Option<Decimal>,
    equipment_premium: Option<Decimal>,
    short_haul_premium: Option<Decimal>,
    short_haul_miles: Option<u32>,
    rounding_increment: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct NegotiationPatch {
    late_round: Option<u32>,
    accept_tolerance: Option<Decimal>,
    min_step: Option<Decimal>,
    concession_round1: Option<Decimal>,
    concession_round2: Option<Decimal>,
    concession_late: Option<Decimal>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl ConfigPatch {
    fn apply(self, config: &mut AppConfig) {
        if let Some(registry) = self.registry {
            overlay(&mut config.registry.base_url, registry.base_url);
            overlay(&mut config.registry.web_key, registry.web_key.map(|k| Some(k.into())));
            overlay(&mut config.registry.timeout_secs, registry.timeout_secs);
            overlay(&mut config.registry.max_retries, registry.max_retries);
            overlay(&mut config.registry.retry_base_delay_ms, registry.retry_base_delay_ms);
        }

        if let Some(pricing) = self.pricing {
            if let Some(patch) = pricing.cap {
                let cap = &mut config.pricing.cap;
                overlay(&mut cap.max_allowance, patch.max_allowance);
                overlay(&mut cap.allowance_pct, patch.allowance_pct);
                overlay(&mut cap.equipment_premium, patch.equipment_premium);
                overlay(&mut cap.short_haul_premium, patch.short_haul_premium);
                overlay(&mut cap.short_haul_miles, patch.short_haul_miles);
                overlay(&mut cap.rounding_increment, patch.rounding_increment);
            }
            if let Some(patch) = pricing.negotiation {
                let negotiation = &mut config.pricing.negotiation;
                overlay(&mut negotiation.late_round, patch.late_round);
                overlay(&mut negotiation.accept_tolerance, patch.accept_tolerance);
                overlay(&mut negotiation.min_step, patch.min_step);
                overlay(&mut negotiation.concession_round1, patch.concession_round1);
                overlay(&mut negotiation.concession_round2, patch.concession_round2);
                overlay(&mut negotiation.concession_late, patch.concession_late);
            }
        }

        if let Some(logging) = self.logging {
            overlay(&mut config.logging.level, logging.level);
            overlay(&mut config.logging.format, logging.format);
        }
    }
}
