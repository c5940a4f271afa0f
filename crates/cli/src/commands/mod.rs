pub mod cap;
pub mod config;
pub mod doctor;
pub mod evaluate;
pub mod loads;
pub mod verify;

use freightdesk_core::config::{AppConfig, LogFormat};
use freightdesk_core::EquipmentClass;
use serde::Serialize;
use serde_json::json;

/// What a subcommand hands back to `run`: the process exit code and the
/// already-rendered output line(s).
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub exit_code: u8,
    pub output: String,
}

impl CommandResult {
    pub fn success(command: &str, message: impl Into<String>) -> Self {
        let envelope = json!({
            "command": command,
            "status": "ok",
            "error_class": null,
            "message": message.into(),
        });
        Self { exit_code: 0, output: envelope.to_string() }
    }

    pub fn failure(
        command: &str,
        error_class: &str,
        message: impl Into<String>,
        exit_code: u8,
    ) -> Self {
        let envelope = json!({
            "command": command,
            "status": "error",
            "error_class": error_class,
            "message": message.into(),
        });
        Self { exit_code, output: envelope.to_string() }
    }

    /// Pretty-prints a data payload (verdicts, decisions, search results).
    pub fn data(exit_code: u8, payload: &impl Serialize) -> Self {
        let output = serde_json::to_string_pretty(payload).unwrap_or_else(|error| {
            json!({
                "status": "error",
                "error_class": "serialization",
                "message": error.to_string(),
            })
            .to_string()
        });
        Self { exit_code, output }
    }
}

pub(crate) fn parse_equipment(raw: Option<&str>) -> Option<EquipmentClass> {
    raw.map(EquipmentClass::parse)
}

/// Initializes the log stream from config. Safe to call more than once;
/// later calls keep the first subscriber.
pub(crate) fn init_logging(config: &AppConfig) {
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);
    let builder = tracing_subscriber::fmt().with_target(false).with_max_level(log_level);

    let initialized = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    let _ = initialized;
}
