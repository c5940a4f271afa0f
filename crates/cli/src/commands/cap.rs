use clap::Args;
use freightdesk_core::config::{AppConfig, LoadOptions};
use freightdesk_core::{cap_with_breakdown, CapBreakdown, LoadFacts};
use rust_decimal::Decimal;
use serde::Serialize;

use super::CommandResult;

#[derive(Debug, Args)]
pub struct CapArgs {
    #[arg(long, help = "Listed (loadboard) rate")]
    pub listed: Decimal,
    #[arg(long, help = "Haul distance in miles")]
    pub miles: Option<u32>,
    #[arg(long, help = "Equipment class, e.g. reefer or flatbed")]
    pub equipment: Option<String>,
}

#[derive(Debug, Serialize)]
struct CapReport {
    command: &'static str,
    status: &'static str,
    breakdown: CapBreakdown,
}

pub fn run(args: &CapArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure("cap", "config_validation", error.to_string(), 2)
        }
    };

    let mut facts = LoadFacts::new(args.listed);
    facts.distance_miles = args.miles;
    facts.equipment = super::parse_equipment(args.equipment.as_deref());

    match cap_with_breakdown(&facts, &config.pricing.cap) {
        Ok(breakdown) => {
            CommandResult::data(0, &CapReport { command: "cap", status: "ok", breakdown })
        }
        Err(error) => CommandResult::failure("cap", "invalid_input", error.to_string(), 2),
    }
}
