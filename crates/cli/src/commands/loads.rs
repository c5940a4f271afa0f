use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::Args;
use freightdesk_core::loadboard::{search, LoadMatch, LoadQuery};
use freightdesk_core::Load;
use serde::Serialize;

use super::CommandResult;

#[derive(Debug, Args)]
pub struct LoadsArgs {
    #[arg(long, help = "Path to a JSON load-board catalog file")]
    pub catalog: PathBuf,
    #[arg(long)]
    pub origin: Option<String>,
    #[arg(long)]
    pub destination: Option<String>,
    #[arg(long)]
    pub equipment: Option<String>,
    #[arg(long, help = "Pickup window start (RFC 3339)")]
    pub pickup_start: Option<DateTime<Utc>>,
    #[arg(long, help = "Pickup window end (RFC 3339)")]
    pub pickup_end: Option<DateTime<Utc>>,
    #[arg(long)]
    pub max_results: Option<usize>,
}

#[derive(Debug, Serialize)]
struct LoadsReport {
    command: &'static str,
    status: &'static str,
    total_matches: usize,
    matches: Vec<LoadMatch>,
}

pub fn run(args: &LoadsArgs) -> CommandResult {
    let raw = match fs::read_to_string(&args.catalog) {
        Ok(raw) => raw,
        Err(error) => {
            return CommandResult::failure(
                "loads",
                "catalog_read",
                format!("could not read catalog `{}`: {error}", args.catalog.display()),
                2,
            );
        }
    };

    let catalog: Vec<Load> = match serde_json::from_str(&raw) {
        Ok(catalog) => catalog,
        Err(error) => {
            return CommandResult::failure(
                "loads",
                "catalog_parse",
                format!("could not parse catalog `{}`: {error}", args.catalog.display()),
                2,
            );
        }
    };

    let query = LoadQuery {
        origin: args.origin.clone(),
        destination: args.destination.clone(),
        equipment: super::parse_equipment(args.equipment.as_deref()),
        pickup_start: args.pickup_start,
        pickup_end: args.pickup_end,
        max_results: args.max_results,
    };

    let matches = search(&catalog, &query);
    CommandResult::data(
        0,
        &LoadsReport {
            command: "loads",
            status: "ok",
            total_matches: matches.len(),
            matches,
        },
    )
}
