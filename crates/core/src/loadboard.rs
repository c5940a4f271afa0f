//! Deterministic load-board search: score each posting against the
//! caller's lane facts and return the best matches. No fuzzy matching;
//! the same query over the same catalog always ranks identically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::load::{EquipmentClass, Load};

const ORIGIN_PREFIX_LEN: usize = 5;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LoadQuery {
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub equipment: Option<EquipmentClass>,
    pub pickup_start: Option<DateTime<Utc>>,
    pub pickup_end: Option<DateTime<Utc>>,
    pub max_results: Option<usize>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadMatch {
    pub score: u32,
    pub load: Load,
}

/// City names arrive as free text from the phone channel; matching keys
/// on a lowercase prefix so "Chicago, IL" and "chicago" land together.
fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

fn prefix(value: &str) -> String {
    normalize(value).chars().take(ORIGIN_PREFIX_LEN).collect()
}

fn score_load(load: &Load, query: &LoadQuery) -> u32 {
    let mut score = 0;

    if let Some(origin) = query.origin.as_deref() {
        if normalize(&load.origin).starts_with(&prefix(origin)) {
            score += 2;
        }
    }
    if let Some(destination) = query.destination.as_deref() {
        if normalize(&load.destination).starts_with(&prefix(destination)) {
            score += 2;
        }
    }
    if let Some(equipment) = query.equipment {
        if load.equipment_type == equipment {
            score += 1;
        }
    }
    if let (Some(start), Some(end)) = (query.pickup_start, query.pickup_end) {
        if load.pickup_datetime >= start && load.pickup_datetime <= end {
            score += 1;
        }
    }

    score
}

/// Scores every posting, drops the zero-score ones, and returns the top
/// `max_results` (at least one). Ties break on load id for determinism.
pub fn search(loads: &[Load], query: &LoadQuery) -> Vec<LoadMatch> {
    let mut matches: Vec<LoadMatch> = loads
        .iter()
        .map(|load| LoadMatch { score: score_load(load, query), load: load.clone() })
        .filter(|candidate| candidate.score > 0)
        .collect();

    matches.sort_by(|a, b| {
        b.score.cmp(&a.score).then_with(|| a.load.load_id.cmp(&b.load.load_id))
    });

    let limit = query.max_results.unwrap_or(3).max(1);
    matches.truncate(limit);
    matches
}
