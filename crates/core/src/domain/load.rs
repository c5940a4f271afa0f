use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentClass {
    DryVan,
    Reefer,
    Flatbed,
    StepDeck,
    PowerOnly,
    Other,
}

impl EquipmentClass {
    /// Parses the free-form equipment strings callers relay from the phone
    /// channel. Unrecognized values map to `Other` rather than failing;
    /// equipment is advisory for pricing, not a hard requirement.
    pub fn parse(raw: &str) -> Self {
        let normalized: String = raw
            .trim()
            .to_ascii_lowercase()
            .chars()
            .filter(|ch| ch.is_ascii_alphanumeric())
            .collect();
        match normalized.as_str() {
            "dryvan" | "van" | "dry" => Self::DryVan,
            "reefer" | "refrigerated" => Self::Reefer,
            "flatbed" => Self::Flatbed,
            "stepdeck" => Self::StepDeck,
            "poweronly" => Self::PowerOnly,
            _ => Self::Other,
        }
    }

    /// Reefer and flatbed capacity trades at a premium over dry van.
    pub fn is_specialized(&self) -> bool {
        matches!(self, Self::Reefer | Self::Flatbed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DryVan => "dry_van",
            Self::Reefer => "reefer",
            Self::Flatbed => "flatbed",
            Self::StepDeck => "step_deck",
            Self::PowerOnly => "power_only",
            Self::Other => "other",
        }
    }
}

/// The load facts the cap is a pure function of. Never includes the
/// carrier's ask or the round number.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoadFacts {
    pub listed_rate: Decimal,
    pub distance_miles: Option<u32>,
    pub equipment: Option<EquipmentClass>,
}

impl LoadFacts {
    pub fn new(listed_rate: Decimal) -> Self {
        Self { listed_rate, distance_miles: None, equipment: None }
    }

    pub fn with_distance(mut self, miles: u32) -> Self {
        self.distance_miles = Some(miles);
        self
    }

    pub fn with_equipment(mut self, equipment: EquipmentClass) -> Self {
        self.equipment = Some(equipment);
        self
    }
}

/// A load-board posting as the surrounding service supplies it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Load {
    pub load_id: String,
    pub origin: String,
    pub destination: String,
    pub pickup_datetime: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_datetime: Option<DateTime<Utc>>,
    pub equipment_type: EquipmentClass,
    pub loadboard_rate: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub miles: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_lbs: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Load {
    pub fn pricing_facts(&self) -> LoadFacts {
        LoadFacts {
            listed_rate: self.loadboard_rate,
            distance_miles: self.miles,
            equipment: Some(self.equipment_type),
        }
    }
}
