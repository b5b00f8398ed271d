//! Static destination facts shared by the estimators.
//!
//! Distances, budget floors and safety notes used to live in separate tables
//! per feature; they are kept here as one versioned dataset with a single
//! lookup so the numbers cannot drift apart.

use serde::Serialize;

pub const REFERENCE_DATA_VERSION: &str = "2024.1";

/// Distance assumed for destinations missing from the table.
pub const DEFAULT_DISTANCE_KM: f64 = 1000.0;
/// Minimum spend per person per day (INR) for unknown destinations.
pub const DEFAULT_MIN_DAILY_BUDGET: f64 = 2000.0;
pub const DEFAULT_SAFETY_SCORE: u8 = 7;
pub const DEFAULT_SAFETY_TAGS: &[&str] = &["general-precautions"];

#[derive(Debug, Clone, Copy, Serialize)]
pub struct DestinationReference {
    pub key: &'static str,
    /// Approximate one-way distance from the home city.
    pub distance_km: f64,
    pub min_daily_budget_per_person: f64,
    /// 1 (avoid) to 10 (very safe).
    pub safety_score: u8,
    pub safety_tags: &'static [&'static str],
}

const fn destination(
    key: &'static str,
    distance_km: f64,
    min_daily_budget_per_person: f64,
    safety_score: u8,
    safety_tags: &'static [&'static str],
) -> DestinationReference {
    DestinationReference {
        key,
        distance_km,
        min_daily_budget_per_person,
        safety_score,
        safety_tags,
    }
}

// Order matters: the first key contained in the query wins.
static DESTINATIONS: &[DestinationReference] = &[
    destination("mumbai", 1400.0, 3500.0, 8, &["crowded-transit", "monsoon-flooding"]),
    destination("goa", 1900.0, 3000.0, 8, &["beach-currents", "night-travel-caution"]),
    destination("jaipur", 280.0, 2000.0, 8, &["summer-heat", "tourist-scams"]),
    destination("agra", 230.0, 1800.0, 7, &["touts", "summer-heat"]),
    destination("udaipur", 660.0, 2500.0, 9, &["lake-safety"]),
    destination("varanasi", 820.0, 1500.0, 7, &["crowded-ghats", "pickpockets"]),
    destination("rishikesh", 240.0, 1500.0, 8, &["river-rafting-safety"]),
    destination("manali", 540.0, 2000.0, 8, &["mountain-roads", "altitude"]),
    destination("shimla", 350.0, 2000.0, 9, &["mountain-roads"]),
    destination("ladakh", 1000.0, 3500.0, 7, &["altitude-sickness", "remote-areas"]),
    destination("leh", 1000.0, 3500.0, 7, &["altitude-sickness", "remote-areas"]),
    destination("kerala", 2600.0, 2500.0, 9, &["monsoon"]),
    destination("bangalore", 2150.0, 2500.0, 8, &["traffic"]),
    destination("bengaluru", 2150.0, 2500.0, 8, &["traffic"]),
    destination("chennai", 2200.0, 2200.0, 8, &["summer-heat"]),
    destination("kolkata", 1500.0, 2000.0, 7, &["crowded-transit"]),
    destination("hyderabad", 1550.0, 2200.0, 8, &["traffic"]),
    destination("darjeeling", 1550.0, 2000.0, 8, &["mountain-roads", "landslides"]),
    destination("andaman", 2500.0, 4000.0, 9, &["sea-conditions"]),
];

pub fn destinations() -> &'static [DestinationReference] {
    DESTINATIONS
}

/// First table entry whose key appears in `name` (case-insensitive).
pub fn lookup_destination(name: &str) -> Option<&'static DestinationReference> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return None;
    }
    DESTINATIONS.iter().find(|d| name.contains(d.key))
}

pub fn distance_km(name: &str) -> f64 {
    lookup_destination(name)
        .map(|d| d.distance_km)
        .unwrap_or(DEFAULT_DISTANCE_KM)
}

pub fn min_daily_budget(name: &str) -> f64 {
    lookup_destination(name)
        .map(|d| d.min_daily_budget_per_person)
        .unwrap_or(DEFAULT_MIN_DAILY_BUDGET)
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SafetyProfile {
    pub destination: String,
    pub matched: Option<&'static str>,
    pub safety_score: u8,
    pub tags: Vec<&'static str>,
    pub data_version: &'static str,
}

pub fn safety_profile(name: &str) -> SafetyProfile {
    let found = lookup_destination(name);
    SafetyProfile {
        destination: name.trim().to_string(),
        matched: found.map(|d| d.key),
        safety_score: found.map(|d| d.safety_score).unwrap_or(DEFAULT_SAFETY_SCORE),
        tags: found
            .map(|d| d.safety_tags)
            .unwrap_or(DEFAULT_SAFETY_TAGS)
            .to_vec(),
        data_version: REFERENCE_DATA_VERSION,
    }
}
