use crate::services::reference_data;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

const DEFAULT_TRAVELERS: u32 = 1;
const DEFAULT_DAYS: u32 = 1;

const ACCOMMODATION_SHARE: f64 = 0.35;
const FOOD_SHARE: f64 = 0.25;
const ACTIVITIES_SHARE: f64 = 0.20;
const TRANSPORT_SHARE: f64 = 0.15;
const MISCELLANEOUS_SHARE: f64 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetTier {
    Budget,
    Moderate,
    Luxury,
}

impl BudgetTier {
    pub const ALL: [BudgetTier; 3] = [BudgetTier::Budget, BudgetTier::Moderate, BudgetTier::Luxury];

    /// Per-person, per-day cost of each category in INR.
    pub fn daily_costs(&self) -> CategoryCosts {
        match self {
            BudgetTier::Budget => CategoryCosts {
                accommodation: 800.0,
                food: 600.0,
                activities: 400.0,
                transport: 500.0,
                miscellaneous: 200.0,
            },
            BudgetTier::Moderate => CategoryCosts {
                accommodation: 2000.0,
                food: 1200.0,
                activities: 1000.0,
                transport: 1000.0,
                miscellaneous: 500.0,
            },
            BudgetTier::Luxury => CategoryCosts {
                accommodation: 6000.0,
                food: 3000.0,
                activities: 2500.0,
                transport: 2500.0,
                miscellaneous: 1000.0,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryCosts {
    pub accommodation: f64,
    pub food: f64,
    pub activities: f64,
    pub transport: f64,
    pub miscellaneous: f64,
}

impl CategoryCosts {
    pub fn total(&self) -> f64 {
        self.accommodation + self.food + self.activities + self.transport + self.miscellaneous
    }

    fn scaled(&self, factor: f64) -> Self {
        Self {
            accommodation: self.accommodation * factor,
            food: self.food * factor,
            activities: self.activities * factor,
            transport: self.transport * factor,
            miscellaneous: self.miscellaneous * factor,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TierEstimate {
    pub tier: BudgetTier,
    pub per_person_per_day: f64,
    pub categories: CategoryCosts,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetEstimate {
    pub travelers: u32,
    pub days: u32,
    pub tiers: Vec<TierEstimate>,
}

impl BudgetEstimate {
    pub fn tier(&self, tier: BudgetTier) -> Option<&TierEstimate> {
        self.tiers.iter().find(|t| t.tier == tier)
    }
}

/// A total split into fixed shares. Each share is rounded on its own, so
/// the parts may not add back up to the total exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BudgetBreakdown {
    pub total: f64,
    pub accommodation: f64,
    pub food: f64,
    pub activities: f64,
    pub transport: f64,
    pub miscellaneous: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimumBudgetCheck {
    pub destination: String,
    pub is_valid: bool,
    pub per_day_per_person: f64,
    pub minimum_required: f64,
    pub entered_budget: f64,
    pub shortfall: f64,
}

fn digits_regex() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").expect("valid digits regex"))
}

/// Traveler count from free text such as "2 People", "Just me (solo)" or
/// "Family". Never fails; unknown text counts as one traveler.
pub fn parse_travelers(raw: &str) -> u32 {
    if let Some(found) = digits_regex().find(raw) {
        if let Ok(count) = found.as_str().parse::<u32>() {
            return count.max(1);
        }
    }

    let lowered = raw.to_lowercase();
    if lowered.contains("solo") {
        1
    } else if lowered.contains("couple") {
        2
    } else if lowered.contains("family") {
        4
    } else if lowered.contains("friends") {
        6
    } else {
        DEFAULT_TRAVELERS
    }
}

pub fn coerce_days(days: Option<f64>) -> u32 {
    match days {
        Some(d) if d.is_finite() && d >= 1.0 => d.trunc() as u32,
        _ => DEFAULT_DAYS,
    }
}

pub fn coerce_amount(amount: Option<f64>) -> f64 {
    match amount {
        Some(a) if a.is_finite() => a,
        _ => 0.0,
    }
}

pub fn estimate_budget(travelers: u32, days: u32) -> BudgetEstimate {
    let travelers = travelers.max(1);
    let days = days.max(1);
    let factor = f64::from(travelers) * f64::from(days);

    let tiers = BudgetTier::ALL
        .iter()
        .map(|tier| {
            let daily = tier.daily_costs();
            let categories = daily.scaled(factor);
            TierEstimate {
                tier: *tier,
                per_person_per_day: daily.total(),
                total: categories.total(),
                categories,
            }
        })
        .collect();

    BudgetEstimate {
        travelers,
        days,
        tiers,
    }
}

pub fn breakdown(total: f64) -> BudgetBreakdown {
    BudgetBreakdown {
        total,
        accommodation: (total * ACCOMMODATION_SHARE).round(),
        food: (total * FOOD_SHARE).round(),
        activities: (total * ACTIVITIES_SHARE).round(),
        transport: (total * TRANSPORT_SHARE).round(),
        miscellaneous: (total * MISCELLANEOUS_SHARE).round(),
    }
}

pub fn validate_minimum_budget(
    destination: &str,
    travelers: u32,
    days: u32,
    entered_budget: f64,
) -> MinimumBudgetCheck {
    let per_day_per_person = reference_data::min_daily_budget(destination);
    let minimum_required = per_day_per_person * f64::from(travelers.max(1)) * f64::from(days.max(1));
    let is_valid = entered_budget >= minimum_required;

    MinimumBudgetCheck {
        destination: destination.trim().to_string(),
        is_valid,
        per_day_per_person,
        minimum_required,
        entered_budget,
        shortfall: if is_valid {
            0.0
        } else {
            minimum_required - entered_budget
        },
    }
}
