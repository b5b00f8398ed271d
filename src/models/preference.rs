use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::marker::PhantomData;

/// Maximum number of entries kept in `learning_history`.
pub const HISTORY_LIMIT: usize = 100;

/// A closed set of keys for one preference group.
///
/// `ALL` fixes the iteration order used for tie-breaking, and `key` is the
/// string stored in the database (and used in update paths).
pub trait Category: Copy + PartialEq + std::fmt::Debug + 'static {
    const ALL: &'static [Self];

    fn key(self) -> &'static str;

    /// Lenient parse: case, spaces, dashes and underscores are ignored, so
    /// "streetFood", "street_food" and "Street Food" all match.
    fn parse(raw: &str) -> Option<Self> {
        let wanted = normalize(raw);
        if wanted.is_empty() {
            return None;
        }
        Self::ALL
            .iter()
            .copied()
            .find(|c| normalize(c.key()) == wanted)
    }
}

pub(crate) fn normalize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FoodType {
    StreetFood,
    FancyRestaurants,
    LocalCuisine,
    Cafes,
}

impl Category for FoodType {
    const ALL: &'static [Self] = &[
        FoodType::StreetFood,
        FoodType::FancyRestaurants,
        FoodType::LocalCuisine,
        FoodType::Cafes,
    ];

    fn key(self) -> &'static str {
        match self {
            FoodType::StreetFood => "streetFood",
            FoodType::FancyRestaurants => "fancyRestaurants",
            FoodType::LocalCuisine => "localCuisine",
            FoodType::Cafes => "cafes",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Heritage,
    Adventure,
    Nature,
    Culture,
    Beaches,
    Shopping,
    Nightlife,
    Spiritual,
    Wellness,
    Food,
}

impl Category for ActivityCategory {
    const ALL: &'static [Self] = &[
        ActivityCategory::Heritage,
        ActivityCategory::Adventure,
        ActivityCategory::Nature,
        ActivityCategory::Culture,
        ActivityCategory::Beaches,
        ActivityCategory::Shopping,
        ActivityCategory::Nightlife,
        ActivityCategory::Spiritual,
        ActivityCategory::Wellness,
        ActivityCategory::Food,
    ];

    fn key(self) -> &'static str {
        match self {
            ActivityCategory::Heritage => "heritage",
            ActivityCategory::Adventure => "adventure",
            ActivityCategory::Nature => "nature",
            ActivityCategory::Culture => "culture",
            ActivityCategory::Beaches => "beaches",
            ActivityCategory::Shopping => "shopping",
            ActivityCategory::Nightlife => "nightlife",
            ActivityCategory::Spiritual => "spiritual",
            ActivityCategory::Wellness => "wellness",
            ActivityCategory::Food => "food",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccommodationType {
    Budget,
    Luxury,
    Boutique,
}

impl Category for AccommodationType {
    const ALL: &'static [Self] = &[
        AccommodationType::Budget,
        AccommodationType::Luxury,
        AccommodationType::Boutique,
    ];

    fn key(self) -> &'static str {
        match self {
            AccommodationType::Budget => "budget",
            AccommodationType::Luxury => "luxury",
            AccommodationType::Boutique => "boutique",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportType {
    Public,
    Private,
    Walking,
}

impl Category for TransportType {
    const ALL: &'static [Self] = &[
        TransportType::Public,
        TransportType::Private,
        TransportType::Walking,
    ];

    fn key(self) -> &'static str {
        match self {
            TransportType::Public => "public",
            TransportType::Private => "private",
            TransportType::Walking => "walking",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl Category for TimeOfDay {
    const ALL: &'static [Self] = &[TimeOfDay::Morning, TimeOfDay::Afternoon, TimeOfDay::Evening];

    fn key(self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CrowdPreference {
    AvoidCrowded,
    DontMind,
}

impl Category for CrowdPreference {
    const ALL: &'static [Self] = &[CrowdPreference::AvoidCrowded, CrowdPreference::DontMind];

    fn key(self) -> &'static str {
        match self {
            CrowdPreference::AvoidCrowded => "avoidCrowded",
            CrowdPreference::DontMind => "dontMind",
        }
    }
}

/// Signed scores for one preference group, stored as a plain string-keyed
/// map. Keys absent from the stored document read as zero.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent, bound = "")]
pub struct CategoryScores<K: Category> {
    scores: BTreeMap<String, f64>,
    #[serde(skip)]
    marker: PhantomData<K>,
}

impl<K: Category> Default for CategoryScores<K> {
    fn default() -> Self {
        let scores = K::ALL.iter().map(|k| (k.key().to_string(), 0.0)).collect();
        Self {
            scores,
            marker: PhantomData,
        }
    }
}

impl<K: Category> PartialEq for CategoryScores<K> {
    fn eq(&self, other: &Self) -> bool {
        self.entries() == other.entries()
    }
}

impl<K: Category> CategoryScores<K> {
    pub fn get(&self, key: K) -> f64 {
        self.scores.get(key.key()).copied().unwrap_or(0.0)
    }

    pub fn add(&mut self, key: K, amount: f64) {
        *self.scores.entry(key.key().to_string()).or_insert(0.0) += amount;
    }

    /// Scores in declaration order of `K`.
    pub fn entries(&self) -> Vec<(K, f64)> {
        K::ALL.iter().map(|k| (*k, self.get(*k))).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    #[serde(alias = "food")]
    Restaurant,
    Activity,
    Hotel,
    Transport,
    Timing,
    Crowd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionAction {
    Selected,
    Skipped,
    Preferred,
    Avoided,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionItem {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(alias = "priceRange")]
    pub price_range: Option<String>,
}

/// Body of `POST /api/preferences/{user_id}/interactions`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    #[serde(default)]
    pub item: InteractionItem,
    pub action: InteractionAction,
    pub context: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningEntry {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    pub item_name: Option<String>,
    pub action: InteractionAction,
    pub context: Option<String>,
}

/// A single counter nudge produced by an accepted interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreDelta {
    Food(FoodType, f64),
    Activity(ActivityCategory, f64),
    Accommodation(AccommodationType, f64),
    Transport(TransportType, f64),
    Timing(TimeOfDay, f64),
    Crowd(CrowdPreference, f64),
}

impl ScoreDelta {
    /// Dotted document path of the counter, e.g. `food_preferences.streetFood`.
    pub fn field_path(&self) -> String {
        let (group, key) = match self {
            ScoreDelta::Food(k, _) => ("food_preferences", k.key()),
            ScoreDelta::Activity(k, _) => ("activity_preferences", k.key()),
            ScoreDelta::Accommodation(k, _) => ("accommodation_preferences", k.key()),
            ScoreDelta::Transport(k, _) => ("transport_preferences", k.key()),
            ScoreDelta::Timing(k, _) => ("timing_preferences", k.key()),
            ScoreDelta::Crowd(k, _) => ("crowd_preferences", k.key()),
        };
        format!("{}.{}", group, key)
    }

    pub fn amount(&self) -> f64 {
        match *self {
            ScoreDelta::Food(_, a)
            | ScoreDelta::Activity(_, a)
            | ScoreDelta::Accommodation(_, a)
            | ScoreDelta::Transport(_, a)
            | ScoreDelta::Timing(_, a)
            | ScoreDelta::Crowd(_, a) => a,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreferenceRecord {
    #[serde(rename = "_id")]
    pub user_id: String,
    #[serde(default)]
    pub food_preferences: CategoryScores<FoodType>,
    #[serde(default)]
    pub activity_preferences: CategoryScores<ActivityCategory>,
    #[serde(default)]
    pub accommodation_preferences: CategoryScores<AccommodationType>,
    #[serde(default)]
    pub transport_preferences: CategoryScores<TransportType>,
    #[serde(default)]
    pub timing_preferences: CategoryScores<TimeOfDay>,
    #[serde(default)]
    pub crowd_preferences: CategoryScores<CrowdPreference>,
    #[serde(default)]
    pub learning_history: Vec<LearningEntry>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl PreferenceRecord {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            food_preferences: CategoryScores::default(),
            activity_preferences: CategoryScores::default(),
            accommodation_preferences: CategoryScores::default(),
            transport_preferences: CategoryScores::default(),
            timing_preferences: CategoryScores::default(),
            crowd_preferences: CategoryScores::default(),
            learning_history: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn apply_delta(&mut self, delta: &ScoreDelta) {
        match *delta {
            ScoreDelta::Food(k, a) => self.food_preferences.add(k, a),
            ScoreDelta::Activity(k, a) => self.activity_preferences.add(k, a),
            ScoreDelta::Accommodation(k, a) => self.accommodation_preferences.add(k, a),
            ScoreDelta::Transport(k, a) => self.transport_preferences.add(k, a),
            ScoreDelta::Timing(k, a) => self.timing_preferences.add(k, a),
            ScoreDelta::Crowd(k, a) => self.crowd_preferences.add(k, a),
        }
    }

    /// Appends to the history, evicting the oldest entries past `HISTORY_LIMIT`.
    pub fn push_history(&mut self, entry: LearningEntry) {
        self.learning_history.push(entry);
        if self.learning_history.len() > HISTORY_LIMIT {
            let excess = self.learning_history.len() - HISTORY_LIMIT;
            self.learning_history.drain(..excess);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_is_lenient() {
        assert_eq!(FoodType::parse("streetFood"), Some(FoodType::StreetFood));
        assert_eq!(FoodType::parse("street_food"), Some(FoodType::StreetFood));
        assert_eq!(FoodType::parse("Street Food"), Some(FoodType::StreetFood));
        assert_eq!(CrowdPreference::parse("dont-mind"), Some(CrowdPreference::DontMind));
        assert_eq!(ActivityCategory::parse("heritge"), None);
        assert_eq!(TimeOfDay::parse(""), None);
    }

    #[test]
    fn test_missing_keys_read_as_zero() {
        let json = serde_json::json!({ "_id": "a@b.com", "food_preferences": { "cafes": 2.0 } });
        let record: PreferenceRecord = serde_json::from_value(json).unwrap();

        assert_eq!(record.food_preferences.get(FoodType::Cafes), 2.0);
        assert_eq!(record.food_preferences.get(FoodType::StreetFood), 0.0);
        assert_eq!(record.crowd_preferences.get(CrowdPreference::DontMind), 0.0);
        assert!(record.learning_history.is_empty());
    }

    #[test]
    fn test_field_path() {
        assert_eq!(
            ScoreDelta::Food(FoodType::StreetFood, 1.0).field_path(),
            "food_preferences.streetFood"
        );
        assert_eq!(
            ScoreDelta::Crowd(CrowdPreference::AvoidCrowded, 1.0).field_path(),
            "crowd_preferences.avoidCrowded"
        );
    }

    #[test]
    fn test_history_is_capped() {
        let mut record = PreferenceRecord::new("a@b.com");
        for i in 0..105 {
            record.push_history(LearningEntry {
                timestamp: Utc::now(),
                interaction_type: InteractionType::Activity,
                item_name: Some(format!("item-{}", i)),
                action: InteractionAction::Selected,
                context: None,
            });
        }

        assert_eq!(record.learning_history.len(), HISTORY_LIMIT);
        assert_eq!(record.learning_history[0].item_name.as_deref(), Some("item-5"));
        assert_eq!(record.learning_history[99].item_name.as_deref(), Some("item-104"));
    }
}
