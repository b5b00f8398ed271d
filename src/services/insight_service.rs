use crate::models::preference::{
    AccommodationType, ActivityCategory, Category, CategoryScores, CrowdPreference, FoodType,
    PreferenceRecord, TimeOfDay, TransportType,
};
use crate::services::preference_service::{PreferenceError, PreferenceService, PreferenceStore};
use serde::{Deserialize, Serialize};

const TOP_ACTIVITY_COUNT: usize = 3;

/// Summary labels reduced from a preference record. Recomputed on every
/// request, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedInsights {
    pub preferred_food_type: Option<FoodType>,
    pub preferred_activities: Vec<ActivityCategory>,
    pub preferred_accommodation: Option<AccommodationType>,
    pub preferred_transport: Option<TransportType>,
    pub preferred_timing: Option<TimeOfDay>,
    pub avoids_crowds: bool,
    pub total_interactions: usize,
}

impl DerivedInsights {
    pub fn from_record(record: &PreferenceRecord) -> Self {
        let crowd = &record.crowd_preferences;

        Self {
            preferred_food_type: top_preference(&record.food_preferences),
            preferred_activities: top_preferences(
                &record.activity_preferences,
                TOP_ACTIVITY_COUNT,
            ),
            preferred_accommodation: top_preference(&record.accommodation_preferences),
            preferred_transport: top_preference(&record.transport_preferences),
            preferred_timing: top_preference(&record.timing_preferences),
            avoids_crowds: crowd.get(CrowdPreference::AvoidCrowded)
                > crowd.get(CrowdPreference::DontMind),
            total_interactions: record.learning_history.len(),
        }
    }
}

/// Key with the highest strictly positive score. Ties go to the key that
/// comes first in iteration order.
pub fn top_preference<K: Category>(scores: &CategoryScores<K>) -> Option<K> {
    let mut best: Option<(K, f64)> = None;
    for (key, score) in scores.entries() {
        if score <= 0.0 {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((key, score)),
        }
    }
    best.map(|(key, _)| key)
}

/// Up to `n` strictly positive keys, highest score first.
pub fn top_preferences<K: Category>(scores: &CategoryScores<K>, n: usize) -> Vec<K> {
    let mut positive: Vec<(K, f64)> = scores
        .entries()
        .into_iter()
        .filter(|(_, score)| *score > 0.0)
        .collect();

    // stable: equal scores keep iteration order
    positive.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    positive.into_iter().take(n).map(|(key, _)| key).collect()
}

pub async fn get_insights<S: PreferenceStore>(
    service: &PreferenceService<S>,
    user_id: &str,
) -> Result<Option<DerivedInsights>, PreferenceError> {
    let record = service.get_record(user_id).await?;
    Ok(record.as_ref().map(DerivedInsights::from_record))
}
