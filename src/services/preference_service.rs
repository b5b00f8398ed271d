use crate::models::preference::{
    AccommodationType, ActivityCategory, Category, CrowdPreference, FoodType,
    Interaction, InteractionAction, InteractionType, LearningEntry, PreferenceRecord, ScoreDelta,
    TimeOfDay, TransportType, HISTORY_LIMIT,
};
use crate::db::mongo::DATABASE;
use chrono::Utc;
use log::{debug, warn};
use mongodb::{
    bson::{doc, Document},
    options::ReturnDocument,
    Client, Collection,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

const SELECTED_BONUS: f64 = 1.0;
const PREMIUM_SKIP_PENALTY: f64 = -0.5;
const LUXURY_HOTEL_SKIP_PENALTY: f64 = -1.0;

const PREMIUM_PRICE_RANGES: &[&str] = &["premium", "luxury", "expensive", "high", "$$$", "$$$$"];

#[derive(Debug)]
pub enum PreferenceError {
    InvalidInteraction(String),
    DatabaseError(String),
}

impl fmt::Display for PreferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceError::InvalidInteraction(msg) => write!(f, "Invalid interaction: {}", msg),
            PreferenceError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
        }
    }
}

impl std::error::Error for PreferenceError {}

impl From<mongodb::error::Error> for PreferenceError {
    fn from(err: mongodb::error::Error) -> Self {
        PreferenceError::DatabaseError(err.to_string())
    }
}

impl From<bson::ser::Error> for PreferenceError {
    fn from(err: bson::ser::Error) -> Self {
        PreferenceError::DatabaseError(err.to_string())
    }
}

/// Storage for preference records.
///
/// `apply` must change the stored counter and history in one step; callers
/// never write a whole record back.
pub trait PreferenceStore {
    async fn load(&self, user_id: &str) -> Result<Option<PreferenceRecord>, PreferenceError>;

    async fn apply(
        &self,
        user_id: &str,
        delta: Option<ScoreDelta>,
        entry: LearningEntry,
    ) -> Result<PreferenceRecord, PreferenceError>;
}

pub struct MongoPreferenceStore {
    client: Arc<Client>,
}

impl MongoPreferenceStore {
    pub fn new(client: Arc<Client>) -> Self {
        Self { client }
    }

    fn collection(&self) -> Collection<PreferenceRecord> {
        self.client.database(DATABASE).collection("Preferences")
    }
}

/// Single atomic update: bump one counter, append to the capped history and
/// stamp the timestamps. No `$inc` is emitted when nothing is scored.
fn update_document(
    delta: Option<ScoreDelta>,
    entry: &LearningEntry,
) -> Result<Document, PreferenceError> {
    let now = bson::to_bson(&Utc::now())?;
    let entry = bson::to_bson(entry)?;
    let created_at = now.clone();
    let slice = -(HISTORY_LIMIT as i64);

    let mut update = doc! {
        "$push": {
            "learning_history": {
                "$each": [entry],
                "$slice": slice,
            }
        },
        "$setOnInsert": { "created_at": created_at },
        "$set": { "updated_at": now },
    };
    if let Some(delta) = delta {
        let mut inc = Document::new();
        inc.insert(delta.field_path(), delta.amount());
        update.insert("$inc", inc);
    }

    Ok(update)
}

impl PreferenceStore for MongoPreferenceStore {
    async fn load(&self, user_id: &str) -> Result<Option<PreferenceRecord>, PreferenceError> {
        let record = self.collection().find_one(doc! { "_id": user_id }).await?;
        Ok(record)
    }

    async fn apply(
        &self,
        user_id: &str,
        delta: Option<ScoreDelta>,
        entry: LearningEntry,
    ) -> Result<PreferenceRecord, PreferenceError> {
        let update = update_document(delta, &entry)?;

        let record = self
            .collection()
            .find_one_and_update(doc! { "_id": user_id }, update)
            .upsert(true)
            .return_document(ReturnDocument::After)
            .await?;

        record.ok_or_else(|| {
            PreferenceError::DatabaseError(format!("Upsert returned no document for {}", user_id))
        })
    }
}

/// Process-local store used by tests and database-less runs.
#[derive(Default)]
pub struct InMemoryPreferenceStore {
    records: Mutex<HashMap<String, PreferenceRecord>>,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for InMemoryPreferenceStore {
    async fn load(&self, user_id: &str) -> Result<Option<PreferenceRecord>, PreferenceError> {
        let records = self
            .records
            .lock()
            .map_err(|_| PreferenceError::DatabaseError("Preference store poisoned".to_string()))?;
        Ok(records.get(user_id).cloned())
    }

    async fn apply(
        &self,
        user_id: &str,
        delta: Option<ScoreDelta>,
        entry: LearningEntry,
    ) -> Result<PreferenceRecord, PreferenceError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| PreferenceError::DatabaseError("Preference store poisoned".to_string()))?;

        let now = Utc::now();
        let record = records.entry(user_id.to_string()).or_insert_with(|| {
            let mut record = PreferenceRecord::new(user_id);
            record.created_at = Some(now);
            record
        });
        if let Some(delta) = delta {
            record.apply_delta(&delta);
        }
        record.push_history(entry);
        record.updated_at = Some(now);

        Ok(record.clone())
    }
}

pub struct PreferenceService<S: PreferenceStore> {
    store: S,
}

impl<S: PreferenceStore> PreferenceService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Best-effort recording: failures are logged and swallowed.
    pub async fn record_interaction(
        &self,
        user_id: &str,
        interaction: Interaction,
    ) -> Option<PreferenceRecord> {
        match self.try_record_interaction(user_id, interaction).await {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Failed to record interaction for {}: {}", user_id, e);
                None
            }
        }
    }

    pub async fn try_record_interaction(
        &self,
        user_id: &str,
        interaction: Interaction,
    ) -> Result<PreferenceRecord, PreferenceError> {
        if user_id.trim().is_empty() {
            return Err(PreferenceError::InvalidInteraction(
                "user id must not be empty".to_string(),
            ));
        }

        let delta = score_delta(&interaction)?;
        debug!(
            "Recording {:?}/{:?} for {} -> {:?}",
            interaction.interaction_type, interaction.action, user_id, delta
        );

        let entry = LearningEntry {
            timestamp: Utc::now(),
            interaction_type: interaction.interaction_type,
            item_name: interaction.item.name.clone(),
            action: interaction.action,
            context: interaction.context.clone(),
        };

        self.store.apply(user_id, delta, entry).await
    }

    pub async fn get_record(
        &self,
        user_id: &str,
    ) -> Result<Option<PreferenceRecord>, PreferenceError> {
        self.store.load(user_id).await
    }
}

fn is_premium(price_range: Option<&str>) -> bool {
    price_range
        .map(|p| {
            let p = p.trim().to_lowercase();
            PREMIUM_PRICE_RANGES.contains(&p.as_str())
        })
        .unwrap_or(false)
}

fn required_category<K: Category>(
    raw: Option<&str>,
    interaction_type: InteractionType,
) -> Result<K, PreferenceError> {
    let raw = raw.unwrap_or_default();
    K::parse(raw).ok_or_else(|| {
        PreferenceError::InvalidInteraction(format!(
            "unknown {:?} category '{}'",
            interaction_type, raw
        ))
    })
}

/// Maps an interaction onto the counter it nudges.
///
/// `Ok(None)` means the interaction is valid but moves no counter (for
/// example skipping a non-premium item); it is still written to history.
pub fn score_delta(interaction: &Interaction) -> Result<Option<ScoreDelta>, PreferenceError> {
    use InteractionAction::*;
    use InteractionType::*;

    let item = &interaction.item;
    let kind = interaction.interaction_type;
    let price_range = item.price_range.as_deref();

    let delta = match (kind, interaction.action) {
        (Restaurant, Selected) => {
            let food: FoodType = required_category(item.category.as_deref(), kind)?;
            Some(ScoreDelta::Food(food, SELECTED_BONUS))
        }
        (Restaurant, Skipped) => is_premium(price_range)
            .then_some(ScoreDelta::Food(FoodType::FancyRestaurants, PREMIUM_SKIP_PENALTY)),
        (Activity, Selected) => {
            let category: ActivityCategory = required_category(item.category.as_deref(), kind)?;
            Some(ScoreDelta::Activity(category, SELECTED_BONUS))
        }
        (Activity, Skipped) if is_premium(price_range) => {
            let category: ActivityCategory = required_category(item.category.as_deref(), kind)?;
            Some(ScoreDelta::Activity(category, PREMIUM_SKIP_PENALTY))
        }
        (Activity, Skipped) => None,
        (Hotel, Selected) => {
            let hotel = match price_range.and_then(AccommodationType::parse) {
                Some(hotel) => hotel,
                None => required_category(item.category.as_deref(), kind)?,
            };
            Some(ScoreDelta::Accommodation(hotel, SELECTED_BONUS))
        }
        (Hotel, Skipped) => {
            let luxury_category = item.category.as_deref().and_then(AccommodationType::parse)
                == Some(AccommodationType::Luxury);
            (is_premium(price_range) || luxury_category).then_some(ScoreDelta::Accommodation(
                AccommodationType::Luxury,
                LUXURY_HOTEL_SKIP_PENALTY,
            ))
        }
        (Transport, Selected | Preferred) => {
            let transport: TransportType = required_category(item.category.as_deref(), kind)?;
            Some(ScoreDelta::Transport(transport, SELECTED_BONUS))
        }
        (Timing, Selected | Preferred) => {
            let raw = item.category.as_deref().or(item.name.as_deref());
            let slot: TimeOfDay = required_category(raw, kind)?;
            Some(ScoreDelta::Timing(slot, SELECTED_BONUS))
        }
        (Crowd, Avoided) => Some(ScoreDelta::Crowd(CrowdPreference::AvoidCrowded, SELECTED_BONUS)),
        (Crowd, Selected | Preferred) => {
            Some(ScoreDelta::Crowd(CrowdPreference::DontMind, SELECTED_BONUS))
        }
        (kind, action) => {
            return Err(PreferenceError::InvalidInteraction(format!(
                "action {:?} is not valid for {:?}",
                action, kind
            )))
        }
    };

    Ok(delta)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::preference::InteractionItem;

    fn interaction(
        kind: InteractionType,
        action: InteractionAction,
        category: Option<&str>,
        price_range: Option<&str>,
    ) -> Interaction {
        Interaction {
            interaction_type: kind,
            item: InteractionItem {
                name: Some("Test Item".to_string()),
                category: category.map(str::to_string),
                price_range: price_range.map(str::to_string),
            },
            action,
            context: None,
        }
    }

    #[test]
    fn test_score_delta_rules() {
        use InteractionAction::*;
        use InteractionType::*;

        let cases = vec![
            (
                interaction(Restaurant, Selected, Some("streetFood"), None),
                Some(ScoreDelta::Food(FoodType::StreetFood, 1.0)),
            ),
            (
                interaction(Restaurant, Skipped, Some("cafes"), Some("premium")),
                Some(ScoreDelta::Food(FoodType::FancyRestaurants, -0.5)),
            ),
            (interaction(Restaurant, Skipped, Some("cafes"), Some("budget")), None),
            (
                interaction(Activity, Selected, Some("heritage"), None),
                Some(ScoreDelta::Activity(ActivityCategory::Heritage, 1.0)),
            ),
            (
                interaction(Activity, Skipped, Some("adventure"), Some("$$$")),
                Some(ScoreDelta::Activity(ActivityCategory::Adventure, -0.5)),
            ),
            (interaction(Activity, Skipped, Some("adventure"), None), None),
            (interaction(Activity, Skipped, None, None), None),
            (
                interaction(Hotel, Selected, None, Some("boutique")),
                Some(ScoreDelta::Accommodation(AccommodationType::Boutique, 1.0)),
            ),
            (
                interaction(Hotel, Skipped, None, Some("luxury")),
                Some(ScoreDelta::Accommodation(AccommodationType::Luxury, -1.0)),
            ),
            (
                interaction(Hotel, Selected, Some("boutique"), Some("$$$")),
                Some(ScoreDelta::Accommodation(AccommodationType::Boutique, 1.0)),
            ),
            (
                interaction(Hotel, Selected, Some("boutique"), Some("luxury")),
                Some(ScoreDelta::Accommodation(AccommodationType::Luxury, 1.0)),
            ),
            (
                interaction(Hotel, Skipped, None, Some("premium")),
                Some(ScoreDelta::Accommodation(AccommodationType::Luxury, -1.0)),
            ),
            (
                interaction(Hotel, Skipped, Some("luxury"), Some("$$$$")),
                Some(ScoreDelta::Accommodation(AccommodationType::Luxury, -1.0)),
            ),
            (
                interaction(Hotel, Skipped, Some("Luxury"), None),
                Some(ScoreDelta::Accommodation(AccommodationType::Luxury, -1.0)),
            ),
            (interaction(Hotel, Skipped, None, Some("budget")), None),
            (interaction(Hotel, Skipped, Some("boutique"), Some("$")), None),
            (
                interaction(Transport, Preferred, Some("walking"), None),
                Some(ScoreDelta::Transport(TransportType::Walking, 1.0)),
            ),
            (
                interaction(Timing, Preferred, Some("evening"), None),
                Some(ScoreDelta::Timing(TimeOfDay::Evening, 1.0)),
            ),
            (
                interaction(Crowd, Avoided, None, None),
                Some(ScoreDelta::Crowd(CrowdPreference::AvoidCrowded, 1.0)),
            ),
            (
                interaction(Crowd, Preferred, None, None),
                Some(ScoreDelta::Crowd(CrowdPreference::DontMind, 1.0)),
            ),
        ];

        for (input, expected) in cases {
            let got = score_delta(&input).unwrap();
            assert_eq!(got, expected, "for {:?}/{:?}", input.interaction_type, input.action);
        }
    }

    #[test]
    fn test_timing_falls_back_to_item_name() {
        let mut input = interaction(
            InteractionType::Timing,
            InteractionAction::Selected,
            None,
            None,
        );
        input.item.name = Some("Morning".to_string());

        assert_eq!(
            score_delta(&input).unwrap(),
            Some(ScoreDelta::Timing(TimeOfDay::Morning, 1.0))
        );
    }

    #[test]
    fn test_invalid_pairs_are_rejected() {
        use InteractionAction::*;
        use InteractionType::*;

        let invalid = vec![
            interaction(Restaurant, Avoided, Some("cafes"), None),
            interaction(Hotel, Preferred, None, Some("luxury")),
            interaction(Timing, Skipped, Some("morning"), None),
            interaction(Crowd, Skipped, None, None),
            interaction(Activity, Selected, Some("skydiving-on-mars"), None),
            interaction(Restaurant, Selected, None, None),
            interaction(Activity, Skipped, None, Some("premium")),
            interaction(Hotel, Selected, Some("hostel"), Some("$$$")),
        ];

        for input in invalid {
            assert!(matches!(
                score_delta(&input),
                Err(PreferenceError::InvalidInteraction(_))
            ));
        }
    }

    #[actix_rt::test]
    async fn test_selected_changes_only_one_counter() {
        let service = PreferenceService::new(InMemoryPreferenceStore::new());
        let user = "traveler@example.com";

        let record = service
            .try_record_interaction(
                user,
                interaction(
                    InteractionType::Restaurant,
                    InteractionAction::Selected,
                    Some("localCuisine"),
                    None,
                ),
            )
            .await
            .unwrap();

        let mut expected = PreferenceRecord::new(user);
        expected.apply_delta(&ScoreDelta::Food(FoodType::LocalCuisine, 1.0));

        assert_eq!(record.food_preferences, expected.food_preferences);
        assert_eq!(record.activity_preferences, expected.activity_preferences);
        assert_eq!(record.accommodation_preferences, expected.accommodation_preferences);
        assert_eq!(record.transport_preferences, expected.transport_preferences);
        assert_eq!(record.timing_preferences, expected.timing_preferences);
        assert_eq!(record.crowd_preferences, expected.crowd_preferences);
        assert_eq!(record.learning_history.len(), 1);
        assert!(record.created_at.is_some());
    }

    #[actix_rt::test]
    async fn test_scores_can_go_negative() {
        let service = PreferenceService::new(InMemoryPreferenceStore::new());
        let user = "traveler@example.com";

        for _ in 0..3 {
            service
                .try_record_interaction(
                    user,
                    interaction(
                        InteractionType::Hotel,
                        InteractionAction::Skipped,
                        None,
                        Some("luxury"),
                    ),
                )
                .await
                .unwrap();
        }

        let record = service.get_record(user).await.unwrap().unwrap();
        assert_eq!(record.accommodation_preferences.get(AccommodationType::Luxury), -3.0);
        assert_eq!(record.learning_history.len(), 3);
    }

    #[actix_rt::test]
    async fn test_history_keeps_most_recent_hundred() {
        let service = PreferenceService::new(InMemoryPreferenceStore::new());
        let user = "traveler@example.com";

        for i in 0..130 {
            let mut input = interaction(
                InteractionType::Activity,
                InteractionAction::Selected,
                Some("nature"),
                None,
            );
            input.item.name = Some(format!("trail-{}", i));
            let record = service.try_record_interaction(user, input).await.unwrap();
            assert_eq!(record.learning_history.len(), (i + 1).min(HISTORY_LIMIT));
        }

        let record = service.get_record(user).await.unwrap().unwrap();
        assert_eq!(record.learning_history.first().unwrap().item_name.as_deref(), Some("trail-30"));
        assert_eq!(record.learning_history.last().unwrap().item_name.as_deref(), Some("trail-129"));
        assert!(record
            .learning_history
            .windows(2)
            .all(|pair| pair[0].timestamp <= pair[1].timestamp));
        assert_eq!(record.activity_preferences.get(ActivityCategory::Nature), 130.0);
    }

    #[actix_rt::test]
    async fn test_invalid_interaction_writes_nothing() {
        let service = PreferenceService::new(InMemoryPreferenceStore::new());

        let result = service
            .record_interaction(
                "traveler@example.com",
                interaction(InteractionType::Crowd, InteractionAction::Skipped, None, None),
            )
            .await;

        assert!(result.is_none());
        assert!(service.get_record("traveler@example.com").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_empty_user_id_is_rejected() {
        let service = PreferenceService::new(InMemoryPreferenceStore::new());

        let result = service
            .try_record_interaction(
                "  ",
                interaction(InteractionType::Crowd, InteractionAction::Avoided, None, None),
            )
            .await;

        assert!(matches!(result, Err(PreferenceError::InvalidInteraction(_))));
    }

    fn entry() -> LearningEntry {
        LearningEntry {
            timestamp: Utc::now(),
            interaction_type: InteractionType::Restaurant,
            item_name: Some("Chowpatty Stall".to_string()),
            action: InteractionAction::Selected,
            context: None,
        }
    }

    #[test]
    fn test_update_document_shape() {
        let update = update_document(
            Some(ScoreDelta::Food(FoodType::StreetFood, 1.0)),
            &entry(),
        )
        .unwrap();

        let inc = update.get_document("$inc").unwrap();
        assert_eq!(inc.len(), 1);
        assert_eq!(inc.get_f64("food_preferences.streetFood").unwrap(), 1.0);

        let history = update
            .get_document("$push")
            .unwrap()
            .get_document("learning_history")
            .unwrap();
        assert_eq!(history.get_i64("$slice").unwrap(), -100);
        assert_eq!(history.get_array("$each").unwrap().len(), 1);

        let on_insert = update.get_document("$setOnInsert").unwrap();
        assert!(on_insert.contains_key("created_at"));
        assert!(!on_insert.contains_key("updated_at"));

        let set = update.get_document("$set").unwrap();
        assert!(set.contains_key("updated_at"));
        assert!(!set.contains_key("created_at"));
    }

    #[test]
    fn test_update_document_without_delta_has_no_inc() {
        let update = update_document(None, &entry()).unwrap();

        assert!(!update.contains_key("$inc"));
        assert!(update.contains_key("$push"));
    }

    #[actix_rt::test]
    async fn test_unscored_activity_skip_is_still_recorded() {
        let service = PreferenceService::new(InMemoryPreferenceStore::new());
        let user = "traveler@example.com";

        let record = service
            .try_record_interaction(
                user,
                interaction(InteractionType::Activity, InteractionAction::Skipped, None, None),
            )
            .await
            .unwrap();

        assert_eq!(record.learning_history.len(), 1);
        assert_eq!(record.activity_preferences, PreferenceRecord::new(user).activity_preferences);
    }

    #[actix_rt::test]
    async fn test_concurrent_interactions_each_count_once() {
        let service = PreferenceService::new(InMemoryPreferenceStore::new());
        let user = "traveler@example.com";
        let writes = 120;

        let pending = (0..writes).map(|_| {
            service.try_record_interaction(
                user,
                interaction(
                    InteractionType::Restaurant,
                    InteractionAction::Selected,
                    Some("streetFood"),
                    None,
                ),
            )
        });
        let results = futures::future::join_all(pending).await;
        assert!(results.iter().all(|r| r.is_ok()));

        let record = service.get_record(user).await.unwrap().unwrap();
        assert_eq!(record.food_preferences.get(FoodType::StreetFood), writes as f64);
        assert_eq!(record.learning_history.len(), HISTORY_LIMIT.min(writes));
    }
}
