use crate::models::lenient::{deserialize_lenient_number, deserialize_lenient_string};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What the traveler picked in the planner form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TripRequest {
    pub user_email: Option<String>,
    pub destination: String,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub days: Option<f64>,
    /// Tier label ("Cheap", "Moderate", "Luxury") or a free-text amount.
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub budget: Option<String>,
    #[serde(default)]
    pub travelers: String,
    pub persona: Option<String>,
    #[serde(default)]
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelOption {
    pub hotel_name: String,
    #[serde(default)]
    pub hotel_address: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub price: Option<String>,
    #[serde(default)]
    pub hotel_image_url: Option<String>,
    #[serde(default)]
    pub geo_coordinates: Option<GeoCoordinates>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub rating: Option<f64>,
    #[serde(default, alias = "description")]
    pub descriptions: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceVisit {
    pub place_name: String,
    #[serde(default)]
    pub place_details: Option<String>,
    #[serde(default)]
    pub place_image_url: Option<String>,
    #[serde(default)]
    pub geo_coordinates: Option<GeoCoordinates>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub ticket_pricing: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub time_to_travel: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPlan {
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub day: Option<f64>,
    #[serde(default)]
    pub theme: Option<String>,
    #[serde(default)]
    pub best_time_to_visit: Option<String>,
    #[serde(alias = "activities")]
    pub plan: Vec<PlaceVisit>,
}

/// The itinerary JSON the generative oracle is asked to return.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedItinerary {
    #[serde(default)]
    pub trip_name: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(alias = "hotels")]
    pub hotel_options: Vec<HotelOption>,
    pub itinerary: Vec<DayPlan>,
}

impl GeneratedItinerary {
    /// Canned itinerary used when sample fallback is enabled and the oracle
    /// reply cannot be used.
    pub fn sample(destination: &str) -> Self {
        let visit = |name: &str, details: &str, time: &str| PlaceVisit {
            place_name: name.to_string(),
            place_details: Some(details.to_string()),
            place_image_url: None,
            geo_coordinates: None,
            ticket_pricing: Some("Free".to_string()),
            time_to_travel: Some("30 minutes".to_string()),
            time: Some(time.to_string()),
        };

        Self {
            trip_name: Some(format!("Explore {}", destination)),
            destination: Some(destination.to_string()),
            hotel_options: vec![HotelOption {
                hotel_name: format!("{} Central Guest House", destination),
                hotel_address: Some(format!("City Centre, {}", destination)),
                price: Some("2500 per night".to_string()),
                hotel_image_url: None,
                geo_coordinates: None,
                rating: Some(4.0),
                descriptions: Some("Clean, central and close to public transport.".to_string()),
            }],
            itinerary: vec![DayPlan {
                day: Some(1.0),
                theme: Some("Getting to know the city".to_string()),
                best_time_to_visit: Some("Morning".to_string()),
                plan: vec![
                    visit("Old Town Walk", "A self-guided walk through the historic centre.", "9:00 AM"),
                    visit("Local Market", "Street food and local crafts.", "1:00 PM"),
                    visit("Sunset Viewpoint", "The best view in town at dusk.", "6:00 PM"),
                ],
            }],
        }
    }
}

/// A generated trip as stored in `Travelers.Trips`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredTrip {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_email: Option<String>,
    pub user_selection: TripRequest,
    pub trip_data: GeneratedItinerary,
    #[serde(default)]
    pub fallback: bool,
    /// Whether learned preferences were added to the prompt.
    #[serde(default)]
    pub personalized: bool,
    pub created_at: DateTime<Utc>,
}
