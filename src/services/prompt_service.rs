use crate::models::preference::{
    AccommodationType, ActivityCategory, FoodType, TimeOfDay, TransportType,
};
use crate::models::trip::TripRequest;
use crate::services::budget_service::{coerce_days, parse_travelers};
use crate::services::insight_service::DerivedInsights;

const DEFAULT_PERSONA: &str = "balanced traveler";
const DEFAULT_BUDGET: &str = "Moderate";

const ITINERARY_TEMPLATE: &str = "Generate a travel plan for location: {destination}, \
for {days} days for {travelers} traveler(s) with a {budget} budget. \
Traveler persona: {persona}.{interests} \
Give me a hotel options list with hotelName, hotelAddress, price, hotelImageUrl, \
geoCoordinates (latitude, longitude), rating and descriptions, and suggest an itinerary \
with day, theme, bestTimeToVisit and a plan list of placeName, placeDetails, placeImageUrl, \
geoCoordinates, ticketPricing, timeToTravel and time for each of the {days} days. \
Respond only with JSON of the shape {\"tripName\", \"destination\", \"hotelOptions\": [...], \
\"itinerary\": [{\"day\", \"theme\", \"bestTimeToVisit\", \"plan\": [...]}]}.";

fn food_label(food: FoodType) -> &'static str {
    match food {
        FoodType::StreetFood => "street food and local eateries",
        FoodType::FancyRestaurants => "fine dining restaurants",
        FoodType::LocalCuisine => "authentic local cuisine",
        FoodType::Cafes => "cozy cafes",
    }
}

fn activity_label(activity: ActivityCategory) -> &'static str {
    match activity {
        ActivityCategory::Heritage => "heritage sites and monuments",
        ActivityCategory::Adventure => "adventure sports",
        ActivityCategory::Nature => "nature and scenic spots",
        ActivityCategory::Culture => "art, museums and cultural shows",
        ActivityCategory::Beaches => "beaches",
        ActivityCategory::Shopping => "shopping and local markets",
        ActivityCategory::Nightlife => "nightlife",
        ActivityCategory::Spiritual => "temples and spiritual places",
        ActivityCategory::Wellness => "spas and wellness retreats",
        ActivityCategory::Food => "food tours",
    }
}

fn accommodation_label(stay: AccommodationType) -> &'static str {
    match stay {
        AccommodationType::Budget => "budget-friendly stays",
        AccommodationType::Luxury => "luxury hotels",
        AccommodationType::Boutique => "boutique hotels",
    }
}

fn transport_label(transport: TransportType) -> &'static str {
    match transport {
        TransportType::Public => "public transport",
        TransportType::Private => "private cabs and rentals",
        TransportType::Walking => "exploring on foot",
    }
}

fn timing_label(timing: TimeOfDay) -> &'static str {
    match timing {
        TimeOfDay::Morning => "early morning outings",
        TimeOfDay::Afternoon => "afternoon outings",
        TimeOfDay::Evening => "evening outings",
    }
}

/// Renders insights as a text block appended to the itinerary prompt.
/// Empty when there is nothing learned yet.
pub fn build_preference_text(insights: Option<&DerivedInsights>) -> String {
    let insights = match insights {
        Some(insights) if insights.total_interactions > 0 => insights,
        _ => return String::new(),
    };

    let mut lines = vec![
        String::new(),
        String::new(),
        "USER PREFERENCES (learned from past choices):".to_string(),
    ];

    if let Some(food) = insights.preferred_food_type {
        lines.push(format!("- Food: prefers {}", food_label(food)));
    }
    if !insights.preferred_activities.is_empty() {
        let activities: Vec<&str> = insights
            .preferred_activities
            .iter()
            .map(|a| activity_label(*a))
            .collect();
        lines.push(format!("- Activities: enjoys {}", activities.join(", ")));
    }
    if let Some(stay) = insights.preferred_accommodation {
        lines.push(format!("- Accommodation: prefers {}", accommodation_label(stay)));
    }
    if let Some(transport) = insights.preferred_transport {
        lines.push(format!("- Transport: prefers {}", transport_label(transport)));
    }
    if let Some(timing) = insights.preferred_timing {
        lines.push(format!("- Timing: prefers {}", timing_label(timing)));
    }
    if insights.avoids_crowds {
        lines.push("- Crowds: prefers less crowded places and off-peak hours".to_string());
    }

    lines.push(format!(
        "Tailor the itinerary to these preferences. They are based on {} previous interaction(s).",
        insights.total_interactions
    ));

    lines.join("\n")
}

/// Substitutes `{name}` placeholders in a single pass. Substituted text is
/// never rescanned, and unknown braces are copied as-is.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let value = after.find('}').and_then(|close| {
            values
                .iter()
                .find(|(name, _)| *name == &after[..close])
                .map(|(_, value)| (*value, close))
        });
        match value {
            Some((value, close)) => {
                out.push_str(value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);

    out
}

/// Fills the itinerary template and appends `preference_text` verbatim.
pub fn build_itinerary_prompt(request: &TripRequest, preference_text: &str) -> String {
    let days = coerce_days(request.days);
    let travelers = parse_travelers(&request.travelers);
    let budget = request
        .budget
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or(DEFAULT_BUDGET);
    let persona = request
        .persona
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .unwrap_or(DEFAULT_PERSONA);
    let interests = if request.interests.is_empty() {
        String::new()
    } else {
        format!(" Interests: {}.", request.interests.join(", "))
    };

    let days = days.to_string();
    let travelers = travelers.to_string();
    let prompt = fill_template(
        ITINERARY_TEMPLATE,
        &[
            ("destination", request.destination.trim()),
            ("days", &days),
            ("travelers", &travelers),
            ("budget", budget),
            ("persona", persona),
            ("interests", &interests),
        ],
    );

    format!("{}{}", prompt, preference_text)
}
