use crate::db::mongo::DATABASE;
use crate::models::trip::{StoredTrip, TripRequest};
use crate::routes::error_response;
use crate::services::insight_service::get_insights;
use crate::services::itinerary_generation_service::{
    GeminiClient, ItineraryError, ItineraryGenerator,
};
use crate::services::preference_service::{MongoPreferenceStore, PreferenceService};
use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use chrono::Utc;
use futures::TryStreamExt;
use log::{error, info, warn};
use mongodb::{bson::doc, Client, Collection};
use serde::Deserialize;
use std::sync::Arc;

const TRIP_LIST_LIMIT: i64 = 50;

fn trips(client: &Client) -> Collection<StoredTrip> {
    client.database(DATABASE).collection("Trips")
}

#[derive(Deserialize)]
pub struct TripQuery {
    user_email: Option<String>,
}

/*
    POST /api/trips/generate
*/
pub async fn generate(
    data: web::Data<Arc<Client>>,
    preferences: web::Data<PreferenceService<MongoPreferenceStore>>,
    generator: web::Data<Option<ItineraryGenerator<GeminiClient>>>,
    input: web::Json<TripRequest>,
) -> impl Responder {
    let Some(generator) = generator.get_ref() else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "oracle_not_configured",
            "Itinerary generation is not configured",
        );
    };

    let request = input.into_inner();
    if request.destination.trim().is_empty() {
        return error_response(
            StatusCode::BAD_REQUEST,
            "invalid_trip",
            "destination must not be empty",
        );
    }

    let insights = match request.user_email.as_deref() {
        Some(email) => get_insights(preferences.get_ref(), email)
            .await
            .unwrap_or_else(|e| {
                warn!("Generating without preferences for {}: {}", email, e);
                None
            }),
        None => None,
    };

    let outcome = match generator.generate(&request, insights.as_ref()).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("Itinerary generation failed for {}: {}", request.destination, err);
            let (status, kind) = match err {
                ItineraryError::NotConfigured(_) => {
                    (StatusCode::SERVICE_UNAVAILABLE, "oracle_not_configured")
                }
                ItineraryError::InvalidResponse(_) => {
                    (StatusCode::BAD_GATEWAY, "invalid_oracle_response")
                }
                ItineraryError::HttpError(_) | ItineraryError::OracleError(_) => {
                    (StatusCode::BAD_GATEWAY, "oracle_unavailable")
                }
            };
            return error_response(status, kind, err);
        }
    };

    let trip = StoredTrip {
        id: uuid::Uuid::new_v4().to_string(),
        user_email: request.user_email.clone(),
        user_selection: request,
        trip_data: outcome.itinerary,
        fallback: outcome.fallback,
        personalized: outcome.personalized,
        created_at: Utc::now(),
    };

    // The traveler still gets the trip if saving fails.
    match trips(&data).insert_one(&trip).await {
        Ok(_) => info!("Saved trip {}", trip.id),
        Err(err) => error!("Failed to save trip {}: {}", trip.id, err),
    }

    HttpResponse::Ok().json(trip)
}

/*
    GET /api/trips/{id}
*/
pub async fn get_by_id(path: web::Path<String>, data: web::Data<Arc<Client>>) -> impl Responder {
    let id = path.into_inner();

    match trips(&data).find_one(doc! { "_id": id.as_str() }).await {
        Ok(Some(trip)) => HttpResponse::Ok().json(trip),
        Ok(None) => error_response(StatusCode::NOT_FOUND, "not_found", "Trip not found"),
        Err(err) => {
            error!("Failed to retrieve trip {}: {}", id, err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_unavailable",
                "Failed to retrieve trip",
            )
        }
    }
}

/*
    GET /api/trips?user_email=
*/
pub async fn list(query: web::Query<TripQuery>, data: web::Data<Arc<Client>>) -> impl Responder {
    let Some(email) = query.user_email.as_deref().filter(|e| !e.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "invalid_query", "user_email is required");
    };

    let cursor = trips(&data)
        .find(doc! { "user_email": email })
        .sort(doc! { "created_at": -1 })
        .limit(TRIP_LIST_LIMIT)
        .await;

    match cursor {
        Ok(cursor) => match cursor.try_collect::<Vec<StoredTrip>>().await {
            Ok(found) => HttpResponse::Ok().json(found),
            Err(err) => {
                error!("Failed to collect trips for {}: {}", email, err);
                error_response(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "store_unavailable",
                    "Failed to process trips",
                )
            }
        },
        Err(err) => {
            error!("Failed to find trips for {}: {}", email, err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_unavailable",
                "Failed to retrieve trips",
            )
        }
    }
}
