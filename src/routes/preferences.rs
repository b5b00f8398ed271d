use crate::models::preference::Interaction;
use crate::routes::error_response;
use crate::services::insight_service::{get_insights, DerivedInsights};
use crate::services::preference_service::{PreferenceError, PreferenceService, PreferenceStore};
use crate::services::prompt_service::build_preference_text;
use actix_web::{http::StatusCode, web, HttpResponse, Responder};
use log::error;
use serde::Serialize;

#[derive(Serialize)]
pub struct InsightsResponse {
    pub user_id: String,
    pub insights: Option<DerivedInsights>,
    pub preference_text: String,
}

/*
    POST /api/preferences/{user_id}/interactions
*/
pub async fn record_interaction<S: PreferenceStore + 'static>(
    path: web::Path<String>,
    service: web::Data<PreferenceService<S>>,
    input: web::Json<Interaction>,
) -> impl Responder {
    let user_id = path.into_inner();

    match service
        .try_record_interaction(&user_id, input.into_inner())
        .await
    {
        Ok(record) => HttpResponse::Ok().json(record),
        Err(PreferenceError::InvalidInteraction(msg)) => {
            error_response(StatusCode::BAD_REQUEST, "invalid_interaction", msg)
        }
        Err(err) => {
            error!("Failed to record interaction for {}: {}", user_id, err);
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "store_unavailable",
                "Failed to record interaction",
            )
        }
    }
}

/*
    GET /api/preferences/{user_id}/insights
*/
pub async fn insights<S: PreferenceStore + 'static>(
    path: web::Path<String>,
    service: web::Data<PreferenceService<S>>,
) -> impl Responder {
    let user_id = path.into_inner();

    // No record or an unreachable store both mean "no personalization".
    let insights = match get_insights(service.get_ref(), &user_id).await {
        Ok(insights) => insights,
        Err(err) => {
            error!("Failed to load insights for {}: {}", user_id, err);
            None
        }
    };

    HttpResponse::Ok().json(InsightsResponse {
        preference_text: build_preference_text(insights.as_ref()),
        insights,
        user_id,
    })
}
