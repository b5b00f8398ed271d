use actix_web::{http::StatusCode, HttpResponse};
use serde_json::json;

pub mod estimates;
pub mod health;
pub mod preferences;
pub mod trips;

pub(crate) fn error_response(status: StatusCode, kind: &str, message: impl ToString) -> HttpResponse {
    HttpResponse::build(status).json(json!({
        "error": kind,
        "message": message.to_string(),
    }))
}
