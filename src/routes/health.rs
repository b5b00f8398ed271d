use crate::config::AppConfig;
use crate::db::mongo::ping;
use crate::services::reference_data::REFERENCE_DATA_VERSION;
use actix_web::{web, HttpResponse, Responder};
use log::error;
use mongodb::Client;
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
    reference_data_version: String,
}

#[derive(Serialize, Clone)]
pub struct ServiceStatus {
    pub status: String,
    pub details: Option<String>,
}

pub async fn health_check(
    client: web::Data<Arc<Client>>,
    config: web::Data<AppConfig>,
) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
        reference_data_version: REFERENCE_DATA_VERSION.to_string(),
    };

    let mongo_result = check_mongodb(&client).await;
    let oracle_result = check_oracle(&config);

    if mongo_result.status != "ok" || oracle_result.status != "ok" {
        health.status = "degraded".to_string();
    }

    health.services.insert("mongodb".to_string(), mongo_result);
    health.services.insert("oracle".to_string(), oracle_result);

    HttpResponse::Ok().json(health)
}

async fn check_mongodb(client: &Client) -> ServiceStatus {
    match ping(client).await {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Connected successfully to MongoDB".to_string()),
        },
        Err(e) => {
            error!("MongoDB health check failed: {}", e);

            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("Failed to connect: {}", e)),
            }
        }
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 8 {
        return "***".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}***{}", head, tail)
}

pub fn check_oracle(config: &AppConfig) -> ServiceStatus {
    match &config.gemini_api_key {
        Some(key) => {
            let masked_key = mask_key(key);

            ServiceStatus {
                status: "ok".to_string(),
                details: Some(format!(
                    "Gemini API key configured ({}), model {}",
                    masked_key, config.gemini_model
                )),
            }
        }
        None => ServiceStatus {
            status: "error".to_string(),
            details: Some("GEMINI_API_KEY not configured".to_string()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oracle_status_masks_key() {
        let config = AppConfig {
            gemini_api_key: Some("AIzaSyExampleKey1234".to_string()),
            ..AppConfig::default()
        };

        let status = check_oracle(&config);

        assert_eq!(status.status, "ok");
        let details = status.details.unwrap();
        assert!(details.contains("AIza***1234"));
        assert!(!details.contains("ExampleKey"));
    }

    #[test]
    fn test_oracle_status_without_key() {
        let status = check_oracle(&AppConfig::default());
        assert_eq!(status.status, "error");
    }

    #[test]
    fn test_mask_key_handles_multibyte_characters() {
        assert_eq!(mask_key("ключ-секрет-1234"), "ключ***1234");
        assert_eq!(mask_key("äöü"), "***");
    }
}
