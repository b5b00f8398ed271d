use crate::models::lenient::deserialize_lenient_number;
use crate::services::carbon_service::TransportMode;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct BudgetRequest {
    #[serde(default)]
    pub travelers: String,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub days: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct BreakdownRequest {
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub total: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct MinimumBudgetRequest {
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub travelers: String,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub days: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub budget: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct CarbonRequest {
    #[serde(default)]
    pub destination: String,
    pub transport: Option<TransportMode>,
}
