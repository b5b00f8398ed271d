use crate::config::AppConfig;
use crate::models::trip::{GeneratedItinerary, TripRequest};
use crate::services::insight_service::DerivedInsights;
use crate::services::prompt_service::{build_itinerary_prompt, build_preference_text};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Debug)]
pub enum ItineraryError {
    NotConfigured(String),
    HttpError(reqwest::Error),
    OracleError(String),
    /// The oracle answered, but not with an itinerary we can use.
    InvalidResponse(String),
}

impl fmt::Display for ItineraryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItineraryError::NotConfigured(msg) => write!(f, "Not configured: {}", msg),
            ItineraryError::HttpError(err) => write!(f, "HTTP error: {}", err),
            ItineraryError::OracleError(msg) => write!(f, "Oracle error: {}", msg),
            ItineraryError::InvalidResponse(msg) => write!(f, "Invalid itinerary response: {}", msg),
        }
    }
}

impl std::error::Error for ItineraryError {}

impl From<reqwest::Error> for ItineraryError {
    fn from(err: reqwest::Error) -> Self {
        ItineraryError::HttpError(err)
    }
}

/// Text-in, text-out access to the generative model.
pub trait ItineraryOracle {
    async fn generate(&self, prompt: &str) -> Result<String, ItineraryError>;
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: String,
    temperature: f32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(config: &AppConfig) -> Result<Self, ItineraryError> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or_else(|| ItineraryError::NotConfigured("GEMINI_API_KEY not set".to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.oracle_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: config.gemini_model.clone(),
        })
    }
}

impl ItineraryOracle for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, ItineraryError> {
        let url = format!("{}/models/{}:generateContent", GEMINI_BASE_URL, self.model);

        let request = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GeminiGenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: 1.0,
            },
        };

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ItineraryError::OracleError(format!(
                "Status: {}, Body: {}",
                status, body
            )));
        }

        let body: GeminiResponse = response.json().await?;
        let text: String = body
            .candidates
            .into_iter()
            .filter_map(|c| c.content)
            .flat_map(|c| c.parts)
            .filter_map(|p| p.text)
            .collect();

        if text.trim().is_empty() {
            return Err(ItineraryError::OracleError(
                "Oracle returned no text".to_string(),
            ));
        }
        Ok(text)
    }
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the language tag line, e.g. ```json
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().trim_end_matches("```").trim()
}

/// Parses oracle text against the itinerary schema.
pub fn parse_itinerary_response(raw: &str) -> Result<GeneratedItinerary, ItineraryError> {
    let body = strip_code_fences(raw);
    let itinerary: GeneratedItinerary = serde_json::from_str(body)
        .map_err(|e| ItineraryError::InvalidResponse(e.to_string()))?;

    if itinerary.itinerary.is_empty() {
        return Err(ItineraryError::InvalidResponse(
            "itinerary has no days".to_string(),
        ));
    }
    Ok(itinerary)
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerationOutcome {
    pub itinerary: GeneratedItinerary,
    /// True when `itinerary` is the canned sample, not the oracle's answer.
    pub fallback: bool,
    pub personalized: bool,
}

pub struct ItineraryGenerator<O: ItineraryOracle> {
    oracle: O,
    sample_fallback: bool,
}

impl<O: ItineraryOracle> ItineraryGenerator<O> {
    pub fn new(oracle: O, sample_fallback: bool) -> Self {
        Self {
            oracle,
            sample_fallback,
        }
    }

    pub async fn generate(
        &self,
        request: &TripRequest,
        insights: Option<&DerivedInsights>,
    ) -> Result<GenerationOutcome, ItineraryError> {
        let preference_text = build_preference_text(insights);
        let personalized = !preference_text.is_empty();
        let prompt = build_itinerary_prompt(request, &preference_text);
        debug!("Itinerary prompt ({} chars, personalized: {})", prompt.len(), personalized);

        let raw = self.oracle.generate(&prompt).await?;

        match parse_itinerary_response(&raw) {
            Ok(itinerary) => {
                info!(
                    "Generated {}-day itinerary for {}",
                    itinerary.itinerary.len(),
                    request.destination
                );
                Ok(GenerationOutcome {
                    itinerary,
                    fallback: false,
                    personalized,
                })
            }
            Err(ItineraryError::InvalidResponse(reason)) if self.sample_fallback => {
                warn!(
                    "Oracle reply for {} unusable ({}), serving sample itinerary",
                    request.destination, reason
                );
                Ok(GenerationOutcome {
                    itinerary: GeneratedItinerary::sample(request.destination.trim()),
                    fallback: true,
                    personalized,
                })
            }
            Err(e) => Err(e),
        }
    }
}
