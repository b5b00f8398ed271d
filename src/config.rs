use std::env;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";
const DEFAULT_ORACLE_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub mongo_uri: Option<String>,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub oracle_timeout_secs: u64,
    /// Serve the canned sample itinerary when the oracle reply is unusable.
    pub sample_fallback: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: HOST.to_string(),
            port: PORT,
            mongo_uri: None,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            oracle_timeout_secs: DEFAULT_ORACLE_TIMEOUT_SECS,
            sample_fallback: false,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Reads the environment, falling back to defaults for anything missing
    /// or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            mongo_uri: non_empty("MONGODB_URI"),
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            gemini_model: non_empty("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            oracle_timeout_secs: env::var("ORACLE_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(defaults.oracle_timeout_secs),
            sample_fallback: env::var("ITINERARY_SAMPLE_FALLBACK")
                .ok()
                .and_then(|s| parse_bool(&s))
                .unwrap_or(defaults.sample_fallback),
        }
    }
}
