use serde::{Deserialize, Deserializer};

// Browser forms send numbers as JSON numbers, numeric strings, or free text
// like "5 days". These helpers keep whatever leading number there is and
// never fail deserialization.

/// Leading numeric prefix of `raw`, read the way a browser `parseFloat` would.
pub fn leading_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    let mut seen_digit = false;

    for (i, c) in trimmed.char_indices() {
        match c {
            '-' | '+' if i == 0 => {}
            '.' if !seen_dot => seen_dot = true,
            d if d.is_ascii_digit() => seen_digit = true,
            _ => break,
        }
        end = i + c.len_utf8();
    }

    if !seen_digit {
        return None;
    }
    trimmed[..end].trim_end_matches('.').parse().ok()
}

pub fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) => Ok(leading_number(&s)),
        _ => Ok(None),
    }
}

pub fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    match value {
        Some(serde_json::Value::String(s)) => Ok(Some(s)),
        Some(serde_json::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(serde_json::Value::Bool(b)) => Ok(Some(b.to_string())),
        _ => Ok(None),
    }
}
