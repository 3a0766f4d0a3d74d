use axum::{
    body::Bytes,
    http::{header, HeaderMap},
};
use serde::{de::DeserializeOwned, Deserialize, Deserializer};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Parse a JSON request body.
///
/// Requests without a JSON content type, or with an empty body, parse as
/// `T::default()` so required-field checks answer them instead of the
/// extractor.
pub fn json_body<T>(headers: &HeaderMap, body: &Bytes) -> ApiResult<T>
where
    T: DeserializeOwned + Default,
{
    if !is_json(headers) || body.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        tracing::debug!(error = %e, "Rejected malformed JSON body");
        ApiError::bad_request("JSON inválido")
            .status("fail")
            .suggestion("Envie um corpo JSON válido")
    })
}

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|mime| {
            let mime = mime.trim().to_ascii_lowercase();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}

/// Accept strings, numbers and `true` for text fields. Empty strings, `0`,
/// `false`, `null`, arrays and objects read as absent.
pub fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    let text = match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Some(Value::Bool(true)) => Some("true".to_string()),
        _ => None,
    };

    Ok(text.filter(|s| !s.is_empty()))
}
