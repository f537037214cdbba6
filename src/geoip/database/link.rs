//! Signed download link request.
//!
//! The licensing endpoint answers `GET ?source=<id>&domain=<host>` with
//! `{"success": bool, "error": string, "url": string}`. The returned URL is
//! short-lived, so a new link is requested for every download.

use serde_json::Value;

use crate::error_handling::DownloadError;

/// Requests a signed database URL for `domain`.
///
/// # Errors
///
/// Each failure mode maps to its own numbered `DownloadError::Link*` variant.
pub(crate) async fn request_download_url(
    client: &reqwest::Client,
    endpoint: &str,
    source: &str,
    domain: &str,
) -> Result<String, DownloadError> {
    log::debug!("Requesting signed database link from {}", endpoint);

    let response = client
        .get(endpoint)
        .query(&[("source", source), ("domain", domain)])
        .send()
        .await
        .map_err(DownloadError::LinkRequest)?;

    let status = response.status();
    if status != reqwest::StatusCode::OK {
        return Err(DownloadError::LinkStatus {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
        });
    }

    let body = response.text().await.map_err(DownloadError::LinkRequest)?;
    parse_link_response(&body)
}

fn parse_link_response(body: &str) -> Result<String, DownloadError> {
    let data = match serde_json::from_str::<Value>(body) {
        Ok(Value::Object(data)) => data,
        _ => return Err(DownloadError::LinkBody(body.to_string())),
    };

    let error = match data.get("error") {
        Some(Value::String(error)) => error.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };

    if !data.get("success").is_some_and(is_truthy) {
        return Err(DownloadError::LinkDenied(error));
    }

    match data.get("url") {
        Some(Value::String(url)) if !url.is_empty() => Ok(url.clone()),
        _ => Err(DownloadError::LinkEmpty(error)),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
