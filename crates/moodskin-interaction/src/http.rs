//! Shared HTTP plumbing for the remote adapters.

use moodskin_core::error::{MoodskinError, Result};
use reqwest::{Client, StatusCode, Url, header::HeaderValue};
use serde::Deserialize;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

/// Which error variant a failed call degrades to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Service {
    Inference,
    Remote,
    Identity,
}

impl Service {
    pub(crate) fn error(self, message: impl Into<String>) -> MoodskinError {
        match self {
            Service::Inference => MoodskinError::inference(message),
            Service::Remote => MoodskinError::remote(message),
            Service::Identity => MoodskinError::identity(message),
        }
    }
}

pub(crate) fn build_client() -> Client {
    Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_else(|err| {
            tracing::warn!(error = %err, "Falling back to default HTTP client");
            Client::new()
        })
}

/// Transport-level failure (DNS, connect, timeout, body decode).
pub(crate) fn request_error(service: Service, name: &str, err: reqwest::Error) -> MoodskinError {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else if err.is_decode() {
        "returned an unreadable body"
    } else {
        "request failed"
    };
    service.error(format!("{name} {kind}: {err}"))
}

/// Error bodies seen across providers: `{"error": {"message"}}`, `{"error": "..."}`,
/// `{"message": "..."}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: NestedError },
    Flat { error: String },
    Message { message: String },
}

#[derive(Deserialize)]
struct NestedError {
    message: Option<String>,
    status: Option<String>,
}

/// Non-success HTTP status → error carrying the provider's message.
pub(crate) fn map_http_error(
    service: Service,
    name: &str,
    status: StatusCode,
    body: &str,
    retry_after: Option<Duration>,
) -> MoodskinError {
    let message = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody::Nested { error }) => {
            let msg = error.message.unwrap_or_else(|| body.to_string());
            match error.status {
                Some(status_text) if !status_text.is_empty() => format!("{status_text}: {msg}"),
                _ => msg,
            }
        }
        Ok(ErrorBody::Flat { error }) => error,
        Ok(ErrorBody::Message { message }) => message,
        Err(_) => body.trim().to_string(),
    };

    let mut text = format!("{name} returned {}: {message}", status.as_u16());
    if let Some(delay) = retry_after {
        text.push_str(&format!(" (retry after {}s)", delay.as_secs()));
    }
    service.error(text)
}

pub(crate) fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}

/// Reads a failed response into an error.
pub(crate) async fn error_from_response(
    service: Service,
    name: &str,
    response: reqwest::Response,
) -> MoodskinError {
    let status = response.status();
    let retry_after = parse_retry_after(response.headers().get("retry-after"));
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| format!("Failed to read {name} error body"));
    map_http_error(service, name, status, &body, retry_after)
}

/// `{base}/{segments...}` with each segment percent-encoded.
pub(crate) fn join_url(service: Service, base: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base)
        .map_err(|e| MoodskinError::config(format!("invalid base URL '{base}': {e}")))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| service.error(format!("base URL '{base}' cannot have a path")))?;
        path.pop_if_empty();
        for segment in segments {
            path.push(segment);
        }
    }
    Ok(url)
}
