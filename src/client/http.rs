//! HTTP utilities for directory REST API calls

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method};
use serde_json::Value;

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips non-printable characters
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let mut end = MAX_LOG_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}... [truncated, {} bytes total]", &body[..end], body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}

/// HTTP client wrapper for directory API calls
#[derive(Clone)]
pub struct IdmHttpClient {
    client: Client,
}

impl IdmHttpClient {
    /// Create a new HTTP client
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("idmctl/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }

    /// Send a request and decode the JSON response.
    ///
    /// `headers` apply to this request only. A body is sent as JSON unless
    /// `headers` already carries a `Content-Type`.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        token: &str,
        body: Option<&Value>,
        headers: &[(&str, String)],
    ) -> Result<Value> {
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method, url).bearer_auth(token);

        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        if let Some(body) = body {
            let has_content_type = headers
                .iter()
                .any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE.as_str()));
            if !has_content_type {
                request = request.header(CONTENT_TYPE, "application/json");
            }
            let encoded = serde_json::to_vec(body).context("Failed to encode request body")?;
            request = request.body(encoded);
        }

        let response = request.send().await.context("Failed to send request")?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            // Only the sanitized/truncated body is logged
            tracing::error!("API error: {} - {}", status, sanitize_for_log(&response_body));
            return Err(anyhow::anyhow!("API request failed: {}", status));
        }

        if response_body.trim().is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&response_body).context("Failed to parse response JSON")
    }
}
