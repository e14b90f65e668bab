//! Directory Client
//!
//! Main client for the directory service, combining the tenant base URL,
//! the bearer token and the HTTP transport.

use super::http::IdmHttpClient;
use anyhow::{Context, Result};
use reqwest::Method;
use serde_json::Value;

/// Header used to tunnel PATCH semantics over a POST request
pub const METHOD_OVERRIDE_HEADER: &str = "X-HTTP-Method-Override";

/// Vendor media type prefix used by the entitlement endpoints
const MEDIA_TYPE_PREFIX: &str = "application/vnd.vmware.horizon.manager.";

/// Expand a short media type name, e.g. `bulk.sync.response`, into the
/// full vendor media type.
pub fn media_type(short: &str) -> String {
    format!("{}{}+json", MEDIA_TYPE_PREFIX, short)
}

/// Main directory client
#[derive(Clone)]
pub struct IdmClient {
    pub http: IdmHttpClient,
    pub base_url: String,
    token: String,
}

impl IdmClient {
    /// Create a new client for the given tenant base URL
    pub fn new(base_url: &str, token: &str) -> Result<Self> {
        let parsed = url::Url::parse(base_url)
            .with_context(|| format!("Invalid directory URL: {}", base_url))?;

        let http = IdmHttpClient::new()?;

        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    /// Build an absolute URL from an API path such as `scim/Users/abc`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issue a request with optional body and one-shot headers
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        headers: &[(&str, String)],
    ) -> Result<Value> {
        let url = self.url(path);
        self.http
            .send(method, &url, &self.token, body, headers)
            .await
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(Method::GET, path, None, &[]).await
    }

    /// Make a POST request
    pub async fn post(&self, path: &str, body: &Value) -> Result<Value> {
        self.request(Method::POST, path, Some(body), &[]).await
    }

    /// Make a DELETE request
    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None, &[]).await
    }

    /// Partial update, sent as POST with the method override header
    pub async fn patch(&self, path: &str, body: &Value) -> Result<Value> {
        let headers = [(METHOD_OVERRIDE_HEADER, "PATCH".to_string())];
        self.request(Method::POST, path, Some(body), &headers).await
    }

    /// POST with vendor `Accept` and `Content-Type` media types
    pub async fn post_media(
        &self,
        path: &str,
        body: &Value,
        accept: &str,
        content_type: &str,
    ) -> Result<Value> {
        let headers = [
            ("Accept", media_type(accept)),
            ("Content-Type", media_type(content_type)),
        ];
        self.request(Method::POST, path, Some(body), &headers).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_expansion() {
        assert_eq!(
            media_type("bulk.sync.response"),
            "application/vnd.vmware.horizon.manager.bulk.sync.response+json"
        );
    }

    #[test]
    fn test_url_joins_paths() {
        let client = IdmClient::new("https://tenant.example.com/api/", "t").unwrap();
        assert_eq!(
            client.url("scim/Users/abc"),
            "https://tenant.example.com/api/scim/Users/abc"
        );
        assert_eq!(
            client.url("/entitlements/definitions"),
            "https://tenant.example.com/api/entitlements/definitions"
        );
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(IdmClient::new("not a url", "t").is_err());
    }
}
