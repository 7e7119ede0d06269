//! HTTP utilities for ONTAP REST API calls

use crate::error::excerpt;
use crate::resource::transport::{Method, RestResponse, TransportFailure};
use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;

/// Pull a readable message out of an ONTAP error body:
/// `{"error": {"message": "...", "code": "..."}}`
pub fn error_message(body: &str) -> Option<String> {
    let parsed: Value = serde_json::from_str(body).ok()?;
    let error = parsed.get("error")?;
    let message = error.get("message").and_then(|v| v.as_str())?;

    match error.get("code").and_then(|v| v.as_str()) {
        Some(code) => Some(format!("{} (code {})", message, code)),
        None => Some(message.to_string()),
    }
}

/// HTTP client wrapper for ONTAP API calls
#[derive(Clone)]
pub struct OntapHttpClient {
    client: Client,
    username: String,
    password: String,
}

impl OntapHttpClient {
    /// Create a new HTTP client
    pub fn new(username: &str, password: &str, validate_certs: bool) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("ontap-rest/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!validate_certs)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Send one request and parse the body (`Value::Null` when empty)
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> std::result::Result<RestResponse, TransportFailure> {
        tracing::debug!("{} {}", method, url);

        let mut request = match method {
            Method::Get => self.client.get(url),
            Method::Post => self.client.post(url),
            Method::Patch => self.client.patch(url),
            Method::Delete => self.client.delete(url),
        }
        .basic_auth(&self.username, Some(&self.password));

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportFailure::new(None, format!("failed to send request: {}", e)))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            TransportFailure::new(
                Some(status.as_u16()),
                format!("failed to read response body: {}", e),
            )
        })?;

        if !status.is_success() {
            // Only log a sanitized/truncated error body
            tracing::error!("API error: {} - {}", status, excerpt(&text));
            let message = error_message(&text)
                .unwrap_or_else(|| format!("API request failed: {}", status));
            return Err(TransportFailure::new(Some(status.as_u16()), message));
        }

        if text.trim().is_empty() {
            return Ok(RestResponse::new(status.as_u16(), Value::Null));
        }

        let body = serde_json::from_str(&text).map_err(|e| {
            TransportFailure::new(
                Some(status.as_u16()),
                format!("failed to parse response JSON: {}, body {}", e, excerpt(&text)),
            )
        })?;

        Ok(RestResponse::new(status.as_u16(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_with_code() {
        let body = r#"{"error": {"message": "entry doesn't exist", "code": "4", "target": "uuid"}}"#;
        assert_eq!(error_message(body).unwrap(), "entry doesn't exist (code 4)");
    }

    #[test]
    fn test_error_message_without_code() {
        let body = r#"{"error": {"message": "not authorized"}}"#;
        assert_eq!(error_message(body).unwrap(), "not authorized");
    }

    #[test]
    fn test_error_message_unparseable() {
        assert_eq!(error_message("<html>502</html>"), None);
        assert_eq!(error_message(r#"{"records": []}"#), None);
    }
}
