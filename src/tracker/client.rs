//! HTTP client shared foundation
//!
//! This module provides a shared HTTP client with:
//! - Fixed User-Agent
//! - Optional bearer credential per request
//! - Non-2xx responses mapped to fetch errors, bad payloads to parse errors
//!
//! There are no retries and no timeouts; a failed call fails the check pass.

use crate::error::TrackerError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Default User-Agent header
const DEFAULT_USER_AGENT: &str = concat!("stackver/", env!("CARGO_PKG_VERSION"));

/// Options for a single GET request
#[derive(Debug, Clone, Default)]
pub struct RequestOptions<'a> {
    /// Value of the `Accept` header
    pub accept: Option<&'a str>,
    /// Bearer token
    pub bearer: Option<&'a str>,
}

/// HTTP client wrapper shared by all tracker backends
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client with default settings
    pub fn new() -> Result<Self, TrackerError> {
        Self::with_user_agent(DEFAULT_USER_AGENT)
    }

    /// Create a new HTTP client with a custom User-Agent
    pub fn with_user_agent(user_agent: &str) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| {
                TrackerError::fetch(
                    "http",
                    "",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self { client })
    }

    /// Send a GET request and return the raw response, whatever its status
    pub async fn send(
        &self,
        url: &str,
        options: &RequestOptions<'_>,
        tracker: &str,
    ) -> Result<Response, TrackerError> {
        let mut headers = HeaderMap::new();
        if let Some(accept) = options.accept {
            if let Ok(value) = HeaderValue::from_str(accept) {
                headers.insert(ACCEPT, value);
            }
        }

        let mut request = self.client.get(url).headers(headers);
        if let Some(token) = options.bearer.filter(|t| !t.is_empty()) {
            request = request.bearer_auth(token);
        }

        debug!(url = %url, tracker = %tracker, "GET");
        request
            .send()
            .await
            .map_err(|e| TrackerError::fetch(tracker, url, e.to_string()))
    }

    /// Perform a GET request, requiring a 2xx status
    pub async fn get(
        &self,
        url: &str,
        options: &RequestOptions<'_>,
        tracker: &str,
    ) -> Result<Response, TrackerError> {
        let response = self.send(url, options, tracker).await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TrackerError::fetch(tracker, url, format!("HTTP {}", status)));
        }
        Ok(response)
    }

    /// Perform a GET request and parse the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        options: &RequestOptions<'_>,
        tracker: &str,
    ) -> Result<T, TrackerError> {
        let response = self.get(url, options, tracker).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| TrackerError::parse(tracker, url, format!("failed to parse JSON: {}", e)))
    }

    /// Perform a GET request and return the body as text
    pub async fn get_text(
        &self,
        url: &str,
        options: &RequestOptions<'_>,
        tracker: &str,
    ) -> Result<String, TrackerError> {
        let response = self.get(url, options, tracker).await?;
        response
            .text()
            .await
            .map_err(|e| TrackerError::fetch(tracker, url, format!("failed to read body: {}", e)))
    }
}
