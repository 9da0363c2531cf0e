// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reverse geocoding: turn a clicked point into a place name.
//!
//! Lookups are best effort. Any failure leaves the place unknown; it never
//! blocks or fails a workout.

use crate::models::Coordinates;
use anyhow::Context;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// Default Google Geocoding API endpoint.
pub const GOOGLE_GEOCODE_URL: &str = "https://maps.googleapis.com/maps/api/geocode/json";

/// Upper bound on one lookup, so a hung endpoint cannot pin lookup tasks.
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);

/// Resolves coordinates to a human-readable location name.
pub trait Geocoder: Send + Sync + 'static {
    fn reverse(
        &self,
        point: Coordinates,
    ) -> impl Future<Output = Result<String, GeocodeError>> + Send;
}

/// Errors from a reverse geocoding lookup.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding API key not configured")]
    MissingCredential,

    #[error("Geocoding request failed: {0}")]
    Transport(String),

    #[error("Geocoding API returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Geocoding response could not be parsed: {0}")]
    Parse(String),

    #[error("No geocoding results (status {0})")]
    NoResults(String),
}

/// Google Geocoding API client.
#[derive(Clone)]
pub struct GoogleGeocoder {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleGeocoder {
    /// Create a client. Without an API key every lookup fails fast with
    /// [`GeocodeError::MissingCredential`].
    pub fn new(api_key: Option<String>, base_url: impl Into<String>) -> anyhow::Result<Self> {
        Self::with_timeout(api_key, base_url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(
        api_key: Option<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("failed building geocoding HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            api_key,
        })
    }
}

impl std::fmt::Debug for GoogleGeocoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleGeocoder")
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Geocoder for GoogleGeocoder {
    async fn reverse(&self, point: Coordinates) -> Result<String, GeocodeError> {
        let key = self
            .api_key
            .as_deref()
            .ok_or(GeocodeError::MissingCredential)?;

        let response = self
            .http
            .get(&self.base_url)
            .query(&[("latlng", point.to_string().as_str()), ("key", key)])
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(GeocodeError::Status { status, body });
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| GeocodeError::Parse(e.to_string()))?;

        body.first_address()
    }
}

/// Geocoding API response. Only the fields we read are modelled.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// One geocoding result. Only the first result's address is read, so a
/// later entry without one must not fail the whole response.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
}

impl GeocodeResponse {
    /// The first result's formatted address.
    pub fn first_address(self) -> Result<String, GeocodeError> {
        let status = self.status.unwrap_or_else(|| "UNKNOWN".to_string());
        match self.results.into_iter().next() {
            Some(GeocodeResult {
                formatted_address: Some(address),
            }) if !address.trim().is_empty() => Ok(address),
            _ => {
                if let Some(message) = self.error_message {
                    tracing::warn!(status = %status, message = %message, "Geocoding API error");
                }
                Err(GeocodeError::NoResults(status))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_address_wins() {
        let body: GeocodeResponse = serde_json::from_str(
            r#"{"results":[{"formatted_address":"Paris, France"},{"formatted_address":"France"}],"status":"OK"}"#,
        )
        .unwrap();
        assert_eq!(body.first_address().unwrap(), "Paris, France");
    }

    #[test]
    fn test_later_result_without_address_is_ignored() {
        let body: GeocodeResponse = serde_json::from_str(
            r#"{"results":[{"formatted_address":"Paris, France"},{"place_id":"abc"}],"status":"OK"}"#,
        )
        .unwrap();
        assert_eq!(body.first_address().unwrap(), "Paris, France");
    }

    #[test]
    fn test_first_result_without_address() {
        let body: GeocodeResponse =
            serde_json::from_str(r#"{"results":[{"place_id":"abc"}],"status":"OK"}"#).unwrap();
        assert!(matches!(
            body.first_address(),
            Err(GeocodeError::NoResults(s)) if s == "OK"
        ));
    }

    #[test]
    fn test_empty_results() {
        let body: GeocodeResponse =
            serde_json::from_str(r#"{"results":[],"status":"ZERO_RESULTS"}"#).unwrap();
        assert!(matches!(
            body.first_address(),
            Err(GeocodeError::NoResults(s)) if s == "ZERO_RESULTS"
        ));
    }

    #[test]
    fn test_missing_results_field_is_parse_error() {
        let parsed: Result<GeocodeResponse, _> =
            serde_json::from_str(r#"{"error_message":"denied","status":"REQUEST_DENIED"}"#);
        assert!(parsed.is_err());
    }

    #[tokio::test]
    async fn test_missing_key_fails_without_request() {
        // Unroutable URL: the call must not get that far.
        let geocoder = GoogleGeocoder::new(None, "http://127.0.0.1:9/geocode").unwrap();
        let result = geocoder.reverse(Coordinates::new(48.85, 2.35)).await;
        assert!(matches!(result, Err(GeocodeError::MissingCredential)));
    }

    #[test]
    fn test_debug_redacts_key() {
        let geocoder = GoogleGeocoder::new(Some("secret".to_string()), GOOGLE_GEOCODE_URL).unwrap();
        let debug = format!("{:?}", geocoder);
        assert!(!debug.contains("secret"));
    }
}
