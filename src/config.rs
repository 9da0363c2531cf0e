// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! The geocoding API key is the only secret. It is read from the
//! environment (or a local `.env` file) and never compiled in.

use crate::models::Coordinates;
use crate::services::geocoding::GOOGLE_GEOCODE_URL;
use crate::services::session::DEFAULT_MAP_ZOOM;
use std::env;
use std::path::PathBuf;

/// Application configuration, loaded once at startup.
#[derive(Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Geocoding endpoint (overridable for local testing)
    pub geocoding_url: String,
    /// Directory holding the workout snapshot
    pub data_dir: PathBuf,
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    /// Starting map position, if known without asking the browser
    pub initial_position: Option<Coordinates>,
    /// Zoom level used when centering the map
    pub map_zoom: u8,

    // --- Secrets ---
    /// Google Geocoding API key. Lookups are skipped without it.
    pub geocoding_api_key: Option<String>,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("geocoding_url", &self.geocoding_url)
            .field("data_dir", &self.data_dir)
            .field("frontend_url", &self.frontend_url)
            .field("port", &self.port)
            .field("initial_position", &self.initial_position)
            .field("map_zoom", &self.map_zoom)
            .field(
                "geocoding_api_key",
                &self.geocoding_api_key.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            geocoding_url: GOOGLE_GEOCODE_URL.to_string(),
            data_dir: PathBuf::from("data"),
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            initial_position: None,
            map_zoom: DEFAULT_MAP_ZOOM,
            geocoding_api_key: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let initial_position = env::var("INITIAL_POSITION")
            .ok()
            .map(|raw| parse_position(&raw))
            .transpose()?;

        let map_zoom = match env::var("MAP_ZOOM") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("MAP_ZOOM", raw))?,
            Err(_) => DEFAULT_MAP_ZOOM,
        };

        Ok(Self {
            geocoding_url: env::var("GEOCODING_URL")
                .unwrap_or_else(|_| GOOGLE_GEOCODE_URL.to_string()),
            data_dir: env::var("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("data")),
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            initial_position,
            map_zoom,

            geocoding_api_key: env::var("GEOCODING_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }
}

/// Parse `"lat,lng"`.
fn parse_position(raw: &str) -> Result<Coordinates, ConfigError> {
    let invalid = || ConfigError::Invalid("INITIAL_POSITION", raw.to_string());

    let (lat, lng) = raw.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let lng: f64 = lng.trim().parse().map_err(|_| invalid())?;

    let position = Coordinates::new(lat, lng);
    if !position.is_valid() {
        return Err(invalid());
    }
    Ok(position)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
