//! Centralized error types for SkyCast.
//!
//! This module provides a typed error hierarchy that:
//! - Gives every failure path one user-facing message
//! - Preserves full error context for debugging/logging

use thiserror::Error;

/// What the widget reports when a lookup fails.
///
/// Errors from the lookup crates are mapped into this type by the widget layer.
/// Use `user_message()` to get a UI-appropriate message.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Weather service error: {0}")]
    Weather(#[from] WeatherError),

    #[error("Geocoding error: {0}")]
    Geocode(#[from] GeocodeError),
}

impl AppError {
    /// Returns a user-friendly message suitable for display in the widget.
    pub fn user_message(&self) -> &'static str {
        match self {
            AppError::Weather(e) => e.user_message(),
            AppError::Geocode(e) => e.user_message(),
        }
    }
}

/// Transport-level failure classes, used in log details.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Server error: {status} - {message}")]
    ServerError { status: u16, message: String },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

/// Weather lookup errors as seen by the user.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Invalid coordinates: {latitude}, {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Weather data unavailable: {0}")]
    Unavailable(String),
}

impl WeatherError {
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::InvalidCoordinate { .. } => {
                "That location is outside the valid coordinate range."
            }
            WeatherError::LocationNotFound(_) => "Location not found. Please try again.",
            WeatherError::InvalidApiKey => "Weather API key is invalid. Check settings.",
            WeatherError::Unavailable(_) => {
                "Unable to fetch weather data. Please try again later."
            }
        }
    }
}

/// Geocoding errors (place search and place-name lookup).
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("No match for query: {0}")]
    NoMatch(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Place name lookup failed: {0}")]
    ReverseFailed(String),
}

impl GeocodeError {
    pub fn user_message(&self) -> &'static str {
        match self {
            GeocodeError::NoMatch(_) => {
                "Location not found. Please try again or try typing the full name."
            }
            GeocodeError::SearchFailed(_) => "Unable to fetch location. Please try again later.",
            GeocodeError::ReverseFailed(_) => {
                "Unable to look up the place name for this location."
            }
        }
    }
}

/// Extension trait for converting reqwest errors to our error types.
pub trait ReqwestErrorExt {
    fn into_network_error(self) -> NetworkError;
}

impl ReqwestErrorExt for reqwest::Error {
    fn into_network_error(self) -> NetworkError {
        if self.is_timeout() {
            NetworkError::Timeout
        } else if self.is_decode() {
            NetworkError::InvalidResponse(self.to_string())
        } else if let Some(status) = self.status() {
            NetworkError::ServerError {
                status: status.as_u16(),
                message: self.to_string(),
            }
        } else {
            NetworkError::ConnectionFailed(self.to_string())
        }
    }
}
