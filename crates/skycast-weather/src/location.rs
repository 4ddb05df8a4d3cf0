//! Startup location: where the device is, or a default when that can't be known.

use crate::types::{Coordinate, LocationError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::Instrument;

/// Something that can report the device's current coordinate
#[async_trait]
pub trait LocationSource: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    async fn current_location(&self) -> Result<Coordinate, LocationError>;
}

/// Approximate location from the public IP address (ip-api.com JSON format)
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpApiResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    lat: Option<f64>,
    #[serde(default)]
    lon: Option<f64>,
    #[serde(default)]
    city: Option<String>,
}

impl IpLocator {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, LocationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LocationError::Other(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl LocationSource for IpLocator {
    fn name(&self) -> &'static str {
        "ip-api"
    }

    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        let response = self.client.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                LocationError::Timeout
            } else {
                LocationError::Other(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(LocationError::Other(format!(
                "geolocation service returned status {}",
                response.status()
            )));
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Other(e.to_string()))?;

        if body.status != "success" {
            return Err(LocationError::Other(
                body.message.unwrap_or_else(|| body.status.clone()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(lat), Some(lon)) => {
                let coordinate = Coordinate::new(lat, lon);
                if !coordinate.is_valid() {
                    return Err(LocationError::Other(format!(
                        "geolocation returned out-of-range coordinate {}",
                        coordinate
                    )));
                }
                tracing::info!(
                    lat,
                    lon,
                    city = body.city.as_deref().unwrap_or("unknown"),
                    "geolocation resolution successful"
                );
                Ok(coordinate)
            }
            _ => Err(LocationError::Other(
                "geolocation response has no coordinates".to_string(),
            )),
        }
    }
}

/// A location fixed in configuration
#[derive(Debug, Clone, Copy)]
pub struct FixedLocation(pub Coordinate);

#[async_trait]
impl LocationSource for FixedLocation {
    fn name(&self) -> &'static str {
        "fixed"
    }

    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        Ok(self.0)
    }
}

/// No location capability on this device
#[derive(Debug, Clone, Copy, Default)]
pub struct Unsupported;

#[async_trait]
impl LocationSource for Unsupported {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        Err(LocationError::ServiceUnavailable)
    }
}

/// Outcome of startup location resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResolvedLocation {
    Device(Coordinate),
    Fallback(Coordinate),
}

impl ResolvedLocation {
    pub fn coordinate(&self) -> Coordinate {
        match self {
            Self::Device(c) | Self::Fallback(c) => *c,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback(_))
    }
}

/// Ask `source` for the device location, falling back to `default` on any failure.
pub async fn resolve_location(source: &dyn LocationSource, default: Coordinate) -> ResolvedLocation {
    let span = tracing::info_span!("location.lookup", source = source.name());

    async move {
        match source.current_location().await {
            Ok(coordinate) => ResolvedLocation::Device(coordinate),
            Err(LocationError::ServiceUnavailable) => {
                tracing::error!("Geolocation is not supported; defaulting to {}", default);
                ResolvedLocation::Fallback(default)
            }
            Err(e) => {
                tracing::error!("Geolocation failed ({}); defaulting to {}", e, default);
                ResolvedLocation::Fallback(default)
            }
        }
    }
    .instrument(span)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: Coordinate = Coordinate::new(51.505, -0.09);

    #[tokio::test]
    async fn test_fixed_location_is_device() {
        let paris = Coordinate::new(48.8566, 2.3522);
        let resolved = resolve_location(&FixedLocation(paris), LONDON).await;
        assert_eq!(resolved, ResolvedLocation::Device(paris));
        assert!(!resolved.is_fallback());
    }

    #[tokio::test]
    async fn test_unsupported_falls_back() {
        let resolved = resolve_location(&Unsupported, LONDON).await;
        assert_eq!(resolved, ResolvedLocation::Fallback(LONDON));
        assert_eq!(resolved.coordinate(), LONDON);
    }

    #[tokio::test]
    async fn test_unreachable_locator_falls_back() {
        let locator = IpLocator::new("http://127.0.0.1:1/json", Duration::from_millis(200)).unwrap();
        let resolved = resolve_location(&locator, LONDON).await;
        assert!(resolved.is_fallback());
    }
}
