//! Geocoding: place names from coordinates and coordinates from place names.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use crate::types::{Coordinate, GeocodeError};
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";
const USER_AGENT: &str = concat!("SkyCast/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

impl NominatimAddress {
    /// City, then town, then village; blank names count as missing
    fn place_name(self) -> Option<String> {
        [self.city, self.town, self.village]
            .into_iter()
            .flatten()
            .find(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct SearchCandidate {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

impl SearchCandidate {
    fn coordinate(&self) -> Result<Coordinate, GeocodeError> {
        let latitude = self
            .lat
            .trim()
            .parse::<f64>()
            .map_err(|e| GeocodeError::Parse(format!("latitude {:?}: {}", self.lat, e)))?;
        let longitude = self
            .lon
            .trim()
            .parse::<f64>()
            .map_err(|e| GeocodeError::Parse(format!("longitude {:?}: {}", self.lon, e)))?;
        Ok(Coordinate::new(latitude, longitude))
    }
}

#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Arc<Client>,
    base_url: String,
}

impl Geocoder {
    pub fn new(timeout: Duration) -> Result<Self, GeocodeError> {
        Self::with_user_agent(USER_AGENT, timeout)
    }

    /// Nominatim's usage policy requires an identifying User-Agent
    pub fn with_user_agent(user_agent: &str, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()?;

        Ok(Self {
            client: Arc::new(client),
            base_url: NOMINATIM_URL.to_string(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Reverse geocode coordinates to a city, town or village name.
    ///
    /// `Ok(None)` when the service knows no such place for the point.
    #[instrument(skip(self), level = "info")]
    pub async fn reverse_geocode(
        &self,
        coordinate: Coordinate,
    ) -> Result<Option<String>, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let lat = coordinate.latitude.to_string();
        let lon = coordinate.longitude.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[("lat", lat.as_str()), ("lon", lon.as_str()), ("format", "json")])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!("Reverse geocode returned status {}", response.status());
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let parsed: ReverseResponse =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

        let name = parsed.address.and_then(NominatimAddress::place_name);
        match &name {
            Some(n) => tracing::info!("Reverse geocoded {} to: {}", coordinate, n),
            None => tracing::debug!("No city, town or village at {}", coordinate),
        }
        Ok(name)
    }

    /// Resolve free text to the best matching coordinate (single top result).
    ///
    /// Blank queries resolve to `Ok(None)` without a request.
    #[instrument(skip(self), level = "info")]
    pub async fn search(&self, query: &str) -> Result<Option<Coordinate>, GeocodeError> {
        let query = query.trim();
        if query.is_empty() {
            tracing::debug!("Skipping search for blank query");
            return Ok(None);
        }

        let url = format!("{}/search", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            tracing::debug!("Search returned status {}", response.status());
            return Err(GeocodeError::Status(response.status().as_u16()));
        }

        let body = response.text().await?;
        let candidates: Vec<SearchCandidate> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Parse(e.to_string()))?;

        let Some(best) = candidates.first() else {
            tracing::info!("No match for {:?}", query);
            return Ok(None);
        };

        let coordinate = best.coordinate()?;
        tracing::info!(
            "Resolved {:?} to {} ({})",
            query,
            coordinate,
            best.display_name.as_deref().unwrap_or("unnamed")
        );
        Ok(Some(coordinate))
    }
}
