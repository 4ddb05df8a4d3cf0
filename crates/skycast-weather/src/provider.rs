//! Forecast lookups against the WeatherAPI.com `forecast.json` endpoint.

use crate::types::{Condition, Coordinate, CurrentWeather, ForecastDay, Place, WeatherError, WeatherReport};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

const WEATHER_API_BASE: &str = "https://api.weatherapi.com/v1";
const DEFAULT_FORECAST_DAYS: u8 = 3;

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    location: Place,
    current: CurrentWeather,
    forecast: ForecastBlock,
}

#[derive(Debug, Deserialize)]
struct ForecastBlock {
    forecastday: Vec<ApiForecastDay>,
}

#[derive(Debug, Deserialize)]
struct ApiForecastDay {
    date: NaiveDate,
    day: ApiDay,
}

#[derive(Debug, Deserialize)]
struct ApiDay {
    maxtemp_c: f64,
    mintemp_c: f64,
    avghumidity: f64,
    uv: f64,
    condition: Condition,
}

impl From<ApiForecastDay> for ForecastDay {
    fn from(api: ApiForecastDay) -> Self {
        Self {
            date: api.date,
            high: api.day.maxtemp_c,
            low: api.day.mintemp_c,
            condition: api.day.condition,
            humidity: api.day.avghumidity,
            uv: api.day.uv,
        }
    }
}

impl From<ForecastResponse> for WeatherReport {
    fn from(resp: ForecastResponse) -> Self {
        Self {
            place: resp.location,
            current: resp.current,
            forecast: resp.forecast.forecastday.into_iter().map(ForecastDay::from).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    api_key: String,
    base_url: String,
    days: u8,
}

impl WeatherProvider {
    pub fn new(api_key: impl Into<String>, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client: Arc::new(client),
            api_key: api_key.into(),
            base_url: WEATHER_API_BASE.to_string(),
            days: DEFAULT_FORECAST_DAYS,
        })
    }

    /// Point the provider at another API root (self-hosted proxy, mock server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Number of days to request, today included
    pub fn with_days(mut self, days: u8) -> Self {
        self.days = days.max(1);
        self
    }

    pub fn days(&self) -> u8 {
        self.days
    }

    /// Fetch current conditions and the daily forecast for `coordinate`.
    ///
    /// Out-of-range coordinates are rejected before any request is sent.
    #[instrument(skip(self), level = "info")]
    pub async fn forecast(&self, coordinate: Coordinate) -> Result<WeatherReport, WeatherError> {
        let coordinate = coordinate.validate().inspect_err(|e| {
            tracing::error!("{}", e);
        })?;

        let url = format!("{}/forecast.json", self.base_url);
        let days = self.days.to_string();
        let query = coordinate.to_string();

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query.as_str()),
                ("days", days.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Forecast request for {} returned status {}", coordinate, status);
            return Err(WeatherError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let parsed: ForecastResponse =
            serde_json::from_str(&body).map_err(|e| WeatherError::Parse(e.to_string()))?;

        let report = WeatherReport::from(parsed);
        tracing::debug!(
            "Forecast for {}, {}: {} day(s)",
            report.place.name,
            report.place.country,
            report.forecast.len()
        );
        Ok(report)
    }
}
