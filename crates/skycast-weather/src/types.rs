use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A point on the Earth's surface in decimal degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude within [-90, 90] and longitude within [-180, 180]. NaN is never valid.
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Returns the coordinate unchanged if it is in range
    pub fn validate(self) -> Result<Self, WeatherError> {
        if self.is_valid() {
            Ok(self)
        } else {
            Err(WeatherError::InvalidCoordinate {
                latitude: self.latitude,
                longitude: self.longitude,
            })
        }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Weather condition as reported by the forecast API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Condition {
    pub text: String,
    /// Protocol-relative icon path, e.g. `//cdn.weatherapi.com/weather/64x64/day/116.png`
    pub icon: String,
}

impl Condition {
    /// Absolute icon URL
    pub fn icon_url(&self) -> String {
        if self.icon.starts_with("//") {
            format!("https:{}", self.icon)
        } else {
            self.icon.clone()
        }
    }
}

/// Place the forecast was resolved for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub country: String,
}

/// Current weather conditions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentWeather {
    /// Local observation time, `YYYY-MM-DD HH:MM`
    #[serde(rename = "last_updated")]
    pub updated_at: String,
    #[serde(rename = "temp_c")]
    pub temperature: f64,
    pub condition: Condition,
    #[serde(rename = "feelslike_c")]
    pub feels_like: f64,
    pub humidity: f64,
    pub uv: f64,
    #[serde(rename = "pressure_mb")]
    pub pressure: f64,
    #[serde(rename = "vis_km")]
    pub visibility: f64,
    #[serde(rename = "wind_kph")]
    pub wind_speed: f64,
    #[serde(rename = "wind_dir")]
    pub wind_direction: String,
    #[serde(rename = "precip_mm")]
    pub precipitation: f64,
}

/// Daily forecast entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    pub date: NaiveDate,
    pub high: f64,
    pub low: f64,
    pub condition: Condition,
    pub humidity: f64,
    pub uv: f64,
}

/// Complete forecast response: where, now, and the following days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub place: Place,
    pub current: CurrentWeather,
    /// Ordered by date; the first entry is today
    pub forecast: Vec<ForecastDay>,
}

impl WeatherReport {
    /// Forecast days after today
    pub fn upcoming(&self) -> &[ForecastDay] {
        self.forecast.get(1..).unwrap_or(&[])
    }
}

/// Location service errors
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Location service unavailable")]
    ServiceUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Other(String),
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Invalid coordinates: {latitude}, {longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },
    #[error("Forecast API returned status {0}")]
    Status(u16),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Geocoding errors
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    #[error("Geocoding API returned status {0}")]
    Status(u16),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    Parse(String),
}
