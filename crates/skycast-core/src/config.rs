use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable that overrides `weather.api_key`.
pub const API_KEY_ENV: &str = "SKYCAST_WEATHER_API_KEY";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Add an error
    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Add a warning
    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a user-friendly message summarizing all errors
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application configuration directory
    pub config_dir: PathBuf,

    /// Forecast API settings
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Geocoding API settings (reverse lookup and search)
    #[serde(default)]
    pub geocoding: GeocodingConfig,

    /// Startup location settings
    #[serde(default)]
    pub location: LocationConfig,

    /// Widget behaviour (map, debounce)
    #[serde(default)]
    pub widget: WidgetConfig,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Forecast API key. Left empty here when provided through the environment.
    #[serde(default)]
    pub api_key: String,

    /// Base URL of the forecast API
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Number of forecast days to request, today included
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
}

fn default_weather_base_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_forecast_days() -> u8 {
    3
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_weather_base_url(),
            forecast_days: default_forecast_days(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Base URL of the Nominatim-compatible geocoding service
    #[serde(default = "default_geocoding_base_url")]
    pub base_url: String,

    /// User-Agent sent with every geocoding request (required by Nominatim)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_geocoding_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

fn default_user_agent() -> String {
    format!("SkyCast/{}", env!("CARGO_PKG_VERSION"))
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_base_url(),
            user_agent: default_user_agent(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    /// Try to detect the device location at startup
    #[serde(default = "default_detect")]
    pub detect: bool,

    /// IP geolocation endpoint
    #[serde(default = "default_geolocation_url")]
    pub geolocation_url: String,

    /// Latitude used when detection fails or is disabled
    #[serde(default = "default_latitude")]
    pub default_latitude: f64,

    /// Longitude used when detection fails or is disabled
    #[serde(default = "default_longitude")]
    pub default_longitude: f64,
}

fn default_detect() -> bool {
    true
}

fn default_geolocation_url() -> String {
    "http://ip-api.com/json".to_string()
}

fn default_latitude() -> f64 {
    51.505
}

fn default_longitude() -> f64 {
    -0.09
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            detect: default_detect(),
            geolocation_url: default_geolocation_url(),
            default_latitude: default_latitude(),
            default_longitude: default_longitude(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Quiet period after the last key release before a search is issued
    #[serde(default = "default_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Zoom level of the map at startup
    #[serde(default = "default_initial_zoom")]
    pub initial_zoom: u8,

    /// Zoom level after a successful search
    #[serde(default = "default_search_zoom")]
    pub search_zoom: u8,

    /// Raster tile URL template for the base layer
    #[serde(default = "default_tile_url")]
    pub tile_url: String,

    /// Attribution required by the tile service
    #[serde(default = "default_tile_attribution")]
    pub tile_attribution: String,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_initial_zoom() -> u8 {
    2
}

fn default_search_zoom() -> u8 {
    10
}

fn default_tile_url() -> String {
    "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string()
}

fn default_tile_attribution() -> String {
    "© OpenStreetMap contributors".to_string()
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            search_debounce_ms: default_debounce_ms(),
            initial_zoom: default_initial_zoom(),
            search_zoom: default_search_zoom(),
            tile_url: default_tile_url(),
            tile_attribution: default_tile_attribution(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("skycast");

        Self {
            config_dir,
            weather: WeatherConfig::default(),
            geocoding: GeocodingConfig::default(),
            location: LocationConfig::default(),
            widget: WidgetConfig::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, creating it if it doesn't exist
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from `path`, writing defaults there if the file is missing
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path).context("Failed to read config file")?;

        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Forecast API key, preferring the environment over the config file.
    pub fn weather_api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .or_else(|| {
                let key = self.weather.api_key.trim();
                (!key.is_empty()).then(|| key.to_string())
            })
    }

    /// Validate the configuration
    ///
    /// Returns a ValidationResult containing any errors or warnings.
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        self.validate_url(&self.weather.base_url, "weather.base_url", &mut result);
        self.validate_url(&self.geocoding.base_url, "geocoding.base_url", &mut result);
        if self.location.detect {
            self.validate_url(
                &self.location.geolocation_url,
                "location.geolocation_url",
                &mut result,
            );
        }

        if self.weather_api_key().is_none() {
            result.add_warning(
                "weather.api_key",
                format!("No forecast API key configured (set {API_KEY_ENV})"),
            );
        }

        if self.weather.forecast_days == 0 {
            result.add_error("weather.forecast_days", "Must request at least one day");
        } else if self.weather.forecast_days == 1 {
            result.add_warning(
                "weather.forecast_days",
                "Only today is requested; no forecast days will be shown",
            );
        }

        if self.geocoding.user_agent.trim().is_empty() {
            result.add_error("geocoding.user_agent", "User agent must not be empty");
        }

        if !(-90.0..=90.0).contains(&self.location.default_latitude) {
            result.add_error(
                "location.default_latitude",
                "Latitude must be within [-90, 90]",
            );
        }
        if !(-180.0..=180.0).contains(&self.location.default_longitude) {
            result.add_error(
                "location.default_longitude",
                "Longitude must be within [-180, 180]",
            );
        }

        if self.widget.search_debounce_ms == 0 {
            result.add_warning(
                "widget.search_debounce_ms",
                "Search debounce disabled (0 ms); every key release issues a request",
            );
        }

        if self.widget.initial_zoom > 19 || self.widget.search_zoom > 19 {
            result.add_warning("widget", "Zoom levels above 19 are not served by most tile services");
        }

        if self.http.timeout_secs == 0 {
            result.add_error("http.timeout_secs", "Timeout must be greater than 0");
        }

        result
    }

    /// Validate a URL field
    fn validate_url(&self, url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}
