pub mod app;
pub mod config;
pub mod error;

pub use app::App;
pub use config::{
    Config, GeocodingConfig, HttpConfig, LocationConfig, ValidationResult, WeatherConfig,
    WidgetConfig, API_KEY_ENV,
};
pub use error::{AppError, GeocodeError, NetworkError, ReqwestErrorExt, WeatherError};

use anyhow::Result;

/// Initialize the core application
pub fn init() -> Result<()> {
    // Initialize tracing/logging; a subscriber installed by an embedding host wins
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    tracing::info!("SkyCast core initialized");
    Ok(())
}
