use skycast_core::{AppError, ReqwestErrorExt, WeatherError};
use skycast_weather::WeatherError as LookupError;

pub fn weather_failure(e: LookupError) -> AppError {
    match e {
        LookupError::InvalidCoordinate {
            latitude,
            longitude,
        } => AppError::Weather(WeatherError::InvalidCoordinate {
            latitude,
            longitude,
        }),
        LookupError::Status(401) | LookupError::Status(403) => {
            AppError::Weather(WeatherError::InvalidApiKey)
        }
        LookupError::Status(status) => {
            AppError::Weather(WeatherError::LocationNotFound(format!("status {status}")))
        }
        LookupError::Network(e) => {
            AppError::Weather(WeatherError::Unavailable(e.into_network_error().to_string()))
        }
        LookupError::Parse(msg) => AppError::Weather(WeatherError::Unavailable(msg)),
    }
}
