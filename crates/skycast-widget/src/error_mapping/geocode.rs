use skycast_core::{AppError, GeocodeError, ReqwestErrorExt};
use skycast_weather::GeocodeError as LookupError;

fn detail(e: LookupError) -> String {
    match e {
        LookupError::Status(status) => format!("status {status}"),
        LookupError::Network(e) => e.into_network_error().to_string(),
        LookupError::Parse(msg) => msg,
    }
}

pub fn search_failure(e: LookupError) -> AppError {
    AppError::Geocode(GeocodeError::SearchFailed(detail(e)))
}

pub fn search_no_match(query: &str) -> AppError {
    AppError::Geocode(GeocodeError::NoMatch(query.to_string()))
}

pub fn reverse_failure(e: LookupError) -> AppError {
    AppError::Geocode(GeocodeError::ReverseFailed(detail(e)))
}
