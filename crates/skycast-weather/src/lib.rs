//! Weather lookups for SkyCast
//!
//! Forecasts from WeatherAPI.com, place names and place search from Nominatim
//! (OpenStreetMap), and startup location detection.

pub mod types;
pub mod geocode;
pub mod location;
pub mod provider;

pub use types::*;
pub use geocode::Geocoder;
pub use location::{resolve_location, FixedLocation, IpLocator, LocationSource, ResolvedLocation, Unsupported};
pub use provider::WeatherProvider;
