//! Maps lookup errors to skycast_core::AppError for consistent user-facing messages.
//! Each lookup has its own module to keep mappings small and readable.

mod geocode;
mod weather;

pub use geocode::{reverse_failure, search_failure, search_no_match};
pub use weather::weather_failure;
