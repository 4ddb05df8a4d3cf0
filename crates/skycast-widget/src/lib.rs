//! The SkyCast widget: map view, search box and results panel wired to the
//! weather and geocoding lookups.

pub mod debounce;
pub mod error_mapping;
pub mod generation;
pub mod map_view;
pub mod render;
pub mod session;
pub mod surface;

pub use debounce::Debouncer;
pub use generation::{RequestClass, RequestGenerations, Ticket};
pub use map_view::{MapView, TileLayer, ViewState};
pub use render::ResultsPanel;
pub use session::{SessionConfig, WidgetSession};
pub use surface::{MemorySurface, SurfaceSnapshot, WidgetSurface};
