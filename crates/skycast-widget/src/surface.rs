//! The page elements the widget reads and writes.
//!
//! A browser host maps these onto the `search` input, the `loading` indicator,
//! the `forecast` results container and the `map` element. `MemorySurface`
//! keeps the same state in memory.

use parking_lot::Mutex;

use crate::map_view::{TileLayer, ViewState};

pub trait WidgetSurface: Send + Sync {
    /// Show or hide the loading indicator
    fn set_loading(&self, visible: bool);

    /// Current text of the search input
    fn search_value(&self) -> String;

    /// Overwrite the search input
    fn set_search_value(&self, value: &str);

    /// Replace the whole results container with `markup`
    fn replace_results(&self, markup: &str);

    /// The map was first shown; `tiles` is the base layer and its attribution
    fn map_created(&self, tiles: &TileLayer);

    /// The map viewport or marker moved
    fn map_changed(&self, view: &ViewState);
}

/// Point-in-time copy of a `MemorySurface`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SurfaceSnapshot {
    pub loading: bool,
    pub search: String,
    pub results: String,
    pub map: Option<ViewState>,
    pub tiles: Option<TileLayer>,
    /// Number of times the results container was replaced
    pub result_writes: usize,
    /// Number of times the loading indicator was shown
    pub loading_shown: usize,
}

#[derive(Debug, Default)]
pub struct MemorySurface {
    state: Mutex<SurfaceSnapshot>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> SurfaceSnapshot {
        self.state.lock().clone()
    }

    pub fn results(&self) -> String {
        self.state.lock().results.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }
}

impl WidgetSurface for MemorySurface {
    fn set_loading(&self, visible: bool) {
        let mut state = self.state.lock();
        if visible && !state.loading {
            state.loading_shown += 1;
        }
        state.loading = visible;
    }

    fn search_value(&self) -> String {
        self.state.lock().search.clone()
    }

    fn set_search_value(&self, value: &str) {
        self.state.lock().search = value.to_string();
    }

    fn replace_results(&self, markup: &str) {
        let mut state = self.state.lock();
        state.results = markup.to_string();
        state.result_writes += 1;
    }

    fn map_created(&self, tiles: &TileLayer) {
        self.state.lock().tiles = Some(tiles.clone());
    }

    fn map_changed(&self, view: &ViewState) {
        self.state.lock().map = Some(view.clone());
    }
}
