//! Map viewport and the single location marker.
//!
//! Tiles are drawn by the host's mapping library; this type only tracks what
//! it should show.

use skycast_weather::Coordinate;

/// Raster base layer the host map draws
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    /// URL template with `{s}`, `{z}`, `{x}`, `{y}` placeholders
    pub url_template: String,
    pub attribution: String,
}

impl Default for TileLayer {
    fn default() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub center: Coordinate,
    pub zoom: u8,
    pub marker: Option<Coordinate>,
}

#[derive(Debug, Clone)]
pub struct MapView {
    view: ViewState,
    tiles: TileLayer,
    markers_created: usize,
    marker_moves: usize,
}

impl MapView {
    /// Map centered on `center` with a marker placed there
    pub fn new(center: Coordinate, zoom: u8, tiles: TileLayer) -> Self {
        let mut map = Self {
            view: ViewState {
                center,
                zoom,
                marker: None,
            },
            tiles,
            markers_created: 0,
            marker_moves: 0,
        };
        map.place_marker(center);
        map
    }

    /// A click anywhere on the map puts the marker there. The viewport stays put.
    pub fn click(&mut self, at: Coordinate) -> Coordinate {
        self.place_marker(at);
        at
    }

    /// Recenter the viewport
    pub fn set_view(&mut self, center: Coordinate, zoom: u8) {
        self.view.center = center;
        self.view.zoom = zoom;
    }

    /// Move the marker, creating it only if there is none yet
    pub fn place_marker(&mut self, at: Coordinate) {
        match self.view.marker.as_mut() {
            Some(marker) => {
                *marker = at;
                self.marker_moves += 1;
            }
            None => {
                self.view.marker = Some(at);
                self.markers_created += 1;
            }
        }
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn tiles(&self) -> &TileLayer {
        &self.tiles
    }

    pub fn markers_created(&self) -> usize {
        self.markers_created
    }

    pub fn marker_moves(&self) -> usize {
        self.marker_moves
    }
}
