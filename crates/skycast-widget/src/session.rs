//! The widget session: one per page, owning the map, the results panel and
//! the request bookkeeping. UI events call into it; results flow out through
//! the `WidgetSurface`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use skycast_core::{AppError, Config};
use skycast_weather::{resolve_location, Coordinate, Geocoder, LocationSource, WeatherProvider};

use crate::debounce::Debouncer;
use crate::error_mapping;
use crate::generation::{RequestClass, RequestGenerations, Ticket};
use crate::map_view::{MapView, TileLayer, ViewState};
use crate::render::ResultsPanel;
use crate::surface::WidgetSurface;

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Used when the device location is unavailable
    pub default_location: Coordinate,
    pub initial_zoom: u8,
    pub search_zoom: u8,
    pub search_debounce: Duration,
    pub tiles: TileLayer,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_location: Coordinate::new(51.505, -0.09),
            initial_zoom: 2,
            search_zoom: 10,
            search_debounce: Duration::from_millis(500),
            tiles: TileLayer::default(),
        }
    }
}

impl From<&Config> for SessionConfig {
    fn from(config: &Config) -> Self {
        Self {
            default_location: Coordinate::new(
                config.location.default_latitude,
                config.location.default_longitude,
            ),
            initial_zoom: config.widget.initial_zoom,
            search_zoom: config.widget.search_zoom,
            search_debounce: Duration::from_millis(config.widget.search_debounce_ms),
            tiles: TileLayer {
                url_template: config.widget.tile_url.clone(),
                attribution: config.widget.tile_attribution.clone(),
            },
        }
    }
}

/// How a failure changes the results panel
#[derive(Debug, Clone, Copy)]
enum Placement {
    /// The failed lookup was the panel's content
    Replace,
    /// Secondary lookup; keep what is shown
    Notice,
}

/// Keeps the loading indicator visible while any request is in flight
struct LoadingGuard<'a> {
    session: &'a WidgetSession,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if self.session.in_flight.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.session.surface.set_loading(false);
        }
    }
}

pub struct WidgetSession {
    config: SessionConfig,
    weather: WeatherProvider,
    geocoder: Geocoder,
    surface: Arc<dyn WidgetSurface>,
    map: Mutex<Option<MapView>>,
    results: Mutex<ResultsPanel>,
    generations: RequestGenerations,
    in_flight: AtomicUsize,
    debouncer: Debouncer,
}

impl WidgetSession {
    pub fn new(
        config: SessionConfig,
        weather: WeatherProvider,
        geocoder: Geocoder,
        surface: Arc<dyn WidgetSurface>,
    ) -> Arc<Self> {
        let debouncer = Debouncer::new(config.search_debounce);
        Arc::new(Self {
            config,
            weather,
            geocoder,
            surface,
            map: Mutex::new(None),
            results: Mutex::new(ResultsPanel::new()),
            generations: RequestGenerations::new(),
            in_flight: AtomicUsize::new(0),
            debouncer,
        })
    }

    /// Build the lookups from application config
    pub fn from_config(config: &Config, surface: Arc<dyn WidgetSurface>) -> anyhow::Result<Arc<Self>> {
        let timeout = Duration::from_secs(config.http.timeout_secs);

        let api_key = config.weather_api_key().unwrap_or_else(|| {
            tracing::warn!("No forecast API key configured; weather lookups will be rejected");
            String::new()
        });
        let weather = WeatherProvider::new(api_key, timeout)?
            .with_base_url(config.weather.base_url.as_str())
            .with_days(config.weather.forecast_days);
        let geocoder = Geocoder::with_user_agent(&config.geocoding.user_agent, timeout)?
            .with_base_url(config.geocoding.base_url.as_str());

        Ok(Self::new(SessionConfig::from(config), weather, geocoder, surface))
    }

    /// Current map state, `None` before the map is shown
    pub fn map_view(&self) -> Option<ViewState> {
        self.map.lock().as_ref().map(|map| map.view().clone())
    }

    pub fn markers_created(&self) -> usize {
        self.map.lock().as_ref().map_or(0, MapView::markers_created)
    }

    /// Page load: find the device, show the map there and look up its weather
    /// and place name concurrently. Falls back to the default location.
    pub async fn start(&self, source: &dyn LocationSource) -> Coordinate {
        let selection = self.generations.begin(RequestClass::Selection);
        let resolved = resolve_location(source, self.config.default_location).await;
        let at = resolved.coordinate();
        if resolved.is_fallback() {
            tracing::info!("Starting at the default location {}", at);
        }

        if !self.still_current(selection) {
            return at;
        }
        self.init_map(at);
        tokio::join!(
            self.weather_for(at, selection),
            self.reverse_for(at, selection)
        );
        at
    }

    /// Show the map centered on `center` at the initial zoom
    pub fn init_map(&self, center: Coordinate) {
        self.show_location(center, self.config.initial_zoom);
    }

    /// Click on the map: move the marker there, then weather, then place name.
    pub async fn on_map_click(&self, at: Coordinate) {
        let selection = {
            let mut map = self.map.lock();
            match map.as_mut() {
                Some(existing) => {
                    existing.click(at);
                    self.surface.map_changed(existing.view());
                    self.generations.begin(RequestClass::Selection)
                }
                None => {
                    tracing::warn!("Map clicked before it was shown; ignoring");
                    return;
                }
            }
        };

        if self.weather_for(at, selection).await {
            self.reverse_for(at, selection).await;
        }
    }

    /// Key released in the search box. The search runs once typing has paused
    /// for the debounce delay, with the text the box held at this release.
    pub fn on_search_keyup(self: &Arc<Self>) {
        let query = self.surface.search_value().trim().to_string();
        let session: Weak<Self> = Arc::downgrade(self);

        self.debouncer.trigger(async move {
            if query.is_empty() {
                tracing::debug!("Search box is empty; nothing to look up");
                return;
            }
            if let Some(session) = session.upgrade() {
                session.search(&query).await;
            }
        });
    }

    /// Wait for the latest debounced search and its lookups to finish
    pub async fn search_settled(&self) {
        self.debouncer.settled().await;
    }

    /// Resolve `query` to a place, move the map there and look it up.
    pub async fn search(&self, query: &str) {
        let selection = self.generations.begin(RequestClass::Selection);
        let ticket = self.generations.begin(RequestClass::Search);

        let result = {
            let _loading = self.loading();
            self.geocoder.search(query).await
        };

        if !self.still_current(ticket) || !self.still_current(selection) {
            return;
        }

        match result {
            Ok(Some(at)) => {
                self.show_location(at, self.config.search_zoom);
                if self.weather_for(at, selection).await {
                    self.reverse_for(at, selection).await;
                }
            }
            Ok(None) => {
                self.fail(error_mapping::search_no_match(query), Placement::Replace);
            }
            Err(e) => {
                tracing::error!("Error in search for {:?}: {}", query, e);
                self.fail(error_mapping::search_failure(e), Placement::Replace);
            }
        }
    }

    /// Fetch and render the forecast for `at` as part of the current selection.
    ///
    /// Returns false when a newer request made the result stale.
    pub async fn fetch_weather(&self, at: Coordinate) -> bool {
        let selection = self.generations.current(RequestClass::Selection);
        self.weather_for(at, selection).await
    }

    /// Put the place name for `at` into the search box.
    pub async fn reverse_geocode(&self, at: Coordinate) {
        let selection = self.generations.current(RequestClass::Selection);
        self.reverse_for(at, selection).await;
    }

    async fn weather_for(&self, at: Coordinate, selection: Ticket) -> bool {
        let ticket = self.generations.begin(RequestClass::Weather);

        if let Err(e) = at.validate() {
            tracing::error!("{}", e);
            self.fail(error_mapping::weather_failure(e), Placement::Replace);
            return true;
        }

        let result = {
            let _loading = self.loading();
            self.weather.forecast(at).await
        };

        if !self.still_current(ticket) || !self.still_current(selection) {
            return false;
        }

        match result {
            Ok(report) => {
                let mut results = self.results.lock();
                results.show_report(&report);
                self.surface.replace_results(&results.render());
            }
            Err(e) => {
                tracing::error!("Error fetching weather data for {}: {}", at, e);
                self.fail(error_mapping::weather_failure(e), Placement::Replace);
            }
        }
        true
    }

    async fn reverse_for(&self, at: Coordinate, selection: Ticket) {
        let ticket = self.generations.begin(RequestClass::ReverseGeocode);

        let result = {
            let _loading = self.loading();
            self.geocoder.reverse_geocode(at).await
        };

        if !self.still_current(ticket) || !self.still_current(selection) {
            return;
        }

        match result {
            Ok(Some(name)) => self.surface.set_search_value(&name),
            Ok(None) => tracing::debug!("No place name for {}; search box unchanged", at),
            Err(e) => {
                tracing::error!("Error in reverse geocode for {}: {}", at, e);
                self.fail(error_mapping::reverse_failure(e), Placement::Notice);
            }
        }
    }

    /// Recenter on `at` and move the marker there, creating the map if needed
    fn show_location(&self, at: Coordinate, zoom: u8) {
        let mut map = self.map.lock();
        match map.as_mut() {
            Some(existing) => {
                existing.set_view(at, zoom);
                existing.place_marker(at);
                self.surface.map_changed(existing.view());
            }
            None => {
                let created = MapView::new(at, zoom, self.config.tiles.clone());
                self.surface.map_created(created.tiles());
                self.surface.map_changed(created.view());
                *map = Some(created);
            }
        }
    }

    fn fail(&self, error: AppError, placement: Placement) {
        tracing::debug!("Showing failure: {}", error);
        let mut results = self.results.lock();
        match placement {
            Placement::Replace => results.show_error(error.user_message()),
            Placement::Notice => results.show_notice(error.user_message()),
        }
        self.surface.replace_results(&results.render());
    }

    fn still_current(&self, ticket: Ticket) -> bool {
        let current = self.generations.is_current(ticket);
        if !current {
            tracing::debug!(
                "Discarding stale {} response (generation {}, latest {})",
                ticket.class.as_str(),
                ticket.generation,
                self.generations.latest(ticket.class)
            );
        }
        current
    }

    fn loading(&self) -> LoadingGuard<'_> {
        if self.in_flight.fetch_add(1, Ordering::SeqCst) == 0 {
            self.surface.set_loading(true);
        }
        LoadingGuard { session: self }
    }
}
