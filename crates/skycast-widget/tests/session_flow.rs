//! End-to-end widget flows against a wiremock server standing in for the
//! forecast and geocoding APIs.

use std::sync::Arc;
use std::time::Duration;

use skycast_weather::{Coordinate, FixedLocation, Geocoder, Unsupported, WeatherProvider};
use skycast_widget::{MemorySurface, SessionConfig, WidgetSession, WidgetSurface};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const PARIS: Coordinate = Coordinate::new(48.8566, 2.3522);
const CAIRO: Coordinate = Coordinate::new(30.04, 31.24);
const LONDON: Coordinate = Coordinate::new(51.505, -0.09);

/// Helper to create a forecast.json body
fn forecast_body(name: &str, temp_c: f64, days: usize) -> serde_json::Value {
    let forecastday: Vec<_> = (0..days)
        .map(|i| {
            serde_json::json!({
                "date": format!("2024-12-{:02}", 8 + i),
                "day": {
                    "maxtemp_c": 12.0,
                    "mintemp_c": 3.0,
                    "avghumidity": 81,
                    "uv": 1.0,
                    "condition": { "text": "Cloudy", "icon": "//cdn.weatherapi.com/weather/64x64/day/119.png" }
                }
            })
        })
        .collect();

    serde_json::json!({
        "location": { "name": name, "country": "Somewhere" },
        "current": {
            "last_updated": "2024-12-08 14:30",
            "temp_c": temp_c,
            "condition": { "text": "Sunny", "icon": "//cdn.weatherapi.com/weather/64x64/day/113.png" },
            "feelslike_c": temp_c,
            "humidity": 40,
            "uv": 5.0,
            "pressure_mb": 1011.0,
            "vis_km": 10.0,
            "wind_kph": 9.0,
            "wind_dir": "N",
            "precip_mm": 0.0
        },
        "forecast": { "forecastday": forecastday }
    })
}

fn session_for(server: &MockServer, surface: Arc<MemorySurface>) -> Arc<WidgetSession> {
    let timeout = Duration::from_secs(5);
    let weather = WeatherProvider::new("test-key", timeout)
        .unwrap()
        .with_base_url(server.uri());
    let geocoder = Geocoder::new(timeout).unwrap().with_base_url(server.uri());
    WidgetSession::new(SessionConfig::default(), weather, geocoder, surface)
}

async fn mount_forecast(server: &MockServer, at: Coordinate, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", at.to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_reverse(server: &MockServer, address: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "address": address })),
        )
        .mount(server)
        .await;
}

fn paths(requests: &[Request]) -> Vec<String> {
    requests.iter().map(|r| r.url.path().to_string()).collect()
}

async fn requests_to(server: &MockServer, wanted: &str) -> Vec<Request> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .into_iter()
        .filter(|r| r.url.path() == wanted)
        .collect()
}

#[tokio::test]
async fn test_startup_without_geolocation_uses_default() {
    let server = MockServer::start().await;
    mount_forecast(&server, LONDON, forecast_body("London", 8.0, 3)).await;
    mount_reverse(&server, serde_json::json!({ "city": "London" })).await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());

    let at = session.start(&Unsupported).await;
    assert_eq!(at, LONDON);

    let view = session.map_view().unwrap();
    assert_eq!(view.center, LONDON);
    assert_eq!(view.zoom, 2);
    assert_eq!(view.marker, Some(LONDON));

    let snap = surface.snapshot();
    assert_eq!(snap.search, "London");
    assert!(snap.results.contains("London, Somewhere"));
    assert!(!snap.loading);
    assert_eq!(snap.map, Some(view));
    let tiles = snap.tiles.expect("map creation reports its tile layer");
    assert_eq!(
        tiles.url_template,
        "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png"
    );
    assert_eq!(tiles.attribution, "© OpenStreetMap contributors");
}

#[tokio::test]
async fn test_startup_with_device_location() {
    let server = MockServer::start().await;
    mount_forecast(&server, PARIS, forecast_body("Paris", 11.0, 3)).await;
    mount_reverse(&server, serde_json::json!({ "city": "Paris" })).await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());

    session.start(&FixedLocation(PARIS)).await;

    assert_eq!(session.map_view().unwrap().center, PARIS);
    assert_eq!(surface.search_value(), "Paris");
    assert_eq!(paths(&requests_to(&server, "/forecast.json").await).len(), 1);
    assert_eq!(paths(&requests_to(&server, "/reverse").await).len(), 1);
}

#[tokio::test]
async fn test_click_fetches_weather_then_place_name() {
    let server = MockServer::start().await;
    mount_forecast(&server, LONDON, forecast_body("London", 8.0, 3)).await;
    mount_forecast(&server, PARIS, forecast_body("Paris", 17.3, 3)).await;
    mount_reverse(&server, serde_json::json!({ "town": "Paris" })).await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());
    session.init_map(LONDON);

    session.on_map_click(PARIS).await;

    let requests = server.received_requests().await.unwrap();
    assert_eq!(paths(&requests), vec!["/forecast.json", "/reverse"]);
    let weather_query: Vec<_> = requests[0].url.query_pairs().collect();
    assert!(weather_query
        .iter()
        .any(|(k, v)| k == "q" && v == "48.8566,2.3522"));

    let results = surface.results();
    assert!(results.starts_with("<div class=\"weather-card\">"));
    let first_card_end = results.find("</div>").unwrap();
    assert!(results[..first_card_end].contains("17.3"));
    assert_eq!(surface.search_value(), "Paris");

    let view = session.map_view().unwrap();
    assert_eq!(view.marker, Some(PARIS));
    // Clicking moves the existing marker instead of adding one
    assert_eq!(session.markers_created(), 1);
    assert_eq!(view.center, LONDON);
}

#[tokio::test]
async fn test_forecast_renders_all_but_today() {
    let server = MockServer::start().await;
    mount_forecast(&server, PARIS, forecast_body("Paris", 10.0, 5)).await;
    mount_reverse(&server, serde_json::json!({})).await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());
    session.init_map(PARIS);
    session.fetch_weather(PARIS).await;

    // One current card plus N-1 forecast cards
    assert_eq!(surface.results().matches("weather-card").count(), 1 + 4);
    assert_eq!(surface.snapshot().result_writes, 1);
}

#[tokio::test]
async fn test_reverse_geocode_field_updates() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": { "city": "Paris", "village": "Ignored" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": { "village": "Eyam" }
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": { "country": "Nowhere" }
        })))
        .mount(&server)
        .await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());

    session.reverse_geocode(Coordinate::new(1.0, 0.0)).await;
    assert_eq!(surface.search_value(), "Paris");

    session.reverse_geocode(Coordinate::new(2.0, 0.0)).await;
    assert_eq!(surface.search_value(), "Eyam");

    session.reverse_geocode(Coordinate::new(3.0, 0.0)).await;
    assert_eq!(surface.search_value(), "Eyam");
}

#[tokio::test]
async fn test_invalid_coordinates_issue_no_weather_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("X", 1.0, 3)))
        .expect(0)
        .mount(&server)
        .await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());

    session.fetch_weather(Coordinate::new(95.0, 10.0)).await;
    session.fetch_weather(Coordinate::new(10.0, -190.0)).await;

    let snap = surface.snapshot();
    assert_eq!(snap.loading_shown, 0);
    assert!(snap.results.contains("outside the valid coordinate range"));
}

#[tokio::test]
async fn test_weather_not_found_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(ResponseTemplate::new(400))
        .mount(&server)
        .await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());
    session.fetch_weather(PARIS).await;

    assert_eq!(
        surface.results(),
        "<p class=\"text-danger\">Location not found. Please try again.</p>"
    );
    assert!(!surface.is_loading());
    assert_eq!(surface.snapshot().loading_shown, 1);
}

#[tokio::test]
async fn test_reverse_failure_keeps_weather_and_adds_notice() {
    let server = MockServer::start().await;
    mount_forecast(&server, PARIS, forecast_body("Paris", 12.0, 3)).await;
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let surface = Arc::new(MemorySurface::new());
    surface.set_search_value("typed by user");
    let session = session_for(&server, surface.clone());
    session.init_map(LONDON);

    session.on_map_click(PARIS).await;

    let results = surface.results();
    assert!(results.starts_with("<p class=\"text-danger\">Unable to look up the place name"));
    assert!(results.contains("Paris, Somewhere"));
    assert_eq!(surface.search_value(), "typed by user");
}

#[tokio::test]
async fn test_search_recenters_and_looks_up_in_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Cairo"))
        .and(query_param("limit", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "lat": "30.04", "lon": "31.24" }
        ])))
        .expect(1)
        .mount(&server)
        .await;
    mount_forecast(&server, CAIRO, forecast_body("Cairo", 24.0, 3)).await;
    mount_reverse(&server, serde_json::json!({ "city": "Cairo" })).await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());
    session.init_map(LONDON);

    session.search("Cairo").await;

    let view = session.map_view().unwrap();
    assert_eq!(view.center, CAIRO);
    assert_eq!(view.zoom, 10);
    assert_eq!(view.marker, Some(CAIRO));
    assert_eq!(session.markers_created(), 1);

    let requests = server.received_requests().await.unwrap();
    assert_eq!(paths(&requests), vec!["/search", "/forecast.json", "/reverse"]);
    let reverse_query: Vec<_> = requests[2].url.query_pairs().collect();
    assert!(reverse_query.iter().any(|(k, v)| k == "lat" && v == "30.04"));
    assert!(reverse_query.iter().any(|(k, v)| k == "lon" && v == "31.24"));

    assert!(surface.results().contains("Cairo, Somewhere"));
    assert_eq!(surface.search_value(), "Cairo");
}

#[tokio::test]
async fn test_search_no_result_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());
    session.search("Atlantis").await;

    assert_eq!(
        surface.results(),
        "<p class=\"text-danger\">Location not found. Please try again or try typing the full name.</p>"
    );
    assert!(session.map_view().is_none());
}

#[tokio::test]
async fn test_search_failure_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());
    session.search("Cairo").await;

    assert_eq!(
        surface.results(),
        "<p class=\"text-danger\">Unable to fetch location. Please try again later.</p>"
    );
    assert!(!surface.is_loading());
}

#[tokio::test]
async fn test_stale_search_does_not_overwrite_newer_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Slowtown"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "lat": "48.8566", "lon": "2.3522" }]))
                .set_delay(Duration::from_millis(800)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Cairo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "lat": "30.04", "lon": "31.24" }
        ])))
        .mount(&server)
        .await;
    mount_forecast(&server, CAIRO, forecast_body("Cairo", 24.0, 3)).await;
    mount_forecast(&server, PARIS, forecast_body("Paris", 9.0, 3)).await;
    mount_reverse(&server, serde_json::json!({ "city": "Cairo" })).await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());
    session.init_map(LONDON);

    tokio::join!(session.search("Slowtown"), session.search("Cairo"));

    assert_eq!(session.map_view().unwrap().center, CAIRO);
    assert!(surface.results().contains("Cairo, Somewhere"));
    let forecasts = requests_to(&server, "/forecast.json").await;
    assert_eq!(forecasts.len(), 1);
    assert!(!surface.is_loading());
}

#[tokio::test]
async fn test_keystroke_burst_issues_one_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());

    for typed in ["C", "Ca", "Cai", "Cair", "Cairo"] {
        surface.set_search_value(typed);
        session.on_search_keyup();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    // 400ms after the last key release: still quiet
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(requests_to(&server, "/search").await.is_empty());

    tokio::time::sleep(Duration::from_millis(900)).await;
    let searches = requests_to(&server, "/search").await;
    assert_eq!(searches.len(), 1);
    let query: Vec<_> = searches[0].url.query_pairs().collect();
    assert!(query.iter().any(|(k, v)| k == "q" && v == "Cairo"));
}

#[tokio::test]
async fn test_blank_search_box_issues_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());

    surface.set_search_value("   ");
    session.on_search_keyup();
    surface.set_search_value("");
    session.on_search_keyup();
    tokio::time::sleep(Duration::from_millis(900)).await;

    assert_eq!(surface.snapshot().result_writes, 0);
}

#[tokio::test]
async fn test_search_settled_waits_for_lookups() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "lat": "30.04", "lon": "31.24" }
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body("Cairo", 24.0, 3))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;
    mount_reverse(&server, serde_json::json!({ "city": "Cairo" })).await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());

    surface.set_search_value("Cairo");
    session.on_search_keyup();
    session.search_settled().await;

    assert!(!surface.is_loading());
    assert!(surface.results().contains("Cairo, Somewhere"));
    assert_eq!(requests_to(&server, "/reverse").await.len(), 1);
}

async fn mount_place(server: &MockServer, lat: &str, name: &str) {
    Mock::given(method("GET"))
        .and(path("/reverse"))
        .and(query_param("lat", lat))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "address": { "city": name }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_overlapping_clicks_keep_newest_place_name() {
    let server = MockServer::start().await;
    let first = Coordinate::new(10.0, 10.0);
    let second = Coordinate::new(20.0, 20.0);

    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", first.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(forecast_body("Aville", 5.0, 3))
                .set_delay(Duration::from_millis(600)),
        )
        .mount(&server)
        .await;
    mount_forecast(&server, second, forecast_body("Bville", 15.0, 3)).await;
    mount_place(&server, "10", "Aville").await;
    mount_place(&server, "20", "Bville").await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());
    session.init_map(LONDON);

    tokio::join!(session.on_map_click(first), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.on_map_click(second).await;
    });

    assert_eq!(session.map_view().unwrap().marker, Some(second));
    assert_eq!(surface.search_value(), "Bville");
    assert!(surface.results().contains("Bville, Somewhere"));
    assert!(!surface.results().contains("Aville"));

    // The first click's chain stops at its stale forecast
    let reverse = requests_to(&server, "/reverse").await;
    assert_eq!(reverse.len(), 1);
    assert!(reverse[0].url.query_pairs().any(|(k, v)| k == "lat" && v == "20"));
    assert!(!surface.is_loading());
}

#[tokio::test]
async fn test_click_overrides_slower_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!([{ "lat": "10", "lon": "10" }]))
                .set_delay(Duration::from_millis(600)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/forecast.json"))
        .and(query_param("q", "10,10"))
        .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body("Aville", 5.0, 3)))
        .expect(0)
        .mount(&server)
        .await;
    mount_forecast(&server, PARIS, forecast_body("Paris", 11.0, 3)).await;
    mount_place(&server, "48.8566", "Paris").await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());
    session.init_map(LONDON);

    tokio::join!(session.search("Aville"), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.on_map_click(PARIS).await;
    });

    let view = session.map_view().unwrap();
    assert_eq!(view.marker, Some(PARIS));
    assert_eq!(view.center, LONDON);
    assert!(surface.results().contains("Paris, Somewhere"));
    assert_eq!(surface.search_value(), "Paris");
}

#[tokio::test]
async fn test_failed_slow_search_keeps_clicked_weather() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502).set_delay(Duration::from_millis(600)))
        .mount(&server)
        .await;
    mount_forecast(&server, PARIS, forecast_body("Paris", 11.0, 3)).await;
    mount_place(&server, "48.8566", "Paris").await;

    let surface = Arc::new(MemorySurface::new());
    let session = session_for(&server, surface.clone());
    session.init_map(LONDON);

    tokio::join!(session.search("Nowhere"), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        session.on_map_click(PARIS).await;
    });

    let results = surface.results();
    assert!(results.contains("Paris, Somewhere"));
    assert!(!results.contains("text-danger"));
}
