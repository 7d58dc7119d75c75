//! Full retrieval cycle against a mock OpenWeather server.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use geoweather_core::{
    CacheStore, Capabilities, Coordinates, CycleOutcome, LocationError, LocationPriority,
    LocationService, NetworkMonitor, Notice, Orchestrator, Permission, PermissionNegotiator,
    PermissionReport, Render, SnapshotSource, Trigger, Units, WeatherSnapshot, WeatherUi,
    provider::openweather::OpenWeatherProvider,
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Parma;

#[async_trait]
impl LocationService for Parma {
    fn is_location_service_enabled(&self) -> bool {
        true
    }

    async fn request_current_location(
        &self,
        _priority: LocationPriority,
    ) -> Result<Coordinates, LocationError> {
        Ok(Coordinates::new(44.34, 10.99))
    }
}

struct Granted;

#[async_trait]
impl PermissionNegotiator for Granted {
    async fn request_permissions(&self, required: &[Permission]) -> PermissionReport {
        PermissionReport::all_granted(required)
    }
}

struct Online;

impl NetworkMonitor for Online {
    fn is_network_available(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct Screen {
    loading: AtomicUsize,
    loaded: AtomicUsize,
    rendered: Mutex<Vec<(WeatherSnapshot, SnapshotSource)>>,
}

impl WeatherUi for Screen {
    fn show_loading(&self) {
        self.loading.fetch_add(1, Ordering::SeqCst);
    }

    fn hide_loading(&self) {
        self.loaded.fetch_add(1, Ordering::SeqCst);
    }

    fn render(&self, render: Render<'_>) {
        if let Render::Snapshot { snapshot, source } = render {
            self.rendered.lock().unwrap().push((snapshot.clone(), source));
        }
    }

    fn notify(&self, notice: Notice) {
        panic!("unexpected notice: {notice:?}");
    }
}

fn parma_body() -> serde_json::Value {
    serde_json::json!({
        "weather": [{"main": "Clear", "description": "clear sky", "icon": "01d"}],
        "main": {"temp": 25.5, "humidity": 40, "temp_min": 24.0, "temp_max": 27.0},
        "wind": {"speed": 3.1},
        "sys": {"country": "IT", "sunrise": 1600000000, "sunset": 1600040000},
        "name": "Parma",
        "cod": 200
    })
}

#[tokio::test]
async fn parma_cycle_reaches_success_and_caches_snapshot() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .and(query_param("lat", "44.34"))
        .and(query_param("lon", "10.99"))
        .and(query_param("units", "metric"))
        .and(query_param("appid", "TEST_KEY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(parma_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = CacheStore::new(dir.path());
    let screen = Arc::new(Screen::default());

    let caps = Capabilities {
        location: Arc::new(Parma),
        permissions: Arc::new(Granted),
        network: Arc::new(Online),
    };
    let provider = Arc::new(OpenWeatherProvider::with_base_url("TEST_KEY".into(), &server.uri()));
    let orchestrator =
        Orchestrator::new(caps, provider, cache.clone(), screen.clone()).with_units(Units::Metric);

    let outcome = orchestrator.run_cycle(Trigger::Start).await;

    assert!(matches!(outcome, CycleOutcome::Success), "got {outcome:?}");

    let expected: WeatherSnapshot = serde_json::from_value(parma_body()).unwrap();
    assert_eq!(expected.weather[0].main, "Clear");
    assert_eq!(cache.load(), Some(expected.clone()));

    let rendered = screen.rendered.lock().unwrap();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0], (expected, SnapshotSource::Network));

    assert_eq!(screen.loading.load(Ordering::SeqCst), 1);
    assert_eq!(screen.loaded.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn cached_snapshot_survives_a_server_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(200).set_body_json(parma_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/weather"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = CacheStore::new(dir.path());
    let screen = Arc::new(Screen::default());
    let caps = Capabilities {
        location: Arc::new(Parma),
        permissions: Arc::new(Granted),
        network: Arc::new(Online),
    };
    let provider = Arc::new(OpenWeatherProvider::with_base_url("TEST_KEY".into(), &server.uri()));
    let orchestrator = Orchestrator::new(caps, provider, cache.clone(), screen.clone());

    assert!(matches!(orchestrator.run_cycle(Trigger::Start).await, CycleOutcome::Success));
    let outcome = orchestrator.run_cycle(Trigger::Refresh).await;

    assert!(matches!(outcome, CycleOutcome::CachedFallback(_)), "got {outcome:?}");
    assert_eq!(cache.load().map(|s| s.name), Some("Parma".to_string()));
    assert_eq!(screen.rendered.lock().unwrap().len(), 1);
    assert_eq!(screen.loading.load(Ordering::SeqCst), 2);
    assert_eq!(screen.loaded.load(Ordering::SeqCst), 2);
}
