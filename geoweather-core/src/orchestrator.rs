//! The retrieval cycle: location service check, permission negotiation,
//! location fix, connectivity check, weather fetch, cache write, render.
//!
//! Every exit path returns control to the caller with a [`CycleOutcome`];
//! nothing here is fatal. Capability failures become a [`Notice`] for the
//! user, network and API failures are logged and the cached snapshot stays
//! in place.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicU64, Ordering},
};

use tracing::Instrument;

use crate::{
    cache::CacheStore,
    error::RetrievalError,
    location::{LocationPriority, LocationService, Permission, PermissionNegotiator, PermissionOutcome},
    model::WeatherSnapshot,
    network::NetworkMonitor,
    provider::WeatherProvider,
    units::Units,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// App start: full cycle including permission negotiation.
    Start,
    /// Explicit user refresh: re-enters at location acquisition once a
    /// previous cycle obtained permission.
    Refresh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleState {
    Idle,
    CheckingLocationService,
    AwaitingPermission,
    AcquiringLocation,
    FetchingWeather,
    Success,
    CachedFallback,
    Denied,
}

#[derive(Debug)]
pub enum CycleOutcome {
    /// A fresh snapshot was cached and rendered.
    Success,
    /// No fresh data; whatever was cached stays on screen.
    CachedFallback(RetrievalError),
    /// Permission was refused for this cycle.
    Denied(RetrievalError),
    /// Positioning is switched off; the user was pointed at the settings.
    ServiceDisabled,
    /// A newer cycle started while this one was in flight; its result was dropped.
    Superseded,
}

impl CycleOutcome {
    pub fn final_state(&self) -> CycleState {
        match self {
            CycleOutcome::Success => CycleState::Success,
            CycleOutcome::CachedFallback(_) => CycleState::CachedFallback,
            CycleOutcome::Denied(_) => CycleState::Denied,
            CycleOutcome::ServiceDisabled | CycleOutcome::Superseded => CycleState::Idle,
        }
    }

    pub fn error(&self) -> Option<&RetrievalError> {
        match self {
            CycleOutcome::CachedFallback(e) | CycleOutcome::Denied(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotSource {
    Network,
    Cache,
}

/// What the UI should display.
#[derive(Debug, Clone, Copy)]
pub enum Render<'a> {
    Snapshot { snapshot: &'a WeatherSnapshot, source: SnapshotSource },
    NoData,
}

/// System settings page a notice can deep-link to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsTarget {
    LocationSources,
    AppPermissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    LocationServiceDisabled,
    PermissionPermanentlyDenied,
    /// Offer the permission settings or cancel; never re-prompt on its own.
    PermissionRationale,
    NoInternet,
}

impl Notice {
    pub fn message(&self) -> &'static str {
        match self {
            Notice::LocationServiceDisabled => RetrievalError::ServiceDisabled.user_message(),
            Notice::PermissionPermanentlyDenied => {
                RetrievalError::PermissionPermanentlyDenied.user_message()
            }
            Notice::PermissionRationale => RetrievalError::PermissionRationaleNeeded.user_message(),
            Notice::NoInternet => RetrievalError::NoConnectivity.user_message(),
        }
    }

    pub fn settings(&self) -> Option<SettingsTarget> {
        match self {
            Notice::LocationServiceDisabled => Some(SettingsTarget::LocationSources),
            Notice::PermissionPermanentlyDenied | Notice::PermissionRationale => {
                Some(SettingsTarget::AppPermissions)
            }
            Notice::NoInternet => None,
        }
    }
}

/// The presentation collaborator.
pub trait WeatherUi: Send + Sync {
    fn show_loading(&self);
    fn hide_loading(&self);
    fn render(&self, render: Render<'_>);
    fn notify(&self, notice: Notice);
}

/// Platform services the cycle depends on.
#[derive(Clone)]
pub struct Capabilities {
    pub location: Arc<dyn LocationService>,
    pub permissions: Arc<dyn PermissionNegotiator>,
    pub network: Arc<dyn NetworkMonitor>,
}

/// Shows the loading indicator on creation and hides it exactly once on drop.
struct LoadingGuard<'a> {
    ui: &'a dyn WeatherUi,
}

impl<'a> LoadingGuard<'a> {
    fn show(ui: &'a dyn WeatherUi) -> Self {
        ui.show_loading();
        Self { ui }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.ui.hide_loading();
    }
}

pub struct Orchestrator {
    caps: Capabilities,
    weather: Arc<dyn WeatherProvider>,
    cache: CacheStore,
    ui: Arc<dyn WeatherUi>,
    units: Units,
    priority: LocationPriority,
    latest_cycle: AtomicU64,
    permission_granted: AtomicBool,
}

impl Orchestrator {
    pub fn new(
        caps: Capabilities,
        weather: Arc<dyn WeatherProvider>,
        cache: CacheStore,
        ui: Arc<dyn WeatherUi>,
    ) -> Self {
        Self {
            caps,
            weather,
            cache,
            ui,
            units: Units::default(),
            priority: LocationPriority::default(),
            latest_cycle: AtomicU64::new(0),
            permission_granted: AtomicBool::new(false),
        }
    }

    pub fn with_units(mut self, units: Units) -> Self {
        self.units = units;
        self
    }

    pub fn with_priority(mut self, priority: LocationPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn units(&self) -> Units {
        self.units
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// Render the cached snapshot, or "no data" when nothing usable is cached.
    /// Returns whether a snapshot was shown.
    pub fn render_cached(&self) -> bool {
        match self.cache.load() {
            Some(snapshot) => {
                self.ui.render(Render::Snapshot { snapshot: &snapshot, source: SnapshotSource::Cache });
                true
            }
            None => {
                self.ui.render(Render::NoData);
                false
            }
        }
    }

    /// Run one retrieval cycle to completion.
    pub async fn run_cycle(&self, trigger: Trigger) -> CycleOutcome {
        let id = self.latest_cycle.fetch_add(1, Ordering::SeqCst) + 1;
        let span = tracing::info_span!("cycle", id, ?trigger);

        async {
            let outcome = self.drive(id, trigger).await;
            tracing::debug!(state = ?outcome.final_state(), "cycle finished");
            if let Some(e) = outcome.error() {
                tracing::info!(error = %e, "cycle ended without fresh data");
            }
            outcome
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, id: u64, trigger: Trigger) -> CycleOutcome {
        enter(CycleState::CheckingLocationService);
        if !self.caps.location.is_location_service_enabled() {
            tracing::warn!("location service disabled");
            self.ui.notify(Notice::LocationServiceDisabled);
            self.render_cached();
            return CycleOutcome::ServiceDisabled;
        }

        let skip_negotiation =
            trigger == Trigger::Refresh && self.permission_granted.load(Ordering::SeqCst);

        if !skip_negotiation {
            enter(CycleState::AwaitingPermission);
            if let Err(outcome) = self.negotiate_permissions().await {
                return outcome;
            }
        }

        enter(CycleState::AcquiringLocation);
        let coordinates = match self.caps.location.request_current_location(self.priority).await {
            Ok(coordinates) => coordinates,
            Err(e) => {
                tracing::warn!(error = %e, "no location fix");
                return CycleOutcome::CachedFallback(e.into());
            }
        };
        tracing::debug!(%coordinates, "location fix");

        enter(CycleState::FetchingWeather);
        if !self.caps.network.is_network_available() {
            tracing::warn!("no network connectivity, showing cached weather");
            self.ui.notify(Notice::NoInternet);
            self.render_cached();
            return CycleOutcome::CachedFallback(RetrievalError::NoConnectivity);
        }

        let result = {
            let _loading = LoadingGuard::show(self.ui.as_ref());
            self.weather.fetch_weather(coordinates, self.units).await
        };

        if self.latest_cycle.load(Ordering::SeqCst) != id {
            tracing::info!("newer cycle started, discarding response");
            return CycleOutcome::Superseded;
        }

        match result {
            Ok(snapshot) => {
                if let Err(e) = self.cache.save(&snapshot) {
                    tracing::error!(error = %e, "failed to cache weather snapshot");
                }
                self.ui.render(Render::Snapshot { snapshot: &snapshot, source: SnapshotSource::Network });
                enter(CycleState::Success);
                CycleOutcome::Success
            }
            Err(e) => {
                tracing::error!(error = %e, "weather request failed, keeping cached data");
                enter(CycleState::CachedFallback);
                CycleOutcome::CachedFallback(e.into())
            }
        }
    }

    async fn negotiate_permissions(&self) -> Result<(), CycleOutcome> {
        let report = self.caps.permissions.request_permissions(Permission::LOCATION).await;
        tracing::debug!(state = ?report.state(), "permission report");

        let (notice, error) = match report.outcome(Permission::LOCATION) {
            PermissionOutcome::Granted => {
                self.permission_granted.store(true, Ordering::SeqCst);
                return Ok(());
            }
            PermissionOutcome::PermanentlyDenied => (
                Notice::PermissionPermanentlyDenied,
                RetrievalError::PermissionPermanentlyDenied,
            ),
            PermissionOutcome::RationaleNeeded => {
                (Notice::PermissionRationale, RetrievalError::PermissionRationaleNeeded)
            }
        };

        self.permission_granted.store(false, Ordering::SeqCst);
        tracing::warn!(error = %error, "location permission not granted");
        enter(CycleState::Denied);
        self.ui.notify(notice);
        self.render_cached();
        Err(CycleOutcome::Denied(error))
    }
}

fn enter(state: CycleState) {
    tracing::debug!(?state, "cycle state");
}
