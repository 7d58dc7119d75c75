//! Core library for the `geoweather` client.
//!
//! This crate defines:
//! - The weather snapshot model and its single-slot cache
//! - Capability traits for location, permissions and connectivity
//! - The OpenWeather client and its error classification
//! - The retrieval orchestrator tying them together
//! - Configuration, icon and unit-label mapping for front-ends
//!
//! It is used by `geoweather-cli`, but can also be reused by other front-ends.

pub mod cache;
pub mod config;
pub mod error;
pub mod icon;
pub mod location;
pub mod model;
pub mod network;
pub mod orchestrator;
pub mod provider;
pub mod units;

pub use cache::CacheStore;
pub use config::{Config, PermissionPolicy};
pub use error::{ApiError, CacheError, LocationError, RetrievalError};
pub use icon::WeatherIcon;
pub use location::{
    LocationPriority, LocationService, Permission, PermissionNegotiator, PermissionOutcome,
    PermissionReport, PermissionState,
};
pub use model::{Coordinates, WeatherSnapshot};
pub use network::{NetworkMonitor, SysfsNetworkMonitor};
pub use orchestrator::{
    Capabilities, CycleOutcome, CycleState, Notice, Orchestrator, Render, SettingsTarget,
    SnapshotSource, Trigger, WeatherUi,
};
pub use provider::{WeatherProvider, provider_from_config};
pub use units::{UnitLabelPolicy, Units};
