use std::{sync::Arc, time::Duration};

use anyhow::{Context, ensure};
use clap::{Parser, Subcommand};
use geoweather_core::{
    CacheStore, Capabilities, Config, Coordinates, CycleOutcome, Orchestrator, PermissionPolicy,
    Render, RetrievalError, SnapshotSource, SysfsNetworkMonitor, Trigger, Units, WeatherProvider,
    WeatherUi, provider_from_config,
};
use inquire::{Confirm, CustomType, Password, Select};

use crate::{
    platform::{ConfiguredLocation, PromptPermissions},
    render::{TerminalUi, locale_region},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "geoweather", version, about = "Current weather for where you are")]
pub struct Cli {
    /// Log pipeline steps to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively edit part of the configuration.
    Configure {
        #[command(subcommand)]
        section: Section,
    },

    /// Fetch and show the weather for the configured location.
    Show {
        /// Override the configured units (metric, imperial, standard).
        #[arg(long, value_parser = parse_units)]
        units: Option<Units>,

        /// Keep refreshing every SECS seconds until interrupted.
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Show the last cached weather without going online.
    Cached,

    /// Delete the cached weather.
    ClearCache,
}

#[derive(Debug, Subcommand)]
pub enum Section {
    /// OpenWeather API key and units.
    Api,
    /// Position, location source and permission policy.
    Location,
}

fn parse_units(value: &str) -> Result<Units, String> {
    Units::try_from(value).map_err(|e| e.to_string())
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { section: Section::Api } => configure_api(),
            Command::Configure { section: Section::Location } => configure_location(),
            Command::Show { units, watch } => show(units, watch).await,
            Command::Cached => show_cached(),
            Command::ClearCache => clear_cache(),
        }
    }
}

fn configure_api() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    ensure!(!api_key.trim().is_empty(), "API key must not be empty");

    let start = Units::all().iter().position(|u| *u == config.api.units).unwrap_or(0);
    let units = Select::new("Units:", Units::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read units")?;

    config.set_api_key(api_key.trim().to_string());
    config.api.units = units;
    config.save()?;

    println!("Saved API settings to {}", Config::config_file_path()?.display());
    Ok(())
}

fn configure_location() -> anyhow::Result<()> {
    let mut config = Config::load()?;

    let latitude = CustomType::<f64>::new("Latitude:")
        .with_error_message("Please type a decimal number, e.g. 44.34")
        .prompt()
        .context("Failed to read latitude")?;
    let longitude = CustomType::<f64>::new("Longitude:")
        .with_error_message("Please type a decimal number, e.g. 10.99")
        .prompt()
        .context("Failed to read longitude")?;

    let coordinates = Coordinates::new(latitude, longitude);
    ensure!(
        coordinates.is_valid(),
        "Coordinates out of range: latitude must be within ±90, longitude within ±180"
    );

    let enabled = Confirm::new("Enable the location source?")
        .with_default(true)
        .prompt()
        .context("Failed to read location source setting")?;

    let start = PermissionPolicy::all()
        .iter()
        .position(|p| *p == config.location.permission)
        .unwrap_or(0);
    let permission = Select::new("Location permission:", PermissionPolicy::all().to_vec())
        .with_starting_cursor(start)
        .prompt()
        .context("Failed to read permission policy")?;

    config.set_location(coordinates);
    config.location.enabled = enabled;
    config.location.permission = permission;
    config.save()?;

    println!("Saved location settings to {}", Config::config_file_path()?.display());
    Ok(())
}

fn terminal_ui(config: &Config, units: Units) -> Arc<TerminalUi> {
    Arc::new(TerminalUi::new(config.display.unit_label.clone(), units, locale_region()))
}

fn build_orchestrator(config: &Config, units: Units) -> anyhow::Result<Orchestrator> {
    let weather: Arc<dyn WeatherProvider> = provider_from_config(config)?.into();

    let caps = Capabilities {
        location: Arc::new(ConfiguredLocation::from_config(&config.location)),
        permissions: Arc::new(PromptPermissions::new(config.location.permission)),
        network: Arc::new(SysfsNetworkMonitor::default()),
    };
    let cache = CacheStore::new(config.cache_dir()?);

    Ok(Orchestrator::new(caps, weather, cache, terminal_ui(config, units)).with_units(units))
}

async fn show(units: Option<Units>, watch: Option<u64>) -> anyhow::Result<()> {
    let config = Config::load()?;
    let units = units.unwrap_or(config.api.units);
    let orchestrator = build_orchestrator(&config, units)?;

    let outcome = orchestrator.run_cycle(Trigger::Start).await;
    if matches!(outcome, CycleOutcome::CachedFallback(_)) && !rendered_by_cycle(&outcome) {
        // Nothing is on screen yet in a fresh process.
        orchestrator.render_cached();
    }

    let Some(secs) = watch else {
        return Ok(());
    };
    let period = Duration::from_secs(secs.max(1));

    let orchestrator = &orchestrator;
    refresh_until(period, interrupted(), move || async move {
        println!();
        orchestrator.run_cycle(Trigger::Refresh).await;
    })
    .await;

    Ok(())
}

async fn interrupted() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Run `refresh` every `period` until `stop` resolves, including while a
/// refresh is still in flight.
async fn refresh_until<S, F, Fut>(period: Duration, stop: S, mut refresh: F)
where
    S: Future<Output = ()>,
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    tokio::pin!(stop);

    loop {
        tokio::select! {
            _ = &mut stop => return,
            _ = tokio::time::sleep(period) => {}
        }
        tokio::select! {
            _ = &mut stop => return,
            _ = refresh() => {}
        }
    }
}

/// Offline cycles already rendered the cache themselves.
fn rendered_by_cycle(outcome: &CycleOutcome) -> bool {
    matches!(outcome.error(), Some(RetrievalError::NoConnectivity))
}

fn show_cached() -> anyhow::Result<()> {
    let config = Config::load()?;
    let cache = CacheStore::new(config.cache_dir()?);
    let ui = terminal_ui(&config, config.api.units);

    match cache.load() {
        Some(snapshot) => {
            ui.render(Render::Snapshot { snapshot: &snapshot, source: SnapshotSource::Cache })
        }
        None => ui.render(Render::NoData),
    }

    Ok(())
}

fn clear_cache() -> anyhow::Result<()> {
    let config = Config::load()?;
    let cache = CacheStore::new(config.cache_dir()?);

    cache
        .clear()
        .with_context(|| format!("Failed to clear cache at {}", cache.path().display()))?;

    println!("Cleared cached weather at {}", cache.path().display());
    Ok(())
}
