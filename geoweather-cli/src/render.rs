//! Terminal front-end: prints snapshots, notices and a loading line.

use std::{
    fmt::Write as _,
    io::Write as _,
    sync::atomic::{AtomicBool, Ordering},
};

use chrono::{DateTime, Local, TimeZone};
use geoweather_core::{
    Notice, Render, SettingsTarget, SnapshotSource, UnitLabelPolicy, Units, WeatherIcon,
    WeatherSnapshot, WeatherUi,
};

pub struct TerminalUi {
    labels: UnitLabelPolicy,
    units: Units,
    region: Option<String>,
    loading: AtomicBool,
}

impl TerminalUi {
    pub fn new(labels: UnitLabelPolicy, units: Units, region: Option<String>) -> Self {
        Self { labels, units, region, loading: AtomicBool::new(false) }
    }

    fn temperature_label(&self) -> &'static str {
        self.labels.temperature_label(self.units, self.region.as_deref())
    }
}

impl WeatherUi for TerminalUi {
    fn show_loading(&self) {
        self.loading.store(true, Ordering::SeqCst);
        eprint!("Fetching current weather...");
        let _ = std::io::stderr().flush();
    }

    fn hide_loading(&self) {
        if self.loading.swap(false, Ordering::SeqCst) {
            // Erase the loading line.
            eprint!("\r\x1b[2K");
            let _ = std::io::stderr().flush();
        }
    }

    fn render(&self, render: Render<'_>) {
        match render {
            Render::Snapshot { snapshot, source } => {
                let text = format_snapshot(
                    snapshot,
                    source,
                    self.temperature_label(),
                    self.units.speed_label(),
                    &Local,
                );
                println!("{text}");
            }
            Render::NoData => println!("No weather data available yet."),
        }
    }

    fn notify(&self, notice: Notice) {
        eprintln!("{}", notice.message());
        if let Some(target) = notice.settings() {
            eprintln!("{}", settings_hint(target));
        }
    }
}

pub fn settings_hint(target: SettingsTarget) -> &'static str {
    match target {
        SettingsTarget::LocationSources => {
            "Hint: run `geoweather configure location` to set and enable your location."
        }
        SettingsTarget::AppPermissions => {
            "Hint: run `geoweather configure location` and set the permission to `allow` or `prompt`."
        }
    }
}

pub fn format_snapshot<Tz: TimeZone>(
    snapshot: &WeatherSnapshot,
    source: SnapshotSource,
    temp_label: &str,
    speed_label: &str,
    tz: &Tz,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();

    let place = if snapshot.sys.country.is_empty() {
        snapshot.name.clone()
    } else {
        format!("{}, {}", snapshot.name, snapshot.sys.country)
    };
    let _ = write!(out, "{place}");
    if source == SnapshotSource::Cache {
        let _ = write!(out, "  (cached)");
    }
    out.push('\n');

    for condition in &snapshot.weather {
        let icon = WeatherIcon::from_code(&condition.icon);
        let _ = writeln!(out, "{} {}: {}", icon.glyph(), condition.main, condition.description);
    }

    let m = &snapshot.main;
    let _ = writeln!(
        out,
        "Temperature  {:.1}{temp_label}  (min {:.1}{temp_label}, max {:.1}{temp_label})",
        m.temp, m.temp_min, m.temp_max
    );
    if let Some(feels_like) = m.feels_like {
        let _ = writeln!(out, "Feels like   {feels_like:.1}{temp_label}");
    }
    let _ = writeln!(out, "Humidity     {} per cent", m.humidity);
    let _ = writeln!(out, "Wind         {:.1} {speed_label}", snapshot.wind.speed);
    let _ = writeln!(out, "Clouds       {}%", snapshot.clouds.all);
    let _ = writeln!(out, "Sunrise      {}", clock(snapshot.sunrise(), tz));
    let _ = write!(out, "Sunset       {}", clock(snapshot.sunset(), tz));

    if let Some(observed) = snapshot.observed_at() {
        let _ = write!(out, "\nObserved     {}", observed.with_timezone(tz).format("%Y-%m-%d %H:%M"));
    }

    out
}

fn clock<Tz: TimeZone>(at: Option<DateTime<chrono::Utc>>, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    match at {
        Some(at) => at.with_timezone(tz).format("%H:%M").to_string(),
        None => "--:--".to_string(),
    }
}

/// ISO region of the user's locale, e.g. `US` from `en_US.UTF-8`.
pub fn region_from_locale(locale: &str) -> Option<String> {
    let tag = locale.split(['.', '@']).next()?;
    let region = tag.split(['_', '-']).nth(1)?;

    if region.len() == 2 && region.chars().all(|c| c.is_ascii_alphabetic()) {
        Some(region.to_ascii_uppercase())
    } else {
        None
    }
}

pub fn locale_region() -> Option<String> {
    ["LC_ALL", "LC_MEASUREMENT", "LANG"]
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .find(|value| !value.is_empty())
        .and_then(|value| region_from_locale(&value))
}
