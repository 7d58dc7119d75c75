use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{model::Coordinates, units::{UnitLabelPolicy, Units}};

/// Upstream API credentials and request options.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiConfig {
    pub api_key: Option<String>,

    /// Override for the OpenWeather base URL, mostly useful for testing.
    pub base_url: Option<String>,

    #[serde(default)]
    pub units: Units,
}

/// How the host answers a location permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionPolicy {
    /// Ask interactively on every attempt.
    #[default]
    Prompt,
    Allow,
    /// Treated as a permanent denial.
    Deny,
}

impl PermissionPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PermissionPolicy::Prompt => "prompt",
            PermissionPolicy::Allow => "allow",
            PermissionPolicy::Deny => "deny",
        }
    }

    pub const fn all() -> &'static [PermissionPolicy] {
        &[PermissionPolicy::Prompt, PermissionPolicy::Allow, PermissionPolicy::Deny]
    }
}

impl std::fmt::Display for PermissionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where this machine is, since desktops rarely have a positioning service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub enabled: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default)]
    pub permission: PermissionPolicy,
}

impl LocationConfig {
    pub fn coordinates(&self) -> Option<Coordinates> {
        Some(Coordinates::new(self.latitude?, self.longitude?))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub unit_label: UnitLabelPolicy,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [api]
/// api_key = "..."
/// units = "metric"
///
/// [location]
/// enabled = true
/// latitude = 44.34
/// longitude = 10.99
/// permission = "prompt"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Directory holding the cached snapshot. Defaults to the platform cache dir.
    pub cache_dir: Option<PathBuf>,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub location: LocationConfig,

    #[serde(default)]
    pub display: DisplayConfig,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "geoweather", "geoweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory of the snapshot cache: `cache_dir` if set, else the platform cache dir.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.cache_dir().to_path_buf()),
        }
    }

    /// Returns the API key, if one is set and not blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api.api_key = Some(api_key);
    }

    /// Record a fixed position and switch the location source on.
    pub fn set_location(&mut self, coordinates: Coordinates) {
        self.location.latitude = Some(coordinates.latitude);
        self.location.longitude = Some(coordinates.longitude);
        self.location.enabled = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let cfg = Config::from_toml("").unwrap();

        assert!(cfg.api_key().is_none());
        assert_eq!(cfg.api.units, Units::Metric);
        assert!(!cfg.location.enabled);
        assert_eq!(cfg.location.permission, PermissionPolicy::Prompt);
        assert_eq!(cfg.display.unit_label, UnitLabelPolicy::default());
    }

    #[test]
    fn parses_full_file() {
        let cfg = Config::from_toml(
            r#"
            cache_dir = "/tmp/geoweather"

            [api]
            api_key = "OPEN_KEY"
            units = "imperial"

            [location]
            enabled = true
            latitude = 44.34
            longitude = 10.99
            permission = "allow"

            [display.unit_label]
            policy = "from_units"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.api_key(), Some("OPEN_KEY"));
        assert_eq!(cfg.api.units, Units::Imperial);
        assert_eq!(cfg.location.coordinates(), Some(Coordinates::new(44.34, 10.99)));
        assert_eq!(cfg.location.permission, PermissionPolicy::Allow);
        assert_eq!(cfg.display.unit_label, UnitLabelPolicy::FromUnits);
        assert_eq!(cfg.cache_dir().unwrap(), PathBuf::from("/tmp/geoweather"));
    }

    #[test]
    fn region_list_is_configurable() {
        let cfg = Config::from_toml(
            r#"
            [display.unit_label]
            policy = "from_region"
            fahrenheit_regions = ["US", "KY"]
            "#,
        )
        .unwrap();

        assert_eq!(
            cfg.display.unit_label,
            UnitLabelPolicy::FromRegion { fahrenheit_regions: vec!["US".into(), "KY".into()] }
        );
    }

    #[test]
    fn set_location_enables_source() {
        let mut cfg = Config::default();
        assert!(cfg.location.coordinates().is_none());

        cfg.set_location(Coordinates::new(-33.87, 151.21));

        assert!(cfg.location.enabled);
        assert_eq!(cfg.location.coordinates(), Some(Coordinates::new(-33.87, 151.21)));
    }

    #[test]
    fn toml_roundtrip_keeps_settings() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.set_location(Coordinates::new(44.34, 10.99));
        cfg.location.permission = PermissionPolicy::Deny;

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = Config::from_toml(&text).unwrap();

        assert_eq!(back.api_key(), Some("KEY"));
        assert_eq!(back.location.permission, PermissionPolicy::Deny);
        assert_eq!(back.location.coordinates(), Some(Coordinates::new(44.34, 10.99)));
    }
}
