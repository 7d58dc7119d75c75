use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt};

/// Measurement system requested from the weather API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
    /// Kelvin and metres per second.
    Standard,
}

impl Units {
    pub fn as_str(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
            Units::Standard => "standard",
        }
    }

    pub const fn all() -> &'static [Units] {
        &[Units::Metric, Units::Imperial, Units::Standard]
    }

    pub fn temperature_label(&self) -> &'static str {
        match self {
            Units::Metric => CELSIUS,
            Units::Imperial => FAHRENHEIT,
            Units::Standard => KELVIN,
        }
    }

    pub fn speed_label(&self) -> &'static str {
        match self {
            Units::Imperial => "mph",
            Units::Metric | Units::Standard => "m/s",
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Units {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.to_lowercase().as_str() {
            "metric" => Ok(Units::Metric),
            "imperial" => Ok(Units::Imperial),
            "standard" => Ok(Units::Standard),
            _ => Err(anyhow::anyhow!(
                "Unknown units '{value}'. Supported units: metric, imperial, standard."
            )),
        }
    }
}

pub const CELSIUS: &str = "°C";
pub const FAHRENHEIT: &str = "°F";
pub const KELVIN: &str = "K";

/// How the temperature suffix shown next to a reading is chosen.
///
/// `FromRegion` (the default) picks the suffix from the viewer's locale
/// region and ignores the requested units, so a metric reading can be
/// labelled `°F`. `FromUnits` ties the label to the request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum UnitLabelPolicy {
    FromRegion { fahrenheit_regions: Vec<String> },
    FromUnits,
}

impl Default for UnitLabelPolicy {
    fn default() -> Self {
        UnitLabelPolicy::FromRegion {
            fahrenheit_regions: ["US", "LR", "MM"].iter().map(|r| r.to_string()).collect(),
        }
    }
}

impl UnitLabelPolicy {
    /// Temperature suffix for a reading requested in `units` and viewed from
    /// `region` (ISO 3166 alpha-2, if known).
    pub fn temperature_label(&self, units: Units, region: Option<&str>) -> &'static str {
        match self {
            UnitLabelPolicy::FromUnits => units.temperature_label(),
            UnitLabelPolicy::FromRegion { fahrenheit_regions } => {
                let fahrenheit = region.is_some_and(|r| {
                    fahrenheit_regions.iter().any(|f| f.eq_ignore_ascii_case(r))
                });
                if fahrenheit { FAHRENHEIT } else { CELSIUS }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn units_as_str_roundtrip() {
        for units in Units::all() {
            let parsed = Units::try_from(units.as_str()).expect("roundtrip should succeed");
            assert_eq!(*units, parsed);
        }
    }

    #[test]
    fn unknown_units_error() {
        let err = Units::try_from("furlongs").unwrap_err();
        assert!(err.to_string().contains("Unknown units"));
    }

    #[test]
    fn region_policy_labels_listed_regions_fahrenheit() {
        let policy = UnitLabelPolicy::default();

        assert_eq!(policy.temperature_label(Units::Metric, Some("US")), FAHRENHEIT);
        assert_eq!(policy.temperature_label(Units::Metric, Some("mm")), FAHRENHEIT);
        assert_eq!(policy.temperature_label(Units::Metric, Some("IT")), CELSIUS);
        assert_eq!(policy.temperature_label(Units::Imperial, None), CELSIUS);
    }

    #[test]
    fn units_policy_follows_request() {
        let policy = UnitLabelPolicy::FromUnits;

        assert_eq!(policy.temperature_label(Units::Imperial, Some("IT")), FAHRENHEIT);
        assert_eq!(policy.temperature_label(Units::Metric, Some("US")), CELSIUS);
        assert_eq!(policy.temperature_label(Units::Standard, None), KELVIN);
    }

    #[test]
    fn custom_region_list_replaces_default() {
        let policy = UnitLabelPolicy::FromRegion { fahrenheit_regions: vec!["BS".into()] };

        assert_eq!(policy.temperature_label(Units::Metric, Some("BS")), FAHRENHEIT);
        assert_eq!(policy.temperature_label(Units::Metric, Some("US")), CELSIUS);
    }
}
