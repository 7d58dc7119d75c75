use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A point on Earth. Wire names follow the upstream `coord` object.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lon")]
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub main: String,
    pub description: String,
    /// Upstream icon code, e.g. `01d`. See [`crate::icon::WeatherIcon`].
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurements {
    pub temp: f64,
    pub humidity: u8,
    pub temp_min: f64,
    pub temp_max: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feels_like: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deg: Option<u16>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cloudiness {
    /// Cloud cover in percent.
    pub all: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    /// Absent for points over open water.
    #[serde(default)]
    pub country: String,
    pub sunrise: i64,
    pub sunset: i64,
}

/// One complete weather observation, shaped like the upstream
/// current-weather response so the same type serves as wire format and
/// cache record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coord: Option<Coordinates>,
    pub weather: Vec<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<String>,
    pub main: Measurements,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visibility: Option<u32>,
    pub wind: Wind,
    #[serde(default)]
    pub clouds: Cloudiness,
    /// Observation time, unix seconds.
    #[serde(default)]
    pub dt: i64,
    pub sys: SunTimes,
    /// Shift from UTC in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub name: String,
    #[serde(default, deserialize_with = "status_code")]
    pub cod: u16,
}

impl WeatherSnapshot {
    /// The first reported condition; upstream orders them by relevance.
    pub fn primary_condition(&self) -> Option<&Condition> {
        self.weather.first()
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        if self.dt == 0 {
            return None;
        }
        DateTime::from_timestamp(self.dt, 0)
    }

    pub fn sunrise(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sys.sunrise, 0)
    }

    pub fn sunset(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.sys.sunset, 0)
    }
}

#[cfg(test)]
pub(crate) fn sample(name: &str, temp: f64) -> WeatherSnapshot {
    WeatherSnapshot {
        coord: Some(Coordinates::new(44.34, 10.99)),
        weather: vec![Condition {
            main: "Clear".into(),
            description: "clear sky".into(),
            icon: "01d".into(),
        }],
        base: Some("stations".into()),
        main: Measurements {
            temp,
            humidity: 40,
            temp_min: 24.0,
            temp_max: 27.0,
            feels_like: Some(25.9),
            pressure: Some(1015),
        },
        visibility: Some(10_000),
        wind: Wind { speed: 3.1, deg: Some(120) },
        clouds: Cloudiness { all: 12 },
        dt: 1_600_020_000,
        sys: SunTimes { country: "IT".into(), sunrise: 1_600_000_000, sunset: 1_600_040_000 },
        timezone: Some(7200),
        id: Some(3_171_457),
        name: name.into(),
        cod: 200,
    }
}

/// Upstream sends `cod` as a number on success but as a string on some
/// error bodies.
fn status_code<'de, D>(deserializer: D) -> Result<u16, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(u16),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Number(n) => Ok(n),
        Repr::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
