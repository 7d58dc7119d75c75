use serde::{Deserialize, Serialize};

/// Artwork shown for an upstream icon code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherIcon {
    Sunny,
    Cloud,
    Rain,
    Storm,
    Snowflake,
    /// Codes without artwork, e.g. mist (`50d`).
    Unknown,
}

impl WeatherIcon {
    /// Night variants reuse day artwork loosely: clear night shows a cloud
    /// and a night storm shows rain.
    pub fn from_code(code: &str) -> Self {
        match code {
            "01d" => WeatherIcon::Sunny,
            "02d" | "03d" | "04d" | "04n" | "01n" | "02n" | "03n" | "10n" => WeatherIcon::Cloud,
            "10d" | "11n" => WeatherIcon::Rain,
            "11d" => WeatherIcon::Storm,
            "13d" | "13n" => WeatherIcon::Snowflake,
            _ => WeatherIcon::Unknown,
        }
    }

    /// Asset identifier the front-end resolves to an image.
    pub fn asset_name(&self) -> &'static str {
        match self {
            WeatherIcon::Sunny => "sunny",
            WeatherIcon::Cloud => "cloud",
            WeatherIcon::Rain => "rain",
            WeatherIcon::Storm => "storm",
            WeatherIcon::Snowflake => "snowflake",
            WeatherIcon::Unknown => "unknown",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            WeatherIcon::Sunny => "☀",
            WeatherIcon::Cloud => "☁",
            WeatherIcon::Rain => "🌧",
            WeatherIcon::Storm => "⛈",
            WeatherIcon::Snowflake => "❄",
            WeatherIcon::Unknown => "?",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_codes() {
        assert_eq!(WeatherIcon::from_code("01d"), WeatherIcon::Sunny);
        assert_eq!(WeatherIcon::from_code("03d"), WeatherIcon::Cloud);
        assert_eq!(WeatherIcon::from_code("10d"), WeatherIcon::Rain);
        assert_eq!(WeatherIcon::from_code("11d"), WeatherIcon::Storm);
        assert_eq!(WeatherIcon::from_code("13d"), WeatherIcon::Snowflake);
    }

    #[test]
    fn night_codes_follow_legacy_artwork() {
        assert_eq!(WeatherIcon::from_code("01n"), WeatherIcon::Cloud);
        assert_eq!(WeatherIcon::from_code("10n"), WeatherIcon::Cloud);
        assert_eq!(WeatherIcon::from_code("11n"), WeatherIcon::Rain);
        assert_eq!(WeatherIcon::from_code("13n"), WeatherIcon::Snowflake);
    }

    #[test]
    fn unmapped_codes_fall_back_to_unknown() {
        assert_eq!(WeatherIcon::from_code("50d"), WeatherIcon::Unknown);
        assert_eq!(WeatherIcon::from_code("09n"), WeatherIcon::Unknown);
        assert_eq!(WeatherIcon::from_code(""), WeatherIcon::Unknown);
        assert_eq!(WeatherIcon::Unknown.asset_name(), "unknown");
    }
}
