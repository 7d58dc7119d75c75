use crate::{
    Config,
    error::ApiError,
    model::{Coordinates, WeatherSnapshot},
    provider::openweather::OpenWeatherProvider,
    units::Units,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current conditions for a point.
///
/// One call is one upstream request: implementations never retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn fetch_weather(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<WeatherSnapshot, ApiError>;
}

/// Construct the OpenWeather provider from the `[api]` section.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key().ok_or_else(|| {
        anyhow::anyhow!(
            "No API key configured.\n\
                 Hint: run `geoweather configure api` and enter your OpenWeather API key."
        )
    })?;

    let provider = match config.api.base_url.as_deref() {
        Some(base_url) => OpenWeatherProvider::with_base_url(api_key.to_owned(), base_url),
        None => OpenWeatherProvider::new(api_key.to_owned()),
    };

    Ok(Box::new(provider))
}
