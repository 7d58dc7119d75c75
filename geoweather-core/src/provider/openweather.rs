use async_trait::async_trait;
use reqwest::Client;

use crate::{
    error::ApiError,
    model::{Coordinates, WeatherSnapshot},
    units::Units,
};

use super::WeatherProvider;

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: String, base_url: &str) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    async fn fetch_current(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<WeatherSnapshot, ApiError> {
        let url = format!("{}/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("units", units.as_str().to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(ApiError::TransportFailure)?;

        let status = res.status();
        let body = res.text().await.map_err(ApiError::TransportFailure)?;

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16());
            tracing::error!(%status, body = %truncate_body(&body), "OpenWeather request failed: {err}");
            return Err(err);
        }

        let mut snapshot: WeatherSnapshot = serde_json::from_str(&body)
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        if snapshot.weather.is_empty() {
            return Err(ApiError::MalformedResponse(
                "response contained no weather conditions".to_string(),
            ));
        }

        if snapshot.cod == 0 {
            snapshot.cod = status.as_u16();
        }

        tracing::info!(
            location = %snapshot.name,
            conditions = snapshot.weather.len(),
            "fetched current weather"
        );

        Ok(snapshot)
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_weather(
        &self,
        coordinates: Coordinates,
        units: Units,
    ) -> Result<WeatherSnapshot, ApiError> {
        self.fetch_current(coordinates, units).await
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
