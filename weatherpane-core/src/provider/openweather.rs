use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::{
    error::{FetchError, WeatherError},
    model::{Condition, Coordinates, WeatherSnapshot},
};

use super::WeatherClient;

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    endpoint: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String) -> Self {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(api_key: String, endpoint: impl Into<String>) -> Self {
        Self {
            api_key,
            endpoint: endpoint.into(),
            http: Client::new(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn request(&self, coordinates: Coordinates) -> Result<WeatherSnapshot, FetchError> {
        let lat = coordinates.lat().to_string();
        let lon = coordinates.lon().to_string();

        let res = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("lat", lat.as_str()),
                ("lon", lon.as_str()),
                ("APPID", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;

        if !status.is_success() {
            return Err(FetchError::from_status(status, &body));
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        let main = parsed
            .weather
            .into_iter()
            .next()
            .map(|w| w.main)
            .ok_or(FetchError::MissingCondition)?;

        Ok(WeatherSnapshot {
            city: parsed.name,
            coordinates,
            temperature_celsius: parsed.main.temp,
            condition: Condition::from_provider(&main),
            description: main,
            observed_at_epoch_seconds: parsed.dt,
        })
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    main: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: i64,
    main: OwMain,
    weather: Vec<OwWeather>,
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn fetch_current(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherSnapshot, WeatherError> {
        debug!(%coordinates, endpoint = %self.endpoint, "requesting current weather");

        let snapshot = self.request(coordinates).await?;

        info!(
            city = %snapshot.city,
            temperature = snapshot.temperature_celsius,
            condition = %snapshot.description,
            "current weather received"
        );
        Ok(snapshot)
    }
}
