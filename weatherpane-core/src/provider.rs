use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    Config,
    error::WeatherError,
    model::{Coordinates, WeatherSnapshot},
    provider::openweather::OpenWeatherClient,
};

pub mod openweather;

/// One network round trip for the current conditions at a location.
#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_current(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherSnapshot, WeatherError>;
}

#[async_trait]
impl<T: WeatherClient + ?Sized> WeatherClient for std::sync::Arc<T> {
    async fn fetch_current(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherSnapshot, WeatherError> {
        (**self).fetch_current(coordinates).await
    }
}

/// Construct the OpenWeather client from config.
pub fn client_from_config(config: &Config) -> anyhow::Result<OpenWeatherClient> {
    let api_key = config.api_key()?;

    let client = match config.endpoint.as_deref() {
        Some(endpoint) => OpenWeatherClient::with_endpoint(api_key.to_owned(), endpoint),
        None => OpenWeatherClient::new(api_key.to_owned()),
    };

    Ok(client)
}
