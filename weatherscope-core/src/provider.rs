use crate::{Config, WeatherError, WeatherSnapshot, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use std::{fmt::Debug, sync::Arc};

pub mod http;
pub mod openweather;

pub use http::{HttpReply, HttpTransport, ReqwestTransport};

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch and normalize current conditions (plus a best-effort forecast) for `city`.
    async fn fetch_weather(&self, city: &str) -> Result<WeatherSnapshot, WeatherError>;
}

/// Construct the OpenWeather provider from config, sharing `transport`.
pub fn provider_from_config(
    config: &Config,
    transport: Arc<dyn HttpTransport>,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.openweather_api_key()?;

    Ok(Box::new(OpenWeatherProvider::new(
        api_key.to_owned(),
        config.weather_base_url.clone(),
        transport,
    )))
}
