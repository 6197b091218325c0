//! Thin wrappers around the external data sources.
//!
//! Each client exposes one fetch operation that returns the raw payload of its
//! API. Turning payloads into domain records is the stores' job.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use std::{fmt::Debug, sync::Arc};

use crate::Config;

pub mod apilayer;
pub mod newsapi;
pub mod openweather;
pub mod restcountries;

use apilayer::{ApiLayerRatesClient, RatesPayload};
use newsapi::{NewsApiClient, NewsPayload};
use openweather::{OpenWeatherClient, WeatherPayload};
use restcountries::{CountryPayload, RestCountriesClient};

/// Providers that need an API key. restcountries is open and has no entry here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    OpenWeather,
    NewsApi,
    ApiLayer,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "openweather",
            ProviderId::NewsApi => "newsapi",
            ProviderId::ApiLayer => "apilayer",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::OpenWeather, ProviderId::NewsApi, ProviderId::ApiLayer]
    }

    /// Environment variable that overrides the configured key.
    pub fn env_var(&self) -> &'static str {
        match self {
            ProviderId::OpenWeather => "API_KEY_OPENWEATHER",
            ProviderId::NewsApi => "API_KEY_NEWSAPI",
            ProviderId::ApiLayer => "API_KEY_APILAYER",
        }
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "openweather" => Ok(ProviderId::OpenWeather),
            "newsapi" => Ok(ProviderId::NewsApi),
            "apilayer" => Ok(ProviderId::ApiLayer),
            _ => Err(anyhow!(
                "Unknown provider '{value}'. Supported providers: openweather, newsapi, apilayer."
            )),
        }
    }
}

#[async_trait]
pub trait WeatherClient: Send + Sync + Debug {
    async fn fetch_weather(&self, capital: &str) -> Result<WeatherPayload>;
}

#[async_trait]
pub trait NewsClient: Send + Sync + Debug {
    async fn fetch_news(&self, query: &str) -> Result<NewsPayload>;
}

#[async_trait]
pub trait CurrencyClient: Send + Sync + Debug {
    async fn fetch_rates(&self, base: &str) -> Result<RatesPayload>;
}

#[async_trait]
pub trait CountryClient: Send + Sync + Debug {
    async fn fetch_countries(&self) -> Result<Vec<CountryPayload>>;
}

/// The four clients a reader needs, built from one config.
#[derive(Debug, Clone)]
pub struct Clients {
    pub weather: Arc<dyn WeatherClient>,
    pub news: Arc<dyn NewsClient>,
    pub currency: Arc<dyn CurrencyClient>,
    pub countries: Arc<dyn CountryClient>,
}

/// Shared HTTP client with the configured request timeout.
pub fn http_client(config: &Config) -> Result<Client> {
    Client::builder()
        .timeout(config.http_timeout())
        .build()
        .context("Failed to build HTTP client")
}

impl Clients {
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = http_client(config)?;

        Ok(Self {
            weather: Arc::new(OpenWeatherClient::new(
                config.require_api_key(ProviderId::OpenWeather)?.to_owned(),
                http.clone(),
            )),
            news: Arc::new(NewsApiClient::new(
                config.require_api_key(ProviderId::NewsApi)?.to_owned(),
                config.news_count(),
                http.clone(),
            )),
            currency: Arc::new(ApiLayerRatesClient::new(
                config.require_api_key(ProviderId::ApiLayer)?.to_owned(),
                http.clone(),
            )),
            countries: Arc::new(RestCountriesClient::new(http)),
        })
    }

    /// The country list client alone; it needs no API key.
    pub fn country_client(config: &Config) -> Result<Arc<dyn CountryClient>> {
        Ok(Arc::new(RestCountriesClient::new(http_client(config)?)))
    }
}

/// Sends `request`, checks the status and parses the body as JSON.
pub(crate) async fn get_json<T: DeserializeOwned>(request: RequestBuilder, api: &str) -> Result<T> {
    let res = request
        .send()
        .await
        .with_context(|| format!("Failed to send request to {api}"))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .with_context(|| format!("Failed to read {api} response body"))?;

    if !status.is_success() {
        return Err(anyhow!(
            "{api} request failed with status {}: {}",
            status,
            truncate_body(&body),
        ));
    }

    serde_json::from_str(&body).with_context(|| format!("Failed to parse {api} JSON"))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
