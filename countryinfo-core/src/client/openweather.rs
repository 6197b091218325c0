use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use super::{WeatherClient, get_json};

pub const BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

#[derive(Debug, Clone)]
pub struct OpenWeatherClient {
    api_key: String,
    http: Client,
}

impl OpenWeatherClient {
    pub fn new(api_key: String, http: Client) -> Self {
        Self { api_key, http }
    }

    fn request(&self, capital: &str) -> RequestBuilder {
        self.http.get(BASE_URL).query(&[
            ("units", "metric"),
            ("q", capital),
            ("appid", self.api_key.as_str()),
        ])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwMain {
    pub temp: f64,
    pub pressure: u32,
    pub humidity: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwWeather {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwWind {
    pub speed: f64,
}

/// Current weather payload as returned by OpenWeather.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherPayload {
    /// Shift from UTC in seconds.
    pub timezone: i64,
    pub dt: i64,
    pub main: OwMain,
    #[serde(default)]
    pub weather: Vec<OwWeather>,
    pub wind: OwWind,
    pub visibility: Option<u32>,
}

#[async_trait]
impl WeatherClient for OpenWeatherClient {
    async fn fetch_weather(&self, capital: &str) -> Result<WeatherPayload> {
        get_json(self.request(capital), "OpenWeather").await
    }
}
