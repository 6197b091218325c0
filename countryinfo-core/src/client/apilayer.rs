use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{CurrencyClient, get_json};

pub const BASE_URL: &str = "https://api.apilayer.com/exchangerates_data/latest";

/// Exchange rates from the APILayer exchangerates_data API.
#[derive(Debug, Clone)]
pub struct ApiLayerRatesClient {
    api_key: String,
    http: Client,
}

impl ApiLayerRatesClient {
    pub fn new(api_key: String, http: Client) -> Self {
        Self { api_key, http }
    }

    fn request(&self, base: &str) -> RequestBuilder {
        self.http
            .get(BASE_URL)
            .query(&[("base", base)])
            .header("apikey", self.api_key.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RatesPayload {
    pub base: String,
    pub rates: BTreeMap<String, f64>,
}

#[async_trait]
impl CurrencyClient for ApiLayerRatesClient {
    async fn fetch_rates(&self, base: &str) -> Result<RatesPayload> {
        get_json(self.request(base), "APILayer").await
    }
}
