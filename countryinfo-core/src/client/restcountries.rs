use anyhow::Result;
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};

use super::{CountryClient, get_json};

pub const BASE_URL: &str = "https://restcountries.com/v2/all";

const FIELDS: &str = "alpha2Code,name,capital,subregion,population,area,latlng,\
                      altSpellings,timezones,currencies,languages,flag";

#[derive(Debug, Clone)]
pub struct RestCountriesClient {
    http: Client,
}

impl RestCountriesClient {
    pub fn new(http: Client) -> Self {
        Self { http }
    }

    fn request(&self) -> RequestBuilder {
        self.http.get(BASE_URL).query(&[("fields", FIELDS)])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyPayload {
    pub code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePayload {
    pub name: String,
    pub native_name: Option<String>,
}

/// One entry of the restcountries v2 listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountryPayload {
    pub alpha2_code: String,
    pub name: String,
    pub capital: Option<String>,
    pub subregion: Option<String>,
    #[serde(default)]
    pub population: u64,
    pub area: Option<f64>,
    #[serde(default)]
    pub latlng: Vec<f64>,
    #[serde(default)]
    pub alt_spellings: Vec<String>,
    #[serde(default)]
    pub timezones: Vec<String>,
    #[serde(default)]
    pub currencies: Vec<CurrencyPayload>,
    #[serde(default)]
    pub languages: Vec<LanguagePayload>,
    pub flag: Option<String>,
}

#[async_trait]
impl CountryClient for RestCountriesClient {
    async fn fetch_countries(&self) -> Result<Vec<CountryPayload>> {
        get_json(self.request(), "restcountries").await
    }
}
