use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, BTreeSet},
    hash::{Hash, Hasher},
};

/// Spoken language of a country, e.g. `Russian (Русский)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Language {
    pub name: String,
    pub native_name: String,
}

/// Canonical country record. Identity is the alpha-2 code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub alpha2code: String,
    pub name: String,
    pub capital: String,
    pub subregion: String,
    pub population: u64,
    pub area: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub alt_spellings: Vec<String>,
    pub timezones: Vec<String>,
    pub currencies: BTreeSet<String>,
    pub languages: BTreeSet<Language>,
    pub flag: Option<String>,
}

impl Country {
    /// Lookup key for the per-location caches (weather, news).
    pub fn location(&self) -> Location {
        Location::new(self.capital.clone(), self.alpha2code.clone())
    }
}

/// Capital + country code. Capital comparison ignores case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub capital: String,
    pub alpha2code: String,
}

impl Location {
    pub fn new(capital: impl Into<String>, alpha2code: impl Into<String>) -> Self {
        Self { capital: capital.into(), alpha2code: alpha2code.into() }
    }

    /// Stable, filesystem-safe key, e.g. `ru_moscow`.
    pub fn cache_key(&self) -> String {
        let capital: String = self
            .capital
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();

        format!("{}_{}", self.alpha2code.to_lowercase(), capital)
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.alpha2code == other.alpha2code
            && self.capital.to_lowercase() == other.capital.to_lowercase()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alpha2code.hash(state);
        self.capital.to_lowercase().hash(state);
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.capital, self.alpha2code)
    }
}

/// Current weather in a capital.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherRecord {
    /// Offset from UTC in hours.
    pub timezone: f64,
    pub temp: f64,
    pub pressure: u32,
    pub humidity: u8,
    pub wind_speed: f64,
    pub visibility: Option<u32>,
    pub description: String,
    pub observed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub source: String,
    pub title: String,
    pub url: String,
    pub url_to_image: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub published_at: DateTime<Utc>,
}

/// Global exchange rate table for one base currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRateTable {
    pub base: String,
    pub rates: BTreeMap<String, f64>,
}

impl CurrencyRateTable {
    /// Rates for `codes` only; codes without a rate are skipped.
    pub fn restrict_to<'a>(
        &self,
        codes: impl IntoIterator<Item = &'a String>,
    ) -> BTreeMap<String, f64> {
        codes
            .into_iter()
            .filter_map(|code| self.rates.get(code).map(|rate| (code.clone(), *rate)))
            .collect()
    }
}

/// Composite record assembled for a single `find` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub location: Country,
    pub weather: WeatherRecord,
    pub news: Vec<NewsItem>,
    pub currency_rates: BTreeMap<String, f64>,
}
