use std::{collections::HashSet, sync::Arc};

use crate::{
    catalog::CountryCatalog,
    error::ReaderError,
    model::{Country, Location, LocationInfo, NewsItem, WeatherRecord},
    store::{CurrencyRatesStore, NewsStore, Stores, WeatherStore},
};

/// Answers country queries from the catalog and the per-source stores.
#[derive(Debug, Clone)]
pub struct Reader {
    catalog: Arc<CountryCatalog>,
    weather: WeatherStore,
    news: NewsStore,
    currency: CurrencyRatesStore,
}

impl Reader {
    pub fn new(
        catalog: Arc<CountryCatalog>,
        weather: WeatherStore,
        news: NewsStore,
        currency: CurrencyRatesStore,
    ) -> Self {
        Self { catalog, weather, news, currency }
    }

    pub fn from_stores(catalog: Arc<CountryCatalog>, stores: Stores) -> Self {
        Self::new(catalog, stores.weather, stores.news, stores.currency)
    }

    pub fn find_country(&self, name: &str) -> Option<&Country> {
        self.catalog.resolve(name)
    }

    /// Weather for `location`, fetching it first if the cache has nothing fresh.
    pub async fn get_weather(&self, location: &Location) -> Result<WeatherRecord, ReaderError> {
        let collected = self.weather.collect(&HashSet::from([location.clone()])).await;

        self.weather.read(location).await.ok_or_else(|| ReaderError::WeatherUnavailable {
            location: location.clone(),
            cause: collected.err(),
        })
    }

    /// News for `location`; empty when the source has none or cannot be reached.
    pub async fn get_news(&self, location: &Location) -> Vec<NewsItem> {
        if let Err(e) = self.news.collect(&HashSet::from([location.clone()])).await {
            tracing::debug!(%location, error = %e, "news collect failed");
        }
        self.news.read(location).await.unwrap_or_default()
    }

    /// Builds the composite record for a country name.
    ///
    /// An unknown name is `Ok(None)`. Weather is required; news and currency
    /// rates degrade to empty when their sources fail.
    #[tracing::instrument(skip(self))]
    pub async fn find(&self, name: &str) -> Result<Option<LocationInfo>, ReaderError> {
        let Some(country) = self.catalog.resolve(name) else {
            tracing::info!("country not found");
            return Ok(None);
        };

        let location = country.location();
        let locations = HashSet::from([location.clone()]);

        let (weather_collected, news_collected, rates_collected) = tokio::join!(
            self.weather.collect(&locations),
            self.news.collect(&locations),
            self.currency.collect(),
        );

        let (weather, news, rates) = tokio::join!(
            self.weather.read(&location),
            self.news.read(&location),
            self.currency.read(),
        );

        let weather = weather.ok_or_else(|| ReaderError::WeatherUnavailable {
            location: location.clone(),
            cause: weather_collected.err(),
        })?;

        let news = match news {
            Some(items) => items,
            None => {
                if news_collected.is_err() {
                    tracing::warn!(%location, "news unavailable, continuing without it");
                }
                Vec::new()
            }
        };

        let currency_rates = match rates {
            Some(table) => table.restrict_to(&country.currencies),
            None => {
                if rates_collected.is_err() {
                    tracing::warn!("currency rates unavailable, continuing without them");
                }
                Default::default()
            }
        };

        Ok(Some(LocationInfo { location: country.clone(), weather, news, currency_rates }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Config,
        cache::FreshnessPolicy,
        client::Clients,
        store::fakes::{FakeNews, FakeRates, FakeWeather, russia_clients},
    };
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    async fn reader(dir: &TempDir, clients: Clients) -> Reader {
        let config = Config { cache_dir: Some(dir.path().to_path_buf()), ..Config::default() };
        let stores = Stores::open(&config, &clients, FreshnessPolicy::PresentIsFresh).unwrap();
        let catalog = CountryCatalog::load(&stores.countries).await.unwrap();
        Reader::from_stores(Arc::new(catalog), stores)
    }

    #[tokio::test]
    async fn find_assembles_composite_record() {
        let dir = TempDir::new().unwrap();
        let reader = reader(&dir, russia_clients()).await;

        let info = reader.find("Russia").await.unwrap().expect("Russia is known");

        assert_eq!(info.location.alpha2code, "RU");
        assert_eq!(info.location.capital, "Moscow");
        assert_eq!(info.location.name, "Russian Federation");
        assert_eq!(info.weather.timezone, 3.0);
        assert_eq!(info.news.len(), 3);
        assert_eq!(info.currency_rates, BTreeMap::from([("RUB".to_string(), 1.0)]));
    }

    #[tokio::test]
    async fn currency_rates_are_subset_of_country_currencies() {
        let dir = TempDir::new().unwrap();
        let reader = reader(&dir, russia_clients()).await;

        let info = reader.find("russian federation").await.unwrap().unwrap();
        assert!(info.currency_rates.keys().all(|code| info.location.currencies.contains(code)));
    }

    #[tokio::test]
    async fn unknown_country_is_none_and_fetches_nothing() {
        let dir = TempDir::new().unwrap();
        let weather = Arc::new(FakeWeather::default());
        let clients = Clients { weather: weather.clone(), ..russia_clients() };
        let reader = reader(&dir, clients).await;

        assert!(reader.find("test").await.unwrap().is_none());
        assert!(reader.find_country("test").is_none());
        assert_eq!(weather.calls(), 0);
    }

    #[tokio::test]
    async fn missing_weather_is_an_error_with_cause() {
        let dir = TempDir::new().unwrap();
        let clients = Clients { weather: Arc::new(FakeWeather::default()), ..russia_clients() };
        let reader = reader(&dir, clients).await;

        let err = reader.find("Russia").await.unwrap_err();
        let ReaderError::WeatherUnavailable { location, cause } = err;
        assert_eq!(location, Location::new("Moscow", "RU"));
        assert_eq!(cause.expect("collect failure kept").source_name, "weather");
    }

    #[tokio::test]
    async fn failing_news_and_rates_degrade_to_empty() {
        let dir = TempDir::new().unwrap();
        let clients = Clients {
            news: Arc::new(FakeNews { fail: true, ..FakeNews::default() }),
            currency: Arc::new(FakeRates { fail: true, ..FakeRates::default() }),
            ..russia_clients()
        };
        let reader = reader(&dir, clients).await;

        let info = reader.find("Russia").await.unwrap().unwrap();
        assert!(info.news.is_empty());
        assert!(info.currency_rates.is_empty());
        assert_eq!(info.weather.timezone, 3.0);
    }

    #[tokio::test]
    async fn weather_entry_of_another_shape_is_fetched_again() {
        let dir = TempDir::new().unwrap();
        crate::cache::JsonCache::new(dir.path().join("weather"))
            .put("ru_moscow", &serde_json::json!({ "temp": 1 }))
            .await
            .unwrap();

        let weather = Arc::new(FakeWeather::with([(
            "Moscow",
            crate::store::fakes::weather_payload(10_800, -3.0),
        )]));
        let clients = Clients { weather: weather.clone(), ..russia_clients() };
        let reader = reader(&dir, clients).await;

        let first = reader.find("Russia").await.unwrap().expect("Russia is known");
        assert_eq!(first.weather.temp, -3.0);
        assert_eq!(weather.calls(), 1);

        reader.find("Russia").await.unwrap().expect("served from cache");
        assert_eq!(weather.calls(), 1);
    }

    #[tokio::test]
    async fn get_news_is_empty_when_source_fails() {
        let dir = TempDir::new().unwrap();
        let clients = Clients {
            news: Arc::new(FakeNews { fail: true, ..FakeNews::default() }),
            ..russia_clients()
        };
        let reader = reader(&dir, clients).await;

        assert!(reader.get_news(&Location::new("Moscow", "RU")).await.is_empty());
    }

    #[tokio::test]
    async fn narrow_entry_points_share_the_stores() {
        let dir = TempDir::new().unwrap();
        let reader = reader(&dir, russia_clients()).await;
        let moscow = Location::new("Moscow", "RU");

        let country = reader.find_country("Russia").expect("known country");
        assert_eq!(country.name, "Russian Federation");
        assert_eq!(country.capital, "Moscow");

        let weather = reader.get_weather(&moscow).await.unwrap();
        assert_eq!(weather.timezone, 3.0);

        let news = reader.get_news(&moscow).await;
        assert_eq!(news.len(), 3);

        let unknown = Location::new("Atlantis", "AT");
        assert!(reader.get_weather(&unknown).await.is_err());
        assert!(reader.get_news(&unknown).await.is_empty());
    }
}
