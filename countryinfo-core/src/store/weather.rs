use chrono::{DateTime, Utc};
use std::{collections::HashSet, sync::Arc};

use super::collect_batch;
use crate::{
    cache::{FreshnessPolicy, JsonCache},
    client::{WeatherClient, openweather::WeatherPayload},
    error::CollectError,
    model::{Location, WeatherRecord},
};

impl From<WeatherPayload> for WeatherRecord {
    fn from(payload: WeatherPayload) -> Self {
        let description = payload
            .weather
            .first()
            .map(|w| w.description.clone())
            .unwrap_or_else(|| "Unknown".to_string());

        WeatherRecord {
            timezone: payload.timezone as f64 / 3600.0,
            temp: payload.main.temp,
            pressure: payload.main.pressure,
            humidity: payload.main.humidity,
            wind_speed: payload.wind.speed,
            visibility: payload.visibility,
            description,
            observed_at: DateTime::<Utc>::from_timestamp(payload.dt, 0).unwrap_or_else(Utc::now),
        }
    }
}

/// Current weather per capital.
#[derive(Debug, Clone)]
pub struct WeatherStore {
    client: Arc<dyn WeatherClient>,
    cache: JsonCache,
    policy: FreshnessPolicy,
}

impl WeatherStore {
    pub fn new(client: Arc<dyn WeatherClient>, cache: JsonCache, policy: FreshnessPolicy) -> Self {
        Self { client, cache, policy }
    }

    pub async fn read(&self, location: &Location) -> Option<WeatherRecord> {
        self.cache.get(&location.cache_key()).await.map(|entry| entry.value)
    }

    #[tracing::instrument(name = "collect_weather", skip_all, fields(locations = locations.len()))]
    pub async fn collect(&self, locations: &HashSet<Location>) -> Result<(), CollectError> {
        let client = &self.client;

        collect_batch(
            "weather",
            &self.cache,
            self.policy,
            locations.iter().cloned(),
            Location::cache_key,
            move |location: Location| async move {
                let payload = client.fetch_weather(&location.capital).await?;
                Ok::<_, anyhow::Error>(WeatherRecord::from(payload))
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fakes::{FakeWeather, weather_payload};
    use tempfile::TempDir;

    fn store(dir: &TempDir, client: Arc<FakeWeather>, policy: FreshnessPolicy) -> WeatherStore {
        WeatherStore::new(client, JsonCache::new(dir.path()), policy)
    }

    #[test]
    fn payload_timezone_is_converted_to_hours() {
        let record = WeatherRecord::from(weather_payload(10_800, 1.5));
        assert_eq!(record.timezone, 3.0);
        assert_eq!(record.description, "light snow");
        assert_eq!(record.observed_at.timestamp(), 1_700_000_000);

        let india = WeatherRecord::from(weather_payload(19_800, 30.0));
        assert_eq!(india.timezone, 5.5);
    }

    #[tokio::test]
    async fn read_before_collect_is_none() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeWeather::with([("Moscow", weather_payload(10_800, -3.0))]));
        let store = store(&dir, client.clone(), FreshnessPolicy::PresentIsFresh);

        assert!(store.read(&Location::new("Moscow", "RU")).await.is_none());
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn collect_then_read_returns_fetched_weather() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeWeather::with([("Moscow", weather_payload(10_800, -3.0))]));
        let store = store(&dir, client.clone(), FreshnessPolicy::PresentIsFresh);
        let moscow = Location::new("Moscow", "RU");

        store.collect(&HashSet::from([moscow.clone()])).await.unwrap();

        let weather = store.read(&moscow).await.expect("weather cached");
        assert_eq!(weather.timezone, 3.0);
        assert_eq!(weather.temp, -3.0);

        // Case-insensitive capital addresses the same entry.
        assert!(store.read(&Location::new("MOSCOW", "RU")).await.is_some());
    }

    #[tokio::test]
    async fn cached_weather_is_not_refetched_until_policy_says_so() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeWeather::with([("Moscow", weather_payload(10_800, -3.0))]));
        let locations = HashSet::from([Location::new("Moscow", "RU")]);

        let cached = store(&dir, client.clone(), FreshnessPolicy::PresentIsFresh);
        cached.collect(&locations).await.unwrap();
        cached.collect(&locations).await.unwrap();
        assert_eq!(client.calls(), 1);

        let forced = store(&dir, client.clone(), FreshnessPolicy::AlwaysStale);
        forced.collect(&locations).await.unwrap();
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn one_failing_capital_keeps_the_rest() {
        let dir = TempDir::new().unwrap();
        let client = Arc::new(FakeWeather::with([
            ("Moscow", weather_payload(10_800, -3.0)),
            ("Berlin", weather_payload(3_600, 7.0)),
        ]));
        let store = store(&dir, client, FreshnessPolicy::PresentIsFresh);

        let atlantis = Location::new("Atlantis", "AT");
        let locations = HashSet::from([
            Location::new("Moscow", "RU"),
            Location::new("Berlin", "DE"),
            atlantis.clone(),
        ]);

        let err = store.collect(&locations).await.unwrap_err();
        assert_eq!(err.failed_keys().collect::<Vec<_>>(), [atlantis.cache_key().as_str()]);

        assert!(store.read(&Location::new("Moscow", "RU")).await.is_some());
        assert!(store.read(&Location::new("Berlin", "DE")).await.is_some());
        assert!(store.read(&atlantis).await.is_none());
    }
}
