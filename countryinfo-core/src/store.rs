//! Cache-or-fetch stores, one per data source.
//!
//! All stores split their work the same way:
//! - `read` only looks at the local cache and never touches the network;
//! - `collect` fetches every key whose cache entry is not fresh and persists
//!   the converted record. One failing key does not stop the others; all
//!   failures come back together as a [`CollectError`].

use anyhow::Result;
use futures::future::join_all;
use serde::{Serialize, de::DeserializeOwned};
use std::{future::Future, path::Path, sync::Arc};

use crate::{
    Config,
    cache::{FreshnessPolicy, JsonCache},
    client::{Clients, CountryClient},
    error::{CollectError, KeyFailure},
};

pub mod country;
pub mod currency;
pub mod news;
pub mod weather;

pub use country::CountryStore;
pub use currency::CurrencyRatesStore;
pub use news::NewsStore;
pub use weather::WeatherStore;

/// All four stores sharing one cache root and freshness policy.
#[derive(Debug, Clone)]
pub struct Stores {
    pub weather: WeatherStore,
    pub news: NewsStore,
    pub currency: CurrencyRatesStore,
    pub countries: CountryStore,
}

impl Stores {
    pub fn open(config: &Config, clients: &Clients, policy: FreshnessPolicy) -> Result<Self> {
        let root = config.cache_dir()?;
        tracing::debug!(cache_dir = %root.display(), ?policy, "opening stores");

        Ok(Self {
            weather: WeatherStore::new(
                clients.weather.clone(),
                JsonCache::new(root.join("weather")),
                policy,
            ),
            news: NewsStore::new(
                clients.news.clone(),
                JsonCache::new(root.join("news")),
                policy,
                config.news_count(),
            ),
            currency: CurrencyRatesStore::new(
                clients.currency.clone(),
                JsonCache::new(root.join("currency")),
                policy,
                config.base_currency(),
            ),
            countries: Self::country_store(&root, clients.countries.clone(), policy),
        })
    }

    /// Just the country store, for commands that need no keyed provider.
    pub fn open_countries(
        config: &Config,
        client: Arc<dyn CountryClient>,
        policy: FreshnessPolicy,
    ) -> Result<CountryStore> {
        Ok(Self::country_store(&config.cache_dir()?, client, policy))
    }

    fn country_store(root: &Path, client: Arc<dyn CountryClient>, policy: FreshnessPolicy) -> CountryStore {
        CountryStore::new(client, JsonCache::new(root.join("countries")), policy)
    }
}

/// Refreshes every stale key in `keys` concurrently.
pub(crate) async fn collect_batch<K, T, F, Fut>(
    source_name: &'static str,
    cache: &JsonCache,
    policy: FreshnessPolicy,
    keys: impl IntoIterator<Item = K>,
    cache_key: impl Fn(&K) -> String,
    fetch: F,
) -> Result<(), CollectError>
where
    F: Fn(K) -> Fut,
    Fut: Future<Output = Result<T>>,
    T: Serialize + DeserializeOwned,
{
    let mut stale = Vec::new();
    for key in keys {
        let name = cache_key(&key);
        if cache.is_fresh::<T>(&name, policy).await {
            tracing::debug!(source = source_name, key = %name, "fresh in cache, skipping fetch");
            continue;
        }
        stale.push((name, key));
    }

    if stale.is_empty() {
        return Ok(());
    }

    let tasks = stale.into_iter().map(|(name, key)| {
        let fetched = fetch(key);
        async move {
            let stored = match fetched.await {
                Ok(record) => cache.put(&name, &record).await,
                Err(e) => Err(e),
            };
            stored.map_err(|error| KeyFailure { key: name, error })
        }
    });

    let failures: Vec<KeyFailure> = join_all(tasks)
        .await
        .into_iter()
        .filter_map(Result::err)
        .collect();

    if failures.is_empty() {
        return Ok(());
    }

    let err = CollectError { source_name, failures };
    tracing::warn!("{err}");
    Err(err)
}
