use std::sync::Arc;

use super::collect_batch;
use crate::{
    cache::{FreshnessPolicy, JsonCache},
    client::CurrencyClient,
    error::CollectError,
    model::CurrencyRateTable,
};

/// The global rate table, quoted against `base`. Each base is cached under its own key.
#[derive(Debug, Clone)]
pub struct CurrencyRatesStore {
    client: Arc<dyn CurrencyClient>,
    cache: JsonCache,
    policy: FreshnessPolicy,
    base: String,
    key: String,
}

impl CurrencyRatesStore {
    pub fn new(
        client: Arc<dyn CurrencyClient>,
        cache: JsonCache,
        policy: FreshnessPolicy,
        base: impl Into<String>,
    ) -> Self {
        let base = base.into();
        let key = format!("rates_{}", base.to_lowercase());
        Self { client, cache, policy, base, key }
    }

    /// Cached table for the configured base.
    pub async fn read(&self) -> Option<CurrencyRateTable> {
        self.cache.get(&self.key).await.map(|entry| entry.value)
    }

    #[tracing::instrument(name = "collect_rates", skip_all, fields(base = %self.base))]
    pub async fn collect(&self) -> Result<(), CollectError> {
        let client = &self.client;
        let base = self.base.as_str();

        collect_batch(
            "currency",
            &self.cache,
            self.policy,
            [()],
            |_| self.key.clone(),
            move |()| async move {
                let payload = client.fetch_rates(base).await?;
                Ok::<_, anyhow::Error>(CurrencyRateTable { base: payload.base, rates: payload.rates })
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fakes::FakeRates;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn rates() -> FakeRates {
        FakeRates {
            rates: BTreeMap::from([("USD".to_string(), 0.011), ("EUR".to_string(), 0.0101)]),
            fail: false,
        }
    }

    #[tokio::test]
    async fn collect_then_read_returns_table() {
        let dir = TempDir::new().unwrap();
        let store = CurrencyRatesStore::new(
            Arc::new(rates()),
            JsonCache::new(dir.path()),
            FreshnessPolicy::default(),
            "RUB",
        );

        assert!(store.read().await.is_none());
        store.collect().await.unwrap();

        let table = store.read().await.expect("rates cached");
        assert_eq!(table.base, "RUB");
        assert_eq!(table.rates.len(), 2);
    }

    #[tokio::test]
    async fn switching_base_collects_a_new_table() {
        let dir = TempDir::new().unwrap();
        let rub = CurrencyRatesStore::new(
            Arc::new(rates()),
            JsonCache::new(dir.path()),
            FreshnessPolicy::default(),
            "RUB",
        );
        rub.collect().await.unwrap();

        let eur = CurrencyRatesStore::new(
            Arc::new(rates()),
            JsonCache::new(dir.path()),
            FreshnessPolicy::default(),
            "EUR",
        );
        assert!(eur.read().await.is_none());

        eur.collect().await.unwrap();
        assert_eq!(eur.read().await.expect("EUR table collected").base, "EUR");
        assert_eq!(rub.read().await.expect("RUB table kept").base, "RUB");
    }

    #[tokio::test]
    async fn failure_is_reported_and_keeps_previous_table() {
        let dir = TempDir::new().unwrap();
        let cache = JsonCache::new(dir.path());

        let ok = CurrencyRatesStore::new(Arc::new(rates()), cache.clone(), FreshnessPolicy::default(), "RUB");
        ok.collect().await.unwrap();

        let failing = CurrencyRatesStore::new(
            Arc::new(FakeRates { rates: BTreeMap::new(), fail: true }),
            cache,
            FreshnessPolicy::AlwaysStale,
            "RUB",
        );
        let err = failing.collect().await.unwrap_err();
        assert_eq!(err.failed_keys().collect::<Vec<_>>(), ["rates_rub"]);
        assert_eq!(failing.read().await.unwrap().rates.len(), 2);
    }
}
