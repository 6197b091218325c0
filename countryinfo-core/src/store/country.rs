use std::sync::Arc;

use super::collect_batch;
use crate::{
    cache::{FreshnessPolicy, JsonCache},
    client::{CountryClient, restcountries::CountryPayload},
    error::CollectError,
    model::{Country, Language},
};

const COUNTRIES_KEY: &str = "all";

impl From<CountryPayload> for Country {
    fn from(payload: CountryPayload) -> Self {
        let languages = payload
            .languages
            .into_iter()
            .map(|lang| Language {
                native_name: lang.native_name.unwrap_or_else(|| lang.name.clone()),
                name: lang.name,
            })
            .collect();

        Country {
            alpha2code: payload.alpha2_code,
            name: payload.name,
            capital: payload.capital.unwrap_or_default(),
            subregion: payload.subregion.unwrap_or_default(),
            population: payload.population,
            area: payload.area,
            latitude: payload.latlng.first().copied(),
            longitude: payload.latlng.get(1).copied(),
            alt_spellings: payload.alt_spellings,
            timezones: payload.timezones,
            currencies: payload.currencies.into_iter().filter_map(|c| c.code).collect(),
            languages,
            flag: payload.flag,
        }
    }
}

/// The full country list backing the catalog.
#[derive(Debug, Clone)]
pub struct CountryStore {
    client: Arc<dyn CountryClient>,
    cache: JsonCache,
    policy: FreshnessPolicy,
}

impl CountryStore {
    pub fn new(client: Arc<dyn CountryClient>, cache: JsonCache, policy: FreshnessPolicy) -> Self {
        Self { client, cache, policy }
    }

    pub async fn read(&self) -> Option<Vec<Country>> {
        self.cache.get(COUNTRIES_KEY).await.map(|entry| entry.value)
    }

    #[tracing::instrument(name = "collect_countries", skip_all)]
    pub async fn collect(&self) -> Result<(), CollectError> {
        let client = &self.client;

        collect_batch(
            "countries",
            &self.cache,
            self.policy,
            [()],
            |_| COUNTRIES_KEY.to_string(),
            move |()| async move {
                let payload = client.fetch_countries().await?;
                let countries: Vec<Country> = payload.into_iter().map(Country::from).collect();
                tracing::debug!(count = countries.len(), "fetched country list");
                Ok::<_, anyhow::Error>(countries)
            },
        )
        .await
    }
}
