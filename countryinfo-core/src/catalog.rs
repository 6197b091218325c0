use anyhow::{Result, anyhow};
use std::collections::HashMap;

use crate::{model::Country, store::CountryStore};

/// Read-only list of countries with name lookup.
#[derive(Debug, Clone, Default)]
pub struct CountryCatalog {
    countries: Vec<Country>,
    by_code: HashMap<String, usize>,
}

impl CountryCatalog {
    /// Builds the catalog; a repeated alpha-2 code keeps its first occurrence.
    pub fn new(countries: impl IntoIterator<Item = Country>) -> Self {
        let mut catalog = Self::default();

        for country in countries {
            let code = country.alpha2code.to_uppercase();
            if catalog.by_code.contains_key(&code) {
                tracing::warn!(code = %code, name = %country.name, "duplicate country code, skipping");
                continue;
            }
            catalog.by_code.insert(code, catalog.countries.len());
            catalog.countries.push(country);
        }

        catalog
    }

    /// Collects the country list if needed and builds the catalog from the cache.
    pub async fn load(store: &CountryStore) -> Result<Self> {
        let collected = store.collect().await;

        match store.read().await {
            Some(countries) => Ok(Self::new(countries)),
            None => Err(match collected {
                Err(e) => anyhow::Error::new(e).context("Country list is not available"),
                Ok(()) => anyhow!("Country list is not available"),
            }),
        }
    }

    pub fn countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    pub fn by_code(&self, alpha2code: &str) -> Option<&Country> {
        self.by_code
            .get(&alpha2code.to_uppercase())
            .map(|&idx| &self.countries[idx])
    }

    /// Finds a country by name, then by alternate spelling. Case is ignored.
    pub fn resolve(&self, name: &str) -> Option<&Country> {
        let query = name.trim().to_lowercase();
        if query.is_empty() {
            return None;
        }

        let found = self
            .countries
            .iter()
            .find(|c| c.name.to_lowercase() == query)
            .or_else(|| {
                self.countries
                    .iter()
                    .find(|c| c.alt_spellings.iter().any(|alt| alt.to_lowercase() == query))
            });

        if found.is_none() {
            tracing::debug!(name, "no country matches");
        }
        found
    }
}
