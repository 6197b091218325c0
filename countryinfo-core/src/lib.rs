//! Core library for the `countryinfo` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Clients for the external data sources (weather, news, rates, countries)
//! - A JSON file cache and the cache-or-fetch stores built on it
//! - The country catalog and the [`Reader`] that merges everything into a [`LocationInfo`]
//!
//! It is used by `countryinfo-cli`, but can also be reused by other binaries or services.

pub mod cache;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod reader;
pub mod store;

pub use cache::FreshnessPolicy;
pub use catalog::CountryCatalog;
pub use client::{Clients, ProviderId};
pub use config::{Config, ProviderConfig};
pub use error::{CollectError, ReaderError};
pub use model::{
    Country, CurrencyRateTable, Language, Location, LocationInfo, NewsItem, WeatherRecord,
};
pub use reader::Reader;
pub use store::Stores;
