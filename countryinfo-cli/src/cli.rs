use anyhow::Context;
use clap::{Parser, Subcommand};
use countryinfo_core::{
    Clients, Config, CountryCatalog, FreshnessPolicy, ProviderId, Reader, Stores,
};
use inquire::{Password, PasswordDisplayMode};
use std::sync::Arc;

use crate::render::Renderer;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "countryinfo", version, about = "Country facts, weather, news and exchange rates")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure credentials for a specific provider.
    Configure {
        /// Provider short name: "openweather", "newsapi" or "apilayer".
        provider: String,
    },

    /// Show facts, weather, news and currency rates for a country.
    Show {
        /// Country name or alternate spelling, e.g. "Russia".
        country: String,

        /// Ignore cached data and fetch everything again.
        #[arg(long)]
        refresh: bool,
    },

    /// List every known country.
    Countries,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider } => configure(&provider),
            Command::Show { country, refresh } => show(&country, refresh).await,
            Command::Countries => list_countries().await,
        }
    }
}

fn load_config() -> anyhow::Result<Config> {
    let mut config = Config::load()?;
    config.apply_env();
    Ok(config)
}

fn configure(provider: &str) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;

    let mut config = Config::load()?;
    if config.is_provider_configured(id) {
        println!("Replacing the saved API key for '{id}'.");
    }
    let api_key = Password::new(&format!("API key for {id}:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    config.upsert_provider_api_key(id, api_key.trim().to_string());
    config.save()?;

    println!("Saved API key for '{id}' to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(name: &str, refresh: bool) -> anyhow::Result<()> {
    let config = load_config()?;
    let policy = if refresh { FreshnessPolicy::AlwaysStale } else { config.freshness_policy() };
    tracing::debug!(country = name, ?policy, "showing country");

    let clients = Clients::from_config(&config)?;
    let stores = Stores::open(&config, &clients, policy)?;
    let catalog = CountryCatalog::load(&stores.countries).await?;
    let reader = Reader::from_stores(Arc::new(catalog), stores);

    match reader.find(name).await? {
        Some(info) => {
            for line in Renderer::new(&info).render() {
                println!("{line}");
            }
        }
        None => println!("Country '{name}' not found."),
    }

    Ok(())
}

async fn list_countries() -> anyhow::Result<()> {
    let config = load_config()?;
    let store = Stores::open_countries(
        &config,
        Clients::country_client(&config)?,
        config.freshness_policy(),
    )?;
    let catalog = CountryCatalog::load(&store).await?;

    for country in catalog.countries() {
        println!("{}  {}", country.alpha2code, country.name);
    }

    Ok(())
}
