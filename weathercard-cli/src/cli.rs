use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use weathercard_core::{
    AssetBundle, CardMode, CardService, Config, ProviderId, greeting::greeting,
    provider::{
        default_provider_from_config, provider_from_config, wttr::ForecastDays, wttr_from_config,
    },
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weathercard", version, about = "Weather cards for chat channels")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure a provider and make it the default.
    Configure {
        /// Provider short name, e.g. "wttr" or "weatherapi".
        provider: String,

        /// API key; prompted for when the provider needs one and it is omitted.
        #[arg(long)]
        api_key: Option<String>,
    },

    /// Render a weather card for a city.
    Card {
        /// City name.
        #[arg(default_value = "Los Angeles")]
        city: String,

        /// Card style: simple, hourly or dark.
        #[arg(long, default_value = "simple")]
        mode: CardMode,

        /// Where to write the PNG.
        #[arg(long, default_value = "weather_report.png")]
        out: PathBuf,

        /// Use this provider instead of the configured default.
        #[arg(long)]
        provider: Option<String>,
    },

    /// Print wttr.in's plain-text forecast for a city.
    Forecast {
        /// City name.
        #[arg(default_value = "Los Angeles")]
        city: String,

        /// Number of days to forecast.
        #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=3))]
        days: u8,
    },

    /// Print wttr.in's plain-text current conditions for a city.
    Now {
        /// City name.
        #[arg(default_value = "Los Angeles")]
        city: String,
    },

    /// Print today's weather-report greeting.
    Report,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command {
            Command::Configure { provider, api_key } => configure(&provider, api_key),
            Command::Card { city, mode, out, provider } => {
                card(&city, mode, &out, provider.as_deref()).await
            }
            Command::Forecast { city, days } => forecast(&city, days).await,
            Command::Now { city } => now(&city).await,
            Command::Report => {
                println!("{}", greeting(chrono::Local::now().date_naive()));
                Ok(())
            }
        }
    }
}

fn configure(provider: &str, api_key: Option<String>) -> anyhow::Result<()> {
    let id = ProviderId::try_from(provider)?;
    let mut config = Config::load()?;

    if id.needs_api_key() {
        let key = match api_key {
            Some(key) => key,
            None => inquire::Password::new(&format!("API key for {id}:"))
                .without_confirmation()
                .prompt()
                .context("Failed to read API key")?,
        };
        config.upsert_provider_api_key(id, key.trim().to_string());
    }
    config.set_default_provider(id);
    config.save()?;

    println!("Configured {id} as the default provider.");
    Ok(())
}

async fn card(
    city: &str,
    mode: CardMode,
    out: &Path,
    provider: Option<&str>,
) -> anyhow::Result<()> {
    let config = Config::load()?;

    let provider = match provider {
        Some(name) => {
            let id = ProviderId::try_from(name)?;
            if !config.is_provider_configured(id) {
                anyhow::bail!(
                    "Provider '{id}' is not configured.\n\
                     Hint: run `weathercard configure {id}` first."
                );
            }
            provider_from_config(id, &config)?
        }
        None => default_provider_from_config(&config)?,
    };

    let assets_dir = config.assets_dir();
    let assets = AssetBundle::load(&assets_dir).with_context(|| {
        format!(
            "Failed to load card assets from {}.\n\
             Hint: set `assets_dir` in {}.",
            assets_dir.display(),
            Config::config_file_path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|_| "the config file".to_string()),
        )
    })?;

    let service = CardService::new(provider, Arc::new(assets));
    let png = service
        .render(city, mode)
        .await
        .with_context(|| format!("Could not make a weather card for {city}"))?;

    fs::write(out, &png).with_context(|| format!("Failed to write {}", out.display()))?;
    tracing::debug!(path = %out.display(), bytes = png.len(), "card written");
    println!("Wrote {} card for {city} to {}", mode, out.display());
    Ok(())
}

async fn forecast(city: &str, days: u8) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = wttr_from_config(&config)?;

    let report = provider
        .text_forecast(city, ForecastDays::try_from(days)?)
        .await
        .with_context(|| format!("Could not get a forecast for {city}"))?;

    println!("{}", report.title);
    println!("{}", report.body);
    Ok(())
}

async fn now(city: &str) -> anyhow::Result<()> {
    let config = Config::load()?;
    let provider = wttr_from_config(&config)?;

    let text = provider
        .current_text(city)
        .await
        .with_context(|| format!("Could not get current conditions for {city}"))?;

    print!("{text}");
    Ok(())
}
