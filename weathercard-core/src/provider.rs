use crate::{
    Config, WeatherReport, WeatherRequest,
    error::{Result, WeatherError},
    provider::{weatherapi::WeatherApiProvider, wttr::WttrProvider},
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod weatherapi;
pub mod wttr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderId {
    Wttr,
    WeatherApi,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Wttr => "wttr",
            ProviderId::WeatherApi => "weatherapi",
        }
    }

    pub const fn all() -> &'static [ProviderId] {
        &[ProviderId::Wttr, ProviderId::WeatherApi]
    }

    pub fn needs_api_key(&self) -> bool {
        matches!(self, ProviderId::WeatherApi)
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> std::result::Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        match lower.as_str() {
            "wttr" | "wttr.in" => Ok(ProviderId::Wttr),
            "weatherapi" => Ok(ProviderId::WeatherApi),
            _ => Err(anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: wttr, weatherapi."
            )),
        }
    }
}

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherReport>;
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let base_url = config.provider_config(id).and_then(|cfg| cfg.base_url.clone());
    let timeout = config.request_timeout();
    let night = config.night_window();

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::Wttr => Box::new(wttr_from_config(config)?),
        ProviderId::WeatherApi => {
            let api_key = config.provider_api_key(id).ok_or_else(|| {
                anyhow::anyhow!(
                    "No API key configured for provider '{id}'.\n\
                         Hint: run `weathercard configure {id}` and enter your API key."
                )
            })?;
            let mut provider = WeatherApiProvider::new(api_key.to_owned(), night, timeout)?;
            if let Some(url) = base_url {
                provider = provider.with_base_url(url);
            }
            Box::new(provider)
        }
    };

    Ok(boxed)
}

/// wttr.in client from config; also serves the plain-text reports.
pub fn wttr_from_config(config: &Config) -> anyhow::Result<WttrProvider> {
    let mut provider = WttrProvider::new(config.night_window(), config.request_timeout())?;
    if let Some(url) = config.provider_config(ProviderId::Wttr).and_then(|c| c.base_url.clone()) {
        provider = provider.with_base_url(url);
    }
    Ok(provider)
}

/// Construct the default provider from config, using `default_provider` field.
pub fn default_provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let id = config.default_provider_id()?;
    provider_from_config(id, config)
}

pub(crate) fn http_client(provider: &'static str, timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| WeatherError::fetch(provider, format!("could not build HTTP client: {e}")))
}

/// Sends `request` and returns the body as text. Transport errors, timeouts
/// and non-success statuses are fetch errors.
pub(crate) async fn fetch_text(provider: &'static str, request: RequestBuilder) -> Result<String> {
    let res = request.send().await.map_err(|e| {
        let reason = if e.is_timeout() {
            format!("request timed out: {e}")
        } else {
            format!("request failed: {e}")
        };
        WeatherError::fetch(provider, reason)
    })?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| WeatherError::fetch(provider, format!("failed to read response body: {e}")))?;

    if !status.is_success() {
        return Err(WeatherError::fetch(
            provider,
            format!("status {}: {}", status, truncate_body(&body)),
        ));
    }

    Ok(body)
}

/// Like [`fetch_text`], but a body that is not JSON is a fetch error too.
pub(crate) async fn fetch_json(
    provider: &'static str,
    request: RequestBuilder,
) -> Result<serde_json::Value> {
    let body = fetch_text(provider, request).await?;
    serde_json::from_str(&body)
        .map_err(|e| WeatherError::fetch(provider, format!("response is not valid JSON: {e}")))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
