use std::sync::Arc;

use crate::{
    assets::AssetBundle,
    card::{CardInput, CardMode, compose},
    daytime::daily_progress,
    error::Result,
    model::WeatherRequest,
    provider::WeatherProvider,
};

/// City in, PNG out. Holds only read-only state, so one instance can serve
/// any number of concurrent requests.
#[derive(Debug)]
pub struct CardService {
    provider: Box<dyn WeatherProvider>,
    assets: Arc<AssetBundle>,
}

impl CardService {
    pub fn new(provider: Box<dyn WeatherProvider>, assets: Arc<AssetBundle>) -> Self {
        Self { provider, assets }
    }

    pub async fn render(&self, city: &str, mode: CardMode) -> Result<Vec<u8>> {
        let request = if mode.needs_forecast() {
            WeatherRequest::with_hourly(city)
        } else {
            WeatherRequest::current(city)
        };
        tracing::info!(city, %mode, "rendering weather card");

        let report = self.provider.get_weather(&request).await?;
        let input = CardInput {
            snapshot: &report.snapshot,
            hourly: report.hourly.as_ref(),
            progress: daily_progress(report.snapshot.local_time),
            mode,
        };

        compose(&self.assets, &input).inspect_err(|e| {
            tracing::error!(city, %mode, error = %e, "weather card could not be drawn");
        })
    }
}
