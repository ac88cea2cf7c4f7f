use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    daytime::{NightWindow, parse_local_datetime},
    error::{Result, WeatherError},
    model::{
        ConditionCode, HourlyForecast, SAMPLE_HOURS, Temperature, WeatherReport, WeatherRequest,
        WeatherSnapshot,
    },
    provider::{fetch_json, http_client},
};

use super::WeatherProvider;

const PROVIDER: &str = "weatherapi";
const DEFAULT_BASE_URL: &str = "http://api.weatherapi.com";

#[derive(Debug, Clone)]
pub struct WeatherApiProvider {
    api_key: String,
    base_url: String,
    night: NightWindow,
    http: Client,
}

impl WeatherApiProvider {
    pub fn new(api_key: String, night: NightWindow, timeout: Duration) -> Result<Self> {
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            night,
            http: http_client(PROVIDER, timeout)?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch_forecast(&self, city: &str) -> Result<serde_json::Value> {
        let url = format!("{}/v1/forecast.json", self.base_url);

        let request = self.http.get(url).query(&[
            ("key", self.api_key.as_str()),
            ("q", city),
            ("days", "1"),
        ]);

        fetch_json(PROVIDER, request).await
    }
}

#[derive(Debug, Deserialize)]
struct WaLocation {
    /// `YYYY-MM-DD H:MM`, hour not zero-padded.
    localtime: String,
}

#[derive(Debug, Deserialize)]
struct WaCondition {
    /// e.g. `//cdn.weatherapi.com/weather/64x64/day/116.png`
    icon: String,
}

/// Shape shared by `current` and each `forecastday[].hour[]` entry.
#[derive(Debug, Deserialize)]
struct WaReading {
    temp_c: Option<f64>,
    feelslike_c: Option<f64>,
    condition: WaCondition,
}

impl WaReading {
    /// Actual temperature, falling back to the feels-like value.
    fn temperature(&self, what: &str) -> Result<Temperature> {
        match (self.temp_c, self.feelslike_c) {
            (Some(t), _) => Ok(Temperature::from_celsius(t)),
            (None, Some(feels)) => {
                tracing::warn!(reading = what, "temp_c missing, using feelslike_c");
                Ok(Temperature::from_celsius(feels))
            }
            (None, None) => Err(WeatherError::data(
                PROVIDER,
                format!("{what} has neither temp_c nor feelslike_c"),
            )),
        }
    }

    fn condition(&self, what: &str) -> Result<ConditionCode> {
        ConditionCode::from_icon_url(&self.condition.icon).ok_or_else(|| {
            WeatherError::data(
                PROVIDER,
                format!("{what} condition icon '{}' has no code", self.condition.icon),
            )
        })
    }
}

#[derive(Debug, Deserialize)]
struct WaForecastDay {
    hour: Vec<WaReading>,
}

#[derive(Debug, Deserialize)]
struct WaForecast {
    forecastday: Vec<WaForecastDay>,
}

#[derive(Debug, Deserialize)]
struct WaForecastResponse {
    location: WaLocation,
    current: WaReading,
    forecast: Option<WaForecast>,
}

/// Turns a `forecast.json` body into a report for `request`.
pub fn parse_forecast(
    body: serde_json::Value,
    request: &WeatherRequest,
    night: &NightWindow,
) -> Result<WeatherReport> {
    let parsed: WaForecastResponse =
        serde_json::from_value(body).map_err(|e| WeatherError::data(PROVIDER, e.to_string()))?;

    let localtime = &parsed.location.localtime;
    let (local_date, local_time) = parse_local_datetime(localtime).ok_or_else(|| {
        WeatherError::data(PROVIDER, format!("unreadable location.localtime '{localtime}'"))
    })?;

    let is_night = night.is_night(local_time);
    let mut condition = parsed.current.condition("current")?;
    if is_night {
        tracing::debug!(reported = %condition, %local_time, "night time, showing the moon");
        condition = ConditionCode::moon();
    }

    let snapshot = WeatherSnapshot {
        city: request.city.clone(),
        temperature: parsed.current.temperature("current")?,
        condition,
        local_time,
        local_date: Some(local_date),
        is_night,
    };

    let hourly = if request.hourly {
        let forecast = parsed
            .forecast
            .ok_or_else(|| WeatherError::data(PROVIDER, "response has no forecast block"))?;
        Some(hourly_forecast(&forecast)?)
    } else {
        None
    };

    Ok(WeatherReport { snapshot, hourly })
}

fn hourly_forecast(forecast: &WaForecast) -> Result<HourlyForecast> {
    let today = forecast
        .forecastday
        .first()
        .ok_or_else(|| WeatherError::data(PROVIDER, "response contained no forecastday data"))?;

    let values = SAMPLE_HOURS
        .iter()
        .map(|&hour| -> Result<(Temperature, ConditionCode)> {
            let reading = today.hour.get(hour as usize).ok_or_else(|| {
                WeatherError::data(
                    PROVIDER,
                    format!("hourly forecast has {} entries, need hour {hour}", today.hour.len()),
                )
            })?;
            let what = format!("hour {hour}");
            Ok((reading.temperature(&what)?, reading.condition(&what)?))
        })
        .collect::<Result<Vec<_>>>()?;

    let values: [(Temperature, ConditionCode); 6] = values
        .try_into()
        .map_err(|_| WeatherError::data(PROVIDER, "expected six hourly samples"))?;

    Ok(HourlyForecast::new(values))
}

#[async_trait]
impl WeatherProvider for WeatherApiProvider {
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherReport> {
        tracing::info!(
            provider = PROVIDER,
            city = %request.city,
            hourly = request.hourly,
            "fetching weather"
        );

        let body = self.fetch_forecast(&request.city).await?;
        parse_forecast(body, request, &self.night)
    }
}
