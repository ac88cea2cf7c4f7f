use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    daytime::NightWindow,
    error::{Result, WeatherError},
    model::{ConditionCode, Temperature, WeatherReport, WeatherRequest, WeatherSnapshot},
    provider::{fetch_json, fetch_text, http_client},
};

use super::WeatherProvider;

const PROVIDER: &str = "wttr";
const DEFAULT_BASE_URL: &str = "https://wttr.in";

/// Lines of the plain-text report taken up by the current-conditions block,
/// title included.
const CURRENT_BLOCK_LINES: usize = 8;

/// How many days of plain-text forecast to ask wttr.in for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForecastDays {
    One,
    Two,
    #[default]
    Three,
}

impl ForecastDays {
    /// wttr.in option string: no follow line (`F`), no colours (`T`), narrow
    /// (`n`) and the day count, where an absent count means three days.
    fn options(&self) -> &'static str {
        match self {
            ForecastDays::One => "FTn1",
            ForecastDays::Two => "FTn2",
            ForecastDays::Three => "FTn",
        }
    }
}

impl TryFrom<u8> for ForecastDays {
    type Error = anyhow::Error;

    fn try_from(days: u8) -> std::result::Result<Self, Self::Error> {
        match days {
            1 => Ok(ForecastDays::One),
            2 => Ok(ForecastDays::Two),
            3 => Ok(ForecastDays::Three),
            other => anyhow::bail!("wttr.in forecasts 1 to 3 days, not {other}"),
        }
    }
}

/// Plain-text forecast with the current-conditions block cut off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextForecast {
    /// First line of the report, e.g. `Weather report: Lisbon`.
    pub title: String,
    pub body: String,
}

/// Splits a plain-text report into its title line and everything after the
/// current-conditions block.
pub fn split_text_forecast(text: &str) -> Result<TextForecast> {
    let title = text.lines().next().unwrap_or_default().trim();
    let body = text.splitn(CURRENT_BLOCK_LINES + 1, '\n').nth(CURRENT_BLOCK_LINES);

    match body {
        Some(body) if !title.is_empty() => {
            Ok(TextForecast { title: title.to_string(), body: body.to_string() })
        }
        _ => {
            let lines = text.lines().count();
            let reason = format!("text report has {lines} lines, expected a title and a forecast");
            Err(WeatherError::data(PROVIDER, reason))
        }
    }
}

/// wttr.in, keyed by city in the URL path. Current conditions only.
#[derive(Debug, Clone)]
pub struct WttrProvider {
    base_url: String,
    night: NightWindow,
    http: Client,
}

impl WttrProvider {
    pub fn new(night: NightWindow, timeout: Duration) -> Result<Self> {
        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            night,
            http: http_client(PROVIDER, timeout)?,
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn url_for(&self, city: &str) -> Result<Url> {
        let base = &self.base_url;
        let mut url = Url::parse(base)
            .map_err(|e| WeatherError::fetch(PROVIDER, format!("bad base url '{base}': {e}")))?;
        url.path_segments_mut()
            .map_err(|_| WeatherError::fetch(PROVIDER, format!("base url '{base}' takes no path")))?
            .pop_if_empty()
            .push(city);
        Ok(url)
    }

    async fn fetch_plain(&self, city: &str, options: &str) -> Result<String> {
        let mut url = self.url_for(city)?;
        url.set_query(Some(options));
        tracing::info!(provider = PROVIDER, %city, options, "fetching text report");
        fetch_text(PROVIDER, self.http.get(url)).await
    }

    /// Multi-day plain-text forecast, split into title and body.
    pub async fn text_forecast(&self, city: &str, days: ForecastDays) -> Result<TextForecast> {
        let text = self.fetch_plain(city, days.options()).await?;
        split_text_forecast(&text)
    }

    /// Current conditions only, as wttr.in's plain-text block.
    pub async fn current_text(&self, city: &str) -> Result<String> {
        self.fetch_plain(city, "0FT").await
    }
}

#[derive(Debug, Deserialize)]
struct WttrCurrent {
    #[serde(rename = "FeelsLikeC")]
    feels_like_c: Option<String>,
    #[serde(rename = "temp_C")]
    temp_c: Option<String>,
    #[serde(rename = "weatherCode")]
    weather_code: String,
    /// `YYYY-MM-DD hh:mm AM`
    #[serde(rename = "localObsDateTime")]
    local_obs_date_time: String,
}

#[derive(Debug, Deserialize)]
struct WttrResponse {
    current_condition: Vec<WttrCurrent>,
}

/// Turns a `?format=j1` body into a report. wttr numbers arrive as strings.
pub fn parse_current(
    body: serde_json::Value,
    request: &WeatherRequest,
    night: &NightWindow,
) -> Result<WeatherReport> {
    let parsed: WttrResponse =
        serde_json::from_value(body).map_err(|e| WeatherError::data(PROVIDER, e.to_string()))?;
    let current = parsed
        .current_condition
        .first()
        .ok_or_else(|| WeatherError::data(PROVIDER, "current_condition is empty"))?;

    let celsius = current
        .feels_like_c
        .as_deref()
        .or(current.temp_c.as_deref())
        .and_then(|t| t.trim().parse::<f64>().ok())
        .ok_or_else(|| WeatherError::data(PROVIDER, "no usable FeelsLikeC or temp_C"))?;

    let obs = current.local_obs_date_time.trim();
    let observed = NaiveDateTime::parse_from_str(obs, "%Y-%m-%d %I:%M %p").map_err(|e| {
        WeatherError::data(PROVIDER, format!("unreadable localObsDateTime '{obs}': {e}"))
    })?;

    let code = &current.weather_code;
    let mut condition = ConditionCode::parse(code).ok_or_else(|| {
        WeatherError::data(PROVIDER, format!("weatherCode '{code}' is not a condition code"))
    })?;

    let local_time = observed.time();
    let is_night = night.is_night(local_time);
    if is_night {
        tracing::debug!(reported = %condition, %local_time, "night time, showing the moon");
        condition = ConditionCode::moon();
    }

    Ok(WeatherReport {
        snapshot: WeatherSnapshot {
            city: request.city.clone(),
            temperature: Temperature::from_celsius(celsius),
            condition,
            local_time,
            local_date: Some(observed.date()),
            is_night,
        },
        hourly: None,
    })
}

#[async_trait]
impl WeatherProvider for WttrProvider {
    async fn get_weather(&self, request: &WeatherRequest) -> Result<WeatherReport> {
        if request.hourly {
            return Err(WeatherError::data(PROVIDER, "wttr does not provide an hourly forecast"));
        }
        tracing::info!(provider = PROVIDER, city = %request.city, "fetching weather");

        let url = self.url_for(&request.city)?;
        let body = fetch_json(PROVIDER, self.http.get(url).query(&[("format", "j1")])).await?;
        parse_current(body, request, &self.night)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveTime;
    use serde_json::{Value, json};
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path, query_param},
    };

    fn body(obs: &str) -> Value {
        json!({
            "current_condition": [{
                "FeelsLikeC": "21",
                "temp_C": "23",
                "weatherCode": "116",
                "localObsDateTime": obs,
                "weatherDesc": [{ "value": "Partly cloudy" }]
            }]
        })
    }

    fn parse(value: Value) -> Result<WeatherReport> {
        parse_current(value, &WeatherRequest::current("Lisbon"), &NightWindow::default())
    }

    #[test]
    fn parses_afternoon_observation() {
        let report = parse(body("2021-08-13 04:44 PM")).expect("parses");

        let snap = report.snapshot;
        assert_eq!(snap.temperature, Temperature(21));
        assert_eq!(snap.condition.as_str(), "116");
        assert_eq!(snap.local_time, NaiveTime::from_hms_opt(16, 44, 0).expect("valid time"));
        assert!(!snap.is_night);
        assert!(report.hourly.is_none());
    }

    #[test]
    fn late_evening_shows_moon() {
        let report = parse(body("2021-08-13 10:15 PM")).expect("parses");
        assert!(report.snapshot.condition.is_moon());
    }

    #[test]
    fn falls_back_to_actual_temperature() {
        let mut value = body("2021-08-13 04:44 PM");
        value["current_condition"][0].as_object_mut().expect("object").remove("FeelsLikeC");

        let report = parse(value).expect("parses");
        assert_eq!(report.snapshot.temperature, Temperature(23));
    }

    #[test]
    fn empty_current_condition_is_a_data_error() {
        let err = parse(json!({ "current_condition": [] })).unwrap_err();
        assert!(err.is_data());
    }

    #[tokio::test]
    async fn hourly_request_is_rejected_without_fetching() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("2021-08-13 04:44 PM")))
            .expect(0)
            .mount(&server)
            .await;

        let provider = WttrProvider::new(NightWindow::default(), Duration::from_secs(5))
            .expect("client builds")
            .with_base_url(server.uri());
        let err =
            provider.get_weather(&WeatherRequest::with_hourly("Lisbon")).await.unwrap_err();

        assert!(err.is_data());
    }

    #[tokio::test]
    async fn city_goes_in_the_path() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Los%20Angeles"))
            .and(query_param("format", "j1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body("2021-08-13 11:00 AM")))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WttrProvider::new(NightWindow::default(), Duration::from_secs(5))
            .expect("client builds")
            .with_base_url(server.uri());
        let report = provider
            .get_weather(&WeatherRequest::current("Los Angeles"))
            .await
            .expect("fetch succeeds");

        assert_eq!(report.snapshot.city, "Los Angeles");
    }

    fn plain_report() -> String {
        let mut lines = vec!["Weather report: Lisbon".to_string(), String::new()];
        lines.extend((0..6).map(|i| format!("current block line {i}")));
        lines.push("┌─────────────┐".to_string());
        lines.push("│  Fri 13 Aug │".to_string());
        lines.join("\n")
    }

    #[test]
    fn text_report_drops_current_block() {
        let forecast = split_text_forecast(&plain_report()).expect("splits");

        assert_eq!(forecast.title, "Weather report: Lisbon");
        assert_eq!(forecast.body, "┌─────────────┐\n│  Fri 13 Aug │");
    }

    #[test]
    fn short_text_report_is_a_data_error() {
        let err = split_text_forecast("Weather report: Lisbon\n\nonly a few lines").unwrap_err();
        assert!(err.is_data());
    }

    #[test]
    fn forecast_days_from_number() {
        assert_eq!(ForecastDays::try_from(1).expect("valid"), ForecastDays::One);
        assert_eq!(ForecastDays::try_from(3).expect("valid"), ForecastDays::Three);
        assert!(ForecastDays::try_from(4).is_err());
        assert_eq!(ForecastDays::default().options(), "FTn");
    }

    #[tokio::test]
    async fn text_forecast_asks_for_day_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Lisbon"))
            .and(query_param("FTn2", ""))
            .respond_with(ResponseTemplate::new(200).set_body_string(plain_report()))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WttrProvider::new(NightWindow::default(), Duration::from_secs(5))
            .expect("client builds")
            .with_base_url(server.uri());
        let forecast =
            provider.text_forecast("Lisbon", ForecastDays::Two).await.expect("fetch succeeds");

        assert_eq!(forecast.title, "Weather report: Lisbon");
        assert!(forecast.body.starts_with("┌"));
    }

    #[tokio::test]
    async fn current_text_is_returned_verbatim() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/Lisbon"))
            .and(query_param("0FT", ""))
            .respond_with(ResponseTemplate::new(200).set_body_string("Weather report: Lisbon\n"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = WttrProvider::new(NightWindow::default(), Duration::from_secs(5))
            .expect("client builds")
            .with_base_url(server.uri());
        let text = provider.current_text("Lisbon").await.expect("fetch succeeds");

        assert_eq!(text, "Weather report: Lisbon\n");
    }

    #[tokio::test]
    async fn text_forecast_error_status_is_a_fetch_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("busy"))
            .mount(&server)
            .await;

        let provider = WttrProvider::new(NightWindow::default(), Duration::from_secs(5))
            .expect("client builds")
            .with_base_url(server.uri());
        let err = provider.text_forecast("Lisbon", ForecastDays::One).await.unwrap_err();

        assert!(err.is_fetch());
    }
}
