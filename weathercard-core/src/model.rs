use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Hours of the local day sampled for the hourly strip, in display order.
pub const SAMPLE_HOURS: [u32; 6] = [9, 12, 15, 18, 21, 23];

#[derive(Debug, Clone)]
pub struct WeatherRequest {
    pub city: String,
    /// Ask the provider for an hourly forecast as well as current conditions.
    pub hourly: bool,
}

impl WeatherRequest {
    pub fn current(city: impl Into<String>) -> Self {
        Self { city: city.into(), hourly: false }
    }

    pub fn with_hourly(city: impl Into<String>) -> Self {
        Self { city: city.into(), hourly: true }
    }
}

/// Whole degrees Celsius. Halves round to the even neighbour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Temperature(pub i32);

impl Temperature {
    pub fn from_celsius(value: f64) -> Self {
        Self(value.round_ties_even() as i32)
    }
}

impl fmt::Display for Temperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}°", self.0)
    }
}

/// Three-digit provider condition code, e.g. `"116"` for partly cloudy.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConditionCode(String);

impl ConditionCode {
    pub const MOON_CODE: &'static str = "999";

    pub fn moon() -> Self {
        Self(Self::MOON_CODE.to_string())
    }

    /// Accepts exactly three ASCII digits.
    pub fn parse(code: &str) -> Option<Self> {
        let code = code.trim();
        let valid = code.len() == 3 && code.bytes().all(|b| b.is_ascii_digit());
        valid.then(|| Self(code.to_string()))
    }

    /// Extracts the code from an icon URL such as
    /// `//cdn.weatherapi.com/weather/64x64/day/116.png`.
    pub fn from_icon_url(url: &str) -> Option<Self> {
        let file = url.rsplit('/').next()?;
        let stem = file.split('.').next()?;
        Self::parse(stem)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_moon(&self) -> bool {
        self.0 == Self::MOON_CODE
    }
}

impl fmt::Display for ConditionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Current conditions for one city at the time of the request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub city: String,
    pub temperature: Temperature,
    /// Already replaced by the moon code when `is_night` is set.
    pub condition: ConditionCode,
    pub local_time: NaiveTime,
    pub local_date: Option<NaiveDate>,
    pub is_night: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlySample {
    pub hour: u32,
    pub temperature: Temperature,
    pub condition: ConditionCode,
}

/// Six samples at [`SAMPLE_HOURS`]; the last one always shows the moon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyForecast {
    samples: [HourlySample; 6],
}

impl HourlyForecast {
    /// Builds the forecast from `(temperature, condition)` pairs ordered like
    /// [`SAMPLE_HOURS`].
    pub fn new(values: [(Temperature, ConditionCode); 6]) -> Self {
        let mut i = 0;
        let mut samples = values.map(|(temperature, condition)| {
            let hour = SAMPLE_HOURS[i];
            i += 1;
            HourlySample { hour, temperature, condition }
        });
        samples[5].condition = ConditionCode::moon();
        Self { samples }
    }

    pub fn samples(&self) -> &[HourlySample; 6] {
        &self.samples
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherReport {
    pub snapshot: WeatherSnapshot,
    pub hourly: Option<HourlyForecast>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> ConditionCode {
        ConditionCode::parse(s).expect("valid code")
    }

    #[test]
    fn temperature_rounds_and_shows_degree_sign() {
        assert_eq!(Temperature::from_celsius(20.6).to_string(), "21°");
        assert_eq!(Temperature::from_celsius(-0.4).to_string(), "0°");
        assert_eq!(Temperature::from_celsius(22.5).0, 22);
        assert_eq!(Temperature::from_celsius(23.5).0, 24);
        assert_eq!(Temperature::from_celsius(0.5).0, 0);
        assert_eq!(Temperature::from_celsius(-2.5).0, -2);
    }

    #[test]
    fn condition_code_from_icon_url() {
        let c = ConditionCode::from_icon_url("//cdn.weatherapi.com/weather/64x64/day/116.png");
        assert_eq!(c, Some(code("116")));

        assert!(ConditionCode::from_icon_url("//cdn.weatherapi.com/weather/64x64/day/").is_none());
        assert!(ConditionCode::parse("11").is_none());
        assert!(ConditionCode::parse("abc").is_none());
    }

    #[test]
    fn hourly_forecast_orders_hours_and_forces_moon_last() {
        let values = [
            (Temperature(18), code("113")),
            (Temperature(21), code("116")),
            (Temperature(23), code("119")),
            (Temperature(20), code("176")),
            (Temperature(17), code("113")),
            (Temperature(15), code("296")),
        ];
        let forecast = HourlyForecast::new(values);
        let hours: Vec<u32> = forecast.samples().iter().map(|s| s.hour).collect();

        assert_eq!(hours, SAMPLE_HOURS.to_vec());
        assert!(hours.windows(2).all(|w| w[0] < w[1]));
        assert!(forecast.samples()[5].condition.is_moon());
        assert_eq!(forecast.samples()[5].temperature, Temperature(15));
        assert_eq!(forecast.samples()[0].condition, code("113"));
    }
}
