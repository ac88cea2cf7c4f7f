//! Core library for the `weathercard` tool.
//!
//! This crate defines:
//! - Weather providers that fetch and normalize current conditions and an
//!   hourly forecast for a city
//! - Condition code lookup, icon recolouring and weather card composition
//! - Configuration & credentials handling
//!
//! It is used by `weathercard-cli`, but any command layer (a chat bot, a web
//! handler) can drive [`CardService`] directly.

pub mod assets;
pub mod card;
pub mod condition;
pub mod config;
pub mod daytime;
pub mod error;
pub mod greeting;
pub mod model;
pub mod provider;
pub mod recolor;
pub mod service;

pub use assets::AssetBundle;
pub use card::{CardInput, CardMode, compose};
pub use config::{Config, ProviderConfig};
pub use error::{Result, WeatherError};
pub use model::{
    ConditionCode, HourlyForecast, HourlySample, Temperature, WeatherReport, WeatherRequest,
    WeatherSnapshot,
};
pub use provider::{ProviderId, WeatherProvider};
pub use service::CardService;
