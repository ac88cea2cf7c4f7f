use thiserror::Error;

/// Everything that can abort a weather card request.
///
/// Nothing here is retried; the command layer turns these into a message for
/// the user.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Transport failure, timeout, non-success status or a body that is not JSON.
    #[error("Failed to fetch weather from {provider}: {reason}")]
    Fetch { provider: &'static str, reason: String },

    /// The response parsed but lacks (or garbles) a field we need.
    #[error("Weather data from {provider} is incomplete: {reason}")]
    Data { provider: &'static str, reason: String },

    #[error("A {0} card needs an hourly forecast")]
    MissingForecast(String),

    #[error("Unknown condition code '{0}'")]
    UnknownCondition(String),

    #[error("Missing asset: {0}")]
    Asset(String),

    #[error("Failed to encode weather card")]
    Encode(#[from] image::ImageError),
}

impl WeatherError {
    pub(crate) fn fetch(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::Fetch { provider, reason: reason.into() }
    }

    pub(crate) fn data(provider: &'static str, reason: impl Into<String>) -> Self {
        Self::Data { provider, reason: reason.into() }
    }

    pub fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch { .. })
    }

    pub fn is_data(&self) -> bool {
        matches!(self, Self::Data { .. })
    }
}

pub type Result<T> = std::result::Result<T, WeatherError>;
