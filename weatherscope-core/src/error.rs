use thiserror::Error;

/// Failure kinds surfaced by a weather lookup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeatherError {
    #[error("City not found. Please check the spelling and try again.")]
    CityNotFound,

    #[error("Weather service unavailable. Please try again later.")]
    ServiceUnavailable,

    /// Any other failure. The detail is for logs; users see the generic text.
    #[error("Failed to fetch weather data. Please try again.")]
    FetchFailed(String),
}

impl WeatherError {
    pub fn fetch_failed(detail: impl Into<String>) -> Self {
        WeatherError::FetchFailed(detail.into())
    }

    /// Diagnostic detail for logs, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            WeatherError::FetchFailed(detail) => Some(detail),
            _ => None,
        }
    }

    /// Message shown in the dashboard's error slot.
    pub fn user_message(&self) -> &'static str {
        match self {
            WeatherError::CityNotFound => {
                "City not found. Please check the spelling and try again."
            }
            WeatherError::ServiceUnavailable => {
                "Weather service unavailable. Please try again later."
            }
            WeatherError::FetchFailed(_) => "Failed to fetch weather data. Please try again.",
        }
    }
}

/// City input rejected before any request is made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please enter a city name.")]
    EmptyCity,

    #[error("City name must be at least 2 characters.")]
    CityTooShort,
}
