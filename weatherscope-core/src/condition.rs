//! Maps free-text provider conditions onto a closed set of categories.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherCategory {
    Clear,
    Cloudy,
    Rain,
    Thunderstorm,
    Snow,
    Fog,
    Windy,
    Unknown,
}

// Order matters: "thunderstorm with light rain" must land on Thunderstorm.
const RULES: &[(WeatherCategory, &[&str])] = &[
    (WeatherCategory::Thunderstorm, &["thunderstorm", "storm"]),
    (WeatherCategory::Snow, &["snow", "blizzard", "sleet"]),
    (WeatherCategory::Rain, &["rain", "drizzle", "shower"]),
    (WeatherCategory::Fog, &["mist", "fog", "haze", "smoke"]),
    (WeatherCategory::Cloudy, &["cloud", "overcast"]),
    (WeatherCategory::Clear, &["clear", "sunny"]),
    (WeatherCategory::Windy, &["wind", "gust"]),
];

impl WeatherCategory {
    pub fn classify(condition_text: &str) -> Self {
        let text = condition_text.to_lowercase();

        RULES
            .iter()
            .find(|(_, needles)| needles.iter().any(|n| text.contains(n)))
            .map(|(category, _)| *category)
            .unwrap_or(WeatherCategory::Unknown)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherCategory::Clear => "clear",
            WeatherCategory::Cloudy => "cloudy",
            WeatherCategory::Rain => "rain",
            WeatherCategory::Thunderstorm => "thunderstorm",
            WeatherCategory::Snow => "snow",
            WeatherCategory::Fog => "fog",
            WeatherCategory::Windy => "windy",
            WeatherCategory::Unknown => "unknown",
        }
    }

    /// Whether the category implies falling precipitation.
    pub fn is_precipitation(&self) -> bool {
        matches!(
            self,
            WeatherCategory::Rain | WeatherCategory::Thunderstorm | WeatherCategory::Snow
        )
    }
}

impl fmt::Display for WeatherCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_openweather_descriptions() {
        assert_eq!(WeatherCategory::classify("Clear sky"), WeatherCategory::Clear);
        assert_eq!(WeatherCategory::classify("Broken clouds"), WeatherCategory::Cloudy);
        assert_eq!(WeatherCategory::classify("overcast clouds"), WeatherCategory::Cloudy);
        assert_eq!(WeatherCategory::classify("Light rain"), WeatherCategory::Rain);
        assert_eq!(WeatherCategory::classify("shower drizzle"), WeatherCategory::Rain);
        assert_eq!(WeatherCategory::classify("Heavy snow"), WeatherCategory::Snow);
        assert_eq!(WeatherCategory::classify("Haze"), WeatherCategory::Fog);
        assert_eq!(WeatherCategory::classify("Sunny"), WeatherCategory::Clear);
    }

    #[test]
    fn storms_win_over_rain() {
        assert_eq!(
            WeatherCategory::classify("Thunderstorm with light rain"),
            WeatherCategory::Thunderstorm
        );
        assert!(WeatherCategory::Thunderstorm.is_precipitation());
    }

    #[test]
    fn wind_and_unknown() {
        assert_eq!(WeatherCategory::classify("Strong gusts"), WeatherCategory::Windy);
        assert_eq!(WeatherCategory::classify("volcanic ash"), WeatherCategory::Unknown);
        assert_eq!(WeatherCategory::classify(""), WeatherCategory::Unknown);
    }
}
