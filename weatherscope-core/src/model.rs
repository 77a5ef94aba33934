use serde::{Deserialize, Serialize};

/// One normalized weather result for a single city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub location: Location,
    pub current: Current,
    /// `None` when the forecast request failed; current conditions still stand.
    pub forecast: Option<Forecast>,
    pub astronomy: Astronomy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub region: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub text: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Current {
    pub temp_c: i32,
    pub temp_f: i32,
    pub condition: Condition,
    pub humidity: u8,
    pub wind_kph: i32,
    pub wind_mph: i32,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub visibility_km: i32,
    pub uv: f64,
    pub feelslike_c: i32,
    pub feelslike_f: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// The first day is always "today".
    pub forecastday: Vec<ForecastDay>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastDay {
    /// ISO `YYYY-MM-DD`, provider-local.
    pub date: String,
    pub day: DaySummary,
    #[serde(default)]
    pub hour: Vec<ForecastHour>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub maxtemp_c: i32,
    pub maxtemp_f: i32,
    pub mintemp_c: i32,
    pub mintemp_f: i32,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastHour {
    /// Provider-local wall-clock label, e.g. `"3 PM"`.
    pub time: String,
    pub temp_c: i32,
    pub temp_f: i32,
    pub condition: Condition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Astronomy {
    pub astro: Astro,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Astro {
    /// `"h:mm AM"` style, provider-local.
    pub sunrise: String,
    pub sunset: String,
}

impl WeatherSnapshot {
    pub fn today(&self) -> Option<&ForecastDay> {
        self.forecast.as_ref().and_then(|f| f.forecastday.first())
    }
}

/// Author of a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub text: String,
}
