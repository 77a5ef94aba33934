use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};
use serde::Deserialize;
use std::{collections::BTreeMap, sync::Arc, time::Instant};
use tracing::{debug, info, warn};

use crate::{
    error::WeatherError,
    model::{
        Astro, Astronomy, Condition, Current, DaySummary, Forecast, ForecastDay, ForecastHour,
        Location, WeatherSnapshot,
    },
    units::{bearing_to_compass, celsius_to_fahrenheit, mps_to_kph, mps_to_mph},
};

use super::{
    WeatherProvider,
    http::{HttpTransport, truncate_body},
};

/// Visibility reported when the provider leaves it out.
const DEFAULT_VISIBILITY_KM: i32 = 10;
/// Upcoming days kept after "today".
const UPCOMING_DAYS: usize = 3;
const NOON_SECS: i64 = 12 * 3600;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Arc<dyn HttpTransport>,
}

impl OpenWeatherProvider {
    pub fn new(api_key: String, base_url: String, http: Arc<dyn HttpTransport>) -> Self {
        Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    async fn fetch_current(&self, city: &str) -> Result<OwCurrentResponse, WeatherError> {
        let url = format!("{}/weather", self.base_url);
        let start = Instant::now();

        let res = self
            .http
            .get(&url, &[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .await
            .map_err(|e| {
                warn!("OpenWeather current request failed - city={city}, error={e:#}");
                WeatherError::fetch_failed(format!("{e:#}"))
            })?;

        debug!(
            "OpenWeather current response - city={}, status={}, duration={:.2}s",
            city,
            res.status,
            start.elapsed().as_secs_f32()
        );

        match res.status {
            404 => return Err(WeatherError::CityNotFound),
            401 => return Err(WeatherError::ServiceUnavailable),
            _ if !res.is_success() => {
                return Err(WeatherError::fetch_failed(format!(
                    "OpenWeather current request failed with status {}: {}",
                    res.status,
                    truncate_body(&res.body),
                )));
            }
            _ => {}
        }

        serde_json::from_str(&res.body).map_err(|e| {
            WeatherError::fetch_failed(format!("Failed to parse OpenWeather current JSON: {e}"))
        })
    }

    /// Best effort: any failure yields `None`.
    async fn fetch_forecast(&self, city: &str) -> Option<OwForecastResponse> {
        let url = format!("{}/forecast", self.base_url);
        let start = Instant::now();

        let res = match self
            .http
            .get(&url, &[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .await
        {
            Ok(res) => res,
            Err(e) => {
                warn!("OpenWeather forecast request failed - city={city}, error={e:#}");
                return None;
            }
        };

        debug!(
            "OpenWeather forecast response - city={}, status={}, duration={:.2}s",
            city,
            res.status,
            start.elapsed().as_secs_f32()
        );

        if !res.is_success() {
            warn!(
                "OpenWeather forecast request failed with status {} - city={}",
                res.status, city
            );
            return None;
        }

        match serde_json::from_str(&res.body) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Failed to parse OpenWeather forecast JSON - city={city}, error={e}");
                None
            }
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
        let city = city.trim();

        let current = self.fetch_current(city).await?;
        let forecast = self.fetch_forecast(city).await;

        info!(
            "Weather fetched - city={}, resolved={}, forecast={}",
            city,
            current.name,
            forecast.is_some()
        );

        Ok(normalize(&current, forecast.as_ref(), Utc::now()))
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    feels_like: f64,
    temp_min: Option<f64>,
    temp_max: Option<f64>,
    humidity: u8,
    #[serde(default)]
    pressure: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct OwWeather {
    description: String,
    #[serde(default)]
    icon: String,
}

#[derive(Debug, Default, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: f64,
    deg: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    country: Option<String>,
    sunrise: Option<i64>,
    sunset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    dt: Option<i64>,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: OwWind,
    /// Metres.
    visibility: Option<f64>,
    #[serde(default)]
    sys: OwSys,
    /// Offset from UTC in seconds.
    #[serde(default)]
    timezone: i64,
}

#[derive(Debug, Default, Deserialize)]
struct OwCity {
    timezone: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct OwForecastMain {
    temp: f64,
    temp_min: f64,
    temp_max: f64,
}

#[derive(Debug, Deserialize)]
struct OwForecastEntry {
    dt: i64,
    main: OwForecastMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwForecastResponse {
    #[serde(default)]
    city: OwCity,
    list: Vec<OwForecastEntry>,
}

fn normalize(
    current: &OwCurrentResponse,
    forecast: Option<&OwForecastResponse>,
    now: DateTime<Utc>,
) -> WeatherSnapshot {
    let weather = current.weather.first();
    let description = weather.map(|w| w.description.as_str()).unwrap_or("Unknown");
    let icon = weather.map(|w| w.icon.clone()).unwrap_or_default();

    let temp_c = current.main.temp.round() as i32;
    let feelslike_c = current.main.feels_like.round() as i32;
    let country = current.sys.country.clone().unwrap_or_default();

    let local_now = local_datetime(current.dt.unwrap_or_else(|| now.timestamp()), current.timezone);
    let today = local_now.map(|dt| dt.date()).unwrap_or_else(|| now.date_naive());

    let forecast = forecast.map(|fc| {
        let tz = fc.city.timezone.unwrap_or(current.timezone);
        let max_c = current.main.temp_max.unwrap_or(current.main.temp).round() as i32;
        let min_c = current.main.temp_min.unwrap_or(current.main.temp).round() as i32;

        let mut forecastday = vec![ForecastDay {
            date: today.format("%Y-%m-%d").to_string(),
            day: DaySummary {
                maxtemp_c: max_c,
                maxtemp_f: celsius_to_fahrenheit(f64::from(max_c)),
                mintemp_c: min_c,
                mintemp_f: celsius_to_fahrenheit(f64::from(min_c)),
                condition: Condition { text: description.to_string(), icon: icon.clone() },
            },
            hour: Vec::new(),
        }];

        let mut by_date: BTreeMap<NaiveDate, Vec<(NaiveDateTime, &OwForecastEntry)>> =
            BTreeMap::new();
        for entry in &fc.list {
            if let Some(local) = local_datetime(entry.dt, tz) {
                by_date.entry(local.date()).or_default().push((local, entry));
            }
        }

        if let Some(entries) = by_date.get(&today) {
            forecastday[0].hour = entries.iter().map(|(local, e)| hour_entry(*local, e)).collect();
        }

        forecastday.extend(
            by_date
                .range(today.succ_opt().unwrap_or(today)..)
                .filter(|(date, _)| **date > today)
                .take(UPCOMING_DAYS)
                .map(|(date, entries)| aggregate_day(*date, entries)),
        );

        Forecast { forecastday }
    });

    WeatherSnapshot {
        location: Location {
            name: current.name.clone(),
            region: country.clone(),
            country,
        },
        current: Current {
            temp_c,
            temp_f: celsius_to_fahrenheit(f64::from(temp_c)),
            condition: Condition { text: capitalize(description), icon },
            humidity: current.main.humidity.min(100),
            wind_kph: mps_to_kph(current.wind.speed.max(0.0)),
            wind_mph: mps_to_mph(current.wind.speed.max(0.0)),
            wind_dir: bearing_to_compass(current.wind.deg).to_string(),
            pressure_mb: current.main.pressure,
            visibility_km: current
                .visibility
                .map(|m| (m / 1000.0).round() as i32)
                .unwrap_or(DEFAULT_VISIBILITY_KM),
            uv: 0.0,
            feelslike_c,
            feelslike_f: celsius_to_fahrenheit(f64::from(feelslike_c)),
        },
        forecast,
        astronomy: Astronomy {
            astro: Astro {
                sunrise: current
                    .sys
                    .sunrise
                    .and_then(|ts| format_clock(ts, current.timezone))
                    .unwrap_or_default(),
                sunset: current
                    .sys
                    .sunset
                    .and_then(|ts| format_clock(ts, current.timezone))
                    .unwrap_or_default(),
            },
        },
    }
}

fn hour_entry(local: NaiveDateTime, entry: &OwForecastEntry) -> ForecastHour {
    let temp_c = entry.main.temp.round() as i32;

    ForecastHour {
        time: local.format("%-I %p").to_string(),
        temp_c,
        temp_f: celsius_to_fahrenheit(f64::from(temp_c)),
        condition: entry_condition(entry),
    }
}

fn aggregate_day(date: NaiveDate, entries: &[(NaiveDateTime, &OwForecastEntry)]) -> ForecastDay {
    let min = entries.iter().map(|(_, e)| e.main.temp_min).fold(f64::INFINITY, f64::min);
    let max = entries.iter().map(|(_, e)| e.main.temp_max).fold(f64::NEG_INFINITY, f64::max);
    let min_c = min.round() as i32;
    let max_c = max.round() as i32;

    let representative = entries
        .iter()
        .min_by_key(|(local, _)| (local.time().num_seconds_from_midnight() as i64 - NOON_SECS).abs())
        .map(|(_, e)| entry_condition(e))
        .unwrap_or_else(|| Condition { text: "Unknown".to_string(), icon: String::new() });

    ForecastDay {
        date: date.format("%Y-%m-%d").to_string(),
        day: DaySummary {
            maxtemp_c: max_c,
            maxtemp_f: celsius_to_fahrenheit(f64::from(max_c)),
            mintemp_c: min_c,
            mintemp_f: celsius_to_fahrenheit(f64::from(min_c)),
            condition: representative,
        },
        hour: entries.iter().map(|(local, e)| hour_entry(*local, e)).collect(),
    }
}

fn entry_condition(entry: &OwForecastEntry) -> Condition {
    entry
        .weather
        .first()
        .map(|w| Condition { text: capitalize(&w.description), icon: w.icon.clone() })
        .unwrap_or_else(|| Condition { text: "Unknown".to_string(), icon: String::new() })
}

/// Provider wall clock for a Unix timestamp and a UTC offset in seconds.
fn local_datetime(ts: i64, offset_secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(ts.checked_add(offset_secs)?, 0).map(|dt| dt.naive_utc())
}

/// `"6:05 AM"` style, no seconds.
fn format_clock(ts: i64, offset_secs: i64) -> Option<String> {
    local_datetime(ts, offset_secs).map(|dt| dt.format("%-I:%M %p").to_string())
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
