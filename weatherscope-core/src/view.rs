//! Unit-resolved view of a snapshot, ready for display.

use chrono::{NaiveTime, Timelike};

use crate::{
    condition::WeatherCategory,
    daynight::is_night_at,
    model::{ForecastHour, WeatherSnapshot},
    units::TemperatureUnit,
};

const HOURLY_ENTRIES: usize = 6;
const DAILY_ENTRIES: usize = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub location: String,
    pub condition: String,
    pub category: WeatherCategory,
    pub is_night: bool,
    pub unit: TemperatureUnit,
    pub temperature: i32,
    pub feels_like: i32,
    /// `(min, max)` for today, when a forecast is available.
    pub today_range: Option<(i32, i32)>,
    pub humidity: u8,
    pub wind_speed: i32,
    pub wind_unit: &'static str,
    pub wind_dir: String,
    pub pressure_mb: f64,
    pub visibility_km: i32,
    pub sunrise: String,
    pub sunset: String,
    pub hourly: Vec<HourView>,
    pub daily: Vec<DayView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HourView {
    pub time: String,
    pub temperature: i32,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayView {
    pub date: String,
    pub min: i32,
    pub max: i32,
    pub condition: String,
    pub category: WeatherCategory,
}

impl WeatherView {
    /// Resolve `snapshot` in `unit`, classifying day/night against local time `now`.
    pub fn build(snapshot: &WeatherSnapshot, unit: TemperatureUnit, now: NaiveTime) -> Self {
        let pick = |c: i32, f: i32| match unit {
            TemperatureUnit::Celsius => c,
            TemperatureUnit::Fahrenheit => f,
        };

        let current = &snapshot.current;
        let astro = &snapshot.astronomy.astro;
        let days = snapshot
            .forecast
            .as_ref()
            .map(|f| f.forecastday.as_slice())
            .unwrap_or_default();

        let today_range = days.first().map(|d| {
            (pick(d.day.mintemp_c, d.day.mintemp_f), pick(d.day.maxtemp_c, d.day.maxtemp_f))
        });

        let (wind_speed, wind_unit) = match unit {
            TemperatureUnit::Celsius => (current.wind_kph, "km/h"),
            TemperatureUnit::Fahrenheit => (current.wind_mph, "mph"),
        };

        // Today's remaining hours first, spilling into tomorrow.
        let hourly = days
            .first()
            .into_iter()
            .flat_map(|today| today.hour.iter().filter(|h| hour_of(h) >= now.hour()))
            .chain(days.iter().skip(1).flat_map(|d| d.hour.iter()))
            .take(HOURLY_ENTRIES)
            .map(|h| HourView {
                time: h.time.clone(),
                temperature: pick(h.temp_c, h.temp_f),
                condition: h.condition.text.clone(),
            })
            .collect();

        let daily = days
            .iter()
            .skip(1)
            .take(DAILY_ENTRIES)
            .map(|d| DayView {
                date: d.date.clone(),
                min: pick(d.day.mintemp_c, d.day.mintemp_f),
                max: pick(d.day.maxtemp_c, d.day.maxtemp_f),
                condition: d.day.condition.text.clone(),
                category: WeatherCategory::classify(&d.day.condition.text),
            })
            .collect();

        Self {
            location: if snapshot.location.country.is_empty() {
                snapshot.location.name.clone()
            } else {
                format!("{}, {}", snapshot.location.name, snapshot.location.country)
            },
            condition: current.condition.text.clone(),
            category: WeatherCategory::classify(&current.condition.text),
            is_night: is_night_at(Some(astro.sunrise.as_str()), Some(astro.sunset.as_str()), now),
            unit,
            temperature: pick(current.temp_c, current.temp_f),
            feels_like: pick(current.feelslike_c, current.feelslike_f),
            today_range,
            humidity: current.humidity,
            wind_speed,
            wind_unit,
            wind_dir: current.wind_dir.clone(),
            pressure_mb: current.pressure_mb,
            visibility_km: current.visibility_km,
            sunrise: astro.sunrise.clone(),
            sunset: astro.sunset.clone(),
            hourly,
            daily,
        }
    }

    pub fn temperature_label(&self) -> String {
        format!("{}{}", self.temperature, self.unit.suffix())
    }
}

/// Hour of day (0-23) from an `"h AM"` label; unknown labels sort first.
fn hour_of(hour: &ForecastHour) -> u32 {
    let mut parts = hour.time.split_whitespace();
    let h: u32 = parts.next().and_then(|h| h.parse().ok()).unwrap_or(0) % 12;
    match parts.next() {
        Some(p) if p.eq_ignore_ascii_case("PM") => h + 12,
        _ => h,
    }
}
