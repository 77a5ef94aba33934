//! Metric/imperial conversions and compass bearings.

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW",
    "NW", "NNW",
];

/// Label used when the provider sends no wind bearing.
pub const UNKNOWN_BEARING: &str = "N/A";

pub fn celsius_to_fahrenheit(c: f64) -> i32 {
    (c * 9.0 / 5.0 + 32.0).round() as i32
}

pub fn mps_to_kph(v: f64) -> i32 {
    (v * 3.6).round() as i32
}

pub fn mps_to_mph(v: f64) -> i32 {
    (v * 2.237).round() as i32
}

/// 16-point compass label for a bearing in degrees, `"N/A"` when absent.
pub fn bearing_to_compass(deg: Option<f64>) -> &'static str {
    let Some(deg) = deg.filter(|d| d.is_finite()) else {
        return UNKNOWN_BEARING;
    };

    let index = (deg / 22.5).round().rem_euclid(16.0) as usize;
    COMPASS_POINTS[index]
}

/// Display unit for temperatures (and, by extension, wind speed).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }
}
