//! Day/night decision from provider sunrise/sunset strings.

use chrono::{Local, NaiveTime, Timelike};

const FALLBACK_DAWN_MINUTES: u32 = 6 * 60;
const FALLBACK_DUSK_MINUTES: u32 = 18 * 60;

/// Parse a `"h:mm AM"` / `"hh:mm PM"` string into minutes since midnight.
pub fn parse_clock_minutes(s: &str) -> Option<u32> {
    let (time, period) = s.trim().split_once(' ')?;
    let (h, m) = time.split_once(':')?;
    let hours: u32 = h.trim().parse().ok()?;
    let minutes: u32 = m.trim().parse().ok()?;

    if !(1..=12).contains(&hours) || minutes >= 60 {
        return None;
    }

    let hours = match period.trim().to_ascii_uppercase().as_str() {
        "AM" if hours == 12 => 0,
        "AM" => hours,
        "PM" if hours == 12 => 12,
        "PM" => hours + 12,
        _ => return None,
    };

    Some(hours * 60 + minutes)
}

/// Night means strictly before sunrise or strictly after sunset.
///
/// If either time is missing or unparseable, night is before 06:00 or after 18:00.
pub fn is_night_at(sunrise: Option<&str>, sunset: Option<&str>, now: NaiveTime) -> bool {
    let current = now.hour() * 60 + now.minute();

    match (sunrise.and_then(parse_clock_minutes), sunset.and_then(parse_clock_minutes)) {
        (Some(rise), Some(set)) => current < rise || current > set,
        _ => current < FALLBACK_DAWN_MINUTES || current > FALLBACK_DUSK_MINUTES,
    }
}

/// [`is_night_at`] against the local wall clock.
pub fn is_night(sunrise: Option<&str>, sunset: Option<&str>) -> bool {
    is_night_at(sunrise, sunset, Local::now().time())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).expect("valid time")
    }

    #[test]
    fn parses_twelve_hour_clock() {
        assert_eq!(parse_clock_minutes("6:30 AM"), Some(390));
        assert_eq!(parse_clock_minutes("07:45 PM"), Some(19 * 60 + 45));
        assert_eq!(parse_clock_minutes("12:05 AM"), Some(5));
        assert_eq!(parse_clock_minutes("12:00 PM"), Some(720));
        assert_eq!(parse_clock_minutes("12:59 pm"), Some(779));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_clock_minutes(""), None);
        assert_eq!(parse_clock_minutes("18:00"), None);
        assert_eq!(parse_clock_minutes("13:00 PM"), None);
        assert_eq!(parse_clock_minutes("6:75 AM"), None);
        assert_eq!(parse_clock_minutes("6:30 XM"), None);
    }

    #[test]
    fn uses_sunrise_and_sunset_when_known() {
        let rise = Some("6:30 AM");
        let set = Some("7:45 PM");
        assert!(!is_night_at(rise, set, at(12, 0)));
        assert!(is_night_at(rise, set, at(22, 0)));
        assert!(is_night_at(rise, set, at(6, 29)));
        // Boundaries themselves count as day.
        assert!(!is_night_at(rise, set, at(6, 30)));
        assert!(!is_night_at(rise, set, at(19, 45)));
        assert!(is_night_at(rise, set, at(19, 46)));
    }

    #[test]
    fn falls_back_to_fixed_hours() {
        assert!(is_night_at(None, None, at(23, 0)));
        assert!(!is_night_at(None, None, at(12, 0)));
        assert!(is_night_at(Some("6:30 AM"), Some("nonsense"), at(5, 59)));
        assert!(!is_night_at(Some("6:30 AM"), None, at(18, 0)));
    }
}
