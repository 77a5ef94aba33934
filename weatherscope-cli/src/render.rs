use chrono::Local;
use weatherscope_core::{ChatMessage, ChatRole, Slide, WeatherCategory, WeatherView};

fn category_symbol(category: WeatherCategory, is_night: bool) -> &'static str {
    match category {
        WeatherCategory::Clear if is_night => "\u{1F319}", // CRESCENT MOON
        WeatherCategory::Clear => "\u{1F31E}",             // SUN WITH FACE
        WeatherCategory::Cloudy => "\u{2601}",             // CLOUD
        WeatherCategory::Rain => "\u{1F327}",              // CLOUD WITH RAIN
        WeatherCategory::Thunderstorm => "\u{26C8}",       // THUNDER CLOUD AND RAIN
        WeatherCategory::Snow => "\u{2744}",               // SNOWFLAKE
        WeatherCategory::Fog => "\u{1F32B}",               // FOG
        WeatherCategory::Windy => "\u{1F32C}",             // WIND BLOWING FACE
        WeatherCategory::Unknown => "?",
    }
}

pub fn print_view(view: &WeatherView, slide: Slide, favorite: bool) {
    let star = if favorite { " \u{2605}" } else { "" };
    println!("{}{}", view.location, star);

    match slide {
        Slide::Current => print_current(view),
        Slide::Hourly => print_hourly(view),
        Slide::Daily => print_daily(view),
    }
}

fn print_current(view: &WeatherView) {
    let suffix = view.unit.suffix();

    println!(
        "  {} {}  {}",
        category_symbol(view.category, view.is_night),
        view.temperature_label(),
        view.condition
    );
    println!("  Feels like   {}{suffix}", view.feels_like);
    if let Some((min, max)) = view.today_range {
        println!("  Low / High   {min}{suffix} / {max}{suffix}");
    }
    println!("  Humidity     {}%", view.humidity);
    println!("  Wind         {} {} {}", view.wind_speed, view.wind_unit, view.wind_dir);
    println!("  Pressure     {} mb", view.pressure_mb);
    println!("  Visibility   {} km", view.visibility_km);
    println!("  Sunrise      {}", view.sunrise);
    println!("  Sunset       {}", view.sunset);
    println!("  Updated      {}", Local::now().format("%-I:%M %p"));
    if view.is_night {
        println!("  (night)");
    }
}

fn print_hourly(view: &WeatherView) {
    if view.hourly.is_empty() {
        println!("  No hourly forecast available.");
        return;
    }

    for hour in &view.hourly {
        println!(
            "  {:>5}  {:>4}{}  {}",
            hour.time,
            hour.temperature,
            view.unit.suffix(),
            hour.condition
        );
    }
}

fn print_daily(view: &WeatherView) {
    if view.daily.is_empty() {
        println!("  No daily forecast available.");
        return;
    }

    let suffix = view.unit.suffix();
    for day in &view.daily {
        println!(
            "  {}  {} {:>4}{suffix} / {:>4}{suffix}  {}",
            day.date,
            category_symbol(day.category, false),
            day.min,
            day.max,
            day.condition
        );
    }
}

pub fn print_chat(messages: &[ChatMessage]) {
    for message in messages {
        let who = match message.role {
            ChatRole::User => "you",
            ChatRole::Bot => "bot",
        };
        println!("{who:>4}: {}", message.text);
    }
}
