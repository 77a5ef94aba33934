//! Dashboard state: one search state machine plus orthogonal display settings.

use chrono::NaiveTime;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::{
    error::{ValidationError, WeatherError},
    model::WeatherSnapshot,
    store::MIN_QUERY_LEN,
    theme::{Theme, ThemeBroadcaster, ThemeSettings},
    units::TemperatureUnit,
    view::WeatherView,
};

/// Minimum time between two carousel moves.
pub const SLIDE_COOLDOWN: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchPhase {
    Idle,
    Searching,
    Success,
    Failed,
}

/// Handed out by [`PresentationController::submit`]; only the latest ticket settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
    token: u64,
    city: String,
}

impl SearchTicket {
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Trimmed city the search was issued for.
    pub fn city(&self) -> &str {
        &self.city
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Slide {
    #[default]
    Current,
    Hourly,
    Daily,
}

impl Slide {
    pub const COUNT: usize = 3;

    pub fn index(self) -> usize {
        match self {
            Slide::Current => 0,
            Slide::Hourly => 1,
            Slide::Daily => 2,
        }
    }

    pub fn from_index(index: usize) -> Self {
        match index % Self::COUNT {
            0 => Slide::Current,
            1 => Slide::Hourly,
            _ => Slide::Daily,
        }
    }
}

/// Three-slide carousel that ignores moves during a transition.
#[derive(Debug, Clone, Default)]
pub struct Carousel {
    active: Slide,
    busy_until: Option<Instant>,
}

impl Carousel {
    pub fn active(&self) -> Slide {
        self.active
    }

    pub fn is_transitioning(&self, now: Instant) -> bool {
        self.busy_until.is_some_and(|until| now < until)
    }

    pub fn next_at(&mut self, now: Instant) -> bool {
        self.move_to(Slide::from_index(self.active.index() + 1), now)
    }

    pub fn prev_at(&mut self, now: Instant) -> bool {
        self.move_to(Slide::from_index(self.active.index() + Slide::COUNT - 1), now)
    }

    /// Jumping to the active slide is a no-op.
    pub fn go_to_at(&mut self, slide: Slide, now: Instant) -> bool {
        slide != self.active && self.move_to(slide, now)
    }

    fn move_to(&mut self, slide: Slide, now: Instant) -> bool {
        if self.is_transitioning(now) {
            return false;
        }

        self.active = slide;
        self.busy_until = Some(now + SLIDE_COOLDOWN);
        true
    }
}

#[derive(Debug)]
pub struct PresentationController {
    city: String,
    phase: SearchPhase,
    snapshot: Option<WeatherSnapshot>,
    error: Option<String>,
    validation: Option<ValidationError>,
    latest_token: u64,
    unit: TemperatureUnit,
    carousel: Carousel,
    theme: ThemeBroadcaster,
}

impl PresentationController {
    pub fn new(theme: ThemeSettings) -> Self {
        Self {
            city: String::new(),
            phase: SearchPhase::Idle,
            snapshot: None,
            error: None,
            validation: None,
            latest_token: 0,
            unit: TemperatureUnit::default(),
            carousel: Carousel::default(),
            theme: ThemeBroadcaster::new(theme),
        }
    }

    /// Start a search. Invalid input leaves the search state untouched.
    pub fn submit(&mut self, city: &str) -> Result<SearchTicket, ValidationError> {
        let trimmed = city.trim();
        let check = if trimmed.is_empty() {
            Err(ValidationError::EmptyCity)
        } else if trimmed.chars().count() < MIN_QUERY_LEN {
            Err(ValidationError::CityTooShort)
        } else {
            Ok(())
        };

        if let Err(e) = check {
            self.validation = Some(e);
            return Err(e);
        }

        self.latest_token += 1;
        self.city = trimmed.to_string();
        self.phase = SearchPhase::Searching;
        self.snapshot = None;
        self.error = None;
        self.validation = None;

        debug!("Search submitted - city={}, token={}", self.city, self.latest_token);

        Ok(SearchTicket { token: self.latest_token, city: self.city.clone() })
    }

    /// Apply a search result. Returns `false` if a newer search has since been submitted.
    pub fn settle(
        &mut self,
        ticket: &SearchTicket,
        result: Result<WeatherSnapshot, WeatherError>,
    ) -> bool {
        if ticket.token != self.latest_token || self.phase != SearchPhase::Searching {
            debug!(
                "Discarding stale search result - city={}, token={}, latest={}",
                ticket.city, ticket.token, self.latest_token
            );
            return false;
        }

        match result {
            Ok(snapshot) => {
                self.snapshot = Some(snapshot);
                self.error = None;
                self.phase = SearchPhase::Success;
            }
            Err(e) => {
                self.snapshot = None;
                self.error = Some(e.user_message().to_string());
                self.phase = SearchPhase::Failed;
            }
        }

        true
    }

    pub fn phase(&self) -> SearchPhase {
        self.phase
    }

    pub fn is_loading(&self) -> bool {
        self.phase == SearchPhase::Searching
    }

    pub fn city(&self) -> &str {
        &self.city
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Last rejected input, cleared by the next accepted submit.
    pub fn validation_error(&self) -> Option<ValidationError> {
        self.validation
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    pub fn set_unit(&mut self, unit: TemperatureUnit) {
        self.unit = unit;
    }

    pub fn toggle_unit(&mut self) -> TemperatureUnit {
        self.unit = self.unit.toggled();
        self.unit
    }

    pub fn active_slide(&self) -> Slide {
        self.carousel.active()
    }

    pub fn next_slide(&mut self) -> bool {
        self.carousel.next_at(Instant::now())
    }

    pub fn prev_slide(&mut self) -> bool {
        self.carousel.prev_at(Instant::now())
    }

    pub fn go_to_slide(&mut self, slide: Slide) -> bool {
        self.carousel.go_to_at(slide, Instant::now())
    }

    pub fn theme(&self) -> &ThemeBroadcaster {
        &self.theme
    }

    pub fn theme_settings(&self) -> ThemeSettings {
        self.theme.current()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.theme.set_theme(theme);
    }

    pub fn set_dark_mode(&self, dark_mode: bool) {
        self.theme.set_dark_mode(dark_mode);
    }

    /// View model for the current snapshot, if any.
    pub fn view_at(&self, now: NaiveTime) -> Option<WeatherView> {
        self.snapshot.as_ref().map(|s| WeatherView::build(s, self.unit, now))
    }

    pub fn view(&self) -> Option<WeatherView> {
        self.view_at(chrono::Local::now().time())
    }
}

impl Default for PresentationController {
    fn default() -> Self {
        Self::new(ThemeSettings::default())
    }
}
