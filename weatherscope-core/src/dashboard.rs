//! Caller-facing actions: search, favorites, theme. Owns the controller and store.

use anyhow::Result;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{info, warn};

use crate::{
    controller::PresentationController,
    error::ValidationError,
    provider::WeatherProvider,
    store::CityStore,
    theme::{Theme, ThemeSettings},
};

/// What happened to a submitted search once its request finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Applied,
    /// A later search was submitted first; this result was dropped.
    Superseded,
}

#[derive(Debug)]
pub struct Dashboard {
    provider: Arc<dyn WeatherProvider>,
    controller: Mutex<PresentationController>,
    store: Mutex<CityStore>,
}

impl Dashboard {
    /// Restores persisted theme preferences from the store's backend.
    pub fn new(provider: Arc<dyn WeatherProvider>, store: CityStore) -> Self {
        let theme = ThemeSettings::load(store.backend());

        Self {
            provider,
            controller: Mutex::new(PresentationController::new(theme)),
            store: Mutex::new(store),
        }
    }

    pub async fn controller(&self) -> MutexGuard<'_, PresentationController> {
        self.controller.lock().await
    }

    pub async fn store(&self) -> MutexGuard<'_, CityStore> {
        self.store.lock().await
    }

    /// Validate, record history, fetch, then settle if still the latest search.
    ///
    /// Locks are never held across the network call, so overlapping searches
    /// run concurrently and the last submitted one wins.
    pub async fn search(&self, city: &str) -> Result<SearchOutcome, ValidationError> {
        let ticket = self.controller.lock().await.submit(city)?;

        if let Err(e) = self.store.lock().await.record_search(ticket.city()) {
            warn!("Failed to record search history - city={}, error={e:#}", ticket.city());
        }

        let result = self.provider.fetch_weather(ticket.city()).await;

        if self.controller.lock().await.settle(&ticket, result) {
            info!("Search settled - city={}", ticket.city());
            Ok(SearchOutcome::Applied)
        } else {
            Ok(SearchOutcome::Superseded)
        }
    }

    /// Star or un-star `city`. Returns whether it is now a favorite.
    pub async fn toggle_favorite(&self, city: &str) -> Result<bool> {
        self.store.lock().await.toggle_favorite(city)
    }

    pub async fn favorites(&self) -> Vec<String> {
        self.store.lock().await.favorites().to_vec()
    }

    pub async fn history(&self) -> Vec<String> {
        self.store.lock().await.history().to_vec()
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        let settings = {
            let controller = self.controller.lock().await;
            controller.set_theme(theme);
            controller.theme_settings()
        };
        settings.save(self.store.lock().await.backend_mut())
    }

    pub async fn set_dark_mode(&self, dark_mode: bool) -> Result<()> {
        let settings = {
            let controller = self.controller.lock().await;
            controller.set_dark_mode(dark_mode);
            controller.theme_settings()
        };
        settings.save(self.store.lock().await.backend_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        controller::SearchPhase,
        error::WeatherError,
        model::*,
        storage::{KeyValueStore, MemoryStore},
        theme::{MODE_KEY, THEME_KEY},
    };
    use async_trait::async_trait;
    use std::time::Duration;

    /// Atlantis is slow and missing; every other city resolves immediately.
    #[derive(Debug)]
    struct FakeProvider;

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn fetch_weather(&self, city: &str) -> Result<WeatherSnapshot, WeatherError> {
            if city == "Atlantis" {
                tokio::time::sleep(Duration::from_millis(50)).await;
                return Err(WeatherError::CityNotFound);
            }

            Ok(WeatherSnapshot {
                location: Location {
                    name: city.to_string(),
                    region: "XX".into(),
                    country: "XX".into(),
                },
                current: Current {
                    temp_c: 18,
                    temp_f: 64,
                    condition: Condition { text: "Few clouds".into(), icon: "02d".into() },
                    humidity: 60,
                    wind_kph: 11,
                    wind_mph: 7,
                    wind_dir: "W".into(),
                    pressure_mb: 1012.0,
                    visibility_km: 10,
                    uv: 0.0,
                    feelslike_c: 17,
                    feelslike_f: 63,
                },
                forecast: None,
                astronomy: Astronomy {
                    astro: Astro { sunrise: "6:00 AM".into(), sunset: "9:00 PM".into() },
                },
            })
        }
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(Arc::new(FakeProvider), CityStore::load(Box::new(MemoryStore::default())))
    }

    #[tokio::test]
    async fn not_found_ends_failed() {
        let dash = dashboard();

        let outcome = dash.search("Atlantis").await.unwrap();
        assert_eq!(outcome, SearchOutcome::Applied);

        let ctl = dash.controller().await;
        assert_eq!(ctl.phase(), SearchPhase::Failed);
        assert!(ctl.error().unwrap().contains("City not found"));
        assert!(ctl.snapshot().is_none());
    }

    #[tokio::test]
    async fn later_submission_wins_even_if_it_resolves_first() {
        let dash = dashboard();

        let (first, second) = tokio::join!(dash.search("Atlantis"), async {
            // Let the first search submit before this one.
            tokio::task::yield_now().await;
            dash.search("Paris").await
        });

        assert_eq!(first.unwrap(), SearchOutcome::Superseded);
        assert_eq!(second.unwrap(), SearchOutcome::Applied);

        let ctl = dash.controller().await;
        assert_eq!(ctl.phase(), SearchPhase::Success);
        assert_eq!(ctl.city(), "Paris");
        assert_eq!(ctl.snapshot().unwrap().location.name, "Paris");
        assert!(ctl.error().is_none());
    }

    #[tokio::test]
    async fn invalid_input_makes_no_request_and_no_history() {
        let dash = dashboard();

        assert_eq!(dash.search(" ").await.unwrap_err(), ValidationError::EmptyCity);
        assert_eq!(dash.search("Q").await.unwrap_err(), ValidationError::CityTooShort);

        assert_eq!(dash.controller().await.phase(), SearchPhase::Idle);
        assert!(dash.history().await.is_empty());
    }

    #[tokio::test]
    async fn searches_are_recorded_in_history() {
        let dash = dashboard();

        dash.search("Paris").await.unwrap();
        dash.search(" Paris ").await.unwrap();
        dash.search("London").await.unwrap();

        assert_eq!(dash.history().await, ["London", "Paris"]);
    }

    #[tokio::test]
    async fn favorites_toggle() {
        let dash = dashboard();

        assert!(dash.toggle_favorite("Tokyo").await.unwrap());
        assert_eq!(dash.favorites().await, ["Tokyo"]);
        assert!(!dash.toggle_favorite("Tokyo").await.unwrap());
        assert!(dash.favorites().await.is_empty());
    }

    #[tokio::test]
    async fn theme_preferences_are_persisted_and_restored() {
        let dash = dashboard();
        let rx = dash.controller().await.theme().subscribe();

        dash.set_theme(Theme::Rose).await.unwrap();
        dash.set_dark_mode(true).await.unwrap();
        assert_eq!(*rx.borrow(), ThemeSettings { theme: Theme::Rose, dark_mode: true });

        let mut backend = MemoryStore::default();
        {
            let store = dash.store().await;
            for key in [THEME_KEY, MODE_KEY] {
                backend.set(key, &store.backend().get(key).unwrap()).unwrap();
            }
        }

        let restored = Dashboard::new(Arc::new(FakeProvider), CityStore::load(Box::new(backend)));
        assert_eq!(
            restored.controller().await.theme_settings(),
            ThemeSettings { theme: Theme::Rose, dark_mode: true }
        );
    }
}
