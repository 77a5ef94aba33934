//! Search history and favorite cities, persisted through a [`KeyValueStore`].

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::storage::KeyValueStore;

pub const FAVORITES_KEY: &str = "weather-favorites";
pub const HISTORY_KEY: &str = "weather-history";

pub const MAX_HISTORY: usize = 5;
pub const MAX_FAVORITES: usize = 8;
/// Shortest query that is recorded or suggested for.
pub const MIN_QUERY_LEN: usize = 2;
const MAX_SUGGESTIONS: usize = 5;

const POPULAR_CITIES: [&str; 15] = [
    "London",
    "New York",
    "Tokyo",
    "Paris",
    "Sydney",
    "Mumbai",
    "Berlin",
    "Toronto",
    "Dubai",
    "Singapore",
    "Hong Kong",
    "Los Angeles",
    "Madrid",
    "Rome",
    "Bangkok",
];

#[derive(Debug)]
pub struct CityStore {
    backend: Box<dyn KeyValueStore>,
    history: Vec<String>,
    favorites: Vec<String>,
}

impl CityStore {
    /// Load both lists once; absent or unparseable entries become empty lists.
    pub fn load(backend: Box<dyn KeyValueStore>) -> Self {
        let history = read_list(backend.as_ref(), HISTORY_KEY);
        let favorites = read_list(backend.as_ref(), FAVORITES_KEY);

        debug!(
            "City store loaded - history={}, favorites={}",
            history.len(),
            favorites.len()
        );

        Self { backend, history, favorites }
    }

    /// Most recent first.
    pub fn history(&self) -> &[String] {
        &self.history
    }

    /// Most recent first.
    pub fn favorites(&self) -> &[String] {
        &self.favorites
    }

    pub fn is_favorite(&self, city: &str) -> bool {
        let city = city.trim();
        self.favorites.iter().any(|c| c == city)
    }

    /// Prepend `city`, dropping an earlier identical entry. Short input is ignored.
    pub fn record_search(&mut self, city: &str) -> Result<()> {
        let city = city.trim();
        if city.chars().count() < MIN_QUERY_LEN {
            return Ok(());
        }

        let mut history = self.history.clone();
        history.retain(|c| c != city);
        history.insert(0, city.to_string());
        history.truncate(MAX_HISTORY);

        write_list(self.backend.as_mut(), HISTORY_KEY, &history)?;
        self.history = history;
        Ok(())
    }

    pub fn clear_history(&mut self) -> Result<()> {
        write_list(self.backend.as_mut(), HISTORY_KEY, &[])?;
        self.history.clear();
        Ok(())
    }

    /// Remove `city` if starred, otherwise star it. Returns whether it is now a favorite.
    ///
    /// The in-memory list only changes once the backend write succeeded.
    pub fn toggle_favorite(&mut self, city: &str) -> Result<bool> {
        let city = city.trim();
        if city.is_empty() {
            return Ok(false);
        }

        let mut favorites = self.favorites.clone();
        let now_favorite = if favorites.iter().any(|c| c == city) {
            favorites.retain(|c| c != city);
            false
        } else {
            favorites.insert(0, city.to_string());
            favorites.truncate(MAX_FAVORITES);
            true
        };

        write_list(self.backend.as_mut(), FAVORITES_KEY, &favorites)?;
        self.favorites = favorites;
        Ok(now_favorite)
    }

    pub fn backend_mut(&mut self) -> &mut dyn KeyValueStore {
        self.backend.as_mut()
    }

    pub fn backend(&self) -> &dyn KeyValueStore {
        self.backend.as_ref()
    }
}

fn read_list(backend: &dyn KeyValueStore, key: &str) -> Vec<String> {
    let Some(raw) = backend.get(key) else {
        return Vec::new();
    };

    serde_json::from_str(&raw).unwrap_or_else(|e| {
        warn!("Ignoring unparseable stored list - key={key}, error={e}");
        Vec::new()
    })
}

fn write_list(backend: &mut dyn KeyValueStore, key: &str, list: &[String]) -> Result<()> {
    let json = serde_json::to_string(list).context("Failed to serialize city list")?;
    backend
        .set(key, &json)
        .with_context(|| format!("Failed to persist '{key}'"))
}

/// Strip characters the search box never accepts.
pub fn sanitize_city_input(input: &str) -> String {
    input.chars().filter(|c| !matches!(c, '<' | '>')).collect()
}

/// Popular cities containing `input`, excluding an exact match.
pub fn suggest(input: &str) -> Vec<&'static str> {
    let needle = input.trim().to_lowercase();
    if needle.chars().count() < MIN_QUERY_LEN {
        return Vec::new();
    }

    POPULAR_CITIES
        .iter()
        .copied()
        .filter(|city| {
            let lower = city.to_lowercase();
            lower.contains(&needle) && lower != needle
        })
        .take(MAX_SUGGESTIONS)
        .collect()
}
