//! Theme and dark-mode preferences, published to every subscriber.

use anyhow::{Context, Result, anyhow};
use std::{fmt, str::FromStr};
use tokio::sync::watch;

use crate::storage::KeyValueStore;

pub const THEME_KEY: &str = "weather-theme";
pub const MODE_KEY: &str = "weatherapp-theme";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Theme {
    /// Background follows the weather.
    #[default]
    Default,
    Ocean,
    Sunset,
    Forest,
    Rose,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Default => "default",
            Theme::Ocean => "ocean",
            Theme::Sunset => "sunset",
            Theme::Forest => "forest",
            Theme::Rose => "rose",
        }
    }

    pub const fn all() -> &'static [Theme] {
        &[Theme::Default, Theme::Ocean, Theme::Sunset, Theme::Forest, Theme::Rose]
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_lowercase();

        Theme::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| {
                anyhow!("Unknown theme '{s}'. Supported themes: default, ocean, sunset, forest, rose.")
            })
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ThemeSettings {
    pub theme: Theme,
    pub dark_mode: bool,
}

impl ThemeSettings {
    /// Read both preferences; anything missing or unknown falls back to the default.
    pub fn load(backend: &dyn KeyValueStore) -> Self {
        let theme = backend
            .get(THEME_KEY)
            .and_then(|s| s.parse().ok())
            .unwrap_or_default();
        let dark_mode = backend.get(MODE_KEY).is_some_and(|s| s == "dark");

        Self { theme, dark_mode }
    }

    pub fn save(&self, backend: &mut dyn KeyValueStore) -> Result<()> {
        backend
            .set(THEME_KEY, self.theme.as_str())
            .context("Failed to persist theme")?;
        backend
            .set(MODE_KEY, if self.dark_mode { "dark" } else { "light" })
            .context("Failed to persist dark mode")?;
        Ok(())
    }
}

/// Single owner of the theme settings; consumers hold a receiver instead of
/// reading shared globals.
#[derive(Debug)]
pub struct ThemeBroadcaster {
    tx: watch::Sender<ThemeSettings>,
}

impl ThemeBroadcaster {
    pub fn new(initial: ThemeSettings) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    pub fn subscribe(&self) -> watch::Receiver<ThemeSettings> {
        self.tx.subscribe()
    }

    pub fn current(&self) -> ThemeSettings {
        *self.tx.borrow()
    }

    pub fn set_theme(&self, theme: Theme) {
        self.tx.send_if_modified(|s| std::mem::replace(&mut s.theme, theme) != theme);
    }

    pub fn set_dark_mode(&self, dark_mode: bool) {
        self.tx
            .send_if_modified(|s| std::mem::replace(&mut s.dark_mode, dark_mode) != dark_mode);
    }

    pub fn toggle_dark_mode(&self) -> bool {
        let dark = !self.current().dark_mode;
        self.set_dark_mode(dark);
        dark
    }
}

impl Default for ThemeBroadcaster {
    fn default() -> Self {
        Self::new(ThemeSettings::default())
    }
}
