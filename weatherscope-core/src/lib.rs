//! Core library for WeatherScope.
//!
//! This crate defines:
//! - Fetching and normalizing OpenWeather data into a [`WeatherSnapshot`]
//! - Dashboard state (search state machine, unit, carousel, theme)
//! - Search history and favorites, persisted through a key-value backend
//! - A stateless relay to an LLM weather assistant
//!
//! It is used by `weatherscope-cli`, but carries no terminal concerns of its own.

pub mod chat;
pub mod condition;
pub mod config;
pub mod controller;
pub mod dashboard;
pub mod daynight;
pub mod error;
pub mod model;
pub mod provider;
pub mod storage;
pub mod store;
pub mod theme;
pub mod units;
pub mod view;

pub use chat::{ChatBackend, ChatLog, ChatRelay};
pub use condition::WeatherCategory;
pub use config::{ChatConfig, Config};
pub use controller::{PresentationController, SearchPhase, SearchTicket, Slide};
pub use dashboard::{Dashboard, SearchOutcome};
pub use error::{ValidationError, WeatherError};
pub use model::{ChatMessage, ChatRole, WeatherSnapshot};
pub use provider::{HttpTransport, ReqwestTransport, WeatherProvider};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::CityStore;
pub use theme::{Theme, ThemeSettings};
pub use units::TemperatureUnit;
pub use view::WeatherView;
