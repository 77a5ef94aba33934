use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

pub const DEFAULT_WEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
pub const DEFAULT_CHAT_MODEL: &str = "google/gemini-pro-1.5";
pub const DEFAULT_CHAT_MAX_TOKENS: u32 = 512;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

/// Chat relay settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Relay endpoint accepting `{ "message": .. }` and answering `{ "reply": .. }`.
    pub endpoint: Option<String>,

    /// Used to call OpenRouter directly when no relay endpoint is set.
    pub openrouter_api_key: Option<String>,

    pub model: String,
    pub max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            openrouter_api_key: None,
            model: DEFAULT_CHAT_MODEL.to_string(),
            max_tokens: DEFAULT_CHAT_MAX_TOKENS,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// openweather_api_key = "..."
/// request_timeout_secs = 10
///
/// [chat]
/// endpoint = "http://localhost:3000/api/ai-chat"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub openweather_api_key: Option<String>,
    pub weather_base_url: String,
    pub request_timeout_secs: u64,

    /// Overrides the platform data directory holding persisted favorites and history.
    pub data_dir: Option<PathBuf>,

    pub chat: ChatConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            openweather_api_key: None,
            weather_base_url: DEFAULT_WEATHER_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            data_dir: None,
            chat: ChatConfig::default(),
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "weatherscope", "weatherscope")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Directory holding persisted dashboard state.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.data_dir().to_path_buf()),
        }
    }

    pub fn set_openweather_api_key(&mut self, api_key: String) {
        self.openweather_api_key = Some(api_key);
    }

    /// Returns the OpenWeather key, with a configuration hint when absent.
    pub fn openweather_api_key(&self) -> Result<&str> {
        self.openweather_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No OpenWeather API key configured.\n\
                     Hint: run `weatherscope configure` and enter your API key."
                )
            })
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.openweather_api_key().unwrap_err();

        assert!(err.to_string().contains("No OpenWeather API key configured"));
        assert!(err.to_string().contains("weatherscope configure"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_openweather_api_key("   ".into());
        assert!(cfg.openweather_api_key().is_err());
    }

    #[test]
    fn set_api_key() {
        let mut cfg = Config::default();
        cfg.set_openweather_api_key("OPEN_KEY".into());

        assert_eq!(cfg.openweather_api_key().expect("key must exist"), "OPEN_KEY");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = Config::from_toml(
            r#"
            openweather_api_key = "abc"

            [chat]
            endpoint = "http://localhost:3000/api/ai-chat"
            "#,
        )
        .expect("valid toml");

        assert_eq!(cfg.openweather_api_key.as_deref(), Some("abc"));
        assert_eq!(cfg.weather_base_url, DEFAULT_WEATHER_BASE_URL);
        assert_eq!(cfg.request_timeout(), Duration::from_secs(10));
        assert_eq!(cfg.chat.model, DEFAULT_CHAT_MODEL);
        assert_eq!(cfg.chat.max_tokens, 512);
        assert_eq!(cfg.chat.endpoint.as_deref(), Some("http://localhost:3000/api/ai-chat"));
    }

    #[test]
    fn zero_timeout_is_clamped() {
        let cfg = Config { request_timeout_secs: 0, ..Config::default() };
        assert_eq!(cfg.request_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn explicit_data_dir_wins() {
        let cfg = Config { data_dir: Some(PathBuf::from("/tmp/ws")), ..Config::default() };
        assert_eq!(cfg.data_dir().expect("data dir"), PathBuf::from("/tmp/ws"));
    }

    #[test]
    fn toml_roundtrip_preserves_chat_settings() {
        let mut cfg = Config::default();
        cfg.chat.openrouter_api_key = Some("or-key".into());
        cfg.chat.max_tokens = 256;

        let text = toml::to_string_pretty(&cfg).expect("serialize");
        let back = Config::from_toml(&text).expect("parse");

        assert_eq!(back.chat.openrouter_api_key.as_deref(), Some("or-key"));
        assert_eq!(back.chat.max_tokens, 256);
    }
}
