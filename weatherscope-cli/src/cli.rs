use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Password, Text};
use std::sync::Arc;

use weatherscope_core::{
    ChatLog, ChatRelay, CityStore, Config, Dashboard, FileStore, HttpTransport, ReqwestTransport,
    SearchPhase, Slide, TemperatureUnit, Theme, ThemeSettings, chat::backend_from_config,
    provider::provider_from_config,
    store::{sanitize_city_input, suggest},
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherscope", version, about = "WeatherScope dashboard in the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SlideArg {
    Current,
    Hourly,
    Daily,
}

impl From<SlideArg> for Slide {
    fn from(value: SlideArg) -> Self {
        match value {
            SlideArg::Current => Slide::Current,
            SlideArg::Hourly => Slide::Hourly,
            SlideArg::Daily => Slide::Daily,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Configure the OpenWeather key and the chat backend.
    Configure,

    /// Show weather for a city.
    Show {
        /// City name, e.g. "Paris".
        city: String,

        /// Display temperatures in °F and wind in mph.
        #[arg(long)]
        fahrenheit: bool,

        /// Which view to print.
        #[arg(long, value_enum, default_value = "current")]
        slide: SlideArg,
    },

    /// Star or un-star a city.
    Favorite { city: String },

    /// List starred cities.
    Favorites,

    /// List recent searches.
    History {
        /// Forget all recent searches.
        #[arg(long)]
        clear: bool,
    },

    /// Show or change the theme and dark mode.
    Theme {
        /// One of: default, ocean, sunset, forest, rose.
        name: Option<Theme>,

        #[arg(long, conflicts_with = "light")]
        dark: bool,

        #[arg(long)]
        light: bool,
    },

    /// Suggest popular cities matching the input.
    Suggest { text: String },

    /// Ask the weather assistant. Without a question, starts an interactive chat.
    Chat { question: Option<String> },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let config = Config::load()?;

        match self.command {
            Command::Configure => configure(config),
            Command::Show { city, fahrenheit, slide } => {
                show(&config, &city, fahrenheit, slide.into()).await
            }
            Command::Favorite { city } => {
                let mut store = open_store(&config)?;
                let city = sanitize_city_input(&city);
                if store.toggle_favorite(&city)? {
                    println!("Added {} to favorites.", city.trim());
                } else {
                    println!("Removed {} from favorites.", city.trim());
                }
                Ok(())
            }
            Command::Favorites => {
                print_list("No favorite cities yet.", open_store(&config)?.favorites());
                Ok(())
            }
            Command::History { clear } => {
                let mut store = open_store(&config)?;
                if clear {
                    store.clear_history()?;
                    println!("Search history cleared.");
                } else {
                    print_list("No recent searches.", store.history());
                }
                Ok(())
            }
            Command::Theme { name, dark, light } => {
                let mut store = open_store(&config)?;
                let mut settings = ThemeSettings::load(store.backend());

                if let Some(theme) = name {
                    settings.theme = theme;
                }
                if dark || light {
                    settings.dark_mode = dark;
                }
                if name.is_some() || dark || light {
                    settings.save(store.backend_mut())?;
                }

                let mode = if settings.dark_mode { "dark" } else { "light" };
                println!("Theme: {} ({mode})", settings.theme);
                Ok(())
            }
            Command::Suggest { text } => {
                let matches = suggest(&sanitize_city_input(&text));
                if matches.is_empty() {
                    println!("No suggestions.");
                }
                for city in matches {
                    println!("{city}");
                }
                Ok(())
            }
            Command::Chat { question } => chat(&config, question).await,
        }
    }
}

fn transport(config: &Config) -> anyhow::Result<Arc<dyn HttpTransport>> {
    Ok(Arc::new(ReqwestTransport::new(config.request_timeout())?))
}

fn open_store(config: &Config) -> anyhow::Result<CityStore> {
    let dir = config.data_dir()?;
    Ok(CityStore::load(Box::new(FileStore::open(&dir))))
}

fn print_list(empty: &str, items: &[String]) {
    if items.is_empty() {
        println!("{empty}");
    }
    for (i, item) in items.iter().enumerate() {
        println!("{:>2}. {item}", i + 1);
    }
}

async fn show(config: &Config, city: &str, fahrenheit: bool, slide: Slide) -> anyhow::Result<()> {
    let provider = provider_from_config(config, transport(config)?)?;
    let dashboard = Dashboard::new(Arc::from(provider), open_store(config)?);

    dashboard.search(&sanitize_city_input(city)).await?;

    let mut controller = dashboard.controller().await;
    if fahrenheit {
        controller.set_unit(TemperatureUnit::Fahrenheit);
    }
    controller.go_to_slide(slide);

    match controller.phase() {
        SearchPhase::Success => {
            let view = controller
                .view()
                .ok_or_else(|| anyhow!("Search succeeded without weather data"))?;
            let favorite = dashboard.store().await.is_favorite(controller.city());
            render::print_view(&view, controller.active_slide(), favorite);
            Ok(())
        }
        SearchPhase::Failed => Err(anyhow!(
            "{}",
            controller.error().unwrap_or("An unknown error occurred.")
        )),
        SearchPhase::Idle | SearchPhase::Searching => {
            Err(anyhow!("Search for '{}' did not complete", city.trim()))
        }
    }
}

async fn chat(config: &Config, question: Option<String>) -> anyhow::Result<()> {
    let relay = ChatRelay::new(backend_from_config(&config.chat, transport(config)?)?);
    let mut log = ChatLog::default();

    if let Some(question) = question {
        log.ask(&relay, &question).await;
        render::print_chat(&log.messages()[1..]);
        return Ok(());
    }

    render::print_chat(log.messages());
    loop {
        let input = Text::new("you:")
            .with_help_message("Empty line to quit")
            .prompt()
            .context("Failed to read chat input")?;

        if input.trim().is_empty() {
            return Ok(());
        }

        if let Some(reply) = log.ask(&relay, &input).await {
            render::print_chat(std::slice::from_ref(reply));
        }
    }
}

fn configure(mut config: Config) -> anyhow::Result<()> {
    let key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;
    if !key.trim().is_empty() {
        config.set_openweather_api_key(key.trim().to_string());
    }

    let endpoint = Text::new("Chat relay endpoint (optional):")
        .with_default(config.chat.endpoint.as_deref().unwrap_or(""))
        .prompt()
        .context("Failed to read chat endpoint")?;
    config.chat.endpoint = Some(endpoint.trim().to_string()).filter(|e| !e.is_empty());

    if config.chat.endpoint.is_none() {
        let or_key = Password::new("OpenRouter API key (optional):")
            .without_confirmation()
            .prompt()
            .context("Failed to read OpenRouter key")?;
        if !or_key.trim().is_empty() {
            config.chat.openrouter_api_key = Some(or_key.trim().to_string());
        }
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}
