use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, Select};
use tracing::debug;
use weatherpane_core::{
    CityEntry, CityIndex, Config, FileLocationCache, OpenWeatherClient, RefreshController,
    ScreenState, provider::client_from_config,
};

use crate::output::{city_label, print_outcome, print_state};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weatherpane", version, about = "Current weather for a chosen city")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key.
    Configure,

    /// Show current weather for the last used (or default) location.
    Show,

    /// Search the city list (US and Canada).
    Search {
        /// Any part of the city name, case-insensitive.
        query: String,
    },

    /// Switch to a city and show its weather.
    Select {
        /// Any part of the city name; prompts when several cities match.
        query: String,
    },

    /// Swap the primary temperature unit between Celsius and Fahrenheit.
    Units,

    /// Keep the screen open: refresh, change city, toggle units.
    Interactive,
}

type Screen = RefreshController<OpenWeatherClient, FileLocationCache>;

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure()?,
            Command::Show => {
                let screen = open_screen()?;
                let outcome = screen.initialize().await;
                print_state(&screen.state(), screen.use_celsius());
                outcome?;
            }
            Command::Search { query } => {
                let config = Config::load()?;
                let cities = load_cities(&config)?;
                let matches = cities.search(&query);

                if matches.is_empty() {
                    println!("No matching cities.");
                }
                for entry in matches {
                    println!("{}", city_label(entry));
                }
            }
            Command::Select { query } => {
                let config = Config::load()?;
                let cities = load_cities(&config)?;
                let entry = pick_city(&cities, &query)?;

                let screen = screen_from(&config)?;
                screen.resolve_start().await;
                let outcome = screen.select_entry(entry).await;
                print_state(&screen.state(), screen.use_celsius());
                outcome?;
            }
            Command::Units => {
                let config = Config::load()?;
                // No request is made, so a missing API key is fine here.
                let client = OpenWeatherClient::new(config.api_key.clone().unwrap_or_default());
                let cache = FileLocationCache::new(Config::data_dir()?);
                let screen = RefreshController::new(client, cache, config.refresh_settings());

                screen.resolve_start().await;
                let use_celsius = screen.toggle_units().await;
                println!("Primary unit: {}", if use_celsius { "Celsius" } else { "Fahrenheit" });
            }
            Command::Interactive => interactive().await?,
        }

        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Refresh,
    Retry,
    ChangeCity,
    ToggleUnits,
    Quit,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Action::Refresh => "Refresh",
            Action::Retry => "Retry",
            Action::ChangeCity => "Change city",
            Action::ToggleUnits => "Toggle °C/°F",
            Action::Quit => "Quit",
        })
    }
}

async fn interactive() -> Result<()> {
    let config = Config::load()?;
    let cities = load_cities(&config)?;
    let screen = screen_from(&config)?;

    // A failed first load lands in the error state; the loop offers a retry.
    if let Err(err) = screen.initialize().await {
        debug!(error = %err, "initial load failed");
    }

    loop {
        println!();
        print_state(&screen.state(), screen.use_celsius());
        println!();

        let first = match screen.state() {
            ScreenState::Error { .. } => Action::Retry,
            _ => Action::Refresh,
        };
        let actions = vec![first, Action::ChangeCity, Action::ToggleUnits, Action::Quit];

        match Select::new("What next?", actions).prompt()? {
            Action::Refresh => print_outcome(&screen.refresh().await),
            Action::Retry => print_outcome(&screen.retry().await),
            Action::ChangeCity => {
                let query = inquire::Text::new("City:")
                    .with_placeholder("San Francisco")
                    .prompt()?;
                match pick_city(&cities, &query) {
                    Ok(entry) => print_outcome(&screen.select_entry(entry).await),
                    Err(err) => println!("{err}"),
                }
            }
            Action::ToggleUnits => {
                screen.toggle_units().await;
            }
            Action::Quit => break,
        }
    }

    Ok(())
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .without_confirmation()
        .prompt()
        .context("Failed to read API key")?;

    let api_key = api_key.trim();
    if api_key.is_empty() {
        bail!("API key must not be empty");
    }

    config.set_api_key(api_key.to_string());
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn open_screen() -> Result<Screen> {
    screen_from(&Config::load()?)
}

fn screen_from(config: &Config) -> Result<Screen> {
    let client = client_from_config(config)?;
    let cache = FileLocationCache::new(Config::data_dir()?);

    Ok(RefreshController::new(client, cache, config.refresh_settings()))
}

fn load_cities(config: &Config) -> Result<CityIndex> {
    match &config.city_list {
        Some(path) => CityIndex::load(path)
            .with_context(|| format!("Failed to load city list: {}", path.display())),
        None => Ok(CityIndex::bundled()),
    }
}

fn pick_city<'a>(cities: &'a CityIndex, query: &str) -> Result<&'a CityEntry> {
    let matches = cities.search(query.trim());

    match matches.as_slice() {
        [] => bail!("No city matches '{query}'."),
        [only] => Ok(*only),
        _ => {
            let labels: Vec<String> = matches.iter().map(|entry| city_label(entry)).collect();
            let choice = Select::new("Pick a city:", labels)
                .raw_prompt()
                .context("City selection cancelled")?;

            Ok(matches[choice.index])
        }
    }
}
