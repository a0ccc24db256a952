//! Core library for the `weatherpane` current-weather screen.
//!
//! This crate defines:
//! - The refresh state machine deciding which location to query and when
//! - The persisted last-known location and its cache contract
//! - The OpenWeather client and the static US/Canada city index
//! - Derived views (temperature in both units, condition imagery)
//!
//! It is used by `weatherpane-cli`, but carries no terminal code of its own.

pub mod cache;
pub mod cities;
pub mod config;
pub mod controller;
pub mod error;
pub mod model;
pub mod provider;
pub mod view;

pub use cache::{FileLocationCache, LocationCache, MemoryLocationCache};
pub use cities::{CityEntry, CityIndex};
pub use config::Config;
pub use controller::{RefreshController, RefreshOutcome, RefreshSettings, ScreenState};
pub use error::{FetchError, WeatherError};
pub use model::{Condition, Coordinates, LocationRecord, WeatherSnapshot};
pub use provider::{WeatherClient, openweather::OpenWeatherClient};
pub use view::{Imagery, ScreenView};
