//! Location resolution and weather refresh state machine.
//!
//! ```text
//! Initializing -> Loading -> Ready <-> Refreshing
//!                    |  ^      |
//!                    v  |      | select city
//!                   Error <----+ (failed fetch)
//! ```
//!
//! Every load is tagged with a request token. Fetches are serialized through
//! an async gate, and a result whose token is no longer current is dropped
//! without touching state or the cache. Cache writes go through a second gate
//! and always store the state as of the moment the write starts, so the last
//! write to land reflects the latest location and unit.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    cache::LocationCache,
    cities::CityEntry,
    error::WeatherError,
    model::{Coordinates, LocationRecord, WeatherSnapshot},
    provider::WeatherClient,
};

/// Source of "now" for the refresh debounce.
pub trait Clock: Send + Sync {
    fn now_epoch_seconds(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_epoch_seconds(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

impl<K: Clock + ?Sized> Clock for Arc<K> {
    fn now_epoch_seconds(&self) -> i64 {
        (**self).now_epoch_seconds()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshSettings {
    /// Manual refreshes within this many seconds of the last observation
    /// don't hit the network.
    pub debounce_secs: i64,
    /// Minimum duration of a manual refresh, fetch or not.
    pub refresh_delay: Duration,
    /// Used when nothing usable is cached.
    pub default_location: Coordinates,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            debounce_secs: 600,
            refresh_delay: Duration::from_secs(1),
            default_location: Coordinates::DEFAULT,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScreenState {
    Initializing,
    Loading {
        coordinates: Coordinates,
    },
    Ready {
        snapshot: WeatherSnapshot,
    },
    Refreshing {
        snapshot: WeatherSnapshot,
    },
    Error {
        coordinates: Coordinates,
        message: String,
        /// Last good reading, if any, so it can stay on screen.
        last: Option<WeatherSnapshot>,
    },
}

impl ScreenState {
    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        match self {
            ScreenState::Ready { snapshot } | ScreenState::Refreshing { snapshot } => {
                Some(snapshot)
            }
            ScreenState::Error { last, .. } => last.as_ref(),
            ScreenState::Initializing | ScreenState::Loading { .. } => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            ScreenState::Initializing | ScreenState::Loading { .. } | ScreenState::Refreshing { .. }
        )
    }
}

/// What a controller operation ended up doing.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// A fetch completed and its snapshot is now current.
    Updated(WeatherSnapshot),
    /// Nothing fetched: debounced, or nothing to act on in this state.
    Unchanged,
    /// A newer request replaced this one before it could apply.
    Superseded,
    /// Ignored because another load or refresh is in progress.
    Busy,
}

#[derive(Debug)]
struct Inner {
    state: ScreenState,
    last_snapshot: Option<WeatherSnapshot>,
    /// Location to persist; seeded from the cache, replaced by each reading.
    location: Option<LocationRecord>,
    use_celsius: bool,
    token: u64,
}

#[derive(Debug)]
pub struct RefreshController<C, S, K = SystemClock> {
    client: C,
    cache: S,
    clock: K,
    settings: RefreshSettings,
    inner: Mutex<Inner>,
    fetch_gate: tokio::sync::Mutex<()>,
    write_gate: tokio::sync::Mutex<()>,
}

impl<C, S> RefreshController<C, S, SystemClock>
where
    C: WeatherClient,
    S: LocationCache,
{
    pub fn new(client: C, cache: S, settings: RefreshSettings) -> Self {
        Self::with_clock(client, cache, SystemClock, settings)
    }
}

impl<C, S, K> RefreshController<C, S, K>
where
    C: WeatherClient,
    S: LocationCache,
    K: Clock,
{
    pub fn with_clock(client: C, cache: S, clock: K, settings: RefreshSettings) -> Self {
        Self {
            client,
            cache,
            clock,
            settings,
            inner: Mutex::new(Inner {
                state: ScreenState::Initializing,
                last_snapshot: None,
                location: None,
                use_celsius: true,
                token: 0,
            }),
            fetch_gate: tokio::sync::Mutex::new(()),
            write_gate: tokio::sync::Mutex::new(()),
        }
    }

    pub fn state(&self) -> ScreenState {
        self.inner.lock().state.clone()
    }

    /// Most recent successful reading, regardless of the current state.
    pub fn snapshot(&self) -> Option<WeatherSnapshot> {
        self.inner.lock().last_snapshot.clone()
    }

    pub fn use_celsius(&self) -> bool {
        self.inner.lock().use_celsius
    }

    /// Read the cache and pick the starting coordinates without fetching.
    pub async fn resolve_start(&self) -> Coordinates {
        self.inner.lock().state = ScreenState::Initializing;

        let cached = self.cache.read().await;

        let mut inner = self.inner.lock();
        let coordinates = match cached {
            Some(record) => {
                inner.use_celsius = record.use_celsius;
                match record.coordinates() {
                    Some(coordinates) => {
                        inner.location = Some(record);
                        coordinates
                    }
                    None => {
                        warn!(
                            lat = record.lat,
                            lon = record.lon,
                            "cached coordinates out of range"
                        );
                        self.settings.default_location
                    }
                }
            }
            None => self.settings.default_location,
        };

        debug!(%coordinates, use_celsius = inner.use_celsius, "start location resolved");
        inner.state = ScreenState::Loading { coordinates };
        coordinates
    }

    /// Resolve the start location and load it.
    pub async fn initialize(&self) -> Result<RefreshOutcome, WeatherError> {
        let coordinates = self.resolve_start().await;
        self.load(coordinates).await
    }

    /// Switch to a new location. Never debounced.
    pub async fn select_city(
        &self,
        coordinates: Coordinates,
    ) -> Result<RefreshOutcome, WeatherError> {
        info!(%coordinates, "location selected");
        self.load(coordinates).await
    }

    pub async fn select_entry(&self, entry: &CityEntry) -> Result<RefreshOutcome, WeatherError> {
        info!(city = %entry.name, country = %entry.country_code, "city picked");
        self.load(entry.coordinates).await
    }

    /// Load again after a failed fetch. A no-op in any other state.
    pub async fn retry(&self) -> Result<RefreshOutcome, WeatherError> {
        let coordinates = {
            let inner = self.inner.lock();
            match &inner.state {
                ScreenState::Error { coordinates, .. } => *coordinates,
                _ => return Ok(RefreshOutcome::Unchanged),
            }
        };

        self.load(coordinates).await
    }

    /// Manual pull-to-refresh. Only acts from `Ready`.
    pub async fn refresh(&self) -> Result<RefreshOutcome, WeatherError> {
        let now = self.clock.now_epoch_seconds();

        let (token, snapshot, due) = {
            let mut inner = self.inner.lock();
            let snapshot = match &inner.state {
                ScreenState::Ready { snapshot } => snapshot.clone(),
                state if state.is_busy() => return Ok(RefreshOutcome::Busy),
                _ => return Ok(RefreshOutcome::Unchanged),
            };

            let age = now - snapshot.observed_at_epoch_seconds;
            let due = age >= self.settings.debounce_secs;
            if due {
                inner.token += 1;
            } else {
                debug!(age, "last observation too recent, skipping fetch");
            }

            inner.state = ScreenState::Refreshing {
                snapshot: snapshot.clone(),
            };
            (inner.token, snapshot, due)
        };

        if !due {
            tokio::time::sleep(self.settings.refresh_delay).await;
            self.end_refresh(token, snapshot);
            return Ok(RefreshOutcome::Unchanged);
        }

        let coordinates = snapshot.coordinates;
        let result = {
            let _gate = self.fetch_gate.lock().await;
            if !self.is_current(token) {
                debug!(token, "refresh superseded while queued");
                return Ok(RefreshOutcome::Superseded);
            }

            let (result, ()) = tokio::join!(
                self.client.fetch_current(coordinates),
                tokio::time::sleep(self.settings.refresh_delay),
            );
            result
        };

        self.apply(token, coordinates, result).await
    }

    /// Flip the unit preference and persist it with the known location.
    /// Never fetches. Returns the new preference.
    pub async fn toggle_units(&self) -> bool {
        let use_celsius = {
            let mut inner = self.inner.lock();
            inner.use_celsius = !inner.use_celsius;
            inner.use_celsius
        };

        self.persist().await;
        use_celsius
    }

    async fn load(&self, coordinates: Coordinates) -> Result<RefreshOutcome, WeatherError> {
        let token = {
            let mut inner = self.inner.lock();
            inner.token += 1;
            inner.state = ScreenState::Loading { coordinates };
            inner.token
        };

        let result = {
            let _gate = self.fetch_gate.lock().await;
            if !self.is_current(token) {
                debug!(token, %coordinates, "load superseded while queued");
                return Ok(RefreshOutcome::Superseded);
            }

            self.client.fetch_current(coordinates).await
        };

        self.apply(token, coordinates, result).await
    }

    async fn apply(
        &self,
        token: u64,
        coordinates: Coordinates,
        result: Result<WeatherSnapshot, WeatherError>,
    ) -> Result<RefreshOutcome, WeatherError> {
        match result {
            Ok(snapshot) => {
                {
                    let mut inner = self.inner.lock();
                    if inner.token != token {
                        debug!(token, current = inner.token, "discarding stale weather result");
                        return Ok(RefreshOutcome::Superseded);
                    }

                    inner.state = ScreenState::Ready {
                        snapshot: snapshot.clone(),
                    };
                    let record = LocationRecord::from_snapshot(&snapshot, inner.use_celsius);
                    inner.location = Some(record);
                    inner.last_snapshot = Some(snapshot.clone());
                }

                self.persist().await;
                Ok(RefreshOutcome::Updated(snapshot))
            }
            Err(err) => {
                let mut inner = self.inner.lock();
                if inner.token != token {
                    debug!(token, error = %err, "discarding stale fetch failure");
                    return Ok(RefreshOutcome::Superseded);
                }

                warn!(%coordinates, error = %err, "weather fetch failed");
                inner.state = ScreenState::Error {
                    coordinates,
                    message: err.to_string(),
                    last: inner.last_snapshot.clone(),
                };
                Err(err)
            }
        }
    }

    /// Write the current location and unit. The record is built only once
    /// the write gate is held.
    async fn persist(&self) {
        let _write = self.write_gate.lock().await;

        let record = {
            let inner = self.inner.lock();
            inner.location.clone().map(|record| LocationRecord {
                use_celsius: inner.use_celsius,
                ..record
            })
        };

        match record {
            Some(record) => self.cache.write(&record).await,
            None => debug!("no known location yet, unit preference kept in memory"),
        }
    }

    fn end_refresh(&self, token: u64, snapshot: WeatherSnapshot) {
        let mut inner = self.inner.lock();
        if inner.token == token && matches!(inner.state, ScreenState::Refreshing { .. }) {
            inner.state = ScreenState::Ready { snapshot };
        }
    }

    fn is_current(&self, token: u64) -> bool {
        self.inner.lock().token == token
    }
}
