//! Refresh orchestrator: decides when lookups run and commits their results.
//!
//! Each refresh takes a new generation number and cancellation token. Starting
//! a refresh cancels the one in flight, and only the newest generation may
//! commit into [`QueryState`].

use std::sync::atomic::{AtomicU64, Ordering};

use ipdash_core::{AppError, Config, Language};
use ipdash_geo::GeoResolver;
use ipdash_weather::WeatherProvider;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::sources::{LocationSource, WeatherSource};
use crate::state::{QueryState, ViewState};

/// Messages accepted by [`Dashboard::dispatch`]
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Initial lookup of the caller's own address
    Start,
    /// Look up the given target (trimmed, empty = own address)
    Search(String),
    ChangeLanguage(Language),
    ShowView(ViewState),
}

pub struct Dashboard<L, W> {
    locations: L,
    weather: W,
    state: watch::Sender<QueryState>,
    generation: AtomicU64,
    current: Mutex<CancellationToken>,
}

impl Dashboard<GeoResolver, WeatherProvider> {
    /// Dashboard backed by the configured providers
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let locations = GeoResolver::from_config(config)?;
        let weather = WeatherProvider::from_config(config)?;
        Ok(Self::new(locations, weather, config.general.default_language))
    }
}

impl<L: LocationSource, W: WeatherSource> Dashboard<L, W> {
    pub fn new(locations: L, weather: W, language: Language) -> Self {
        Self {
            locations,
            weather,
            state: watch::Sender::new(QueryState::new(language)),
            generation: AtomicU64::new(0),
            current: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn snapshot(&self) -> QueryState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every committed state
    pub fn subscribe(&self) -> watch::Receiver<QueryState> {
        self.state.subscribe()
    }

    pub async fn dispatch(&self, command: Command) -> QueryState {
        match command {
            Command::Start => self.start().await,
            Command::Search(input) => self.search(&input).await,
            Command::ChangeLanguage(language) => self.change_language(language).await,
            Command::ShowView(view) => self.show_view(view),
        }
    }

    pub async fn start(&self) -> QueryState {
        let language = self.state.borrow().language;
        self.refresh(String::new(), language).await
    }

    pub async fn search(&self, input: &str) -> QueryState {
        let language = self.state.borrow().language;
        self.refresh(input.trim().to_string(), language).await
    }

    /// Store the language and, when a location is shown or a lookup is in
    /// flight, repeat the last lookup in it. The in-flight lookup is
    /// superseded so its old-language result never commits.
    pub async fn change_language(&self, language: Language) -> QueryState {
        let mut refetch = None;
        self.state.send_if_modified(|state| {
            if state.language == language {
                return false;
            }
            state.language = language;
            if state.location.is_some() || state.loading {
                refetch = Some(state.query.clone());
            }
            true
        });

        match refetch {
            Some(query) => self.refresh(query, language).await,
            None => self.snapshot(),
        }
    }

    pub fn show_view(&self, view: ViewState) -> QueryState {
        self.state.send_if_modified(|state| {
            if state.view == view {
                return false;
            }
            state.view = view;
            true
        });
        self.snapshot()
    }

    /// Location lookup followed, when it yields coordinates, by the weather
    /// lookup. Never returns an error; failures land in the state.
    async fn refresh(&self, query: String, language: Language) -> QueryState {
        let (generation, token) = self.begin();
        tracing::info!(generation, query = %query, %language, "Refreshing dashboard");

        self.commit(generation, |state| {
            state.loading = true;
            state.query = query.clone();
        });

        let located = tokio::select! {
            biased;
            _ = token.cancelled() => return self.superseded(generation),
            result = self.locations.resolve_location(&query, language) => result,
        };

        let record = match located {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(generation, error = %e, "Location lookup failed");
                let message = e.user_message();
                self.commit(generation, |state| {
                    state.location = None;
                    state.weather = None;
                    state.weather_error = None;
                    state.error = Some(message);
                    state.loading = false;
                });
                return self.snapshot();
            }
        };

        let coordinates = record.coordinates();
        self.commit(generation, |state| {
            state.location = Some(record);
            state.error = None;
            if coordinates.is_none() {
                state.weather = None;
                state.weather_error = None;
                state.loading = false;
            }
        });

        let Some((lat, lon)) = coordinates else {
            tracing::debug!(generation, "No usable coordinates, skipping weather");
            return self.snapshot();
        };

        let forecast = tokio::select! {
            biased;
            _ = token.cancelled() => return self.superseded(generation),
            result = self.weather.fetch_weather(lat, lon) => result,
        };

        match forecast {
            Ok(weather) => {
                self.commit(generation, |state| {
                    state.weather = Some(weather);
                    state.weather_error = None;
                    state.loading = false;
                });
            }
            Err(e) => {
                tracing::warn!(generation, error = %e, "Weather lookup failed");
                let message = AppError::from(e).user_message().to_string();
                self.commit(generation, |state| {
                    state.weather = None;
                    state.weather_error = Some(message);
                    state.loading = false;
                });
            }
        }

        self.snapshot()
    }

    /// Cancel the refresh in flight and claim the next generation
    fn begin(&self) -> (u64, CancellationToken) {
        let mut current = self.current.lock();
        current.cancel();
        *current = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        (generation, current.clone())
    }

    /// Apply `update` only if `generation` is still the newest refresh
    fn commit(&self, generation: u64, update: impl FnOnce(&mut QueryState)) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            update(state);
            true
        })
    }

    fn superseded(&self, generation: u64) -> QueryState {
        tracing::debug!(generation, "Refresh superseded by a newer one");
        self.snapshot()
    }
}
