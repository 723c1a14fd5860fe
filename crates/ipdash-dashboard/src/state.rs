//! Dashboard state owned by the orchestrator.
//!
//! Rendering code only ever sees cloned snapshots of [`QueryState`].

use ipdash_core::Language;
use ipdash_geo::LocationRecord;
use ipdash_weather::WeatherRecord;

/// Which page the dashboard shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Home,
    About,
    Privacy,
}

/// What the location panel currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataPresence {
    Empty,
    Populated,
    Errored,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryState {
    pub view: ViewState,
    pub language: Language,
    /// Last submitted lookup target; empty means the caller's own address
    pub query: String,
    pub location: Option<LocationRecord>,
    pub weather: Option<WeatherRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub weather_error: Option<String>,
}

impl QueryState {
    pub fn new(language: Language) -> Self {
        Self {
            view: ViewState::default(),
            language,
            query: String::new(),
            location: None,
            weather: None,
            loading: false,
            error: None,
            weather_error: None,
        }
    }

    pub fn presence(&self) -> DataPresence {
        match (&self.location, &self.error) {
            (_, Some(_)) => DataPresence::Errored,
            (Some(_), None) => DataPresence::Populated,
            (None, None) => DataPresence::Empty,
        }
    }

    /// Coordinates of the stored location, if usable
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        self.location.as_ref().and_then(LocationRecord::coordinates)
    }
}

impl Default for QueryState {
    fn default() -> Self {
        Self::new(Language::default())
    }
}
