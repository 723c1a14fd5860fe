//! Dashboard orchestration for ipdash
//!
//! Owns the dashboard state and runs the location and weather lookups in
//! response to startup, searches and language changes.

pub mod clock;
pub mod orchestrator;
pub mod sources;
pub mod state;

pub use clock::{ClockDisplay, ClockProvider, ClockRequest, LocalClock};
pub use orchestrator::{Command, Dashboard};
pub use sources::{LocationSource, WeatherSource};
pub use state::{DataPresence, QueryState, ViewState};
