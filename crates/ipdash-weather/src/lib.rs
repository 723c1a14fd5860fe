//! Weather lookups for ipdash
//!
//! Fetches current conditions and an hourly series from Open-Meteo for the
//! coordinates of a resolved location.

pub mod provider;
pub mod types;

pub use provider::WeatherProvider;
pub use types::*;
