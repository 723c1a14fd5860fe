//! IP geolocation for ipdash
//!
//! Resolves an address (or the caller's own) through a primary provider with
//! a differently-shaped fallback, normalizing both into one record.

pub mod error;
pub mod resolver;
pub mod schema;
pub mod types;

pub use error::{normalize_message, GeoError, GENERIC_FAILURE, NETWORK_ADVISORY};
pub use resolver::GeoResolver;
pub use types::{flag_label, text_label, LocationRecord, Provider};
