//! Seams between the orchestrator and the network-backed lookups.

use std::future::Future;

use ipdash_core::Language;
use ipdash_geo::{GeoError, GeoResolver, LocationRecord};
use ipdash_weather::{WeatherError, WeatherProvider, WeatherRecord};

/// Resolves a lookup target (empty = own address) to a location.
pub trait LocationSource: Send + Sync {
    fn resolve_location(
        &self,
        query: &str,
        lang: Language,
    ) -> impl Future<Output = Result<LocationRecord, GeoError>> + Send;
}

/// Fetches weather for a coordinate pair.
pub trait WeatherSource: Send + Sync {
    fn fetch_weather(
        &self,
        lat: f64,
        lon: f64,
    ) -> impl Future<Output = Result<WeatherRecord, WeatherError>> + Send;
}

impl LocationSource for GeoResolver {
    async fn resolve_location(
        &self,
        query: &str,
        lang: Language,
    ) -> Result<LocationRecord, GeoError> {
        GeoResolver::resolve_location(self, query, lang).await
    }
}

impl WeatherSource for WeatherProvider {
    async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherRecord, WeatherError> {
        WeatherProvider::fetch_weather(self, lat, lon).await
    }
}
