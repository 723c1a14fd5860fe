use crate::types::{WeatherError, WeatherRecord};
use ipdash_core::Config;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

const HOURLY_VARIABLES: &str = "temperature_2m,relativehumidity_2m";

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    base_url: Url,
}

impl WeatherProvider {
    pub fn new(base_url: &str) -> Result<Self, WeatherError> {
        Self::with_client(Client::builder().build()?, base_url)
    }

    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let providers = &config.providers;
        let mut builder = Client::builder().user_agent(providers.user_agent.clone());
        if let Some(secs) = providers.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self::with_client(builder.build()?, &providers.weather_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Result<Self, WeatherError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| WeatherError::InvalidEndpoint(format!("{}: {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(WeatherError::InvalidEndpoint(base_url.to_string()));
        }
        Ok(Self {
            client: Arc::new(client),
            base_url,
        })
    }

    /// Fetch current conditions and the hourly series for a coordinate pair.
    /// Times in the response are local to the coordinates.
    #[tracing::instrument(skip(self), level = "info")]
    pub async fn fetch_weather(&self, lat: f64, lon: f64) -> Result<WeatherRecord, WeatherError> {
        let response = self
            .client
            .get(self.base_url.clone())
            .query(&[
                ("latitude", lat.to_string()),
                ("longitude", lon.to_string()),
                ("current_weather", "true".to_string()),
                ("hourly", HOURLY_VARIABLES.to_string()),
                ("timezone", "auto".to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "Weather provider returned an error");
            return Err(WeatherError::Http {
                status: status.as_u16(),
                reason: status
                    .canonical_reason()
                    .map(str::to_string)
                    .unwrap_or_else(|| status.as_u16().to_string()),
            });
        }

        let record: WeatherRecord = response
            .json()
            .await
            .map_err(|e| WeatherError::Parse(e.to_string()))?;

        tracing::debug!(
            temperature = record.current_weather.temperature,
            code = record.current_weather.weathercode,
            "Weather fetched"
        );
        Ok(record)
    }
}
