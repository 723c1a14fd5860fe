//! IP resolution with primary/fallback failover.
//!
//! The primary provider (ip-api.com schema) is tried first unless the
//! transport context forbids plain-http requests. Any primary failure falls
//! through to the fallback provider (ipwho.is schema); only the fallback's
//! failure is returned to the caller.

use std::sync::Arc;
use std::time::Duration;

use ipdash_core::{Config, Language, TransportContext};
use reqwest::{Client, Response};
use tracing::instrument;
use url::Url;

use crate::error::GeoError;
use crate::schema::{FallbackResponse, PrimaryResponse, PRIMARY_FIELDS};
use crate::types::{LocationRecord, Provider};

#[derive(Debug, Clone)]
pub struct GeoResolver {
    client: Arc<Client>,
    primary_url: Url,
    fallback_url: Url,
    transport: TransportContext,
}

impl GeoResolver {
    /// Create a resolver with a default HTTP client
    pub fn new(
        primary_url: &str,
        fallback_url: &str,
        transport: TransportContext,
    ) -> Result<Self, GeoError> {
        let client = Client::builder().build()?;
        Self::with_client(client, primary_url, fallback_url, transport)
    }

    /// Create a resolver from the application config
    pub fn from_config(config: &Config) -> Result<Self, GeoError> {
        let providers = &config.providers;
        let mut builder = Client::builder().user_agent(providers.user_agent.clone());
        if let Some(secs) = providers.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Self::with_client(
            builder.build()?,
            &providers.primary_url,
            &providers.fallback_url,
            config.general.transport,
        )
    }

    /// Create a resolver around an existing client
    pub fn with_client(
        client: Client,
        primary_url: &str,
        fallback_url: &str,
        transport: TransportContext,
    ) -> Result<Self, GeoError> {
        Ok(Self {
            client: Arc::new(client),
            primary_url: parse_endpoint(primary_url)?,
            fallback_url: parse_endpoint(fallback_url)?,
            transport,
        })
    }

    pub fn transport(&self) -> TransportContext {
        self.transport
    }

    /// Resolve `query` (empty = the caller's own address) to a canonical record.
    ///
    /// The query is an opaque lookup key; the providers validate it.
    #[instrument(skip(self), level = "info")]
    pub async fn resolve_location(
        &self,
        query: &str,
        lang: Language,
    ) -> Result<LocationRecord, GeoError> {
        let primary_failure = if self.transport.is_secure() {
            GeoError::TransportBlocked
        } else {
            match self.fetch_primary(query, lang).await {
                Ok(record) => return Ok(record),
                Err(e) => e,
            }
        };

        tracing::warn!(
            error = %primary_failure,
            "Primary provider unavailable or blocked, attempting fallback"
        );

        match self.fetch_fallback(query, lang).await {
            Ok(record) => Ok(record),
            Err(e) => {
                tracing::error!(error = %e, "Fallback provider failed");
                Err(e)
            }
        }
    }

    async fn fetch_primary(&self, query: &str, lang: Language) -> Result<LocationRecord, GeoError> {
        let url = lookup_url(&self.primary_url, query)?;
        tracing::debug!(%url, "Querying primary provider");

        let response = self
            .client
            .get(url)
            .query(&[("fields", PRIMARY_FIELDS), ("lang", lang.code())])
            .send()
            .await?;

        let body: PrimaryResponse = check_status(response, Provider::Primary)?
            .json()
            .await
            .map_err(|e| GeoError::Parse(e.to_string()))?;

        body.into_record()
    }

    async fn fetch_fallback(&self, query: &str, lang: Language) -> Result<LocationRecord, GeoError> {
        let url = lookup_url(&self.fallback_url, query)?;
        tracing::debug!(%url, "Querying fallback provider");

        let response = self
            .client
            .get(url)
            .query(&[("lang", lang.code())])
            .send()
            .await?;

        let body: FallbackResponse = check_status(response, Provider::Fallback)?
            .json()
            .await
            .map_err(|e| GeoError::Parse(e.to_string()))?;

        body.into_record()
    }
}

fn parse_endpoint(raw: &str) -> Result<Url, GeoError> {
    let url = Url::parse(raw).map_err(|e| GeoError::InvalidEndpoint(format!("{}: {}", raw, e)))?;
    if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
        return Err(GeoError::InvalidEndpoint(raw.to_string()));
    }
    Ok(url)
}

/// Append the lookup target as a single encoded path segment
fn lookup_url(base: &Url, target: &str) -> Result<Url, GeoError> {
    // URL normalization resolves dot segments away (percent-encoded forms
    // included), which would silently turn the request into an own-address lookup.
    if target == "." || target == ".." {
        return Err(GeoError::UnroutableTarget(target.to_string()));
    }
    let mut url = base.clone();
    if !target.is_empty() {
        url.path_segments_mut()
            .map_err(|_| GeoError::InvalidEndpoint(base.to_string()))?
            .pop_if_empty()
            .push(target);
    }
    Ok(url)
}

fn check_status(response: Response, provider: Provider) -> Result<Response, GeoError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    Err(GeoError::HttpStatus {
        provider,
        status: status.as_u16(),
        reason: status
            .canonical_reason()
            .map(str::to_string)
            .unwrap_or_else(|| status.as_u16().to_string()),
    })
}
