//! Geolocation lookup errors and user-facing message normalization.

use thiserror::Error;

use crate::types::Provider;

/// Shown for any failure that looks like the request never left the machine
pub const NETWORK_ADVISORY: &str =
    "Network request blocked. Please check your connection or disable ad-blockers/privacy extensions.";

/// Shown when no provider produced a better diagnostic
pub const GENERIC_FAILURE: &str = "Failed to fetch IP data from any provider.";

/// Used when a provider reports failure without a message
pub const UNRESOLVED: &str = "Failed to resolve IP";

#[derive(Debug, Error)]
pub enum GeoError {
    /// The primary endpoint is plain http and we run under a secure context
    #[error("Mixed content: cannot query the plain-http primary provider from a secure context")]
    TransportBlocked,

    #[error("{provider} provider returned HTTP {status} {reason}")]
    HttpStatus {
        provider: Provider,
        status: u16,
        reason: String,
    },

    /// Well-formed failure payload (`status: "fail"` or `success: false`)
    #[error("{0}")]
    ProviderFailure(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid provider response: {0}")]
    Parse(String),

    #[error("Invalid provider endpoint: {0}")]
    InvalidEndpoint(String),

    /// Target that cannot travel as a path segment
    #[error("Cannot look up \"{0}\": not an IP address or hostname")]
    UnroutableTarget(String),
}

impl GeoError {
    /// Message for the error panel: provider diagnostics verbatim, transport
    /// failures collapsed into [`NETWORK_ADVISORY`].
    pub fn user_message(&self) -> String {
        match self {
            GeoError::Network(_) => NETWORK_ADVISORY.to_string(),
            GeoError::HttpStatus {
                provider: Provider::Primary,
                reason,
                ..
            } => normalize_message(&format!("IP Fetch Error: {}", reason)),
            GeoError::HttpStatus {
                provider: Provider::Fallback,
                reason,
                ..
            } => normalize_message(&format!("Fallback IP API Error: {}", reason)),
            GeoError::ProviderFailure(msg) => normalize_message(msg),
            other => normalize_message(&other.to_string()),
        }
    }

    /// True for failures of the outbound call itself
    pub fn is_network(&self) -> bool {
        matches!(self, GeoError::Network(_))
    }
}

/// Rewrite generic transport-failure texts into the single advisory; pass everything else through.
pub fn normalize_message(msg: &str) -> String {
    let msg = msg.trim();
    if msg.is_empty() {
        return GENERIC_FAILURE.to_string();
    }
    if msg == "Script error." || msg == "Failed to fetch" || msg.contains("NetworkError") {
        return NETWORK_ADVISORY.to_string();
    }
    msg.to_string()
}
