//! Failure types reported by discovery adapters.

use thiserror::Error;

/// Errors from a single [`crate::PlaceDiscovery`] query.
///
/// These never abort an analysis: the collector degrades the affected query
/// to "no results" and records the failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiscoveryError {
    /// The request did not complete within the configured timeout.
    #[error("request to {endpoint} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint contacted, without query parameters.
        endpoint: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The provider answered with a non-success HTTP status.
    #[error("request to {endpoint} failed with status {status}: {message}")]
    Http {
        /// Endpoint contacted, without query parameters.
        endpoint: String,
        /// HTTP status code.
        status: u16,
        /// Short error description.
        message: String,
    },
    /// The request failed before a response was received.
    #[error("network error contacting {endpoint}: {message}")]
    Network {
        /// Endpoint contacted, without query parameters.
        endpoint: String,
        /// Transport error description.
        message: String,
    },
    /// The provider rejected the request because a quota was exhausted.
    #[error("rate limited by {endpoint}")]
    RateLimited {
        /// Endpoint contacted, without query parameters.
        endpoint: String,
    },
    /// The provider returned an application-level error status.
    #[error("provider returned status {status}: {message}")]
    Service {
        /// Provider status code, e.g. `"INVALID_REQUEST"`.
        status: String,
        /// Provider error message, if any.
        message: String,
    },
    /// The response body could not be decoded.
    #[error("failed to parse provider response: {message}")]
    Parse {
        /// Decoder error description.
        message: String,
    },
    /// The query was scheduled but its worker stopped before reporting.
    #[error("query for {place_type} was interrupted")]
    Interrupted {
        /// Place-type tag of the lost query.
        place_type: String,
    },
}

impl DiscoveryError {
    /// Report whether the failure was a quota rejection worth retrying.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Errors raised when adapter credentials are unusable.
///
/// Unlike [`DiscoveryError`] these are surfaced to the caller before any
/// query runs: no partial analysis is meaningful without a working adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    /// No credential was configured.
    #[error("no API key configured for {provider}")]
    Missing {
        /// Provider name.
        provider: &'static str,
    },
    /// A credential was configured but is not well-formed.
    #[error("API key for {provider} is malformed: {reason}")]
    Malformed {
        /// Provider name.
        provider: &'static str,
        /// What is wrong with the key.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn only_rate_limits_are_retryable() {
        let limited = DiscoveryError::RateLimited {
            endpoint: "https://maps.example.com".into(),
        };
        let timeout = DiscoveryError::Timeout {
            endpoint: "https://maps.example.com".into(),
            timeout_secs: 30,
        };
        assert!(limited.is_rate_limited());
        assert!(!timeout.is_rate_limited());
    }

    #[rstest]
    fn credential_errors_name_the_provider() {
        let err = CredentialError::Missing {
            provider: "google-maps",
        };
        assert_eq!(err.to_string(), "no API key configured for google-maps");
    }
}
