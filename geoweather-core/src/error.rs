//! Error types for the retrieval pipeline.
//!
//! OS-capability failures (`ServiceDisabled`, permission outcomes) are meant
//! to reach the user with a next step; network and API failures are logged
//! and absorbed in favour of cached data.

use thiserror::Error;

/// Failure classes of a single weather API call.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("bad request (400)")]
    BadRequest,

    #[error("not found (404)")]
    NotFound,

    #[error("HTTP error {0}")]
    GenericHttpError(u16),

    #[error("malformed response body: {0}")]
    MalformedResponse(String),

    #[error("transport failure: {0}")]
    TransportFailure(#[source] reqwest::Error),
}

impl ApiError {
    /// Map a non-success HTTP status onto its error class.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => ApiError::BadRequest,
            404 => ApiError::NotFound,
            other => ApiError::GenericHttpError(other),
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            ApiError::BadRequest => "The weather service rejected the request.",
            ApiError::NotFound => "No weather is available for this location.",
            ApiError::GenericHttpError(_) => "The weather service returned an error.",
            ApiError::MalformedResponse(_) => "The weather service sent data we could not read.",
            ApiError::TransportFailure(_) => "Could not reach the weather service.",
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location service unavailable")]
    ServiceUnavailable,

    #[error("no location fix available")]
    NoFix,

    #[error("location error: {0}")]
    Other(String),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error on {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize snapshot: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Why a retrieval cycle did not end in a fresh snapshot.
#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("location service is disabled")]
    ServiceDisabled,

    #[error("location permission permanently denied")]
    PermissionPermanentlyDenied,

    #[error("location permission denied, rationale required")]
    PermissionRationaleNeeded,

    #[error("no network connectivity")]
    NoConnectivity,

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl RetrievalError {
    /// Whether the user must act (change a setting) before a retry can help.
    pub fn needs_user_action(&self) -> bool {
        matches!(
            self,
            RetrievalError::ServiceDisabled
                | RetrievalError::PermissionPermanentlyDenied
                | RetrievalError::PermissionRationaleNeeded
        )
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            RetrievalError::ServiceDisabled => {
                "Your location provider is turned off. Please turn it on."
            }
            RetrievalError::PermissionPermanentlyDenied => {
                "You have denied location permission. Please allow it, it is mandatory."
            }
            RetrievalError::PermissionRationaleNeeded => {
                "Location permission is required for this feature. It can be enabled in the settings."
            }
            RetrievalError::NoConnectivity => "No internet connection available.",
            RetrievalError::Location(_) => "Could not determine your current location.",
            RetrievalError::Api(e) => e.user_message(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_classification() {
        assert!(matches!(ApiError::from_status(400), ApiError::BadRequest));
        assert!(matches!(ApiError::from_status(404), ApiError::NotFound));
        assert!(matches!(ApiError::from_status(500), ApiError::GenericHttpError(500)));
        assert!(matches!(ApiError::from_status(401), ApiError::GenericHttpError(401)));
    }

    #[test]
    fn capability_failures_need_user_action() {
        assert!(RetrievalError::ServiceDisabled.needs_user_action());
        assert!(RetrievalError::PermissionRationaleNeeded.needs_user_action());
        assert!(!RetrievalError::NoConnectivity.needs_user_action());
        assert!(!RetrievalError::from(ApiError::NotFound).needs_user_action());
    }
}
