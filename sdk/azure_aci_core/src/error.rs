use std::fmt;

use thiserror::Error;

/// The `{code, message}` pair carried by an ARM error envelope.
///
/// Both parts are kept exactly as the service sent them so callers can match
/// on substrings such as `ResourceSomeRequestsNotSpecified`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceError {
    /// The service error code, when the body carried one.
    pub code: Option<String>,
    /// The service message, or the (sanitized) raw body when no envelope was found.
    pub message: String,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Errors that can occur when interacting with Azure Resource Manager.
#[derive(Error, Debug)]
pub enum AciError {
    /// The credential was rejected, the identity endpoint was unreachable,
    /// or ARM refused the bearer token.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The service rejected the request as semantically invalid.
    #[error("Validation failed (HTTP {status}): {error}")]
    Validation { status: u16, error: ServiceError },

    /// The resource group or container group does not exist.
    #[error("Not found (HTTP {status}): {error}")]
    NotFound { status: u16, error: ServiceError },

    /// A network-level failure or a server-side error that may succeed on retry.
    #[error("Transient failure{}: {message}", fmt_status(.status))]
    Transient {
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    /// A response body did not match the expected schema.
    #[error("Failed to decode response (HTTP {status}): {source}; body: {body}")]
    Decode {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// The request payload could not be serialized.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The endpoint URL is invalid.
    #[error("Invalid endpoint URL: {message}")]
    InvalidEndpoint {
        message: String,
        #[source]
        source: Option<url::ParseError>,
    },

    /// A resource path segment cannot be placed in a URL.
    #[error("Invalid resource name: {0}")]
    InvalidResourceName(String),

    /// A required configuration value is missing.
    #[error("Missing configuration: {0}")]
    MissingConfig(String),

    /// The service-principal credential could not be loaded.
    #[error("Credential error: {0}")]
    Credential(String),

    /// A builder was missing a required field or held an invalid value.
    #[error("Invalid request: {0}")]
    Builder(String),
}

fn fmt_status(status: &Option<u16>) -> String {
    status
        .map(|s| format!(" (HTTP {s})"))
        .unwrap_or_default()
}

impl AciError {
    /// Create an `InvalidEndpoint` error with a parse error as its source.
    pub fn invalid_endpoint_with_source(message: impl Into<String>, source: url::ParseError) -> Self {
        Self::InvalidEndpoint {
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an `InvalidEndpoint` error without a source.
    pub fn invalid_endpoint(message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            message: message.into(),
            source: None,
        }
    }

    /// Whether a caller may reasonably retry the failed operation.
    ///
    /// Only `Transient` failures qualify; a rejected create will be rejected again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }

    /// Whether the error reports a missing resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The HTTP status code that produced this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { status, .. }
            | Self::NotFound { status, .. }
            | Self::Decode { status, .. } => Some(*status),
            Self::Transient { status, .. } => *status,
            _ => None,
        }
    }

    /// The service's `{code, message}` pair, when the error came from ARM.
    pub fn service_error(&self) -> Option<&ServiceError> {
        match self {
            Self::Validation { error, .. } | Self::NotFound { error, .. } => Some(error),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for AciError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transient {
            status: err.status().map(|s| s.as_u16()),
            message: crate::codec::sanitize_error_message(&err.to_string()),
            source: Some(err),
        }
    }
}

/// Result type alias for ACI operations.
pub type AciResult<T> = std::result::Result<T, AciError>;
