//! JSON encoding of request bodies and decoding of ARM responses.
//!
//! Success bodies are parsed against the caller's expected type. Error bodies
//! are parsed permissively: ARM usually wraps `{code, message}` in an `error`
//! object, some endpoints return the pair bare, and proxies in front of ARM
//! may return plain text. Every shape yields a classified [`AciError`].

use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{AciError, AciResult, ServiceError};

/// Maximum length for raw bodies embedded in errors.
const MAX_ERROR_MESSAGE_LEN: usize = 1000;

/// Serialize a request body to JSON bytes.
///
/// Optional fields that are `None` are omitted by the models' serde attributes;
/// explicit zeros are kept.
pub fn encode<T: Serialize + ?Sized>(value: &T) -> AciResult<Bytes> {
    Ok(Bytes::from(serde_json::to_vec(value)?))
}

/// Decode a response body for the given status.
///
/// On 2xx the body is parsed as `T`; any other status becomes a classified
/// error via [`decode_error`]. Never panics on malformed input.
pub fn decode<T: DeserializeOwned>(status: u16, body: &[u8]) -> AciResult<T> {
    if !(200..300).contains(&status) {
        return Err(decode_error(status, body));
    }

    serde_json::from_slice(body).map_err(|source| AciError::Decode {
        status,
        body: truncate_message(&String::from_utf8_lossy(body)),
        source,
    })
}

/// The wire shapes an ARM error body can take.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ErrorEnvelope {
    Nested { error: ErrorBody },
    Bare(ErrorBody),
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ErrorEnvelope {
    fn into_body(self) -> ErrorBody {
        match self {
            Self::Nested { error } | Self::Bare(error) => error,
        }
    }
}

/// How an unsuccessful HTTP status maps onto [`AciError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// 401 and 403.
    Auth,
    /// 404.
    NotFound,
    /// 408, 429 and every 5xx.
    Transient,
    /// Every other non-2xx status.
    Validation,
}

/// Classify a non-2xx status code.
pub fn classify(status: u16) -> ErrorClass {
    match status {
        401 | 403 => ErrorClass::Auth,
        404 => ErrorClass::NotFound,
        408 | 429 | 500..=599 => ErrorClass::Transient,
        _ => ErrorClass::Validation,
    }
}

/// Build a classified error from a non-2xx response.
///
/// Tries `{error: {code, message}}`, then a bare `{code, message}`, then the
/// raw body. Envelope values are kept verbatim; the raw-body fallback is
/// sanitized and truncated.
pub fn decode_error(status: u16, body: &[u8]) -> AciError {
    let raw = String::from_utf8_lossy(body);

    let parsed = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .map(ErrorEnvelope::into_body)
        .filter(|b| b.code.is_some() || b.message.is_some());

    let error = match parsed {
        Some(ErrorBody { code, message }) => ServiceError {
            code,
            message: message.unwrap_or_else(|| truncate_message(&raw)),
        },
        None => ServiceError {
            code: None,
            message: if raw.trim().is_empty() {
                format!("HTTP {status} with empty body")
            } else {
                truncate_message(&raw)
            },
        },
    };

    match classify(status) {
        ErrorClass::Auth => AciError::Auth(format!("HTTP {status}: {error}")),
        ErrorClass::NotFound => AciError::NotFound { status, error },
        ErrorClass::Transient => AciError::Transient {
            status: Some(status),
            message: error.to_string(),
            source: None,
        },
        ErrorClass::Validation => AciError::Validation { status, error },
    }
}

/// Sanitize error messages by removing bearer tokens.
///
/// Prevents credentials from being accidentally logged or exposed in error messages.
pub(crate) fn sanitize_error_message(msg: &str) -> String {
    let mut result = msg.to_string();

    // Use an offset to avoid re-scanning redacted text
    let mut search_start = 0;
    while search_start < result.len() {
        let Some(relative_pos) = result[search_start..].find("Bearer ") else {
            break;
        };
        let token_start = search_start + relative_pos + "Bearer ".len();
        if token_start >= result.len() {
            break;
        }

        if result[token_start..].starts_with("[REDACTED]") {
            search_start = token_start + "[REDACTED]".len();
            continue;
        }

        let token_end = result[token_start..]
            .find(|c: char| c.is_whitespace() || c == '"' || c == '\'' || c == ',')
            .map_or(result.len(), |pos| token_start + pos);

        if token_end > token_start {
            result.replace_range(token_start..token_end, "[REDACTED]");
            search_start = token_start + "[REDACTED]".len();
        } else {
            search_start = token_start;
        }
    }

    result
}

/// Truncate a message if it exceeds the maximum length.
/// Also sanitizes sensitive data before truncating.
pub(crate) fn truncate_message(msg: &str) -> String {
    let sanitized = sanitize_error_message(msg);

    if sanitized.len() > MAX_ERROR_MESSAGE_LEN {
        let mut cut = MAX_ERROR_MESSAGE_LEN;
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        format!("{}... (truncated)", &sanitized[..cut])
    } else {
        sanitized
    }
}
