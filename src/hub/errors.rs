//! Hub API error classification
//!
//! Every non-2xx response, local precondition failure and interactive abort
//! ends up as a [`HubError`]. Call sites branch on [`HubError::kind`] or on the
//! `is_*` predicates instead of matching variants directly.

use std::fmt;

use reqwest::StatusCode;
use serde_json::Value;

/// Classification of a [`HubError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No credentials could be resolved locally
    Authentication,
    /// Second factor code rejected by the server
    TwoFactorFailure,
    /// HTTP 403
    Forbidden,
    /// HTTP 404
    NotFound,
    /// Any other non-2xx status
    Status,
    /// Malformed `Ratelimit-*` header
    RateLimitParse,
    /// Interactive wait aborted by the cancellation signal
    Cancelled,
    /// Transport, decoding, URL or terminal IO errors, passed through unclassified
    Transport,
}

/// Hub client error
#[derive(Debug)]
pub enum HubError {
    /// Raised before any network call when no credentials are available
    Authentication,

    /// Second factor login rejected
    TwoFactorFailure(String),

    /// Operation not permitted (HTTP 403)
    Forbidden,

    /// Resource not found (HTTP 404)
    NotFound,

    /// Other HTTP failure with the message extracted from the body
    Status { code: u16, message: String },

    /// `Ratelimit-Limit` / `Ratelimit-Remaining` header could not be parsed
    RateLimitParse(String),

    /// Cancelled while waiting for user input or for an aggregation join
    Cancelled,

    /// Network or HTTP client error
    Http(reqwest::Error),

    /// Response body could not be decoded
    Json(serde_json::Error),

    /// A request URL could not be built
    InvalidUrl(String),

    /// Terminal input/output failed
    Io(std::io::Error),
}

/// Result alias used across the Hub client
pub type HubResult<T> = Result<T, HubError>;

impl fmt::Display for HubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Authentication => write!(f, "authentication error"),
            Self::TwoFactorFailure(msg) => {
                write!(f, "second factor authentication failed: {}", msg)
            }
            Self::Forbidden => write!(f, "operation not permitted"),
            Self::NotFound => write!(f, "resource not found"),
            Self::Status { code, message } => {
                write!(f, "bad status code {}: {}", code, message)
            }
            Self::RateLimitParse(value) => write!(f, "bad limit header {:?}", value),
            Self::Cancelled => write!(f, "operation cancelled"),
            Self::Http(e) => write!(f, "HTTP request failed: {}", e),
            Self::Json(e) => write!(f, "failed to decode response: {}", e),
            Self::InvalidUrl(msg) => write!(f, "invalid URL: {}", msg),
            Self::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for HubError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Http(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for HubError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e)
    }
}

impl From<std::io::Error> for HubError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for HubError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl HubError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Authentication => ErrorKind::Authentication,
            Self::TwoFactorFailure(_) => ErrorKind::TwoFactorFailure,
            Self::Forbidden => ErrorKind::Forbidden,
            Self::NotFound => ErrorKind::NotFound,
            Self::Status { .. } => ErrorKind::Status,
            Self::RateLimitParse(_) => ErrorKind::RateLimitParse,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Http(_) | Self::Json(_) | Self::InvalidUrl(_) | Self::Io(_) => {
                ErrorKind::Transport
            }
        }
    }

    pub fn is_authentication_error(&self) -> bool {
        self.kind() == ErrorKind::Authentication
    }

    pub fn is_two_factor_failure(&self) -> bool {
        self.kind() == ErrorKind::TwoFactorFailure
    }

    pub fn is_forbidden(&self) -> bool {
        self.kind() == ErrorKind::Forbidden
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_status_error(&self) -> bool {
        self.kind() == ErrorKind::Status
    }

    pub fn is_rate_limit_parse_error(&self) -> bool {
        self.kind() == ErrorKind::RateLimitParse
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind() == ErrorKind::Cancelled
    }

    /// HTTP status code carried by the error, if it came from a response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Forbidden => Some(403),
            Self::NotFound => Some(404),
            Self::Status { code, .. } => Some(*code),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server supplied message, without the status prefix
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Status { message, .. } | Self::TwoFactorFailure(message) => Some(message),
            _ => None,
        }
    }
}

/// Extracts a human readable message from an error body
///
/// Looks at the `message` field first, then `detail`. Returns `None` when the
/// body is not a JSON object or carries neither field as a string.
pub fn extract_message(body: &[u8]) -> Option<String> {
    let json: Value = serde_json::from_slice(body).ok()?;
    let object = json.as_object()?;
    ["message", "detail"]
        .iter()
        .find_map(|key| object.get(*key).and_then(|v| v.as_str()))
        .map(|s| s.to_string())
}

/// Maps a non-2xx response to a [`HubError`]
pub fn classify(status: StatusCode, body: &[u8]) -> HubError {
    match status {
        StatusCode::FORBIDDEN => HubError::Forbidden,
        StatusCode::NOT_FOUND => HubError::NotFound,
        _ => {
            let message = extract_message(body).unwrap_or_else(|| status.to_string());
            HubError::Status {
                code: status.as_u16(),
                message,
            }
        }
    }
}
