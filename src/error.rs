use std::time::Duration;

/// All errors that can occur while talking to the ticketing API or driving
/// a check-in session.
#[derive(thiserror::Error, Debug)]
pub enum TicketdeskError {
    /// HTTP request failed (network, DNS, TLS, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
        /// The `message` field of the error body, when the server sent one.
        message: Option<String>,
    },

    /// Failed to read the response body.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// The response body was not the JSON shape we expected.
    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },

    /// The request did not complete within the configured bound.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("no event selected")]
    NoEventSelected,

    /// The event is not part of today's fetched events.
    #[error("event {0} is not scheduled for today")]
    UnknownEvent(String),

    /// The check-in controller has shut down.
    #[error("check-in session closed")]
    SessionClosed,

    /// A token could not be decoded into claims.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("account is not an administrator")]
    NotAdmin,

    /// A configuration value could not be parsed.
    #[error("invalid configuration for {key}: {reason}")]
    Config { key: &'static str, reason: String },
}

impl TicketdeskError {
    /// The message the server attached to an error response, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            TicketdeskError::UnexpectedStatus {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }

    /// A short operator-facing description for failures that produced no
    /// server message. Connection failures without any response yield `None`.
    pub fn transport_message(&self) -> Option<String> {
        match self {
            TicketdeskError::Timeout(_) => Some("Request timed out".to_string()),
            TicketdeskError::Http { source, .. } if source.is_timeout() => {
                Some("Request timed out".to_string())
            }
            TicketdeskError::UnexpectedStatus { status, .. } => Some(format!(
                "Request failed with status {}",
                status.as_u16()
            )),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TicketdeskError>;

/// Why a code reader could not be opened.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera unavailable: {0}")]
    Unavailable(String),
}
