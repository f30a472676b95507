// Error handling for the daemon RPC path
use serde_json::Value;
use thiserror::Error;

/// Failure kinds of a single daemon RPC round trip
#[derive(Debug, Error)]
pub enum RpcError {
    // HTTP 401
    #[error("Connection Rejected: 401 Unauthorized. Please check user/pass")]
    Unauthorized,

    // HTTP 403
    #[error("Connection Rejected: 403 Forbidden")]
    Forbidden,

    /// HTTP 500; the daemon reports its own error text in the body
    #[error("{0}")]
    Daemon(String),

    /// Success status, but the body is not JSON
    #[error("HTTP Status code: {status}")]
    MalformedResponse {
        status: u16,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// Any status outside 2xx that has no dedicated variant
    #[error("HTTP Status code: {status}")]
    UnexpectedStatus { status: u16, body: String },

    /// The request never produced a response
    #[error("Request Error: {0}")]
    Transport(String),

    /// The UI called `rpc` without a command; nothing is sent
    #[error("Request Error: no RPC command given")]
    MissingCommand,
}

impl RpcError {
    /// Description handed to the UI inside a failure envelope.
    ///
    /// Most variants render as their display string. An unexpected status whose
    /// body is valid JSON passes that body through so the UI can show the
    /// daemon's own error object.
    pub fn envelope_result(&self) -> Value {
        match self {
            RpcError::UnexpectedStatus { body, .. } => serde_json::from_str(body)
                .unwrap_or_else(|_| Value::String(self.to_string())),
            _ => Value::String(self.to_string()),
        }
    }

    /// HTTP status the daemon answered with, when there was an answer
    pub fn status(&self) -> Option<u16> {
        match self {
            RpcError::Unauthorized => Some(401),
            RpcError::Forbidden => Some(403),
            RpcError::Daemon(_) => Some(500),
            RpcError::MalformedResponse { status, .. } | RpcError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            RpcError::Transport(_) | RpcError::MissingCommand => None,
        }
    }
}

impl From<reqwest::Error> for RpcError {
    fn from(err: reqwest::Error) -> Self {
        RpcError::Transport(err.to_string())
    }
}
