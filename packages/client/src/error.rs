//! Error taxonomy for platform calls.
//!
//! The platform signals failures through a small set of non-standard HTTP
//! status codes; [`ClientError::from_status`] maps them to typed errors.
//! The data-model layer never raises on malformed input — only this layer
//! raises, and only on transport and session conditions.

/// An error surfaced while issuing a platform request or interpreting its
/// response status.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The HTTP request or response failed at the transport level.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Status 472, or a required session ticket was missing before the
    /// call was attempted.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Status 400 — the request was malformed.
    #[error("bad request: {0}")]
    Request(String),

    /// Status 473 (operation rejected), or a numeric-response endpoint
    /// returned a non-numeric body.
    #[error("invalid response: {0}")]
    Response(String),

    /// Status ≥ 500.
    #[error("server error: status {0}")]
    Server(u16),

    /// Any other unrecognised non-200 status.
    #[error("unexpected status code: {0}")]
    Unexpected(u16),

    /// A local file operation failed while writing a download.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Map a non-200 platform status code to its error kind.
    pub fn from_status(status: u16) -> Self {
        match status {
            472 => ClientError::Auth("authentication failed".into()),
            473 => ClientError::Response("request was invalid or operation failed".into()),
            400 => ClientError::Request("bad request".into()),
            s if s >= 500 => ClientError::Server(s),
            s => ClientError::Unexpected(s),
        }
    }

    /// The error raised when a call requires a session ticket and none is
    /// stored on the client.
    pub(crate) fn no_ticket() -> Self {
        ClientError::Auth("no session ticket stored in the client".into())
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert!(matches!(ClientError::from_status(472), ClientError::Auth(_)));
        assert!(matches!(
            ClientError::from_status(473),
            ClientError::Response(_)
        ));
        assert!(matches!(
            ClientError::from_status(400),
            ClientError::Request(_)
        ));
        assert!(matches!(
            ClientError::from_status(503),
            ClientError::Server(503)
        ));
        assert!(matches!(
            ClientError::from_status(418),
            ClientError::Unexpected(418)
        ));
    }
}
