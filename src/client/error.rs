//! Client error types

use thiserror::Error;

/// Exchange failure. The message is shown to the user as-is.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ClientError {
    pub kind: ClientErrorKind,
    pub message: String,
}

impl ClientError {
    pub fn new(kind: ClientErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Network, message)
    }

    pub fn timeout() -> Self {
        Self::new(
            ClientErrorKind::Timeout,
            "El agente ha tardado demasiado en responder.",
        )
    }

    /// Non-2xx response
    pub fn status(status: u16) -> Self {
        Self::new(
            ClientErrorKind::Status(status),
            "No se pudo contactar con el agente.",
        )
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ClientErrorKind::Decode, message)
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientErrorKind {
    /// Connection refused, DNS failure, reset
    Network,
    /// Request exceeded the configured timeout
    Timeout,
    /// Service answered with a non-success status
    Status(u16),
    /// Success status but the body was not a valid reply
    Decode,
}
