//! Relay error taxonomy

use thiserror::Error;

/// Errors raised anywhere in the relay.
///
/// Only `InvalidRole` and `Unauthorized` ever travel back to the peer that
/// caused them. The rest are contained at the connection boundary and end up
/// as a log line.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Registration named a role outside {phone, controller}
    #[error("invalid role '{0}'")]
    InvalidRole(String),

    /// Inbound data did not decode into a known frame
    #[error("malformed frame: {0}")]
    MalformedFrame(String),

    /// Shared secret missing or wrong on the one-shot entry
    #[error("unauthorized")]
    Unauthorized,

    /// A send to one connection failed or timed out
    #[error("delivery to connection {connection} failed: {reason}")]
    DeliveryFailure { connection: String, reason: String },

    /// A connection missed a full heartbeat cycle
    #[error("connection {0} did not answer the heartbeat")]
    DeadPeer(String),

    /// The connection was evicted or closed before the operation ran
    #[error("connection {0} is not registered")]
    UnknownConnection(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl RelayError {
    /// Short machine-readable name used in JSON error bodies
    pub fn code(&self) -> &'static str {
        match self {
            RelayError::InvalidRole(_) => "InvalidRole",
            RelayError::MalformedFrame(_) => "MalformedFrame",
            RelayError::Unauthorized => "Unauthorized",
            RelayError::DeliveryFailure { .. } => "DeliveryFailure",
            RelayError::DeadPeer(_) => "DeadPeer",
            RelayError::UnknownConnection(_) => "UnknownConnection",
            RelayError::Config(_) => "Config",
            RelayError::Io(_) => "Io",
        }
    }
}

impl From<serde_json::Error> for RelayError {
    fn from(err: serde_json::Error) -> Self {
        RelayError::MalformedFrame(err.to_string())
    }
}
