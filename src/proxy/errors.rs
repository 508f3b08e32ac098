/// Errors from the proxy collaborator layer.
use thiserror::Error;

/// Typed errors raised while talking to the proxy engine.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The bridge program could not be started.
    #[error("Could not start proxy bridge '{program}': {source}")]
    Spawn {
        /// Program that was executed.
        program: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the bridge failed.
    #[error("Proxy I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The bridge closed its output before answering.
    #[error("Proxy bridge closed the connection while waiting for '{action}'")]
    Closed {
        /// Request that was left unanswered.
        action: String,
    },

    /// The bridge answered with something that is not the expected shape.
    #[error("Malformed response to '{action}': {reason}")]
    Malformed {
        /// Request the response belongs to.
        action: String,
        /// What was wrong with it.
        reason: String,
    },

    /// KeePassXC rejected the request.
    #[error("{message} (error code {code})")]
    Protocol {
        /// Human-readable error from the password manager.
        message: String,
        /// Machine-readable error code from the password manager.
        code: String,
    },

    /// A request was issued before `connect`.
    #[error("Proxy is not connected")]
    NotConnected,
}

impl ProxyError {
    /// The password manager's own error code, when the error came from it.
    #[must_use]
    pub fn protocol_code(&self) -> Option<&str> {
        match self {
            Self::Protocol { code, .. } => Some(code),
            _ => None,
        }
    }
}
