/// Errors from the association and lookup workflow.
use thiserror::Error;

use crate::proxy::ProxyError;

/// Everything that can end a lookup run early.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The keyfile exists but could not be read, or could not be created.
    #[error("Keyfile '{path}': {source}")]
    KeyfileIo {
        /// Keyfile path as given on the command line.
        path: String,
        /// Underlying OS error.
        #[source]
        source: std::io::Error,
    },

    /// The keyfile was read but does not hold a usable association.
    #[error("Failed to load association from '{path}': {reason}. Delete the keyfile and re-run to re-associate.")]
    KeyfileFormat {
        /// Keyfile path as given on the command line.
        path: String,
        /// Which part of the file is malformed.
        reason: String,
    },

    /// The password manager refused the association test with an error.
    #[error("Association test failed: {source}. Delete the keyfile and re-run to re-associate.")]
    AssociationTest {
        /// Error reported by the password manager.
        #[source]
        source: ProxyError,
    },

    /// The password manager answered the association test negatively.
    #[error("Association test failed. Delete the keyfile and re-run to re-associate.")]
    AssociationRejected,

    /// Any other collaborator failure (connect, associate, load, query).
    #[error(transparent)]
    Proxy(#[from] ProxyError),
}

impl LookupError {
    /// Machine-readable error code (snake_case) for the JSON error envelope.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::KeyfileIo { .. } => "keyfile_io",
            Self::KeyfileFormat { .. } => "keyfile_format",
            Self::AssociationTest { .. } | Self::AssociationRejected => "association_failed",
            Self::Proxy(ProxyError::Protocol { .. }) => "protocol_error",
            Self::Proxy(ProxyError::Spawn { .. } | ProxyError::NotConnected) => {
                "proxy_unavailable"
            }
            Self::Proxy(_) => "proxy_error",
        }
    }

    /// The password manager's `errorCode`, if this error carries one.
    #[must_use]
    pub fn protocol_code(&self) -> Option<&str> {
        match self {
            Self::AssociationTest { source } | Self::Proxy(source) => source.protocol_code(),
            _ => None,
        }
    }
}
