/// Collaborator layer: the interface to the KeePassXC proxy engine.
///
/// The encrypted proxy protocol itself lives outside this crate. Everything
/// above this module talks to it only through [`ProxyClient`].
pub mod bridge;
pub mod errors;
#[cfg(test)]
pub mod fake;

use serde::Deserialize;

pub use bridge::BridgeProxy;
pub use errors::ProxyError;

/// A credential entry returned by a lookup. Any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginRecord {
    /// Entry title.
    #[serde(default)]
    pub name: Option<String>,
    /// Username.
    #[serde(default)]
    pub login: Option<String>,
    /// Password.
    #[serde(default)]
    pub password: Option<String>,
}

/// Operations the proxy engine must provide.
///
/// Calls are strictly sequential: `connect` first, then either `associate`
/// followed by `dump_associate`, or `load_associate`; then `test_associate`
/// and finally `get_logins`.
pub trait ProxyClient {
    /// Establish the local transport session.
    ///
    /// # Errors
    ///
    /// Fails if the password manager (or the program fronting it) is not reachable.
    fn connect(&mut self) -> Result<(), ProxyError>;

    /// Run the interactive key exchange. Blocks until the user answers the
    /// prompt in KeePassXC.
    ///
    /// # Errors
    ///
    /// Fails if the user declines or the database is locked.
    fn associate(&mut self) -> Result<(), ProxyError>;

    /// Return the `(id, public key)` produced by [`ProxyClient::associate`].
    ///
    /// # Errors
    ///
    /// Fails if no association has been made in this session.
    fn dump_associate(&mut self) -> Result<(String, Vec<u8>), ProxyError>;

    /// Restore a previously persisted association.
    ///
    /// # Errors
    ///
    /// Fails on transport or protocol errors.
    fn load_associate(&mut self, id: &str, public_key: &[u8]) -> Result<(), ProxyError>;

    /// Check that the current association is still accepted.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::Protocol` carrying the manager's error payload.
    fn test_associate(&mut self) -> Result<bool, ProxyError>;

    /// Look up all entries matching `url`.
    ///
    /// # Errors
    ///
    /// Returns `ProxyError::Protocol` carrying the manager's error payload.
    fn get_logins(&mut self, url: &str) -> Result<Vec<LoginRecord>, ProxyError>;
}
