/// Establish-or-restore and verify the association with the password manager.
use std::path::Path;

use super::errors::LookupError;
use super::keyfile::{self, Association};
use crate::proxy::ProxyClient;

/// How the association for this run came about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Established {
    /// No keyfile existed; a new association was made and saved.
    Created {
        /// Identifier issued by the password manager.
        id: String,
    },
    /// An existing keyfile was loaded.
    Loaded {
        /// Identifier read from the keyfile.
        id: String,
    },
}

/// Create a new association or restore the one stored at `keyfile_path`.
///
/// When the keyfile is absent this runs the interactive key exchange, which
/// blocks until the user confirms it in KeePassXC. The keyfile is written only
/// after both `associate` and `dump_associate` succeed.
///
/// # Errors
///
/// - `LookupError::KeyfileIo` / `LookupError::KeyfileFormat` — unreadable or malformed keyfile
/// - `LookupError::Proxy` — the proxy failed to associate or load
pub fn establish<P: ProxyClient + ?Sized>(
    proxy: &mut P,
    keyfile_path: &Path,
) -> Result<Established, LookupError> {
    let exists = keyfile_path
        .try_exists()
        .map_err(|source| LookupError::KeyfileIo {
            path: keyfile_path.display().to_string(),
            source,
        })?;

    if exists {
        let association = keyfile::read(keyfile_path)?;
        proxy.load_associate(&association.id, &association.key)?;
        log::debug!("loaded association '{}'", association.id);
        return Ok(Established::Loaded { id: association.id });
    }

    log::debug!("no keyfile at {}, starting key exchange", keyfile_path.display());
    proxy.associate()?;
    let (id, key) = proxy.dump_associate()?;
    let association = Association { id, key };
    keyfile::write(keyfile_path, &association)?;
    Ok(Established::Created { id: association.id })
}

/// Confirm the password manager still accepts the current association.
///
/// # Errors
///
/// - `LookupError::AssociationTest` — the manager answered with an error payload
/// - `LookupError::AssociationRejected` — the manager answered "not associated"
pub fn verify<P: ProxyClient + ?Sized>(proxy: &mut P) -> Result<(), LookupError> {
    match proxy.test_associate() {
        Ok(true) => Ok(()),
        Ok(false) => Err(LookupError::AssociationRejected),
        Err(source) => Err(LookupError::AssociationTest { source }),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;
    use crate::proxy::fake::FakeProxy;

    #[test]
    fn test_first_run_associates_and_saves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assoc.json");
        let mut proxy = FakeProxy::default();

        let outcome = establish(&mut proxy, &path).unwrap();
        assert_eq!(
            outcome,
            Established::Created {
                id: "fake-client".to_owned()
            }
        );
        assert_eq!(proxy.calls, ["associate", "dump_associate"]);
        let saved = keyfile::read(&path).unwrap();
        assert_eq!(saved.id, "fake-client");
        assert_eq!(saved.key, vec![0x01, 0x23, 0xab]);
    }

    #[test]
    fn test_second_run_loads_without_associating() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assoc.json");
        establish(&mut FakeProxy::default(), &path).unwrap();

        let mut proxy = FakeProxy::default();
        let outcome = establish(&mut proxy, &path).unwrap();
        assert!(matches!(outcome, Established::Loaded { .. }));
        assert!(!proxy.called("associate"));
        assert_eq!(
            proxy.loaded,
            Some(("fake-client".to_owned(), vec![0x01, 0x23, 0xab]))
        );
    }

    #[test]
    fn test_failed_associate_leaves_no_keyfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assoc.json");
        let mut proxy = FakeProxy {
            fail_on: Some("associate"),
            ..FakeProxy::default()
        };
        assert!(matches!(
            establish(&mut proxy, &path),
            Err(LookupError::Proxy(_))
        ));
        assert!(!path.exists());
    }

    #[test]
    fn test_failed_dump_leaves_no_keyfile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assoc.json");
        let mut proxy = FakeProxy {
            fail_on: Some("dump_associate"),
            ..FakeProxy::default()
        };
        assert!(establish(&mut proxy, &path).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_keyfile_never_reaches_proxy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("assoc.json");
        fs::write(&path, "{\"id\": \"a\", \"key\": \"not hex\"}").unwrap();
        let mut proxy = FakeProxy::default();
        assert!(matches!(
            establish(&mut proxy, &path),
            Err(LookupError::KeyfileFormat { .. })
        ));
        assert!(proxy.calls.is_empty());
    }

    #[test]
    fn test_verify_outcomes() {
        assert!(verify(&mut FakeProxy::default()).is_ok());

        let mut rejected = FakeProxy {
            test_passes: false,
            ..FakeProxy::default()
        };
        assert!(matches!(
            verify(&mut rejected),
            Err(LookupError::AssociationRejected)
        ));

        let mut failing = FakeProxy {
            fail_on: Some("test_associate"),
            ..FakeProxy::default()
        };
        let err = verify(&mut failing).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("test_associate refused"), "{message}");
        assert!(message.contains("error code 7"), "{message}");
        assert!(message.contains("re-associate"), "{message}");
        assert_eq!(err.protocol_code(), Some("7"));
    }
}
