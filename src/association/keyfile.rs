/// Keyfile persistence: one association stored as `{"id": .., "key": <hex>}`.
///
/// The file is written exactly once, after a successful key exchange, and is
/// treated as opaque afterwards. Re-association means deleting it.
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use super::errors::LookupError;

/// A persisted trust relationship with the password manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Association {
    /// Identifier issued by KeePassXC when the user accepted the association.
    pub id: String,
    /// Raw public key bytes used to re-authenticate.
    pub key: Vec<u8>,
}

#[derive(Serialize)]
struct StoredAssociation<'a> {
    id: &'a str,
    key: String,
}

impl Association {
    /// Parse keyfile contents.
    ///
    /// # Errors
    ///
    /// Returns a short description of the first malformed aspect found.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let value: Value =
            serde_json::from_str(contents).map_err(|e| format!("invalid JSON: {e}"))?;
        let Value::Object(map) = value else {
            return Err("expected a JSON object".to_owned());
        };

        let id = string_member(&map, "id")?;
        if id.is_empty() {
            return Err("'id' is empty".to_owned());
        }

        let key = hex::decode(string_member(&map, "key")?)
            .map_err(|e| format!("'key' is not valid hex: {e}"))?;
        if key.is_empty() {
            return Err("'key' is empty".to_owned());
        }

        Ok(Self {
            id: id.to_owned(),
            key,
        })
    }

    /// Serialize to the keyfile JSON representation.
    ///
    /// # Errors
    ///
    /// Returns the serializer error; cannot happen for string fields in practice.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&StoredAssociation {
            id: &self.id,
            key: hex::encode(&self.key),
        })
    }
}

fn string_member<'a>(map: &'a Map<String, Value>, name: &str) -> Result<&'a str, String> {
    match map.get(name) {
        None => Err(format!("missing '{name}' field")),
        Some(Value::String(s)) => Ok(s),
        Some(_) => Err(format!("'{name}' must be a string")),
    }
}

/// Read and validate the association stored at `path`.
///
/// # Errors
///
/// - `LookupError::KeyfileIo` — the file cannot be read
/// - `LookupError::KeyfileFormat` — the contents are not a valid association
pub fn read(path: &Path) -> Result<Association, LookupError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::InvalidData => {
            return Err(format_error(path, "not valid UTF-8".to_owned()));
        }
        Err(source) => return Err(io_error(path, source)),
    };
    Association::parse(&contents).map_err(|reason| format_error(path, reason))
}

/// Create the keyfile at `path` holding `association`.
///
/// Never overwrites an existing file. A failed write removes the partial file.
///
/// # Errors
///
/// Returns `LookupError::KeyfileIo` if the file exists or cannot be written.
pub fn write(path: &Path, association: &Association) -> Result<(), LookupError> {
    let json = association
        .to_json()
        .map_err(|e| io_error(path, io::Error::other(e)))?;

    let mut file = create_new(path).map_err(|source| io_error(path, source))?;
    if let Err(source) = file
        .write_all(json.as_bytes())
        .and_then(|()| file.sync_all())
    {
        drop(file);
        let _ = fs::remove_file(path);
        return Err(io_error(path, source));
    }
    Ok(())
}

fn create_new(path: &Path) -> io::Result<File> {
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    options.open(path)
}

fn io_error(path: &Path, source: io::Error) -> LookupError {
    LookupError::KeyfileIo {
        path: path.display().to_string(),
        source,
    }
}

fn format_error(path: &Path, reason: String) -> LookupError {
    LookupError::KeyfileFormat {
        path: path.display().to_string(),
        reason,
    }
}
