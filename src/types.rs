/// Serializable output types.
///
/// These are what `--json` writes: records to stdout, the error envelope to
/// stderr. They are decoupled from the proxy-layer `LoginRecord`.
use serde::{Deserialize, Serialize};

use crate::association::LookupError;
use crate::proxy::LoginRecord;

/// A credential entry as printed in JSON mode. Missing fields are `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOutput {
    /// Entry title.
    pub name: Option<String>,
    /// Username.
    pub login: Option<String>,
    /// Password.
    pub password: Option<String>,
}

impl From<&LoginRecord> for LoginOutput {
    fn from(record: &LoginRecord) -> Self {
        Self {
            name: record.name.clone(),
            login: record.login.clone(),
            password: record.password.clone(),
        }
    }
}

/// A structured error envelope for JSON error output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorOutput {
    /// Always `false`.
    pub ok: bool,
    /// Error details.
    pub error: ErrorDetail,
}

/// Error detail in the JSON error envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (snake_case).
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// `errorCode` reported by KeePassXC, when the failure came from it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy_code: Option<String>,
}

impl ErrorOutput {
    /// Construct from a `LookupError`.
    #[must_use]
    pub fn from_lookup_error(err: &LookupError) -> Self {
        Self {
            ok: false,
            error: ErrorDetail {
                code: err.code().to_owned(),
                message: err.to_string(),
                proxy_code: err.protocol_code().map(str::to_owned),
            },
        }
    }
}
