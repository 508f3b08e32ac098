/// Line-delimited JSON bridge to an external proxy program.
///
/// The bridge program owns the encrypted KeePassXC protocol. This side writes
/// one request object per line to its stdin and reads one response object per
/// line from its stdout:
///
/// - request: `{"action":"get-logins","url":"https://example.com"}`
/// - success: any object without an `error` member
/// - failure: `{"error":"Database not opened","errorCode":"1"}`
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{LoginRecord, ProxyClient, ProxyError};

/// Bridge program used when neither `--proxy-command` nor `KPXC_PROXY_COMMAND` is set.
pub const DEFAULT_PROGRAM: &str = "keepassxc-proxy-bridge";

/// KeePassXC `errorCode` for a lookup that matched no entries.
pub const NO_LOGINS_FOUND: &str = "15";

/// Longest response line accepted from the bridge.
const MAX_RESPONSE_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Serialize)]
#[serde(tag = "action", rename_all = "kebab-case")]
enum Request<'a> {
    Connect,
    Associate,
    DumpAssociate,
    LoadAssociate { id: &'a str, key: String },
    TestAssociate,
    GetLogins { url: &'a str },
}

impl Request<'_> {
    fn action(&self) -> &'static str {
        match self {
            Self::Connect => "connect",
            Self::Associate => "associate",
            Self::DumpAssociate => "dump-associate",
            Self::LoadAssociate { .. } => "load-associate",
            Self::TestAssociate => "test-associate",
            Self::GetLogins { .. } => "get-logins",
        }
    }
}

#[derive(Debug, Deserialize)]
struct DumpResponse {
    id: String,
    key: String,
}

#[derive(Debug, Deserialize)]
struct TestResponse {
    success: bool,
}

#[derive(Debug, Deserialize)]
struct LoginsResponse {
    entries: Vec<LoginRecord>,
}

/// One request/response conversation over a pair of byte streams.
pub struct Channel<R, W> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> Channel<R, W> {
    /// Wrap a reader (bridge stdout) and writer (bridge stdin).
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    fn call(&mut self, request: &Request<'_>) -> Result<Value, ProxyError> {
        let action = request.action();
        let mut line =
            serde_json::to_string(request).map_err(|e| malformed(action, e.to_string()))?;
        line.push('\n');
        self.writer.write_all(line.as_bytes())?;
        self.writer.flush()?;

        let mut response = String::new();
        let read = (&mut self.reader)
            .take(MAX_RESPONSE_BYTES + 1)
            .read_line(&mut response)?;
        if read == 0 {
            return Err(ProxyError::Closed {
                action: action.to_owned(),
            });
        }
        if read as u64 > MAX_RESPONSE_BYTES {
            return Err(malformed(
                action,
                format!("response exceeds {MAX_RESPONSE_BYTES} bytes"),
            ));
        }
        let value: Value = serde_json::from_str(response.trim_end())
            .map_err(|e| malformed(action, format!("invalid JSON: {e}")))?;
        check_error(action, value)
    }

    fn call_as<T: DeserializeOwned>(&mut self, request: &Request<'_>) -> Result<T, ProxyError> {
        let action = request.action();
        let value = self.call(request)?;
        serde_json::from_value(value).map_err(|e| malformed(action, e.to_string()))
    }
}

impl<R: BufRead, W: Write> ProxyClient for Channel<R, W> {
    fn connect(&mut self) -> Result<(), ProxyError> {
        self.call(&Request::Connect).map(drop)
    }

    fn associate(&mut self) -> Result<(), ProxyError> {
        self.call(&Request::Associate).map(drop)
    }

    fn dump_associate(&mut self) -> Result<(String, Vec<u8>), ProxyError> {
        let request = Request::DumpAssociate;
        let dump: DumpResponse = self.call_as(&request)?;
        let key = hex::decode(&dump.key)
            .map_err(|e| malformed(request.action(), format!("key is not valid hex: {e}")))?;
        Ok((dump.id, key))
    }

    fn load_associate(&mut self, id: &str, public_key: &[u8]) -> Result<(), ProxyError> {
        self.call(&Request::LoadAssociate {
            id,
            key: hex::encode(public_key),
        })
        .map(drop)
    }

    fn test_associate(&mut self) -> Result<bool, ProxyError> {
        let response: TestResponse = self.call_as(&Request::TestAssociate)?;
        Ok(response.success)
    }

    /// KeePassXC reports an empty match as error 15; that is returned as no entries.
    fn get_logins(&mut self, url: &str) -> Result<Vec<LoginRecord>, ProxyError> {
        match self.call_as::<LoginsResponse>(&Request::GetLogins { url }) {
            Ok(response) => Ok(response.entries),
            Err(err) if err.protocol_code() == Some(NO_LOGINS_FOUND) => {
                log::debug!("no entries for {url}: {err}");
                Ok(Vec::new())
            }
            Err(err) => Err(err),
        }
    }
}

/// Split a response into success or the password manager's structured error.
fn check_error(action: &str, value: Value) -> Result<Value, ProxyError> {
    let Value::Object(map) = &value else {
        return Err(malformed(action, "expected a JSON object".to_owned()));
    };
    let failure = match map.get("error") {
        None | Some(Value::Null) => None,
        Some(message) => Some(ProxyError::Protocol {
            message: text(message),
            code: map
                .get("errorCode")
                .map_or_else(|| "unknown".to_owned(), text),
        }),
    };
    match failure {
        Some(err) => Err(err),
        None => Ok(value),
    }
}

/// KeePassXC sends `errorCode` as a string, some bridges as a number.
fn text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn malformed(action: &str, reason: String) -> ProxyError {
    ProxyError::Malformed {
        action: action.to_owned(),
        reason,
    }
}

struct Session {
    child: Child,
    channel: Channel<BufReader<ChildStdout>, ChildStdin>,
}

impl Drop for Session {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// [`ProxyClient`] backed by a child process speaking the bridge protocol.
///
/// The child is spawned by `connect` and killed when the client is dropped.
pub struct BridgeProxy {
    program: String,
    session: Option<Session>,
}

impl BridgeProxy {
    /// Create an unconnected client for `program`.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            session: None,
        }
    }

    fn channel(&mut self) -> Result<&mut Channel<BufReader<ChildStdout>, ChildStdin>, ProxyError> {
        self.session
            .as_mut()
            .map(|s| &mut s.channel)
            .ok_or(ProxyError::NotConnected)
    }
}

impl ProxyClient for BridgeProxy {
    fn connect(&mut self) -> Result<(), ProxyError> {
        if self.session.is_none() {
            log::debug!("spawning proxy bridge '{}'", self.program);
            let mut child = Command::new(&self.program)
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::inherit())
                .spawn()
                .map_err(|source| ProxyError::Spawn {
                    program: self.program.clone(),
                    source,
                })?;
            let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ProxyError::Closed {
                    action: "connect".to_owned(),
                });
            };
            self.session = Some(Session {
                child,
                channel: Channel::new(BufReader::new(stdout), stdin),
            });
        }
        self.channel()?.connect()
    }

    fn associate(&mut self) -> Result<(), ProxyError> {
        self.channel()?.associate()
    }

    fn dump_associate(&mut self) -> Result<(String, Vec<u8>), ProxyError> {
        self.channel()?.dump_associate()
    }

    fn load_associate(&mut self, id: &str, public_key: &[u8]) -> Result<(), ProxyError> {
        self.channel()?.load_associate(id, public_key)
    }

    fn test_associate(&mut self) -> Result<bool, ProxyError> {
        self.channel()?.test_associate()
    }

    fn get_logins(&mut self, url: &str) -> Result<Vec<LoginRecord>, ProxyError> {
        self.channel()?.get_logins(url)
    }
}
