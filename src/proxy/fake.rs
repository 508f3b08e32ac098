/// In-memory `ProxyClient` for workflow tests.
use super::{LoginRecord, ProxyClient, ProxyError};

/// Records every call and answers from canned data.
#[derive(Debug)]
pub struct FakeProxy {
    /// Operation names in call order.
    pub calls: Vec<&'static str>,
    /// What `dump_associate` hands out after `associate`.
    pub issued: (String, Vec<u8>),
    /// What `load_associate` received.
    pub loaded: Option<(String, Vec<u8>)>,
    /// Answer for `test_associate` when it does not fail.
    pub test_passes: bool,
    /// Entries returned by `get_logins`.
    pub logins: Vec<LoginRecord>,
    /// Operation that answers with a protocol error instead.
    pub fail_on: Option<&'static str>,
}

impl Default for FakeProxy {
    fn default() -> Self {
        Self {
            calls: Vec::new(),
            issued: ("fake-client".to_owned(), vec![0x01, 0x23, 0xab]),
            loaded: None,
            test_passes: true,
            logins: Vec::new(),
            fail_on: None,
        }
    }
}

impl FakeProxy {
    fn record(&mut self, op: &'static str) -> Result<(), ProxyError> {
        self.calls.push(op);
        if self.fail_on == Some(op) {
            return Err(ProxyError::Protocol {
                message: format!("{op} refused"),
                code: "7".to_owned(),
            });
        }
        Ok(())
    }

    /// Whether `op` was called at least once.
    pub fn called(&self, op: &str) -> bool {
        self.calls.iter().any(|c| *c == op)
    }
}

impl ProxyClient for FakeProxy {
    fn connect(&mut self) -> Result<(), ProxyError> {
        self.record("connect")
    }

    fn associate(&mut self) -> Result<(), ProxyError> {
        self.record("associate")
    }

    fn dump_associate(&mut self) -> Result<(String, Vec<u8>), ProxyError> {
        self.record("dump_associate")?;
        Ok(self.issued.clone())
    }

    fn load_associate(&mut self, id: &str, public_key: &[u8]) -> Result<(), ProxyError> {
        self.record("load_associate")?;
        self.loaded = Some((id.to_owned(), public_key.to_vec()));
        Ok(())
    }

    fn test_associate(&mut self) -> Result<bool, ProxyError> {
        self.record("test_associate")?;
        Ok(self.test_passes)
    }

    fn get_logins(&mut self, _url: &str) -> Result<Vec<LoginRecord>, ProxyError> {
        self.record("get_logins")?;
        Ok(self.logins.clone())
    }
}
