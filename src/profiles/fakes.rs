//! Scripted in-memory probes for profile tests.
//!
//! Every fake is `Clone` and shares its call log through `Rc`, so a test can
//! hand a clone to the profile factory and still inspect what happened.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::io::{self, Write};
use std::rc::Rc;
use std::time::Duration;

use crate::config::database::DEFAULT_EXPECTED_TABLES;
use crate::error::ProbeError;
use crate::probes::{
    Charset, DatabaseProbe, HttpFetcher, HttpReply, MailSender, MailSession, ObjectStore,
    OutgoingMail,
};

pub(crate) fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

type CallLog = Rc<RefCell<Vec<String>>>;

#[derive(Clone)]
pub(crate) struct FakeDatabase {
    pub connect: Result<String, ProbeError>,
    pub charset: Result<Charset, ProbeError>,
    pub decimal: Result<String, ProbeError>,
    pub tables: Result<Vec<String>, ProbeError>,
    log: CallLog,
}

impl FakeDatabase {
    pub fn healthy() -> Self {
        Self {
            connect: Ok("8.0.36".to_string()),
            charset: Ok(Charset {
                character_set: "utf8mb4".to_string(),
                collation: "utf8mb4_unicode_ci".to_string(),
            }),
            decimal: Ok("1234567890.1234".to_string()),
            tables: Ok(DEFAULT_EXPECTED_TABLES
                .iter()
                .map(|t| t.to_string())
                .chain(["migrations".to_string()])
                .collect()),
            log: CallLog::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    fn record(&self, call: &str) {
        self.log.borrow_mut().push(call.to_string());
    }
}

impl DatabaseProbe for FakeDatabase {
    fn connect(&mut self) -> Result<String, ProbeError> {
        self.record("connect");
        self.connect.clone()
    }

    fn charset(&mut self) -> Result<Charset, ProbeError> {
        self.record("charset");
        self.charset.clone()
    }

    fn decimal_roundtrip(
        &mut self,
        _literal: &str,
        _precision: u8,
        _scale: u8,
    ) -> Result<String, ProbeError> {
        self.record("decimal");
        self.decimal.clone()
    }

    fn table_names(&mut self) -> Result<Vec<String>, ProbeError> {
        self.record("tables");
        self.tables.clone()
    }

    fn close(&mut self) {
        self.record("close");
    }
}

#[derive(Clone)]
pub(crate) struct FakeMail {
    pub connect: Result<MailSession, ProbeError>,
    pub send: Result<(), ProbeError>,
    sent: Rc<RefCell<Vec<OutgoingMail>>>,
    log: CallLog,
}

impl FakeMail {
    pub fn healthy() -> Self {
        Self {
            connect: Ok(MailSession { encrypted: true }),
            send: Ok(()),
            sent: Rc::default(),
            log: CallLog::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn sent(&self) -> Vec<OutgoingMail> {
        self.sent.borrow().clone()
    }
}

impl MailSender for FakeMail {
    fn connect(&mut self) -> Result<MailSession, ProbeError> {
        self.log.borrow_mut().push("connect".to_string());
        self.connect.clone()
    }

    fn send(&mut self, mail: &OutgoingMail) -> Result<(), ProbeError> {
        self.log.borrow_mut().push("send".to_string());
        if self.send.is_ok() {
            self.sent.borrow_mut().push(mail.clone());
        }
        self.send.clone()
    }

    fn close(&mut self) {
        self.log.borrow_mut().push("close".to_string());
    }
}

/// Object store that keeps objects in a shared set, so tests can assert
/// nothing is left behind.
#[derive(Clone)]
pub(crate) struct FakeStore {
    pub put: Result<(), ProbeError>,
    pub presign: Result<(), ProbeError>,
    pub delete: Result<(), ProbeError>,
    objects: Rc<RefCell<BTreeSet<String>>>,
    log: CallLog,
}

impl FakeStore {
    pub fn healthy() -> Self {
        Self {
            put: Ok(()),
            presign: Ok(()),
            delete: Ok(()),
            objects: Rc::default(),
            log: CallLog::default(),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.log.borrow().clone()
    }

    pub fn objects(&self) -> Vec<String> {
        self.objects.borrow().iter().cloned().collect()
    }
}

impl ObjectStore for FakeStore {
    fn put_object(&mut self, key: &str, _body: &[u8], _content_type: &str) -> Result<(), ProbeError> {
        self.log.borrow_mut().push(format!("put {key}"));
        self.put.clone()?;
        self.objects.borrow_mut().insert(key.to_string());
        Ok(())
    }

    fn presign_get(&mut self, key: &str, expires_in: Duration) -> Result<String, ProbeError> {
        self.log.borrow_mut().push(format!("presign {key}"));
        self.presign.clone()?;
        Ok(format!(
            "https://fake-bucket.example/{key}?X-Amz-Expires={}",
            expires_in.as_secs()
        ))
    }

    fn delete_object(&mut self, key: &str) -> Result<(), ProbeError> {
        self.log.borrow_mut().push(format!("delete {key}"));
        self.delete.clone()?;
        self.objects.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Clone)]
pub(crate) struct FakeFetcher {
    pub reply: Result<HttpReply, ProbeError>,
    urls: Rc<RefCell<Vec<String>>>,
}

impl FakeFetcher {
    pub fn replying(status: u16, body: &[u8]) -> Self {
        Self {
            reply: Ok(HttpReply {
                status,
                body: body.to_vec(),
            }),
            urls: Rc::default(),
        }
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.borrow().clone()
    }
}

impl HttpFetcher for FakeFetcher {
    fn get(&self, url: &str) -> Result<HttpReply, ProbeError> {
        self.urls.borrow_mut().push(url.to_string());
        self.reply.clone()
    }
}

/// Output sink that behaves like a closed pipe after `lines` newlines,
/// e.g. stdout piped into `head`.
pub(crate) struct ClosedPipe {
    lines: usize,
}

impl ClosedPipe {
    pub fn after_lines(lines: usize) -> Self {
        Self { lines }
    }
}

impl Write for ClosedPipe {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.lines == 0 {
            return Err(io::Error::from(io::ErrorKind::BrokenPipe));
        }
        let newlines = buf.iter().filter(|b| **b == b'\n').count();
        self.lines = self.lines.saturating_sub(newlines);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
