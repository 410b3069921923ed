//! Capability interfaces over the external dependencies.
//!
//! Checks talk to these traits only. The real adapters wrap the network
//! clients (`sqlx`, `lettre`, `aws-sdk-s3`, `reqwest`); tests substitute fakes.

pub mod http;
pub mod mysql;
pub mod s3;
pub mod smtp;

use std::time::Duration;

use crate::error::ProbeError;

pub use http::ReqwestFetcher;
pub use mysql::MySqlProbe;
pub use s3::S3ObjectStore;
pub use smtp::SmtpMailSender;

/// Database character set and collation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Charset {
    pub character_set: String,
    pub collation: String,
}

pub trait DatabaseProbe {
    /// Open the session and return the server version string.
    fn connect(&mut self) -> Result<String, ProbeError>;

    fn charset(&mut self) -> Result<Charset, ProbeError>;

    /// Cast `literal` to `DECIMAL(precision, scale)` server-side and return
    /// the driver's textual rendering of the decoded value.
    fn decimal_roundtrip(
        &mut self,
        literal: &str,
        precision: u8,
        scale: u8,
    ) -> Result<String, ProbeError>;

    /// Table names in the configured schema.
    fn table_names(&mut self) -> Result<Vec<String>, ProbeError>;

    fn close(&mut self);
}

/// Details of an established mail session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSession {
    pub encrypted: bool,
}

/// A plain-text message to submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from_name: String,
    pub from_email: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub trait MailSender {
    /// Connect, negotiate encryption if configured, and authenticate.
    fn connect(&mut self) -> Result<MailSession, ProbeError>;

    fn send(&mut self, mail: &OutgoingMail) -> Result<(), ProbeError>;

    fn close(&mut self);
}

pub trait ObjectStore {
    fn put_object(&mut self, key: &str, body: &[u8], content_type: &str)
        -> Result<(), ProbeError>;

    /// A GET URL for `key` that is valid for `expires_in` without credentials.
    fn presign_get(&mut self, key: &str, expires_in: Duration) -> Result<String, ProbeError>;

    fn delete_object(&mut self, key: &str) -> Result<(), ProbeError>;
}

/// Status and body of a plain HTTP GET
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub body: Vec<u8>,
}

pub trait HttpFetcher {
    fn get(&self, url: &str) -> Result<HttpReply, ProbeError>;
}
