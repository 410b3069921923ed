//! SMTP submission over a single `lettre` connection.
//!
//! The connection is driven step by step (connect, STARTTLS, AUTH) rather
//! than through a pooled transport so every phase can be told apart when it
//! fails.

use std::time::Duration;

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{SmtpConnection, TlsParameters};
use lettre::transport::smtp::extension::ClientId;
use lettre::{Address, Message};
use tracing::{debug, warn};

use super::{MailSender, MailSession, OutgoingMail};
use crate::config::{EmailConfig, TransportSecurity};
use crate::error::ProbeError;

pub(crate) const SMTP_TIMEOUT: Duration = Duration::from_secs(10);

const AUTH_MECHANISMS: &[Mechanism] = &[Mechanism::Plain, Mechanism::Login];

pub struct SmtpMailSender {
    host: String,
    port: u16,
    security: TransportSecurity,
    credentials: Credentials,
    hello: ClientId,
    connection: Option<SmtpConnection>,
}

impl SmtpMailSender {
    pub fn new(config: &EmailConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            security: config.security,
            credentials: Credentials::new(
                config.username.clone(),
                config.password.expose().to_string(),
            ),
            hello: ClientId::default(),
            connection: None,
        }
    }

    fn tls_parameters(&self) -> Result<TlsParameters, ProbeError> {
        TlsParameters::new(self.host.clone()).map_err(|e| ProbeError::Tls(e.to_string()))
    }
}

impl MailSender for SmtpMailSender {
    fn connect(&mut self) -> Result<MailSession, ProbeError> {
        let tls = match self.security {
            TransportSecurity::None => None,
            TransportSecurity::StartTls | TransportSecurity::Implicit => {
                Some(self.tls_parameters()?)
            }
        };
        let wrapper = match self.security {
            TransportSecurity::Implicit => tls.as_ref(),
            _ => None,
        };

        debug!(host = %self.host, port = self.port, security = self.security.describe(), "connecting to SMTP server");
        let mut connection = SmtpConnection::connect(
            (self.host.as_str(), self.port),
            Some(SMTP_TIMEOUT),
            &self.hello,
            wrapper,
            None,
        )
        .map_err(|e| classify_transport("connect", e))?;

        if let (TransportSecurity::StartTls, Some(tls)) = (self.security, tls.as_ref()) {
            connection
                .starttls(tls, &self.hello)
                .map_err(|e| classify_transport("STARTTLS", e))?;
            debug!("STARTTLS handshake complete");
        }

        let encrypted = connection.is_encrypted();
        // Keep the connection before AUTH so a rejection still sends QUIT.
        let connection = self.connection.insert(connection);
        connection
            .auth(AUTH_MECHANISMS, &self.credentials)
            .map_err(classify_auth)?;
        debug!("SMTP authentication accepted");

        Ok(MailSession { encrypted })
    }

    fn send(&mut self, mail: &OutgoingMail) -> Result<(), ProbeError> {
        let message = build_message(mail)?;
        let connection = self.connection.as_mut().ok_or(ProbeError::NotConnected)?;

        let envelope = message.envelope();
        connection
            .send(envelope, &message.formatted())
            .map_err(|e| {
                if e.is_timeout() {
                    ProbeError::timeout("message submission", SMTP_TIMEOUT)
                } else if e.is_permanent() || e.is_transient() {
                    ProbeError::Rejected(e.to_string())
                } else {
                    ProbeError::Connectivity(e.to_string())
                }
            })?;
        Ok(())
    }

    fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            debug!("closing SMTP session");
            if let Err(err) = connection.quit() {
                warn!(error = %err, "SMTP session did not close cleanly");
            }
        }
    }
}

impl Drop for SmtpMailSender {
    fn drop(&mut self) {
        self.close();
    }
}

/// Build the RFC 5322 message for `mail`.
pub(crate) fn build_message(mail: &OutgoingMail) -> Result<Message, ProbeError> {
    let from_address = parse_address(&mail.from_email)?;
    let to_address = parse_address(&mail.to)?;

    Message::builder()
        .from(Mailbox::new(Some(mail.from_name.clone()), from_address))
        .to(Mailbox::new(None, to_address))
        .subject(mail.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(mail.body.clone())
        .map_err(|e| ProbeError::Unexpected(format!("could not build message: {e}")))
}

fn parse_address(raw: &str) -> Result<Address, ProbeError> {
    raw.parse::<Address>()
        .map_err(|e| ProbeError::Rejected(format!("invalid email address '{raw}': {e}")))
}

fn classify_transport(phase: &'static str, err: lettre::transport::smtp::Error) -> ProbeError {
    if err.is_timeout() {
        ProbeError::timeout(phase, SMTP_TIMEOUT)
    } else if err.is_tls() {
        ProbeError::Tls(err.to_string())
    } else {
        ProbeError::Connectivity(err.to_string())
    }
}

/// Any negative server reply during AUTH is a credential problem.
fn classify_auth(err: lettre::transport::smtp::Error) -> ProbeError {
    if err.is_timeout() {
        ProbeError::timeout("authentication", SMTP_TIMEOUT)
    } else if err.is_permanent() || err.is_transient() || err.is_client() {
        ProbeError::Authentication(err.to_string())
    } else {
        ProbeError::Connectivity(err.to_string())
    }
}
