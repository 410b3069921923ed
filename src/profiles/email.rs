//! SMTP link verification: authenticate, then submit one test message.

use anyhow::Result;

use super::probe_failure;
use crate::check::{Check, CheckContext, CheckResult, DependencyKind, Profile};
use crate::config::{email, EmailConfig, EnvSource, TransportSecurity};
use crate::error::ProbeError;
use crate::probes::{MailSender, OutgoingMail, SmtpMailSender};

pub const TEST_SUBJECT: &str = "[P2P System] SMTP Link Verification - Test Email";

pub const TEST_BODY: &str = "This is an automated test email sent by the P2P Procurement System \
link verification tool.\n\n\
If you received this, SMTP is correctly configured.\n\n\
You may disregard this message.";

const ENDPOINT_VARS: &str = "SMTP_HOST and SMTP_PORT";
const CREDENTIAL_VARS: &str = "SMTP_USER and SMTP_PASSWORD";

pub type MailSenderFactory = fn(&EmailConfig) -> Result<Box<dyn MailSender>>;

pub struct EmailProfile<F = MailSenderFactory> {
    /// Overrides the default recipient (the configured sender)
    recipient: Option<String>,
    open: F,
}

impl<F> EmailProfile<F>
where
    F: Fn(&EmailConfig) -> Result<Box<dyn MailSender>>,
{
    pub fn with_sender(recipient: Option<String>, open: F) -> Self {
        Self { recipient, open }
    }
}

impl EmailProfile {
    pub fn live(recipient: Option<String>) -> Self {
        Self {
            recipient,
            open: open_smtp,
        }
    }
}

fn open_smtp(config: &EmailConfig) -> Result<Box<dyn MailSender>> {
    Ok(Box::new(SmtpMailSender::new(config)))
}

pub struct EmailContext {
    pub config: EmailConfig,
    pub recipient: String,
    sender: Box<dyn MailSender>,
}

impl CheckContext for EmailContext {
    fn release(&mut self) {
        self.sender.close();
    }
}

impl<F> Profile for EmailProfile<F>
where
    F: Fn(&EmailConfig) -> Result<Box<dyn MailSender>>,
{
    type Context = EmailContext;

    fn kind(&self) -> DependencyKind {
        DependencyKind::Email
    }

    fn required_vars(&self) -> &'static [&'static str] {
        email::REQUIRED_VARS
    }

    fn prepare(&self, env: &dyn EnvSource) -> Result<EmailContext> {
        let config = EmailConfig::from_env(env)?;
        let recipient = self
            .recipient
            .clone()
            .unwrap_or_else(|| config.from_email.clone());
        let sender = (self.open)(&config)?;
        Ok(EmailContext {
            config,
            recipient,
            sender,
        })
    }

    fn checks(&self) -> Vec<Check<EmailContext>> {
        vec![
            Check::fatal("session", check_session),
            Check::fatal("message", check_message),
        ]
    }
}

fn check_session(ctx: &mut EmailContext) -> CheckResult {
    let target = ctx.config.address();
    match ctx.sender.connect() {
        Ok(session) => {
            let transport = if session.encrypted {
                ctx.config.security.describe()
            } else {
                "no encryption"
            };
            CheckResult::ok(format!(
                "Connected to {target} ({transport}) and authenticated as {}.",
                ctx.config.username
            ))
        }
        Err(err @ ProbeError::Tls(_)) => {
            let result = probe_failure("SMTP server", &target, ENDPOINT_VARS, CREDENTIAL_VARS, &err);
            match ctx.config.security {
                TransportSecurity::StartTls => result.with_hint(
                    "If the server does not offer STARTTLS on this port, set SMTP_USE_TLS=false.",
                ),
                _ => result,
            }
        }
        Err(err) => probe_failure("SMTP server", &target, ENDPOINT_VARS, CREDENTIAL_VARS, &err),
    }
}

fn check_message(ctx: &mut EmailContext) -> CheckResult {
    let mail = OutgoingMail {
        from_name: ctx.config.from_name.clone(),
        from_email: ctx.config.from_email.clone(),
        to: ctx.recipient.clone(),
        subject: TEST_SUBJECT.to_string(),
        body: TEST_BODY.to_string(),
    };

    match ctx.sender.send(&mail) {
        Ok(()) => CheckResult::ok(format!("Test email sent to: {}", ctx.recipient)),
        Err(ProbeError::Rejected(detail)) => CheckResult::fail(format!(
            "SMTP server rejected the test message to {}: {detail}",
            ctx.recipient
        ))
        .with_hint("Check that SMTP_USER may send as SMTP_FROM_EMAIL and that the recipient is valid."),
        Err(err) => probe_failure(
            "SMTP server",
            &ctx.config.address(),
            ENDPOINT_VARS,
            CREDENTIAL_VARS,
            &err,
        ),
    }
}
