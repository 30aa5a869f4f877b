//! Plain-text email delivery.
//!
//! [`SmtpMailer`] wraps the `lettre` async SMTP transport. Configuration is
//! loaded from environment variables; if `SMTP_HOST` is not set,
//! [`EmailConfig::from_env`] returns `None` and callers fall back to
//! [`LogMailer`], which only records what would have been sent.

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum EmailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// EmailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
pub const DEFAULT_FROM_ADDRESS: &str = "noreply@eventreg.local";

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone)]
pub struct EmailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl EmailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// should only be logged.
    ///
    /// | Variable        | Required | Default                   |
    /// |-----------------|----------|---------------------------|
    /// | `SMTP_HOST`     | yes      | none                      |
    /// | `SMTP_PORT`     | no       | `587`                     |
    /// | `SMTP_FROM`     | no       | `noreply@eventreg.local`  |
    /// | `SMTP_USER`     | no       | none                      |
    /// | `SMTP_PASSWORD` | no       | none                      |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: sender_from_env(),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

/// The sender address from `SMTP_FROM`, or [`DEFAULT_FROM_ADDRESS`].
///
/// Read independently of `SMTP_HOST` so the log mailer reports the same
/// sender a real deployment would use.
pub fn sender_from_env() -> String {
    std::env::var("SMTP_FROM").unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string())
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Sends one plain-text message to a list of recipients.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        from: &str,
        to: &[String],
    ) -> Result<(), EmailError>;
}

/// Assemble a plain-text message addressed to every recipient.
fn build_message(
    subject: &str,
    body: &str,
    from: &str,
    to: &[String],
) -> Result<Message, EmailError> {
    if to.is_empty() {
        return Err(EmailError::Build("no recipients".to_string()));
    }

    let mut builder = Message::builder().from(from.parse()?).subject(subject);
    for recipient in to {
        builder = builder.to(recipient.parse()?);
    }

    builder
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())
        .map_err(|e| EmailError::Build(e.to_string()))
}

// ---------------------------------------------------------------------------
// SmtpMailer
// ---------------------------------------------------------------------------

/// Delivers mail through an SMTP relay using STARTTLS.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Build the relay transport. Fails if the host cannot be used for TLS.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(Self {
            transport: transport_builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        from: &str,
        to: &[String],
    ) -> Result<(), EmailError> {
        let message = build_message(subject, body, from, to)?;
        self.transport.send(message).await?;

        tracing::info!(recipients = to.len(), subject, "Email sent");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LogMailer
// ---------------------------------------------------------------------------

/// Fallback used when SMTP is not configured: validates and logs the message.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(
        &self,
        subject: &str,
        body: &str,
        from: &str,
        to: &[String],
    ) -> Result<(), EmailError> {
        build_message(subject, body, from, to)?;
        tracing::info!(
            from,
            to = %to.join(", "),
            subject,
            body,
            "SMTP not configured, email logged instead of sent"
        );
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
