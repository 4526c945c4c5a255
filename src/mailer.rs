//! Digest delivery over SMTP submission.

use std::time::Duration;

use lettre::address::AddressError;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;
use tracing::info;

use crate::config::MailConfig;

pub const SUBJECT_PREFIX: &str = "Today's Digest ";

pub const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address")]
    Address(#[from] AddressError),

    #[error("failed to build email message")]
    Build(#[from] lettre::error::Error),

    #[error("failed to create SMTP transport")]
    Transport(#[from] lettre::transport::smtp::Error),

    #[error("failed to send email")]
    Send(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub fn subject(today: &str) -> String {
    format!("{}{}", SUBJECT_PREFIX, today)
}

/// Build the digest email: one recipient, HTML body.
pub fn compose(mail: &MailConfig, today: &str, html: String) -> Result<Message, MailError> {
    let from: Mailbox = mail.from.parse()?;
    let to: Mailbox = mail.to.parse()?;

    let message = Message::builder()
        .from(from)
        .to(to)
        .subject(subject(today))
        .header(ContentType::TEXT_HTML)
        .body(html)?;

    Ok(message)
}

/// STARTTLS submission connection with PLAIN authentication.
pub fn smtp_transport(mail: &MailConfig) -> Result<AsyncSmtpTransport<Tokio1Executor>, MailError> {
    let creds = Credentials::new(mail.user.clone(), mail.password.clone());

    let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&mail.host)?
        .port(mail.port)
        .credentials(creds)
        .authentication(vec![Mechanism::Plain])
        .timeout(Some(SMTP_TIMEOUT))
        .build();

    Ok(transport)
}

pub async fn deliver<T>(transport: &T, message: Message) -> Result<(), MailError>
where
    T: AsyncTransport + Sync,
    T::Error: std::error::Error + Send + Sync + 'static,
{
    let recipients = message.envelope().to().len();
    transport
        .send(message)
        .await
        .map_err(|e| MailError::Send(Box::new(e)))?;

    info!("Digest accepted for delivery to {} recipient(s)", recipients);
    Ok(())
}
