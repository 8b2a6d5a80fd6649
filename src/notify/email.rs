use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::{AsyncSmtpTransport, authentication::Credentials};
use lettre::{AsyncTransport, Tokio1Executor};

use async_trait::async_trait;

use super::Notifier;
use crate::error::{AppError, Result};
use crate::models::MailConfig;

/// Body shown by clients that cannot render HTML.
pub const PLAIN_TEXT_FALLBACK: &str = "Please view this email in HTML-compatible client.";

/// Sender login, app password and recipient, read from the environment.
#[derive(Clone)]
pub struct MailCredentials {
    pub sender: String,
    pub app_password: String,
    pub recipient: String,
}

impl std::fmt::Debug for MailCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailCredentials")
            .field("sender", &self.sender)
            .field("app_password", &"***")
            .field("recipient", &self.recipient)
            .finish()
    }
}

impl MailCredentials {
    pub const SENDER_VAR: &'static str = "UPDATE_TO";
    pub const RECIPIENT_VAR: &'static str = "MY_EMAIL";
    pub const PASSWORD_VAR: &'static str = "EMAIL_APP_PASSWORD";

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build credentials from any variable lookup. Missing or blank values fail.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let required = |name: &str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| AppError::config(format!("{name} is not set")))
        };
        Ok(Self {
            sender: required(Self::SENDER_VAR)?,
            app_password: required(Self::PASSWORD_VAR)?,
            recipient: required(Self::RECIPIENT_VAR)?,
        })
    }
}

/// Sends reports through an SMTP relay over implicit TLS.
pub struct SmtpNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpNotifier {
    /// Set up the transport. Addresses are validated here, before any send.
    pub fn new(config: &MailConfig, credentials: MailCredentials) -> Result<Self> {
        let from: Mailbox = credentials.sender.parse()?;
        let to: Mailbox = credentials.recipient.parse()?;

        let creds = Credentials::new(credentials.sender, credentials.app_password);
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?
            .port(config.smtp_port)
            .credentials(creds)
            .build();

        Ok(Self { mailer, from, to })
    }

    /// Assemble the message: plain-text fallback plus the HTML report.
    pub fn build_message(&self, subject: &str, html: &str) -> Result<Message> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .multipart(MultiPart::alternative_plain_html(
                PLAIN_TEXT_FALLBACK.to_string(),
                html.to_string(),
            ))?;
        Ok(message)
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, subject: &str, html: &str) -> Result<()> {
        let message = self.build_message(subject, html)?;
        self.mailer.send(message).await?;
        log::info!("Sent \"{}\" to {}", subject, self.to);
        Ok(())
    }
}
