//! SMTP delivery through lettre

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::{header, Mailbox, Message};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Tokio1Executor};
use tracing::info;

use crate::config::MailConfig;
use crate::domain::notification::{EmailMessage, Notifier};
use crate::domain::DomainError;

/// STARTTLS relay transport
#[derive(Clone)]
pub struct SmtpNotifier {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: Mailbox,
}

impl SmtpNotifier {
    pub fn new(config: &MailConfig) -> Result<Self, DomainError> {
        let from = config.from_address.parse::<Mailbox>().map_err(|e| {
            DomainError::configuration(format!("Invalid mail from_address: {}", e))
        })?;

        let builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)
            .map_err(|e| {
                DomainError::configuration(format!("Failed to configure SMTP transport: {}", e))
            })?
            .port(config.smtp_port);

        let builder = match (&config.username, &config.password) {
            (Some(username), Some(password)) => {
                builder.credentials(Credentials::new(username.clone(), password.clone()))
            }
            _ => builder,
        };

        Ok(Self {
            transport: Arc::new(builder.build()),
            from,
        })
    }

    fn build(&self, message: &EmailMessage) -> Result<Message, DomainError> {
        let from = Mailbox::new(Some(message.from_name.clone()), self.from.email.clone());
        let to = message.to.parse::<Mailbox>().map_err(|e| {
            DomainError::validation(format!("Invalid recipient email address: {}", e))
        })?;

        let mut builder = Message::builder()
            .from(from)
            .to(to)
            .subject(message.subject.as_str())
            .header(header::ContentType::TEXT_PLAIN);

        if let Some(reply_to) = &message.reply_to {
            let reply_to = reply_to.parse::<Mailbox>().map_err(|e| {
                DomainError::validation(format!("Invalid reply-to address: {}", e))
            })?;
            builder = builder.reply_to(reply_to);
        }

        builder
            .body(message.body.clone())
            .map_err(|e| DomainError::internal(format!("Failed to build email message: {}", e)))
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        let email = self.build(message)?;

        self.transport
            .send(email)
            .await
            .map_err(|e| DomainError::dependency("smtp", format!("Failed to send email: {}", e)))?;

        info!(subject = %message.subject, "Email sent");

        Ok(())
    }

    fn is_configured(&self) -> bool {
        true
    }
}
