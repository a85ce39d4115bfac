//! Contact form: feedback to the site admin plus an acknowledgement

use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::domain::notification::{EmailMessage, Notifier};
use crate::domain::user::validate_email;
use crate::domain::{DomainError, Message};

const NOT_CONFIGURED: &str = "Server error: Email service not configured.";
const SEND_FAILED: &str = "Something went wrong. Please try again.";
const THANK_YOU: &str = "Thank you! Your feedback has been sent.";

#[derive(Debug, Clone, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub message: String,
}

pub struct ContactService {
    notifier: Arc<dyn Notifier>,
    admin_address: String,
}

impl ContactService {
    pub fn new(notifier: Arc<dyn Notifier>, admin_address: impl Into<String>) -> Self {
        Self {
            notifier,
            admin_address: admin_address.into(),
        }
    }

    /// Forward feedback to the admin; the acknowledgement is best effort
    pub async fn submit(&self, form: ContactForm) -> Result<Message, DomainError> {
        let name = form.name.trim();
        let email = form.email.trim();
        let body = form.message.trim();

        if name.is_empty() || email.is_empty() || body.is_empty() {
            return Err(DomainError::validation(
                "Name, email and message are all required.",
            ));
        }

        validate_email(email).map_err(|e| DomainError::validation(e.to_string()))?;

        if !self.notifier.is_configured() {
            return Err(DomainError::dependency("mail", NOT_CONFIGURED));
        }

        let to_admin = EmailMessage::new(
            name,
            &self.admin_address,
            format!("New Feedback from {} via BLOGGY", name),
            format!("Name: {}\nEmail: {}\n\nMessage:\n{}", name, email, body),
        )
        .with_reply_to(email);

        if let Err(e) = self.notifier.send(&to_admin).await {
            warn!(error = %e, "Feedback email to admin failed");
            return Err(DomainError::dependency("mail", SEND_FAILED));
        }

        let acknowledgement = EmailMessage::new(
            "BLOGGY",
            email,
            "We have received your feedback!",
            format!(
                "Hi {},\n\nThank you for contacting us. We have received your message and will get back to you shortly.\n\nBest Regards,\nThe BLOGGY Team",
                name
            ),
        );

        if let Err(e) = self.notifier.send(&acknowledgement).await {
            warn!(error = %e, "Feedback acknowledgement failed");
        }

        info!("Feedback forwarded");

        Ok(Message::success(THANK_YOU))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::notification::MockNotifier;
    use crate::domain::MessageType;
    use mockall::Sequence;

    fn form() -> ContactForm {
        ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            message: "Love the site".to_string(),
        }
    }

    #[tokio::test]
    async fn test_sends_admin_mail_then_acknowledgement() {
        let mut notifier = MockNotifier::new();
        let mut seq = Sequence::new();
        notifier.expect_is_configured().return_const(true);
        notifier
            .expect_send()
            .withf(|m| m.to == "admin@example.com" && m.reply_to.as_deref() == Some("ada@example.com"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        notifier
            .expect_send()
            .withf(|m| m.to == "ada@example.com")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let svc = ContactService::new(Arc::new(notifier), "admin@example.com");
        let message = svc.submit(form()).await.unwrap();

        assert_eq!(message.kind, MessageType::Success);
        assert_eq!(message.text, THANK_YOU);
    }

    #[tokio::test]
    async fn test_acknowledgement_failure_does_not_fail() {
        let mut notifier = MockNotifier::new();
        notifier.expect_is_configured().return_const(true);
        notifier
            .expect_send()
            .withf(|m| m.to == "admin@example.com")
            .returning(|_| Ok(()));
        notifier
            .expect_send()
            .withf(|m| m.to == "ada@example.com")
            .returning(|_| Err(DomainError::dependency("smtp", "mailbox full")));

        let svc = ContactService::new(Arc::new(notifier), "admin@example.com");
        assert!(svc.submit(form()).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_failure_is_dependency_failed() {
        let mut notifier = MockNotifier::new();
        notifier.expect_is_configured().return_const(true);
        notifier
            .expect_send()
            .times(1)
            .returning(|_| Err(DomainError::dependency("smtp", "refused")));

        let svc = ContactService::new(Arc::new(notifier), "admin@example.com");

        match svc.submit(form()).await {
            Err(DomainError::DependencyFailed { message, .. }) => assert_eq!(message, SEND_FAILED),
            other => panic!("expected DependencyFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unconfigured_mail_is_reported() {
        let mut notifier = MockNotifier::new();
        notifier.expect_is_configured().return_const(false);
        notifier.expect_send().never();

        let svc = ContactService::new(Arc::new(notifier), "admin@example.com");

        match svc.submit(form()).await {
            Err(DomainError::DependencyFailed { message, .. }) => {
                assert_eq!(message, NOT_CONFIGURED)
            }
            other => panic!("expected DependencyFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_fields_are_rejected() {
        let mut notifier = MockNotifier::new();
        notifier.expect_send().never();

        let svc = ContactService::new(Arc::new(notifier), "admin@example.com");
        let mut incomplete = form();
        incomplete.message = "   ".to_string();

        assert!(matches!(
            svc.submit(incomplete).await,
            Err(DomainError::Validation { .. })
        ));
    }
}
