//! Log-only delivery for development and tests

use async_trait::async_trait;
use tracing::info;

use crate::domain::notification::{EmailMessage, Notifier};
use crate::domain::DomainError;

/// Logs messages instead of sending them
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl LogNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    async fn send(&self, message: &EmailMessage) -> Result<(), DomainError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            "Mail transport not configured; skipping send"
        );
        Ok(())
    }

    fn is_configured(&self) -> bool {
        false
    }
}
