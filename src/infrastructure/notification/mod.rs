//! Outbound email

mod log;
mod smtp;

use std::sync::Arc;

use tracing::warn;

use crate::config::MailConfig;
use crate::domain::notification::Notifier;
use crate::domain::DomainError;

pub use log::LogNotifier;
pub use smtp::SmtpNotifier;

/// SMTP when mail is enabled and a host is set, log-only otherwise
pub fn build_notifier(config: &MailConfig) -> Result<Arc<dyn Notifier>, DomainError> {
    if config.is_active() {
        Ok(Arc::new(SmtpNotifier::new(config)?))
    } else {
        warn!("Mail not configured; notifications will only be logged");
        Ok(Arc::new(LogNotifier::new()))
    }
}
