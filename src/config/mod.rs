//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, LogFormat, LoggingConfig, MailConfig, ServerConfig, SessionConfig,
    StorageBackend, StorageConfig, TrendingConfig, VerificationConfig, DEFAULT_SESSION_SECRET,
};
