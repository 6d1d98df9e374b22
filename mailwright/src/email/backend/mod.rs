//! Transport implementations
//!
//! - **SMTP**: deliver through an SMTP relay (production)
//! - **Console**: log messages instead of sending them (development)

pub mod console;
pub mod smtp;

use std::sync::Arc;

use super::EmailSender;
use crate::config::{Backend, TransportSettings};

/// Build the transport selected in `settings`
#[must_use]
pub fn from_settings(settings: &TransportSettings) -> Arc<dyn EmailSender> {
    match settings.backend {
        Backend::Console if settings.verbose => Arc::new(console::ConsoleBackend::verbose()),
        Backend::Console => Arc::new(console::ConsoleBackend::new()),
        Backend::Smtp => Arc::new(smtp::SmtpBackend::new(settings.smtp.clone())),
    }
}
