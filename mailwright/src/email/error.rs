//! Email error types

use thiserror::Error;

/// Errors that can occur when composing or sending emails
///
/// A missing template variant is not an error: the renderer reports it as
/// `None` and the fallback chain takes over.
#[derive(Debug, Error)]
pub enum EmailError {
    /// Email has no recipients
    #[error("email must have at least one recipient")]
    NoRecipients,

    /// Email has no sender
    #[error("email must have a from address")]
    NoSender,

    /// Invalid email address format
    #[error("invalid email address: {0}")]
    InvalidAddress(String),

    /// A template exists but failed to compile or render
    #[error("failed to render email template: {0}")]
    Template(#[from] minijinja::Error),

    /// The transport rejected the message or could not be reached
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// Email configuration error
    #[error("email configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EmailError {
    /// Create a delivery error from a string message
    #[must_use]
    pub fn delivery<T: Into<String>>(msg: T) -> Self {
        Self::Delivery(msg.into())
    }

    /// Create a configuration error from a string message
    #[must_use]
    pub fn config<T: Into<String>>(msg: T) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error was raised while handing the message to a transport
    ///
    /// Only these errors are covered by `fail_silently`; template and
    /// configuration failures always reach the caller.
    #[must_use]
    pub const fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            Self::NoRecipients | Self::NoSender | Self::InvalidAddress(_) | Self::Delivery(_)
        )
    }
}
