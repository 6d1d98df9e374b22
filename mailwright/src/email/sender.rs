//! Email sender trait abstraction
//!
//! This module defines the core `EmailSender` trait that all transports implement.

use async_trait::async_trait;

use super::{Email, EmailError};

/// Trait for delivering composed emails
///
/// Implemented by every transport (SMTP, console, recording).
///
/// # Examples
///
/// ```rust,no_run
/// use mailwright::email::{ConsoleBackend, Email, EmailSender};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sender = ConsoleBackend::new();
///
/// let email = Email::new()
///     .to("user@example.com")
///     .from("noreply@myapp.com")
///     .subject("Hello!")
///     .text("Hello, World!");
///
/// sender.send(email).await?;
/// # Ok(())
/// # }
/// ```
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmailSender: Send + Sync {
    /// Send an email
    ///
    /// # Errors
    ///
    /// Returns `EmailError` if the message is invalid or the transport
    /// rejects it. Transports do not retry.
    async fn send(&self, email: Email) -> Result<(), EmailError>;
}
