//! Outbound message with fluent API
//!
//! [`Email`] is what a transport receives: every field already resolved,
//! the plain-text body always present, the HTML alternative optional.

use serde::{Deserialize, Serialize};

use super::EmailError;

/// A fully composed email message
///
/// ```rust
/// use mailwright::email::Email;
///
/// let email = Email::new()
///     .to("user@example.com")
///     .from("noreply@myapp.com")
///     .subject("Welcome!")
///     .text("Welcome to our app!")
///     .html("<h1>Welcome to our app!</h1>");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Email recipients (To)
    pub to: Vec<String>,

    /// Email sender (From)
    pub from: Option<String>,

    /// CC recipients
    pub cc: Vec<String>,

    /// BCC recipients
    pub bcc: Vec<String>,

    /// Email subject
    pub subject: String,

    /// Plain text body, the primary part of the message
    pub text: String,

    /// HTML alternative
    pub html: Option<String>,
}

impl Email {
    /// Create a new empty email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a recipient (To)
    #[must_use]
    pub fn to(mut self, address: &str) -> Self {
        self.to.push(address.to_string());
        self
    }

    /// Add multiple recipients (To)
    #[must_use]
    pub fn to_multiple<S: AsRef<str>>(mut self, addresses: &[S]) -> Self {
        self.to
            .extend(addresses.iter().map(|address| address.as_ref().to_string()));
        self
    }

    /// Set the sender (From)
    #[must_use]
    pub fn from(mut self, address: &str) -> Self {
        self.from = Some(address.to_string());
        self
    }

    /// Add a CC recipient
    #[must_use]
    pub fn cc(mut self, address: &str) -> Self {
        self.cc.push(address.to_string());
        self
    }

    /// Add a BCC recipient
    #[must_use]
    pub fn bcc(mut self, address: &str) -> Self {
        self.bcc.push(address.to_string());
        self
    }

    /// Set the email subject
    #[must_use]
    pub fn subject(mut self, subject: &str) -> Self {
        self.subject = subject.to_string();
        self
    }

    /// Set the plain text body
    #[must_use]
    pub fn text(mut self, body: &str) -> Self {
        self.text = body.to_string();
        self
    }

    /// Attach an HTML alternative
    #[must_use]
    pub fn html(mut self, body: &str) -> Self {
        self.html = Some(body.to_string());
        self
    }

    /// All recipients across To, CC and BCC
    pub fn recipients(&self) -> impl Iterator<Item = &str> {
        self.to
            .iter()
            .chain(&self.cc)
            .chain(&self.bcc)
            .map(String::as_str)
    }

    /// Validate the email
    ///
    /// # Errors
    ///
    /// Returns an error if there is no recipient at all or no sender.
    pub fn validate(&self) -> Result<(), EmailError> {
        if self.recipients().next().is_none() {
            return Err(EmailError::NoRecipients);
        }

        if self.from.as_deref().is_none_or(str::is_empty) {
            return Err(EmailError::NoSender);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_builder() {
        let email = Email::new()
            .to("user@example.com")
            .from("noreply@myapp.com")
            .subject("Test")
            .text("Hello, World!");

        assert_eq!(email.to, vec!["user@example.com"]);
        assert_eq!(email.from, Some("noreply@myapp.com".to_string()));
        assert_eq!(email.subject, "Test");
        assert_eq!(email.text, "Hello, World!");
        assert!(email.html.is_none());
    }

    #[test]
    fn test_email_validation_no_recipients() {
        let email = Email::new().from("noreply@myapp.com").text("Hello");

        assert!(matches!(email.validate(), Err(EmailError::NoRecipients)));
    }

    #[test]
    fn test_email_validation_no_sender() {
        let email = Email::new().to("user@example.com").text("Hello");

        assert!(matches!(email.validate(), Err(EmailError::NoSender)));
    }

    #[test]
    fn test_bcc_only_is_enough() {
        let email = Email::new().bcc("audit@example.com").from("noreply@myapp.com");

        assert!(email.validate().is_ok());
        assert_eq!(email.recipients().collect::<Vec<_>>(), vec!["audit@example.com"]);
    }

    #[test]
    fn test_empty_body_is_valid() {
        let email = Email::new().to("user@example.com").from("noreply@myapp.com");

        assert!(email.validate().is_ok());
        assert_eq!(email.text, "");
    }

    #[test]
    fn test_multiple_recipients() {
        let email = Email::new().to_multiple(&["user1@example.com", "user2@example.com"]);

        assert_eq!(email.to, vec!["user1@example.com", "user2@example.com"]);
    }
}
