//! Recording transport for tests

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::email::{Email, EmailError, EmailSender};

/// Transport that captures sent emails in memory
///
/// Can be told to fail, to exercise `fail_silently` handling.
///
/// ```rust
/// use mailwright::email::{Email, EmailSender};
/// use mailwright::testing::RecordingSender;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let sender = RecordingSender::new();
///
/// let email = Email::new()
///     .to("user@example.com")
///     .from("noreply@myapp.com")
///     .subject("Test")
///     .text("Hello");
///
/// sender.send(email).await?;
///
/// assert_eq!(sender.sent_count(), 1);
/// assert!(sender.was_sent_to("user@example.com"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<Email>>>,
    failure: Option<String>,
}

impl RecordingSender {
    /// Create a recording sender that accepts every valid email
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sender that rejects every email with a delivery error
    #[must_use]
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            sent: Arc::default(),
            failure: Some(reason.into()),
        }
    }

    fn sent(&self) -> MutexGuard<'_, Vec<Email>> {
        self.sent.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Number of emails accepted
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent().len()
    }

    /// All accepted emails, oldest first
    #[must_use]
    pub fn sent_emails(&self) -> Vec<Email> {
        self.sent().clone()
    }

    /// The most recently accepted email
    #[must_use]
    pub fn last_sent(&self) -> Option<Email> {
        self.sent().last().cloned()
    }

    /// Forget every accepted email
    pub fn clear(&self) {
        self.sent().clear();
    }

    /// Whether any accepted email listed `address` in To
    #[must_use]
    pub fn was_sent_to(&self, address: &str) -> bool {
        self.sent()
            .iter()
            .any(|email| email.to.iter().any(|to| to == address))
    }

    /// Whether any accepted email had exactly this subject
    #[must_use]
    pub fn was_sent_with_subject(&self, subject: &str) -> bool {
        self.sent().iter().any(|email| email.subject == subject)
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        if let Some(reason) = &self.failure {
            return Err(EmailError::delivery(reason.clone()));
        }

        self.sent().push(email);
        Ok(())
    }
}
