//! Console backend for development
//!
//! Logs emails instead of sending them.

use async_trait::async_trait;
use tracing::{debug, info};

use crate::email::{Email, EmailError, EmailSender};

/// Console email backend for development
///
/// ```rust
/// use mailwright::email::{ConsoleBackend, Email, EmailSender};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = ConsoleBackend::new();
///
/// let email = Email::new()
///     .to("user@example.com")
///     .from("noreply@myapp.com")
///     .subject("Hello!")
///     .text("Hello, World!");
///
/// backend.send(email).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct ConsoleBackend {
    /// Whether to log email bodies
    verbose: bool,
}

impl ConsoleBackend {
    /// Create a new console backend
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a console backend that also prints message bodies
    #[must_use]
    pub const fn verbose() -> Self {
        Self { verbose: true }
    }

    fn render(&self, email: &Email, from: &str) -> String {
        let mut out = String::new();
        out.push_str("\n╭─────────────────────────────────────────────────────╮\n");
        out.push_str("│ Console Email                                       │\n");
        out.push_str("├─────────────────────────────────────────────────────┤\n");
        out.push_str(&format!("│ From:    {from:<43} │\n"));
        out.push_str(&format!("│ To:      {:<43} │\n", email.to.join(", ")));
        if !email.cc.is_empty() {
            out.push_str(&format!("│ CC:      {:<43} │\n", email.cc.join(", ")));
        }
        if !email.bcc.is_empty() {
            out.push_str(&format!("│ BCC:     {:<43} │\n", email.bcc.join(", ")));
        }
        out.push_str(&format!("│ Subject: {:<43} │\n", email.subject));
        out.push_str(&format!(
            "│ Parts:   {:<43} │\n",
            if email.html.is_some() { "text/plain + text/html" } else { "text/plain" }
        ));

        if self.verbose {
            out.push_str("├─────────────────────────────────────────────────────┤\n");
            for line in email.text.lines() {
                out.push_str(&format!("│ {:<51} │\n", truncate(line, 51)));
            }
            if let Some(html) = &email.html {
                out.push_str("├─────────────────────────────────────────────────────┤\n");
                for line in html.lines().take(5) {
                    out.push_str(&format!("│ {:<51} │\n", truncate(line, 51)));
                }
                if html.lines().count() > 5 {
                    out.push_str("│ ... (truncated)                                     │\n");
                }
            }
        }

        out.push_str("╰─────────────────────────────────────────────────────╯\n");
        out
    }
}

fn truncate(line: &str, width: usize) -> String {
    if line.chars().count() > width {
        let head: String = line.chars().take(width - 3).collect();
        format!("{head}...")
    } else {
        line.to_string()
    }
}

#[async_trait]
impl EmailSender for ConsoleBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;

        let from = email.from.as_deref().ok_or(EmailError::NoSender)?;

        info!(
            from = %from,
            to = ?email.to,
            cc = ?email.cc,
            bcc = ?email.bcc,
            subject = %email.subject,
            "Console email sent"
        );

        if self.verbose {
            debug!(text = %email.text, "Email text content");
            if let Some(html) = &email.html {
                debug!(html = %html, "Email HTML content");
            }
        }

        println!("{}", self.render(&email, from));

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email() -> Email {
        Email::new()
            .to("user@example.com")
            .cc("cc@example.com")
            .from("noreply@myapp.com")
            .subject("Test Email")
            .text("This is plain text")
            .html("<h1>This is HTML</h1>")
    }

    #[tokio::test]
    async fn test_console_backend_send() {
        let backend = ConsoleBackend::new();
        assert!(backend.send(email()).await.is_ok());
    }

    #[tokio::test]
    async fn test_console_backend_rejects_invalid() {
        let backend = ConsoleBackend::new();
        let result = backend.send(Email::new().from("noreply@myapp.com")).await;
        assert!(matches!(result, Err(EmailError::NoRecipients)));
    }

    #[test]
    fn test_render_lists_parts() {
        let out = ConsoleBackend::new().render(&email(), "noreply@myapp.com");
        assert!(out.contains("text/plain + text/html"));
        assert!(out.contains("cc@example.com"));
        assert!(!out.contains("This is plain text"));
    }

    #[test]
    fn test_verbose_render_includes_bodies() {
        let out = ConsoleBackend::verbose().render(&email(), "noreply@myapp.com");
        assert!(out.contains("This is plain text"));
        assert!(out.contains("<h1>This is HTML</h1>"));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghijkl", 8), "abcde...");
    }
}
