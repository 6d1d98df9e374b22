//! Templated multipart email
//!
//! This module provides the whole send pipeline:
//! - A base template context (`base_url`, `site_name`) from a pluggable generator
//! - HTML and plain-text rendering with a text fallback derived from HTML
//! - Development-mode subject tagging and failure suppression
//! - Composition into one multipart message handed to a transport
//!
//! # Examples
//!
//! ## Sending a simple email
//!
//! ```rust,no_run
//! use mailwright::config::SmtpSettings;
//! use mailwright::email::{Email, EmailSender, SmtpBackend};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = SmtpBackend::new(SmtpSettings::default());
//!
//! let email = Email::new()
//!     .to("user@example.com")
//!     .from("noreply@myapp.com")
//!     .subject("Welcome!")
//!     .text("Welcome to our app!")
//!     .html("<h1>Welcome to our app!</h1>");
//!
//! backend.send(email).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Sending a templated email
//!
//! ```rust,no_run
//! use mailwright::config::MailSettings;
//! use mailwright::email::{Mailer, RequestParts, TemplatedEmail};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mailer = Mailer::from_settings(MailSettings::load()?);
//! let request = RequestParts::new("app.example.com", true);
//!
//! let email = TemplatedEmail::new("welcome")
//!     .subject("Welcome to Our App!")
//!     .to("alice@example.com")
//!     .var("name", "Alice");
//!
//! mailer.send_email(email, Some(&request)).await?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
mod builder;
mod context;
mod convert;
mod error;
mod mailer;
mod policy;
mod sender;
mod template;

pub use backend::{console::ConsoleBackend, smtp::SmtpBackend};
pub use builder::Email;
pub use context::{
    resolve_email_context, ContextGenerator, ContextGenerators, DefaultContextGenerator,
    EmailContext, EmptyContextGenerator, RequestInfo, RequestParts,
};
pub use convert::{html_to_text, markdown_to_html};
pub use error::EmailError;
pub use mailer::{Envelope, Mailer, MarkdownEmail, TemplatedEmail};
pub use policy::apply_environment_policy;
pub use sender::EmailSender;
pub use template::TemplateRenderer;

#[cfg(test)]
pub use sender::MockEmailSender;
