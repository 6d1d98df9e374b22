//! mailwright: templated multipart email for Rust applications
//!
//! A send goes through four stages:
//! - **Context**: a base context (`base_url`, `site_name`) from a pluggable generator
//! - **Rendering**: `emails/<name>.html` and `emails/<name>.txt`, deriving text from HTML when needed
//! - **Environment policy**: development tags subjects and swallows delivery failures
//! - **Composition**: one multipart message handed to a transport
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use mailwright::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     mailwright::observability::init()?;
//!
//!     let mailer = Mailer::from_settings(MailSettings::load()?);
//!
//!     let email = TemplatedEmail::new("welcome")
//!         .subject("Welcome!")
//!         .to("ann@example.com")
//!         .var("name", "Ann");
//!
//!     mailer.send_email(email, None).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Configuration
//!
//! See [`config::MailSettings`] for the available keys and the order in
//! which configuration sources are merged.

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod email;
pub mod observability;
pub mod template;
pub mod testing;

pub mod prelude {
    //! Convenience re-exports for common types and traits
    //!
    //! # Examples
    //!
    //! ```rust
    //! use mailwright::prelude::*;
    //! ```

    // Configuration
    pub use crate::config::{Backend, Environment, MailSettings};

    // Pipeline
    pub use crate::email::{
        Envelope, Mailer, MarkdownEmail, TemplateRenderer, TemplatedEmail,
    };

    // Context
    pub use crate::email::{
        ContextGenerator, ContextGenerators, EmailContext, RequestInfo, RequestParts,
    };

    // Messages and transports
    pub use crate::email::{ConsoleBackend, Email, EmailError, EmailSender, SmtpBackend};

    pub use serde_json::json;
}
