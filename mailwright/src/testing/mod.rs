//! Testing utilities for applications sending email
//!
//! - [`RecordingSender`] - transport capturing emails in memory
//! - [`TemplateDir`] - temporary template directory for renderer tests
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use mailwright::config::MailSettings;
//! use mailwright::email::{Mailer, TemplatedEmail};
//! use mailwright::testing::{RecordingSender, TemplateDir};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let templates = TemplateDir::new()?.with("emails/welcome.html", "<h1>Hi {{ name }}</h1>")?;
//! let sender = RecordingSender::new();
//! let mailer = Mailer::new(templates.settings(MailSettings::default()), Arc::new(sender.clone()));
//!
//! mailer
//!     .send_email(TemplatedEmail::new("welcome").subject("Hi").var("name", "Ann"), None)
//!     .await?;
//!
//! assert_eq!(sender.sent_count(), 1);
//! # Ok(())
//! # }
//! ```

mod email;

use std::fs;
use std::io;
use std::path::Path;

use tempfile::TempDir;

use crate::config::MailSettings;

pub use email::RecordingSender;

/// Temporary template directory, removed on drop
#[derive(Debug)]
pub struct TemplateDir {
    dir: TempDir,
}

impl TemplateDir {
    /// Create an empty template directory
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    /// Write a template at `name` relative to the directory
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn with(self, name: &str, source: &str) -> io::Result<Self> {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, source)?;
        Ok(self)
    }

    /// Directory path
    #[must_use]
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// `settings` pointed at this directory
    #[must_use]
    pub fn settings(&self, mut settings: MailSettings) -> MailSettings {
        settings.templates.template_dir = self.path().to_path_buf();
        settings
    }
}
