//! Markdown send command

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use console::{style, Emoji};
use mailwright::config::MailSettings;
use mailwright::email::{Mailer, MarkdownEmail};

static SUCCESS: Emoji = Emoji("✓", "√");

/// Send a markdown file as text with an HTML alternative
pub struct MarkdownCommand {
    /// Markdown source file
    pub file: PathBuf,
    /// Subject line
    pub subject: String,
    /// Sender, defaults to the configured sender
    pub from: Option<String>,
    /// Recipients, default to the configured recipients
    pub to: Vec<String>,
}

impl MarkdownCommand {
    fn email(&self) -> Result<MarkdownEmail> {
        let markdown = std::fs::read_to_string(&self.file)
            .with_context(|| format!("Failed to read {}", self.file.display()))?;

        if markdown.trim().is_empty() {
            bail!("{} is empty", self.file.display());
        }

        let mut email = MarkdownEmail::new(markdown).subject(self.subject.as_str());
        email.envelope.sender.clone_from(&self.from);
        email.envelope.to.clone_from(&self.to);

        Ok(email)
    }

    /// Execute the command
    pub async fn execute(&self, settings: MailSettings) -> Result<()> {
        let email = self.email()?;

        Mailer::from_settings(settings)
            .send_markdown_email(email)
            .await?;

        println!(
            "{} Sent {}",
            style(SUCCESS).green(),
            style(self.file.display()).cyan().bold()
        );

        Ok(())
    }
}
