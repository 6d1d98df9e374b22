//! Templated send command

use anyhow::Result;
use console::{style, Emoji};
use mailwright::config::MailSettings;
use mailwright::email::{Mailer, RequestInfo, RequestParts, TemplatedEmail};
use mailwright_cli_lib::context_from_vars;

static SUCCESS: Emoji = Emoji("✓", "√");

/// Render a template and send it through the configured transport
pub struct SendCommand {
    /// Template name
    pub template: String,
    /// Subject line
    pub subject: String,
    /// Sender, defaults to the configured sender
    pub from: Option<String>,
    /// Recipients, default to the configured recipients
    pub to: Vec<String>,
    /// Carbon-copy recipients
    pub cc: Vec<String>,
    /// Blind carbon-copy recipients
    pub bcc: Vec<String>,
    /// Skip the HTML alternative
    pub text_only: bool,
    /// `key=value` template variables
    pub vars: Vec<String>,
    /// Host used for `base_url`
    pub host: Option<String>,
    /// Whether `base_url` uses https
    pub secure: bool,
}

impl SendCommand {
    fn email(&self) -> Result<TemplatedEmail> {
        let mut email = TemplatedEmail::new(self.template.as_str())
            .subject(self.subject.as_str())
            .context(context_from_vars(&self.vars)?)
            .text_only(self.text_only);

        email.envelope.sender.clone_from(&self.from);
        email.envelope.to.clone_from(&self.to);
        email.envelope.cc.clone_from(&self.cc);
        email.envelope.bcc.clone_from(&self.bcc);

        Ok(email)
    }

    /// Execute the command
    pub async fn execute(&self, settings: MailSettings) -> Result<()> {
        let email = self.email()?;
        let mailer = Mailer::from_settings(settings);
        let request = self
            .host
            .as_deref()
            .map(|host| RequestParts::new(host, self.secure));
        let request = request.as_ref().map(|parts| parts as &dyn RequestInfo);

        mailer.send_email(email, request).await?;

        println!(
            "{} Sent {}",
            style(SUCCESS).green(),
            style(&self.template).cyan().bold()
        );

        Ok(())
    }
}
