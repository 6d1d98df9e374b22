//! Template preview command

use anyhow::Result;
use console::style;
use mailwright::config::MailSettings;
use mailwright::email::{Mailer, RequestInfo, RequestParts};
use mailwright_cli_lib::context_from_vars;

/// Render a template's HTML and text bodies without sending
pub struct RenderCommand {
    template: String,
    vars: Vec<String>,
    host: Option<String>,
    secure: bool,
}

impl RenderCommand {
    /// Create a new command instance
    pub const fn new(template: String, vars: Vec<String>, host: Option<String>, secure: bool) -> Self {
        Self {
            template,
            vars,
            host,
            secure,
        }
    }

    /// Execute the command
    pub fn execute(&self, settings: MailSettings) -> Result<()> {
        let context = context_from_vars(&self.vars)?;
        let mailer = Mailer::from_settings(settings);
        let request = self
            .host
            .as_deref()
            .map(|host| RequestParts::new(host, self.secure));
        let request = request.as_ref().map(|parts| parts as &dyn RequestInfo);

        let (html, text) = mailer.render(&self.template, context, request)?;

        println!("{}", style("── HTML ──").cyan().bold());
        if html.is_empty() {
            println!("{}", style("(no HTML variant)").dim());
        } else {
            println!("{html}");
        }
        println!();
        println!("{}", style("── Text ──").cyan().bold());
        if text.is_empty() {
            println!("{}", style("(empty)").dim());
        } else {
            println!("{text}");
        }

        Ok(())
    }
}
