//! Multipart rendering of named email templates
//!
//! A template name `welcome` maps to `emails/welcome.html` and
//! `emails/welcome.txt`. Either file may be missing:
//!
//! 1. The HTML variant is rendered with `base_template` set to the HTML layout.
//! 2. The text variant is rendered with `base_template` set to the text layout.
//! 3. Without a text variant, the HTML variant is rendered again with the
//!    text-phase context and degraded with [`html_to_text`].

use minijinja::{Environment, ErrorKind};
use tracing::debug;

use super::{html_to_text, EmailContext, EmailError};
use crate::config::TemplateSettings;
use crate::template;

/// Renders the HTML and plain-text bodies of templated emails
#[derive(Debug)]
pub struct TemplateRenderer {
    env: Environment<'static>,
    html_base_template: String,
    text_base_template: String,
}

impl TemplateRenderer {
    /// Wrap an existing environment
    #[must_use]
    pub fn new(env: Environment<'static>, settings: &TemplateSettings) -> Self {
        Self {
            env,
            html_base_template: settings.html_base_template.clone(),
            text_base_template: settings.text_base_template.clone(),
        }
    }

    /// Renderer loading templates from `settings.template_dir`
    #[must_use]
    pub fn from_settings(settings: &TemplateSettings) -> Self {
        Self::new(template::environment(settings), settings)
    }

    /// The underlying template environment
    #[must_use]
    pub const fn environment(&self) -> &Environment<'static> {
        &self.env
    }

    /// Render a template if it exists
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Template` if the template exists but fails to
    /// compile or render. A missing template is `Ok(None)`.
    pub fn render_optional(
        &self,
        name: &str,
        context: &EmailContext,
    ) -> Result<Option<String>, EmailError> {
        let template = match self.env.get_template(name) {
            Ok(template) => template,
            Err(err) if err.kind() == ErrorKind::TemplateNotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };

        Ok(Some(template.render(context)?))
    }

    /// Render the `(html, text)` bodies of `template_name`
    ///
    /// Missing variants fall back as described in the module docs; when
    /// neither exists both bodies are empty.
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Template` if an existing variant fails to render.
    pub fn render_multipart(
        &self,
        template_name: &str,
        context: &EmailContext,
    ) -> Result<(String, String), EmailError> {
        let html_name = format!("emails/{template_name}.html");
        let text_name = format!("emails/{template_name}.txt");

        let mut context = context.clone();

        context.insert("base_template", self.html_base_template.clone());
        let html = self.render_optional(&html_name, &context)?;

        context.insert("base_template", self.text_base_template.clone());
        if let Some(text) = self.render_optional(&text_name, &context)? {
            return Ok((html.unwrap_or_default(), text));
        }

        let text = if html.is_some() {
            debug!(template = %template_name, "no text variant, deriving text from HTML");
            self.render_optional(&html_name, &context)?
                .map(|markup| html_to_text(&markup))
                .unwrap_or_default()
        } else {
            debug!(template = %template_name, "no HTML or text variant, sending empty bodies");
            String::new()
        };

        Ok((html.unwrap_or_default(), text))
    }
}
