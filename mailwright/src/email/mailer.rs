//! The send pipeline
//!
//! [`Mailer`] ties the pieces together: base context, template rendering,
//! environment policy and composition. Each send renders synchronously and
//! then awaits exactly one transport call; nothing is retried.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use super::{
    apply_environment_policy, backend, markdown_to_html, ContextGenerator, ContextGenerators,
    Email, EmailContext, EmailError, EmailSender, RequestInfo, TemplateRenderer,
};
use crate::config::MailSettings;

/// Template rendered when the caller names none
pub const DEFAULT_TEMPLATE: &str = "base";

/// Subject and addressing of an outgoing message
///
/// Empty `sender` and `to` fall back to the configured defaults when the
/// message is composed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Envelope {
    /// Subject line, before environment tagging
    pub subject: String,
    /// Sender address
    pub sender: Option<String>,
    /// Primary recipients
    pub to: Vec<String>,
    /// Carbon-copy recipients
    pub cc: Vec<String>,
    /// Blind carbon-copy recipients
    pub bcc: Vec<String>,
}

impl Envelope {
    /// Envelope with only a subject
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            ..Self::default()
        }
    }
}

macro_rules! envelope_setters {
    ($ty:ty) => {
        impl $ty {
            /// Set the subject
            #[must_use]
            pub fn subject(mut self, subject: impl Into<String>) -> Self {
                self.envelope.subject = subject.into();
                self
            }

            /// Set the sender address
            #[must_use]
            pub fn from(mut self, sender: impl Into<String>) -> Self {
                self.envelope.sender = Some(sender.into());
                self
            }

            /// Add a primary recipient
            #[must_use]
            pub fn to(mut self, address: impl Into<String>) -> Self {
                self.envelope.to.push(address.into());
                self
            }

            /// Add a carbon-copy recipient
            #[must_use]
            pub fn cc(mut self, address: impl Into<String>) -> Self {
                self.envelope.cc.push(address.into());
                self
            }

            /// Add a blind carbon-copy recipient
            #[must_use]
            pub fn bcc(mut self, address: impl Into<String>) -> Self {
                self.envelope.bcc.push(address.into());
                self
            }
        }
    };
}

/// A send request for a named template
#[derive(Debug, Clone, PartialEq)]
pub struct TemplatedEmail {
    /// Logical template name, resolved to `emails/<name>.html` and `.txt`
    pub template: String,
    /// Subject and addressing
    pub envelope: Envelope,
    /// Caller variables, laid over the base context
    pub context: EmailContext,
    /// Never attach the HTML alternative
    pub text_only: bool,
}

impl Default for TemplatedEmail {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}

impl TemplatedEmail {
    /// Request for `template`
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            envelope: Envelope::default(),
            context: EmailContext::new(),
            text_only: false,
        }
    }

    /// Add a template variable
    #[must_use]
    pub fn var(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key, value);
        self
    }

    /// Replace the caller context
    #[must_use]
    pub fn context(mut self, context: EmailContext) -> Self {
        self.context = context;
        self
    }

    /// Send the plain-text body only
    #[must_use]
    pub const fn text_only(mut self, text_only: bool) -> Self {
        self.text_only = text_only;
        self
    }
}

envelope_setters!(TemplatedEmail);

/// A send request whose body is markdown source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownEmail {
    /// Subject and addressing
    pub envelope: Envelope,
    /// Markdown source, sent verbatim as the text body
    pub markdown: String,
}

impl MarkdownEmail {
    /// Request with the given markdown body
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            envelope: Envelope::default(),
            markdown: markdown.into(),
        }
    }
}

envelope_setters!(MarkdownEmail);

/// Composes templated emails and hands them to a transport
#[derive(Clone)]
pub struct Mailer {
    settings: Arc<MailSettings>,
    renderer: Arc<TemplateRenderer>,
    generator: Arc<dyn ContextGenerator>,
    sender: Arc<dyn EmailSender>,
}

impl fmt::Debug for Mailer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mailer")
            .field("settings", &self.settings)
            .field("renderer", &self.renderer)
            .finish_non_exhaustive()
    }
}

impl Mailer {
    /// Mailer with the built-in context generators
    #[must_use]
    pub fn new(settings: MailSettings, sender: Arc<dyn EmailSender>) -> Self {
        Self::with_generators(settings, sender, &ContextGenerators::new())
    }

    /// Mailer choosing its context generator from `generators`
    ///
    /// The generator named by `settings.context_generator` is resolved once,
    /// here.
    #[must_use]
    pub fn with_generators(
        settings: MailSettings,
        sender: Arc<dyn EmailSender>,
        generators: &ContextGenerators,
    ) -> Self {
        let generator = generators.resolve(&settings.context_generator);
        let renderer = TemplateRenderer::from_settings(&settings.templates);

        Self {
            settings: Arc::new(settings),
            renderer: Arc::new(renderer),
            generator,
            sender,
        }
    }

    /// Mailer using the transport selected in `settings`
    #[must_use]
    pub fn from_settings(settings: MailSettings) -> Self {
        let sender = backend::from_settings(&settings.transport);
        Self::new(settings, sender)
    }

    /// Replace the template renderer
    #[must_use]
    pub fn with_renderer(mut self, renderer: TemplateRenderer) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// Active settings
    #[must_use]
    pub fn settings(&self) -> &MailSettings {
        &self.settings
    }

    /// Template renderer
    #[must_use]
    pub fn renderer(&self) -> &TemplateRenderer {
        &self.renderer
    }

    /// Base context every template sees
    #[must_use]
    pub fn email_context(&self, request: Option<&dyn RequestInfo>) -> EmailContext {
        self.generator.generate(&self.settings, request)
    }

    /// Render the `(html, text)` bodies of `template` with the base context
    /// overlaid by `context`
    ///
    /// # Errors
    ///
    /// Returns `EmailError::Template` if an existing variant fails to render.
    pub fn render(
        &self,
        template: &str,
        context: EmailContext,
        request: Option<&dyn RequestInfo>,
    ) -> Result<(String, String), EmailError> {
        let template = if template.is_empty() {
            DEFAULT_TEMPLATE
        } else {
            template
        };

        let mut merged = self.email_context(request);
        merged.overlay(context);

        self.renderer.render_multipart(template, &merged)
    }

    /// Build the outbound message
    ///
    /// A missing sender or recipient list takes the configured default. The
    /// HTML alternative is attached only when `text_only` is false and
    /// `html` is non-empty.
    #[must_use]
    pub fn compose(&self, envelope: Envelope, html: &str, text: &str, text_only: bool) -> Email {
        let sender = envelope
            .sender
            .filter(|sender| !sender.is_empty())
            .unwrap_or_else(|| self.settings.default_sender.clone());
        let to = if envelope.to.is_empty() {
            self.settings.default_recipients.clone()
        } else {
            envelope.to
        };

        let mut email = Email::new()
            .from(&sender)
            .to_multiple(&to)
            .subject(&envelope.subject)
            .text(text);
        email.cc = envelope.cc;
        email.bcc = envelope.bcc;

        if !text_only && !html.is_empty() {
            email = email.html(html);
        }

        email
    }

    /// Compose a message and hand it to the transport
    ///
    /// # Errors
    ///
    /// Returns the transport's delivery error unless `fail_silently` is set,
    /// in which case the error is logged and discarded.
    pub async fn compose_and_send(
        &self,
        envelope: Envelope,
        html: &str,
        text: &str,
        text_only: bool,
        fail_silently: bool,
    ) -> Result<(), EmailError> {
        let email = self.compose(envelope, html, text, text_only);
        let subject = email.subject.clone();

        match self.sender.send(email).await {
            Ok(()) => {
                info!(subject = %subject, "Email dispatched");
                Ok(())
            }
            Err(err) if fail_silently && err.is_delivery_failure() => {
                warn!(subject = %subject, error = %err, "Email delivery failed, ignoring");
                Ok(())
            }
            Err(err) => Err(err),
        }
    }

    /// Render and send a templated email
    ///
    /// # Errors
    ///
    /// Template errors always surface. Delivery errors surface unless the
    /// environment policy or configuration suppresses them.
    #[tracing::instrument(skip_all, fields(template = %email.template, subject = %email.envelope.subject))]
    pub async fn send_email(
        &self,
        email: TemplatedEmail,
        request: Option<&dyn RequestInfo>,
    ) -> Result<(), EmailError> {
        let TemplatedEmail {
            template,
            mut envelope,
            context,
            text_only,
        } = email;

        let (html, text) = self.render(&template, context, request)?;

        let (subject, fail_silently) =
            apply_environment_policy(&self.settings, &envelope.subject, self.settings.fail_silently);
        envelope.subject = subject;

        self.compose_and_send(envelope, &html, &text, text_only, fail_silently)
            .await
    }

    /// Send markdown as the text body with its rendered HTML as the alternative
    ///
    /// # Errors
    ///
    /// Delivery errors surface unless suppressed by policy or configuration.
    #[tracing::instrument(skip_all, fields(subject = %email.envelope.subject))]
    pub async fn send_markdown_email(&self, email: MarkdownEmail) -> Result<(), EmailError> {
        let MarkdownEmail {
            mut envelope,
            markdown,
        } = email;

        let html = markdown_to_html(&markdown);

        let (subject, fail_silently) =
            apply_environment_policy(&self.settings, &envelope.subject, self.settings.fail_silently);
        envelope.subject = subject;

        self.compose_and_send(envelope, &html, &markdown, false, fail_silently)
            .await
    }

    /// Send a plain-text message
    ///
    /// The caller's `fail_silently` applies outside development.
    ///
    /// # Errors
    ///
    /// Delivery errors surface unless suppressed.
    #[tracing::instrument(skip_all, fields(subject = %envelope.subject))]
    pub async fn simple_email(
        &self,
        mut envelope: Envelope,
        message: &str,
        fail_silently: bool,
    ) -> Result<(), EmailError> {
        let (subject, fail_silently) =
            apply_environment_policy(&self.settings, &envelope.subject, fail_silently);
        envelope.subject = subject;

        self.compose_and_send(envelope, "", message, true, fail_silently)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, TemplateSettings};
    use crate::email::{MockEmailSender, RequestParts};
    use crate::template;
    use crate::testing::RecordingSender;

    fn settings(environment: Environment) -> MailSettings {
        MailSettings {
            environment,
            ..MailSettings::default()
        }
    }

    fn renderer(templates: &[(&str, &str)]) -> TemplateRenderer {
        let mut env = template::bare_environment();
        for (name, source) in templates {
            env.add_template_owned((*name).to_string(), (*source).to_string())
                .unwrap();
        }
        TemplateRenderer::new(env, &TemplateSettings::default())
    }

    fn recording(environment: Environment, templates: &[(&str, &str)]) -> (Mailer, RecordingSender) {
        let sender = RecordingSender::new();
        let mailer = Mailer::new(settings(environment), Arc::new(sender.clone()))
            .with_renderer(renderer(templates));
        (mailer, sender)
    }

    #[test]
    fn test_compose_applies_defaults() {
        let (mailer, _) = recording(Environment::Production, &[]);

        let email = mailer.compose(Envelope::new("Hi"), "<p>x</p>", "x", false);

        assert_eq!(email.from.as_deref(), Some("Example <no-reply@example.com>"));
        assert_eq!(email.to, vec!["info@example.com"]);
        assert!(email.cc.is_empty());
        assert!(email.bcc.is_empty());
        assert_eq!(email.html.as_deref(), Some("<p>x</p>"));
    }

    #[test]
    fn test_compose_empty_sender_uses_default() {
        let (mailer, _) = recording(Environment::Production, &[]);
        let envelope = Envelope {
            sender: Some(String::new()),
            ..Envelope::new("Hi")
        };

        let email = mailer.compose(envelope, "", "x", false);

        assert_eq!(email.from.as_deref(), Some("Example <no-reply@example.com>"));
    }

    #[test]
    fn test_compose_html_attachment_rules() {
        let (mailer, _) = recording(Environment::Production, &[]);

        assert!(mailer.compose(Envelope::new("s"), "<p>x</p>", "x", true).html.is_none());
        assert!(mailer.compose(Envelope::new("s"), "", "x", false).html.is_none());
    }

    #[tokio::test]
    async fn test_send_email_html_only_template() {
        let (mailer, sender) = recording(
            Environment::Production,
            &[("emails/welcome.html", "<h1>Hi {{ name }}</h1>")],
        );

        let email = TemplatedEmail::new("welcome")
            .subject("Welcome")
            .to("ann@example.com")
            .var("name", "Ann");
        mailer.send_email(email, None).await.unwrap();

        let sent = sender.last_sent().unwrap();
        assert_eq!(sent.subject, "Welcome");
        assert_eq!(sent.text, "# Hi Ann");
        assert_eq!(sent.html.as_deref(), Some("<h1>Hi Ann</h1>"));
    }

    #[tokio::test]
    async fn test_send_email_caller_context_wins() {
        let (mailer, sender) = recording(
            Environment::Production,
            &[("emails/link.txt", "{{ site_name }} {{ base_url }}")],
        );
        let request = RequestParts::new("app.example.org", true);

        let email = TemplatedEmail::new("link").var("site_name", "Custom");
        mailer.send_email(email, Some(&request)).await.unwrap();

        assert_eq!(sender.last_sent().unwrap().text, "Custom https://app.example.org");
    }

    #[tokio::test]
    async fn test_send_email_empty_template_name_uses_base() {
        let (mailer, sender) = recording(
            Environment::Production,
            &[("emails/base.txt", "base body")],
        );

        mailer
            .send_email(TemplatedEmail::new("").subject("s"), None)
            .await
            .unwrap();

        assert_eq!(sender.last_sent().unwrap().text, "base body");
    }

    #[tokio::test]
    async fn test_send_email_text_only() {
        let (mailer, sender) = recording(
            Environment::Production,
            &[
                ("emails/note.html", "<p>html</p>"),
                ("emails/note.txt", "text"),
            ],
        );

        mailer
            .send_email(TemplatedEmail::new("note").text_only(true), None)
            .await
            .unwrap();

        let sent = sender.last_sent().unwrap();
        assert_eq!(sent.text, "text");
        assert!(sent.html.is_none());
    }

    #[tokio::test]
    async fn test_development_tags_subject() {
        let (mailer, sender) = recording(Environment::Development, &[("emails/note.txt", "x")]);

        mailer
            .send_email(TemplatedEmail::new("note").subject("Welcome"), None)
            .await
            .unwrap();

        assert!(sender.was_sent_with_subject("[example-dev] Welcome"));
    }

    #[tokio::test]
    async fn test_development_swallows_delivery_error() {
        let sender = RecordingSender::failing("relay down");
        let mailer = Mailer::new(settings(Environment::Development), Arc::new(sender))
            .with_renderer(renderer(&[("emails/note.txt", "x")]));

        let result = mailer.send_email(TemplatedEmail::new("note"), None).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_production_surfaces_delivery_error() {
        let sender = RecordingSender::failing("relay down");
        let mailer = Mailer::new(settings(Environment::Production), Arc::new(sender))
            .with_renderer(renderer(&[("emails/note.txt", "x")]));

        let err = mailer
            .send_email(TemplatedEmail::new("note"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, EmailError::Delivery(_)));
    }

    #[tokio::test]
    async fn test_configured_fail_silently_in_production() {
        let mut settings = settings(Environment::Production);
        settings.fail_silently = true;
        let mailer = Mailer::new(settings, Arc::new(RecordingSender::failing("relay down")))
            .with_renderer(renderer(&[("emails/note.txt", "x")]));

        assert!(mailer.send_email(TemplatedEmail::new("note"), None).await.is_ok());
    }

    #[tokio::test]
    async fn test_template_error_surfaces_in_development() {
        let mut mock = MockEmailSender::new();
        mock.expect_send().never();

        let mailer = Mailer::new(settings(Environment::Development), Arc::new(mock))
            .with_renderer(renderer(&[("emails/broken.txt", "{{ nope() }}")]));

        let err = mailer
            .send_email(TemplatedEmail::new("broken"), None)
            .await
            .unwrap_err();

        assert!(matches!(err, EmailError::Template(_)));
    }

    #[tokio::test]
    async fn test_send_markdown_email() {
        let mut mock = MockEmailSender::new();
        mock.expect_send()
            .times(1)
            .withf(|email| {
                email.text == "# Hi"
                    && email.html.as_deref().is_some_and(|html| html.contains("<h1>"))
            })
            .returning(|_| Ok(()));

        let mailer = Mailer::new(settings(Environment::Production), Arc::new(mock));

        mailer
            .send_markdown_email(MarkdownEmail::new("# Hi").subject("News"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_simple_email_honours_fail_silently_in_production() {
        let mailer = Mailer::new(
            settings(Environment::Production),
            Arc::new(RecordingSender::failing("relay down")),
        );

        assert!(mailer
            .simple_email(Envelope::new("Hi"), "body", true)
            .await
            .is_ok());
        assert!(mailer
            .simple_email(Envelope::new("Hi"), "body", false)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_simple_email_is_text_only() {
        let (mailer, sender) = recording(Environment::Production, &[]);

        mailer
            .simple_email(Envelope::new("Hi"), "plain body", false)
            .await
            .unwrap();

        let sent = sender.last_sent().unwrap();
        assert_eq!(sent.text, "plain body");
        assert!(sent.html.is_none());
    }

    #[test]
    fn test_unknown_generator_yields_empty_context() {
        let mut settings = settings(Environment::Production);
        settings.context_generator = "missing".to_string();
        let mailer = Mailer::new(settings, Arc::new(RecordingSender::new()));

        assert!(mailer.email_context(None).is_empty());
    }
}
