//! SMTP backend for sending emails
//!
//! Uses the `lettre` crate to deliver through an SMTP relay.

use async_trait::async_trait;
use lettre::{
    message::{header, Mailbox, MultiPart},
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use tracing::info;

use crate::config::SmtpSettings;
use crate::email::{Email, EmailError, EmailSender};

/// SMTP email backend
///
/// ```rust,no_run
/// use mailwright::config::SmtpSettings;
/// use mailwright::email::{Email, EmailSender, SmtpBackend};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let backend = SmtpBackend::new(SmtpSettings {
///     host: "smtp.example.com".to_string(),
///     ..SmtpSettings::default()
/// });
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
#[derive(Debug, Clone)]
pub struct SmtpBackend {
    config: SmtpSettings,
}

fn mailbox(address: &str) -> Result<Mailbox, EmailError> {
    address
        .parse()
        .map_err(|_| EmailError::InvalidAddress(address.to_string()))
}

impl SmtpBackend {
    /// Create a new SMTP backend with the given configuration
    #[must_use]
    pub const fn new(config: SmtpSettings) -> Self {
        Self { config }
    }

    /// Build the lettre message
    ///
    /// The plain-text body is always present; with an HTML body the message
    /// becomes `multipart/alternative`.
    fn build_message(email: &Email) -> Result<Message, EmailError> {
        email.validate()?;

        let from_addr = email.from.as_deref().ok_or(EmailError::NoSender)?;
        let mut builder = Message::builder()
            .from(mailbox(from_addr)?)
            .subject(email.subject.as_str());

        for to_addr in &email.to {
            builder = builder.to(mailbox(to_addr)?);
        }

        for cc_addr in &email.cc {
            builder = builder.cc(mailbox(cc_addr)?);
        }

        for bcc_addr in &email.bcc {
            builder = builder.bcc(mailbox(bcc_addr)?);
        }

        let message = match &email.html {
            Some(html) => builder.multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                html.clone(),
            )),
            None => builder
                .header(header::ContentType::TEXT_PLAIN)
                .body(email.text.clone()),
        };

        message.map_err(|e| EmailError::delivery(e.to_string()))
    }

    /// Create SMTP transport from config
    fn create_transport(&self) -> Result<AsyncSmtpTransport<Tokio1Executor>, EmailError> {
        let mut transport = if self.config.use_tls {
            let tls_parameters = TlsParameters::new(self.config.host.clone())
                .map_err(|e| EmailError::config(format!("TLS parameters error: {e}")))?;

            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.host)
                .map_err(|e| EmailError::config(e.to_string()))?
                .tls(Tls::Required(tls_parameters))
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&self.config.host)
        };

        if !self.config.username.is_empty() {
            transport = transport.credentials(Credentials::new(
                self.config.username.clone(),
                self.config.password.clone(),
            ));
        }

        Ok(transport.port(self.config.port).build())
    }
}

#[async_trait]
impl EmailSender for SmtpBackend {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        let message = Self::build_message(&email)?;
        let transport = self.create_transport()?;

        let response = transport
            .send(message)
            .await
            .map_err(|e| EmailError::delivery(e.to_string()))?;

        info!(
            host = %self.config.host,
            code = %response.code(),
            subject = %email.subject,
            "Email handed to SMTP relay"
        );

        Ok(())
    }
}
