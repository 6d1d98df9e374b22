//! Configuration management for mailwright
//!
//! Settings are loaded from multiple sources with clear precedence:
//!
//! 1. Environment variables (highest priority, `MAILWRIGHT_` prefix, `__` for nesting)
//! 2. `./mailwright.toml` (development)
//! 3. `~/.config/mailwright/config.toml` (user config, XDG)
//! 4. `/etc/mailwright/config.toml` (system config)
//! 5. Hardcoded defaults (fallback)
//!
//! # Example Configuration
//!
//! ```toml
//! site_name = "Example"
//! symbolic_site_name = "example"
//! default_domain = "example.com"
//! default_sender = "Example <no-reply@example.com>"
//! default_recipients = ["info@example.com"]
//! environment = "production"
//!
//! [templates]
//! template_dir = "./templates"
//! html_base_template = "emails/base.html"
//! text_base_template = "emails/base.txt"
//! default_country = "US"
//!
//! [transport]
//! backend = "smtp"
//!
//! [transport.smtp]
//! host = "smtp.example.com"
//! port = 587
//! ```
//!
//! Environment variable format: `MAILWRIGHT_SECTION__FIELD_NAME`, e.g.
//! `MAILWRIGHT_TRANSPORT__SMTP__HOST=smtp.example.com`.

use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Deployment environment
///
/// Development sends get a tagged subject and never raise delivery errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development or test deployment
    Development,
    /// Production deployment
    Production,
}

impl Environment {
    /// Whether this is a non-production environment
    #[must_use]
    pub const fn is_development(self) -> bool {
        matches!(self, Self::Development)
    }
}

impl Default for Environment {
    fn default() -> Self {
        if cfg!(debug_assertions) {
            Self::Development
        } else {
            Self::Production
        }
    }
}

/// Email template configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateSettings {
    /// Directory the template loader reads from
    pub template_dir: PathBuf,

    /// Layout exposed as `base_template` while rendering the HTML variant
    pub html_base_template: String,

    /// Layout exposed as `base_template` while rendering the text variant
    pub text_base_template: String,

    /// ISO 3166 country used by the `phonenumber` filter when none is given
    pub default_country: String,
}

impl Default for TemplateSettings {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("./templates"),
            html_base_template: "emails/base.html".to_string(),
            text_base_template: "emails/base.txt".to_string(),
            default_country: "US".to_string(),
        }
    }
}

/// Which transport delivers composed messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Log messages instead of sending them
    Console,
    /// Deliver through an SMTP relay
    Smtp,
}

/// SMTP relay configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmtpSettings {
    /// SMTP server hostname
    pub host: String,

    /// SMTP server port (usually 587 for STARTTLS)
    pub port: u16,

    /// SMTP username, empty for unauthenticated relays
    pub username: String,

    /// SMTP password
    pub password: String,

    /// Require STARTTLS
    pub use_tls: bool,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 587,
            username: String::new(),
            password: String::new(),
            use_tls: true,
        }
    }
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportSettings {
    /// Selected backend
    pub backend: Backend,

    /// Log full message bodies with the console backend
    pub verbose: bool,

    /// SMTP settings, used when `backend = "smtp"`
    pub smtp: SmtpSettings,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            backend: Backend::Console,
            verbose: false,
            smtp: SmtpSettings::default(),
        }
    }
}

/// Complete mailwright configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MailSettings {
    /// Display name of the site, exposed to templates as `site_name`
    pub site_name: String,

    /// Short machine name of the site, used in development subject tags
    pub symbolic_site_name: String,

    /// Domain used for `base_url` when no request host is available
    pub default_domain: String,

    /// Sender used when the caller does not supply one
    pub default_sender: String,

    /// Recipients used when the caller does not supply any
    pub default_recipients: Vec<String>,

    /// Name of the registered context generator
    ///
    /// An empty or unknown name resolves to a generator producing an empty
    /// context.
    pub context_generator: String,

    /// Deployment environment
    pub environment: Environment,

    /// Suppress delivery errors in production
    pub fail_silently: bool,

    /// Template settings
    pub templates: TemplateSettings,

    /// Transport settings
    pub transport: TransportSettings,
}

impl Default for MailSettings {
    fn default() -> Self {
        Self {
            site_name: "Example".to_string(),
            symbolic_site_name: "example".to_string(),
            default_domain: "example.com".to_string(),
            default_sender: "Example <no-reply@example.com>".to_string(),
            default_recipients: vec!["info@example.com".to_string()],
            context_generator: "default".to_string(),
            environment: Environment::default(),
            fail_silently: false,
            templates: TemplateSettings::default(),
            transport: TransportSettings::default(),
        }
    }
}

impl MailSettings {
    /// Load configuration from the standard locations
    ///
    /// Searches with precedence:
    /// 1. Environment variables (`MAILWRIGHT_*`, use `__` for nesting)
    /// 2. `./mailwright.toml`
    /// 3. `~/.config/mailwright/config.toml`
    /// 4. `/etc/mailwright/config.toml`
    /// 5. Defaults
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file cannot be parsed or a value
    /// has the wrong type.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use mailwright::config::MailSettings;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let settings = MailSettings::load()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn load() -> anyhow::Result<Self> {
        let mut figment = Self::defaults()?;

        let system_config = PathBuf::from("/etc/mailwright/config.toml");
        if system_config.exists() {
            figment = figment.merge(Toml::file(&system_config));
        }

        let user_config = Self::recommended_path();
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }

        let local_config = PathBuf::from("./mailwright.toml");
        if local_config.exists() {
            figment = figment.merge(Toml::file(&local_config));
        }

        let settings = figment.merge(Self::env_provider()).extract()?;
        Ok(settings)
    }

    /// Load configuration from a specific file
    ///
    /// Environment variables still override values from the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file contains invalid TOML or a value has the
    /// wrong type.
    pub fn load_from(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let settings = Self::defaults()?
            .merge(Toml::file(path.as_ref()))
            .merge(Self::env_provider())
            .extract()?;

        Ok(settings)
    }

    /// Get the recommended XDG config path
    ///
    /// Returns `~/.config/mailwright/config.toml` on Linux.
    #[must_use]
    pub fn recommended_path() -> PathBuf {
        dirs::config_dir().map_or_else(
            || PathBuf::from("./mailwright.toml"),
            |config_dir| config_dir.join("mailwright").join("config.toml"),
        )
    }

    fn defaults() -> anyhow::Result<Figment> {
        Ok(Figment::new().merge(Toml::string(&toml::to_string(&Self::default())?)))
    }

    fn env_provider() -> Env {
        Env::prefixed("MAILWRIGHT_").split("__").lowercase(true)
    }
}
