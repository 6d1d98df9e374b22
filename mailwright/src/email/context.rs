//! Template context for outgoing emails
//!
//! Every templated email starts from a base [`EmailContext`] produced by a
//! [`ContextGenerator`], then the caller's own values are laid on top.
//! The generator is chosen by name from a [`ContextGenerators`] registry
//! when the mailer is built, not at send time.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::MailSettings;

/// Variables available to email templates
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailContext(BTreeMap<String, Value>);

impl EmailContext {
    /// Create an empty context
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any previous value under the same key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    /// Builder-style [`insert`](Self::insert)
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Look up a value
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a string value
    #[must_use]
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Lay `overrides` on top of this context; the override wins on conflict
    pub fn overlay(&mut self, overrides: Self) {
        self.0.extend(overrides.0);
    }

    /// Number of variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the context has no variables
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for EmailContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// The parts of an incoming HTTP request the context needs
pub trait RequestInfo: Send + Sync {
    /// Whether the request arrived over a secure connection
    fn is_secure(&self) -> bool;

    /// Requested host, possibly empty
    fn host(&self) -> &str;
}

/// Plain [`RequestInfo`] implementation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestParts {
    /// Secure connection flag
    pub secure: bool,
    /// Host header value
    pub host: String,
}

impl RequestParts {
    /// Create request parts from a host and security flag
    pub fn new(host: impl Into<String>, secure: bool) -> Self {
        Self {
            secure,
            host: host.into(),
        }
    }
}

impl RequestInfo for RequestParts {
    fn is_secure(&self) -> bool {
        self.secure
    }

    fn host(&self) -> &str {
        &self.host
    }
}

/// Build the standard email context: `base_url` and `site_name`
///
/// Without a request the protocol is `http` and the domain is the
/// configured default. With one, the protocol follows the connection and
/// the domain is the request host, or the default when the host is empty.
///
/// ```rust
/// use mailwright::config::MailSettings;
/// use mailwright::email::resolve_email_context;
///
/// let settings = MailSettings::default();
/// let context = resolve_email_context(&settings, None);
/// assert_eq!(context.get_str("base_url"), Some("http://example.com"));
/// ```
#[must_use]
pub fn resolve_email_context(
    settings: &MailSettings,
    request: Option<&dyn RequestInfo>,
) -> EmailContext {
    let (protocol, domain) = match request {
        Some(request) => {
            let protocol = if request.is_secure() { "https" } else { "http" };
            let host = request.host();
            let domain = if host.is_empty() {
                settings.default_domain.as_str()
            } else {
                host
            };
            (protocol, domain)
        }
        None => ("http", settings.default_domain.as_str()),
    };

    EmailContext::new()
        .with("base_url", format!("{protocol}://{domain}"))
        .with("site_name", settings.site_name.clone())
}

/// Strategy producing the base context of every templated email
pub trait ContextGenerator: Send + Sync {
    /// Produce the base context
    fn generate(&self, settings: &MailSettings, request: Option<&dyn RequestInfo>)
        -> EmailContext;
}

impl<F> ContextGenerator for F
where
    F: Fn(&MailSettings, Option<&dyn RequestInfo>) -> EmailContext + Send + Sync,
{
    fn generate(
        &self,
        settings: &MailSettings,
        request: Option<&dyn RequestInfo>,
    ) -> EmailContext {
        self(settings, request)
    }
}

/// Generator backed by [`resolve_email_context`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultContextGenerator;

impl ContextGenerator for DefaultContextGenerator {
    fn generate(
        &self,
        settings: &MailSettings,
        request: Option<&dyn RequestInfo>,
    ) -> EmailContext {
        resolve_email_context(settings, request)
    }
}

/// Generator that contributes nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyContextGenerator;

impl ContextGenerator for EmptyContextGenerator {
    fn generate(&self, _: &MailSettings, _: Option<&dyn RequestInfo>) -> EmailContext {
        EmailContext::new()
    }
}

/// Named context generators
///
/// ```rust
/// use mailwright::config::MailSettings;
/// use mailwright::email::{ContextGenerators, EmailContext};
///
/// let mut generators = ContextGenerators::new();
/// generators.register("static", |_: &MailSettings, _: Option<&dyn mailwright::email::RequestInfo>| {
///     EmailContext::new().with("campaign", "spring")
/// });
///
/// let generator = generators.resolve("static");
/// let context = generator.generate(&MailSettings::default(), None);
/// assert_eq!(context.get_str("campaign"), Some("spring"));
/// ```
#[derive(Clone)]
pub struct ContextGenerators {
    generators: HashMap<String, Arc<dyn ContextGenerator>>,
}

impl ContextGenerators {
    /// Registry holding only the `default` generator
    #[must_use]
    pub fn new() -> Self {
        let mut generators = Self {
            generators: HashMap::new(),
        };
        generators.register("default", DefaultContextGenerator);
        generators
    }

    /// Register a generator under `name`, replacing any previous one
    pub fn register(&mut self, name: impl Into<String>, generator: impl ContextGenerator + 'static) {
        self.generators.insert(name.into(), Arc::new(generator));
    }

    /// Resolve a generator by name
    ///
    /// Unknown and empty names yield [`EmptyContextGenerator`].
    #[must_use]
    pub fn resolve(&self, name: &str) -> Arc<dyn ContextGenerator> {
        if name.is_empty() {
            return Arc::new(EmptyContextGenerator);
        }

        self.generators.get(name).map_or_else(
            || {
                tracing::warn!(
                    generator = %name,
                    "context generator not registered, templates get an empty base context"
                );
                Arc::new(EmptyContextGenerator) as Arc<dyn ContextGenerator>
            },
            Arc::clone,
        )
    }

    /// Whether a generator is registered under `name`
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.generators.contains_key(name)
    }
}

impl Default for ContextGenerators {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextGenerators {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.generators.keys().collect();
        names.sort();
        f.debug_struct("ContextGenerators")
            .field("names", &names)
            .finish()
    }
}
