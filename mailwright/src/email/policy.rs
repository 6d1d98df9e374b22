//! Environment-specific send policy

use crate::config::MailSettings;

/// Adjust subject and failure policy for the configured environment
///
/// In development the subject is tagged `[<symbolic_site_name>-dev]` and
/// delivery failures are always swallowed. Production passes both through.
///
/// ```rust
/// use mailwright::config::{Environment, MailSettings};
/// use mailwright::email::apply_environment_policy;
///
/// let settings = MailSettings {
///     environment: Environment::Development,
///     ..MailSettings::default()
/// };
///
/// let (subject, fail_silently) = apply_environment_policy(&settings, "Welcome", false);
/// assert_eq!(subject, "[example-dev] Welcome");
/// assert!(fail_silently);
/// ```
#[must_use]
pub fn apply_environment_policy(
    settings: &MailSettings,
    subject: &str,
    fail_silently: bool,
) -> (String, bool) {
    if settings.environment.is_development() {
        (
            format!("[{}-dev] {subject}", settings.symbolic_site_name),
            true,
        )
    } else {
        (subject.to_string(), fail_silently)
    }
}
