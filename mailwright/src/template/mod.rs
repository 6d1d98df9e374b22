//! Template environment construction
//!
//! Email templates are plain minijinja files under the configured template
//! directory. Every environment built here has the [`filters`] registered.

pub mod filters;

use minijinja::Environment;

use crate::config::TemplateSettings;

fn with_filters(default_country: &str) -> Environment<'static> {
    let mut env = Environment::new();

    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    filters::register(&mut env, default_country);

    env
}

/// Environment without a loader, for templates added by hand
#[must_use]
pub fn bare_environment() -> Environment<'static> {
    with_filters(&TemplateSettings::default().default_country)
}

/// Environment loading templates from `settings.template_dir`
#[must_use]
pub fn environment(settings: &TemplateSettings) -> Environment<'static> {
    let mut env = with_filters(&settings.default_country);
    env.set_loader(minijinja::path_loader(settings.template_dir.clone()));
    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::{context, ErrorKind};
    use std::fs;
    use std::path::Path;

    fn settings(template_dir: &Path) -> TemplateSettings {
        TemplateSettings {
            template_dir: template_dir.to_path_buf(),
            ..TemplateSettings::default()
        }
    }

    #[test]
    fn test_loader_reads_template_dir() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("emails")).unwrap();
        fs::write(dir.path().join("emails/hello.txt"), "Hello {{ name }}").unwrap();

        let env = environment(&settings(dir.path()));
        let out = env
            .get_template("emails/hello.txt")
            .unwrap()
            .render(context! { name => "Ann" })
            .unwrap();

        assert_eq!(out, "Hello Ann");
    }

    #[test]
    fn test_missing_template_kind() {
        let dir = tempfile::tempdir().unwrap();
        let env = environment(&settings(dir.path()));

        let err = env.get_template("emails/nope.html").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TemplateNotFound);
    }

    #[test]
    fn test_filters_registered() {
        let env = bare_environment();
        let out = env.render_str("{{ 'HTTP_ACCEPT' | http_header }}", context! {}).unwrap();
        assert_eq!(out, "Accept");
    }

    #[test]
    fn test_default_country_from_settings() {
        let dir = tempfile::tempdir().unwrap();
        let env = environment(&TemplateSettings {
            default_country: "GB".to_string(),
            ..settings(dir.path())
        });

        let out = env
            .render_str("{{ '020 7946 0958' | phonenumber }}", context! {})
            .unwrap();
        assert_eq!(out, "020 7946 0958");
    }
}
