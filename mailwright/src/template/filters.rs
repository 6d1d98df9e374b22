//! Template filters and functions
//!
//! Registered on every environment built by [`super::environment`]:
//!
//! ```jinja
//! {{ prices | get_item("basic") }}
//! {{ "order-" | concat(order_id) }}
//! {{ invoice_number | zeropad(6) }}
//! {{ created_at | timestamp }}
//! <script>var enabled = {{ feature_on | jsbool }};</script>
//! {{ "HTTP_CACHE_CONTROL" | http_header }}
//! {{ support_phone | phonenumber }} {{ office_phone | phonenumber("GB") }}
//! {{ support_email | obfuscate_mailto("Contact us") }}
//! {{ lesscss("/static/css/email", "screen") }}
//! {{ loadjs("/static/js/app.js") }}
//! ```

use chrono::DateTime;
use minijinja::{Environment, Error, ErrorKind, State, Value};
use phonenumber::{country, Mode};

/// Register every filter and function on `env`
///
/// `phonenumber` without an explicit country uses `default_country`.
pub fn register(env: &mut Environment<'_>, default_country: &str) {
    let default_country = default_country.to_string();

    env.add_filter("get_item", get_item);
    env.add_filter("concat", concat);
    env.add_filter("zeropad", zeropad);
    env.add_filter("timestamp", timestamp);
    env.add_filter("jsbool", jsbool);
    env.add_filter("http_header", http_header);
    env.add_filter("phonenumber", move |value: &str, country: Option<String>| {
        format_phone_number(value, country.as_deref().unwrap_or(&default_country))
    });
    env.add_filter("obfuscate", obfuscate);
    env.add_filter("obfuscate_mailto", obfuscate_mailto);
    env.add_function("lesscss", lesscss);
    env.add_function("loadjs", loadjs);
}

/// Look up `key` in a map; undefined when absent
///
/// # Errors
///
/// Returns an error if `map` cannot be indexed.
pub fn get_item(map: &Value, key: &Value) -> Result<Value, Error> {
    map.get_item(key)
}

/// Concatenate the string forms of two values
#[must_use]
pub fn concat(value: &Value, arg: &Value) -> String {
    format!("{value}{arg}")
}

/// Left-pad with zeros to `num_digits`, keeping a leading sign in front
#[must_use]
pub fn zeropad(value: &Value, num_digits: usize) -> String {
    let digits = value.to_string();
    let (sign, rest) = match digits.strip_prefix(['-', '+']) {
        Some(rest) => (&digits[..1], rest),
        None => ("", digits.as_str()),
    };
    let width = num_digits.saturating_sub(sign.len());
    format!("{sign}{rest:0>width$}")
}

/// Format unix seconds as `YYYY-MM-DD HH:MM:SS` (UTC); empty for anything else
///
/// Fractional seconds are truncated.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn timestamp(value: Value) -> String {
    let secs = i64::try_from(value.clone()).ok().or_else(|| {
        f64::try_from(value)
            .ok()
            .filter(|secs| secs.is_finite())
            .map(|secs| secs.trunc() as i64)
    });

    secs.and_then(|secs| DateTime::from_timestamp(secs, 0))
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default()
}

/// Render truthiness as a JavaScript boolean literal
#[must_use]
pub fn jsbool(value: &Value) -> String {
    let literal = if value.is_true() { "true" } else { "false" };
    literal.to_string()
}

/// Convert a CGI-style header key to its wire form
///
/// `HTTP_ACCEPT` becomes `Accept`, `HTTP_CACHE_CONTROL` becomes `Cache-Control`.
#[must_use]
pub fn http_header(value: &str) -> String {
    value
        .split('_')
        .skip(1)
        .map(title_case)
        .collect::<Vec<_>>()
        .join("-")
}

fn title_case(part: &str) -> String {
    let mut chars = part.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Format a phone number the way it is dialled within `country`
///
/// `country` is an ISO 3166 alpha-2 code; numbers with a `+` prefix keep
/// their own region.
///
/// # Errors
///
/// Returns an error for an unknown country code or an unparseable number.
pub fn format_phone_number(value: &str, country: &str) -> Result<String, Error> {
    let id = country
        .to_ascii_uppercase()
        .parse::<country::Id>()
        .map_err(|_| {
            Error::new(
                ErrorKind::InvalidOperation,
                format!("unknown country code `{country}`"),
            )
        })?;

    let number = phonenumber::parse(Some(id), value).map_err(|e| {
        Error::new(
            ErrorKind::InvalidOperation,
            format!("cannot parse phone number `{value}`: {e}"),
        )
    })?;

    Ok(number.format().mode(Mode::National).to_string())
}

/// Encode every character as a decimal HTML entity
#[must_use]
pub fn obfuscate_string(value: &str) -> String {
    value.chars().map(|c| format!("&#{};", u32::from(c))).collect()
}

/// [`obfuscate_string`] as a safe template value
#[must_use]
pub fn obfuscate(value: &str) -> Value {
    Value::from_safe_string(obfuscate_string(value))
}

/// Obfuscated `mailto:` anchor; the link text defaults to the address
#[must_use]
pub fn obfuscate_mailto(value: &str, text: Option<String>) -> Value {
    let email = obfuscate_string(value);
    let link_text = text.map_or_else(|| email.clone(), |text| escape_html(&text));

    Value::from_safe_string(format!(
        r#"<a href="{}{email}">{link_text}</a>"#,
        obfuscate_string("mailto:")
    ))
}

/// Stylesheet link tag; `css_rel` and `css_ext` come from the render context
#[must_use]
pub fn lesscss(state: &State, css_file_path_base: &str, media: Option<String>) -> Value {
    let css_rel = lookup_string(state, "css_rel").unwrap_or_else(|| "stylesheet".to_string());
    let css_ext = lookup_string(state, "css_ext").unwrap_or_else(|| "css".to_string());
    let media = media
        .filter(|m| !m.is_empty())
        .map(|m| format!(r#"media="{m}" "#))
        .unwrap_or_default();

    Value::from_safe_string(format!(
        r#"<link type="text/css" rel="{css_rel}" href="{css_file_path_base}.{css_ext}" {media}/>"#
    ))
}

/// Script tag, cache-busted with `asset_version` from the render context
#[must_use]
pub fn loadjs(state: &State, js_file_path: &str) -> Value {
    let version = state
        .lookup("asset_version")
        .filter(Value::is_true)
        .map(|v| format!("?v={v}"))
        .unwrap_or_default();

    Value::from_safe_string(format!(
        r#"<script type="text/javascript" src="{js_file_path}{version}"></script>"#
    ))
}

fn lookup_string(state: &State, name: &str) -> Option<String> {
    state
        .lookup(name)
        .filter(|v| !v.is_undefined() && !v.is_none())
        .map(|v| v.to_string())
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    fn env() -> Environment<'static> {
        let mut env = Environment::new();
        register(&mut env, "US");
        env
    }

    fn render(source: &str, ctx: Value) -> String {
        env().render_str(source, ctx).unwrap()
    }

    #[test]
    fn test_get_item() {
        let out = render(
            "{{ prices | get_item('basic') }}|{% if prices | get_item('gold') is undefined %}missing{% endif %}",
            context! { prices => context! { basic => 10 } },
        );
        assert_eq!(out, "10|missing");
    }

    #[test]
    fn test_concat() {
        assert_eq!(render("{{ 'order-' | concat(42) }}", context! {}), "order-42");
    }

    #[test]
    fn test_zeropad() {
        assert_eq!(zeropad(&Value::from(42), 5), "00042");
        assert_eq!(zeropad(&Value::from(-5), 3), "-05");
        assert_eq!(zeropad(&Value::from("12345"), 3), "12345");
    }

    #[test]
    fn test_timestamp() {
        assert_eq!(timestamp(Value::from(0)), "1970-01-01 00:00:00");
        assert_eq!(timestamp(Value::from(1_700_000_000)), "2023-11-14 22:13:20");
        assert_eq!(timestamp(Value::from(1_700_000_000.75)), "2023-11-14 22:13:20");
        assert_eq!(timestamp(Value::from(f64::NAN)), "");
        assert_eq!(timestamp(Value::from("yesterday")), "");
    }

    #[test]
    fn test_jsbool() {
        assert_eq!(render("{{ 1 | jsbool }}/{{ '' | jsbool }}", context! {}), "true/false");
    }

    #[test]
    fn test_http_header() {
        assert_eq!(http_header("HTTP_ACCEPT"), "Accept");
        assert_eq!(http_header("HTTP_CACHE_CONTROL"), "Cache-Control");
        assert_eq!(http_header("HTTP"), "");
    }

    #[test]
    fn test_phonenumber() {
        assert_eq!(format_phone_number("6502530000", "US").unwrap(), "(650) 253-0000");
        assert_eq!(format_phone_number("+44 20 7946 0958", "gb").unwrap(), "020 7946 0958");
        assert!(format_phone_number("not a phone", "US").is_err());
        assert!(format_phone_number("6502530000", "ZZ").is_err());
    }

    #[test]
    fn test_phonenumber_filter_country() {
        assert_eq!(
            render("{{ '650-253-0000' | phonenumber }}", context! {}),
            "(650) 253-0000"
        );
        assert_eq!(
            render("{{ '020 7946 0958' | phonenumber('GB') }}", context! {}),
            "020 7946 0958"
        );
    }

    #[test]
    fn test_phonenumber_failure_is_render_error() {
        let err = env()
            .render_str("{{ 'call me' | phonenumber }}", context! {})
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidOperation);
    }

    #[test]
    fn test_obfuscate() {
        assert_eq!(obfuscate_string("a@b"), "&#97;&#64;&#98;");
        // safe output is not escaped again in an auto-escaping template
        let out = env()
            .template_from_named_str("t.html", "{{ 'a' | obfuscate }}")
            .unwrap()
            .render(context! {})
            .unwrap();
        assert_eq!(out, "&#97;");
    }

    #[test]
    fn test_obfuscate_mailto() {
        let anchor = obfuscate_mailto("a@b", Some("Mail <us>".to_string()));
        let html = anchor.to_string();
        assert!(html.starts_with(r#"<a href="&#109;&#97;&#105;&#108;&#116;&#111;&#58;&#97;&#64;&#98;">"#));
        assert!(html.ends_with("Mail &lt;us&gt;</a>"));

        let plain = obfuscate_mailto("a@b", None).to_string();
        assert!(plain.ends_with(">&#97;&#64;&#98;</a>"));
    }

    #[test]
    fn test_lesscss() {
        assert_eq!(
            render("{{ lesscss('/css/mail') }}", context! {}),
            r#"<link type="text/css" rel="stylesheet" href="/css/mail.css" />"#
        );
        assert_eq!(
            render(
                "{{ lesscss('/css/mail', 'print') }}",
                context! { css_rel => "stylesheet/less", css_ext => "less" }
            ),
            r#"<link type="text/css" rel="stylesheet/less" href="/css/mail.less" media="print" />"#
        );
        assert_eq!(
            render("{{ lesscss('/css/mail', '') }}", context! {}),
            r#"<link type="text/css" rel="stylesheet" href="/css/mail.css" />"#
        );
    }

    #[test]
    fn test_loadjs() {
        assert_eq!(
            render("{{ loadjs('/js/app.js') }}", context! {}),
            r#"<script type="text/javascript" src="/js/app.js"></script>"#
        );
        assert_eq!(
            render("{{ loadjs('/js/app.js') }}", context! { asset_version => "7" }),
            r#"<script type="text/javascript" src="/js/app.js?v=7"></script>"#
        );
    }
}
