//! Conversions between HTML, markdown and plain text bodies

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Options, Parser};
use regex::{Captures, Regex};

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("Invalid regex")
}

static INVISIBLE: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?is)<head\b.*?</head\s*>|<style\b.*?</style\s*>|<script\b.*?</script\s*>|<!--.*?-->")
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| regex(r"[ \t\r\n]+"));
static HEADING: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<h([1-6])\b[^>]*>(.*?)</h[1-6]\s*>"));
static BREAK: Lazy<Regex> = Lazy::new(|| regex(r"(?i)<br\s*/?>"));
static STRONG: Lazy<Regex> =
    Lazy::new(|| regex(r"(?is)<(?:strong|b)\b[^>]*>(.*?)</(?:strong|b)\s*>"));
static EMPHASIS: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<(?:em|i)\b[^>]*>(.*?)</(?:em|i)\s*>"));
static LINK: Lazy<Regex> = Lazy::new(|| {
    regex(r#"(?is)<a\b[^>]*?\bhref\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a\s*>"#)
});
static IMAGE: Lazy<Regex> =
    Lazy::new(|| regex(r#"(?is)<img\b[^>]*?\balt\s*=\s*["']([^"']+)["'][^>]*>"#));
static IMAGE_SRC: Lazy<Regex> =
    Lazy::new(|| regex(r#"(?is)<img\b[^>]*?\bsrc\s*=\s*["']([^"']*)["'][^>]*>"#));
static PRE: Lazy<Regex> = Lazy::new(|| regex(r"(?is)<pre\b[^>]*>(.*?)</pre\s*>"));
static PRE_SLOT: Lazy<Regex> = Lazy::new(|| regex(r"\x00([0-9]+)\x00"));
static LIST_ITEM: Lazy<Regex> = Lazy::new(|| regex(r"(?i)<li\b[^>]*>"));
static RULE: Lazy<Regex> = Lazy::new(|| regex(r"(?i)<hr\b[^>]*>"));
static BLOCK: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)</?(?:p|pre|div|ul|ol|table|tr|blockquote|section|article|header|footer|body|html|center)\b[^>]*>")
});
static CELL: Lazy<Regex> = Lazy::new(|| regex(r"(?i)</?t[dh]\b[^>]*>"));
static TAG: Lazy<Regex> = Lazy::new(|| regex(r"<[^>]*>"));
static NUMERIC_ENTITY: Lazy<Regex> = Lazy::new(|| regex(r"&#(?:[xX]([0-9a-fA-F]+)|([0-9]+));"));
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| regex(r"\n{3,}"));

/// Degrade HTML to a markdown-flavoured plain-text approximation
///
/// Headings become `#` lines, bold and italic become `**` and `*`, links
/// become `[text](href)`, images become their alt text or `![](src)`, list
/// items become `* ` lines, and every other tag is dropped. `<pre>` blocks
/// keep their line structure.
///
/// Markup with no visible text falls back to the trimmed HTML itself, so the
/// result is only empty when `html` is blank.
///
/// ```rust
/// use mailwright::email::html_to_text;
///
/// let text = html_to_text("<h1>Hi Ann</h1><p>Welcome to <b>Example</b>.</p>");
/// assert_eq!(text, "# Hi Ann\n\nWelcome to **Example**.");
/// ```
#[must_use]
pub fn html_to_text(html: &str) -> String {
    let visible = INVISIBLE.replace_all(html, "");

    let mut preformatted = Vec::new();
    let text = PRE.replace_all(&visible, |caps: &Captures| {
        let body = decode_entities(&TAG.replace_all(&caps[1], ""));
        preformatted.push(body.trim_matches(|c: char| c == '\r' || c == '\n').to_string());
        format!("<pre>\x00{}\x00</pre>", preformatted.len() - 1)
    });

    let text = WHITESPACE.replace_all(&text, " ");

    let text = HEADING.replace_all(&text, |caps: &Captures| {
        let level = caps[1].parse::<usize>().unwrap_or(1);
        format!("\n\n{} {}\n\n", "#".repeat(level), caps[2].trim())
    });
    let text = BREAK.replace_all(&text, "\n");
    let text = STRONG.replace_all(&text, "**$1**");
    let text = EMPHASIS.replace_all(&text, "*$1*");
    let text = LINK.replace_all(&text, |caps: &Captures| {
        let href = &caps[1];
        let label = TAG.replace_all(&caps[2], "");
        let label = label.trim();
        if label.is_empty() || label == href {
            href.to_string()
        } else {
            format!("[{label}]({href})")
        }
    });
    let text = IMAGE.replace_all(&text, "$1");
    let text = IMAGE_SRC.replace_all(&text, "![]($1)");
    let text = LIST_ITEM.replace_all(&text, "\n* ");
    let text = RULE.replace_all(&text, "\n\n---\n\n");
    let text = BLOCK.replace_all(&text, "\n\n");
    let text = CELL.replace_all(&text, " ");
    let text = TAG.replace_all(&text, "");

    let text = decode_entities(&text);

    let lines: Vec<&str> = text.lines().map(str::trim).collect();
    let text = lines.join("\n");

    let text = BLANK_LINES.replace_all(&text, "\n\n");
    let text = PRE_SLOT.replace_all(text.trim(), |caps: &Captures| {
        caps[1]
            .parse::<usize>()
            .ok()
            .and_then(|i| preformatted.get(i))
            .cloned()
            .unwrap_or_default()
    });
    let text = text.trim();

    if text.is_empty() {
        visible_text(&visible).unwrap_or_else(|| html.trim().to_string())
    } else {
        text.to_string()
    }
}

/// Tag-stripped text of `html`, `None` when nothing visible remains
fn visible_text(html: &str) -> Option<String> {
    let text = decode_entities(&TAG.replace_all(html, " "));
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn decode_entities(text: &str) -> String {
    let text = NUMERIC_ENTITY.replace_all(text, |caps: &Captures| {
        let code = caps.get(1).map_or_else(
            || caps[2].parse::<u32>().ok(),
            |hex| u32::from_str_radix(hex.as_str(), 16).ok(),
        );
        code.and_then(char::from_u32)
            .map_or_else(|| caps[0].to_string(), String::from)
    });

    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Render markdown to HTML (CommonMark plus tables and strikethrough)
///
/// ```rust
/// use mailwright::email::markdown_to_html;
///
/// assert_eq!(markdown_to_html("# Hi"), "<h1>Hi</h1>\n");
/// ```
#[must_use]
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(
        markdown,
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH,
    );

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        assert_eq!(html_to_text("<h1>Title</h1>"), "# Title");
        assert_eq!(html_to_text("<h3 class=\"x\">Sub</h3>"), "### Sub");
    }

    #[test]
    fn test_emphasis_and_links() {
        let html = r#"<p>Read <em>this</em> and <strong>that</strong> at <a href="https://example.com/docs">the docs</a>.</p>"#;
        assert_eq!(
            html_to_text(html),
            "Read *this* and **that** at [the docs](https://example.com/docs)."
        );
    }

    #[test]
    fn test_bare_link_keeps_href() {
        let html = r#"<a href="https://example.com">https://example.com</a>"#;
        assert_eq!(html_to_text(html), "https://example.com");
    }

    #[test]
    fn test_lists_and_breaks() {
        let html = "<p>Items:<br>below</p><ul>\n  <li>one</li>\n  <li>two</li>\n</ul>";
        assert_eq!(html_to_text(html), "Items:\nbelow\n\n* one\n* two");
    }

    #[test]
    fn test_invisible_content_dropped() {
        let html = "<html><head><title>x</title><style>p { color: red; }</style></head>\
                    <body><!-- tracking --><p>Body</p><script>alert(1)</script></body></html>";
        assert_eq!(html_to_text(html), "Body");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(
            html_to_text("<p>Tom &amp; Jerry&nbsp;&lt;3 &#169; &#x2014;</p>"),
            "Tom & Jerry <3 \u{a9} \u{2014}"
        );
    }

    #[test]
    fn test_no_markup_left() {
        let html = "<div><table><tr><td><span style=\"x\">Hi Ann</span></td></tr></table></div>";
        let text = html_to_text(html);
        assert_eq!(text, "Hi Ann");
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_plain_text_untouched() {
        assert_eq!(html_to_text("just words"), "just words");
        assert_eq!(html_to_text(""), "");
    }

    #[test]
    fn test_images() {
        assert_eq!(
            html_to_text(r#"<p><img src="/logo.png" alt="Example logo"></p>"#),
            "Example logo"
        );
        assert_eq!(
            html_to_text(r#"<p><img src="https://example.com/banner.png"></p>"#),
            "![](https://example.com/banner.png)"
        );
        assert_eq!(
            html_to_text(r#"<img alt="" src="/spacer.gif" />"#),
            "![](/spacer.gif)"
        );
    }

    #[test]
    fn test_markup_only_html_is_never_blank() {
        assert_eq!(html_to_text("<div><br></div>"), "<div><br></div>");
        assert_eq!(html_to_text("   "), "");
    }

    #[test]
    fn test_preformatted_keeps_lines() {
        let html = "<p>Run:</p><pre class=\"code\">cargo build\n  --release\n\n<b>done</b> &amp; ok\n</pre><p>Then  wait.</p>";
        assert_eq!(
            html_to_text(html),
            "Run:\n\ncargo build\n  --release\n\ndone & ok\n\nThen wait."
        );
    }

    #[test]
    fn test_markdown_to_html() {
        let html = markdown_to_html("# Hi\n\nSome *text* with a [link](https://example.com).");
        assert!(html.contains("<h1>Hi</h1>"));
        assert!(html.contains("<em>text</em>"));
        assert!(html.contains(r#"<a href="https://example.com">link</a>"#));
    }
}
