//! Allowlist HTML sanitization.

use ammonia::Builder;
use regex::Regex;
use std::sync::OnceLock;

const EXTRA_TAGS: &[&str] = &[
    "img", "h1", "h2", "h3", "h4", "h5", "h6", "span", "div", "figure", "figcaption", "iframe",
    "video", "source", "svg", "path", "mark", "del", "ins", "sup", "sub",
];

static SCRIPT_SCHEME_REGEX: OnceLock<Regex> = OnceLock::new();
static HANDLER_TOKEN_REGEX: OnceLock<Regex> = OnceLock::new();

fn script_scheme_regex() -> &'static Regex {
    SCRIPT_SCHEME_REGEX.get_or_init(|| Regex::new(r"(?i)(?:java|vb)script:").unwrap())
}

fn handler_token_regex() -> &'static Regex {
    HANDLER_TOKEN_REGEX.get_or_init(|| Regex::new(r"(?i)\b(on(?:error|click|load))\s*=").unwrap())
}

fn policy() -> Builder<'static> {
    let mut builder = Builder::default();
    builder
        .add_tags(EXTRA_TAGS)
        .add_generic_attributes(&["class"])
        .add_tag_attributes("a", &["href", "name", "target", "rel", "title"])
        .add_tag_attributes("img", &["src", "alt", "title", "loading", "width", "height"])
        .add_tag_attributes(
            "iframe",
            &["src", "frameborder", "allow", "allowfullscreen", "loading", "title", "width", "height"],
        )
        .add_tag_attributes("video", &["src", "controls", "poster", "preload", "width", "height"])
        .add_tag_attributes("source", &["src", "type"])
        .add_tag_attributes("span", &["aria-hidden"])
        // footnote definitions are the targets of `href="#n"` references
        .add_tag_attributes("div", &["id"])
        .add_tag_attributes("svg", &["viewBox", "width", "height", "fill", "aria-hidden"])
        .add_tag_attributes("path", &["d", "fill", "fill-rule", "clip-rule"])
        // rel is set by the external-link pass; ammonia must not overwrite it
        .link_rel(None);
    for heading in ["h1", "h2", "h3", "h4", "h5", "h6"] {
        builder.add_tag_attributes(heading, &["id"]);
    }
    builder
}

/// Remove every `javascript:`/`vbscript:` occurrence, including ones that a
/// single pass would splice back together.
pub fn strip_script_schemes(html: &str) -> String {
    let mut cleaned = html.to_string();
    while script_scheme_regex().is_match(&cleaned) {
        cleaned = script_scheme_regex().replace_all(&cleaned, "").into_owned();
    }
    cleaned
}

/// Encode the `=` after handler names left in text, e.g. inside `<code>`.
///
/// Attributes are already gone at this point; `&#61;` displays the same.
pub fn neutralize_handler_tokens(html: &str) -> String {
    handler_token_regex().replace_all(html, "$1&#61;").into_owned()
}

/// Clean rendered HTML down to the allowed tags and attributes.
pub fn sanitize(html: &str) -> String {
    let cleaned = policy().clean(html).to_string();
    neutralize_handler_tokens(&strip_script_schemes(&cleaned))
}
