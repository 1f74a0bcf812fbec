//! Code syntax highlighting using syntect.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Tag, TagEnd};
use std::sync::OnceLock;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::{SyntaxReference, SyntaxSet};
use syntect::util::LinesWithEndings;

static SYNTAX_SET: OnceLock<SyntaxSet> = OnceLock::new();

fn syntax_set() -> &'static SyntaxSet {
    SYNTAX_SET.get_or_init(SyntaxSet::load_defaults_newlines)
}

/// Transformer for syntax highlighting fenced code blocks.
///
/// Output uses CSS classes (`<span class="source rust">`) rather than inline
/// styles, so the sanitizer never has to allow `style`.
pub struct HighlightTransformer;

impl HighlightTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Replace each fenced code block with a single highlighted HTML event
    pub fn transform<'a>(&self, events: Vec<Event<'a>>) -> Vec<Event<'a>> {
        let mut result = Vec::with_capacity(events.len());
        let mut code_lang: Option<String> = None;
        let mut code_content = String::new();

        for event in events {
            match event {
                Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(lang))) => {
                    code_lang = Some(lang.to_string());
                    code_content.clear();
                }
                Event::Text(text) if code_lang.is_some() => {
                    code_content.push_str(&text);
                }
                Event::End(TagEnd::CodeBlock) if code_lang.is_some() => {
                    let lang = code_lang.take().unwrap_or_default();
                    let highlighted = highlight_code(&code_content, &lang);
                    result.push(Event::Html(CowStr::from(highlighted)));
                }
                other => result.push(other),
            }
        }

        result
    }
}

impl Default for HighlightTransformer {
    fn default() -> Self {
        Self::new()
    }
}

/// First word of an info string: "rust,ignore" and "py title=x" name a language.
fn language_token(info: &str) -> &str {
    info.split(|c: char| c.is_whitespace() || c == ',' || c == '{')
        .next()
        .unwrap_or("")
}

fn find_syntax<'s>(ss: &'s SyntaxSet, lang: &str) -> &'s SyntaxReference {
    if lang.is_empty() {
        return ss.find_syntax_plain_text();
    }
    ss.find_syntax_by_token(lang)
        .or_else(|| ss.find_syntax_by_extension(lang))
        .unwrap_or_else(|| ss.find_syntax_plain_text())
}

pub fn highlight_code(code: &str, info: &str) -> String {
    let ss = syntax_set();
    let lang = language_token(info);
    let syntax = find_syntax(ss, lang);
    let class_lang = if lang.is_empty() {
        "plaintext".to_string()
    } else {
        html_escape(&lang.to_lowercase())
    };

    let body = classed_spans(code, ss, syntax).unwrap_or_else(|| html_escape(code));
    format!(
        "<pre class=\"code\"><code class=\"language-{}\">{}</code></pre>\n",
        class_lang, body
    )
}

fn classed_spans(code: &str, ss: &SyntaxSet, syntax: &SyntaxReference) -> Option<String> {
    let mut generator = ClassedHTMLGenerator::new_with_class_style(syntax, ss, ClassStyle::Spaced);
    for line in LinesWithEndings::from(code) {
        generator
            .parse_html_for_line_which_includes_newline(line)
            .ok()?;
    }
    Some(generator.finalize())
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
