//! Markdown rendering pipeline: token passes, HTML post-processing and
//! sanitization.

pub mod callouts;
pub mod excerpt;
pub mod highlight;
pub mod links;
pub mod postprocess;
pub mod sanitize;

use crate::slug::tag_slug;
use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;

pub use excerpt::{extract_excerpt, DEFAULT_EXCERPT_LENGTH};
pub use highlight::HighlightTransformer;
pub use links::{CdnConfig, LinkKind};
pub use postprocess::NofollowExceptions;

/// Per-run rendering settings, shared read-only by every document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformConfig {
    pub cdn: Option<CdnConfig>,
    pub nofollow_exceptions: NofollowExceptions,
}

impl TransformConfig {
    fn active_cdn(&self) -> Option<&CdnConfig> {
        self.cdn.as_ref().filter(|cdn| cdn.enabled)
    }
}

/// Markdown processor with the blog's extensions
pub struct MarkdownProcessor {
    options: Options,
}

impl MarkdownProcessor {
    pub fn new() -> Self {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_FOOTNOTES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        // GFM alerts (`> [!NOTE]`) become callouts
        options.insert(Options::ENABLE_GFM);

        Self { options }
    }

    /// Convert markdown to sanitized HTML
    pub fn render(&self, markdown: &str, config: &TransformConfig) -> String {
        let events: Vec<Event> = Parser::new_ext(markdown, self.options).collect();

        let events = HighlightTransformer::new().transform(events);
        let events = attach_heading_ids(events);

        let cdn = config.active_cdn();
        let events = events
            .into_iter()
            .map(links::rewrite_cross_document)
            .map(links::mark_external)
            .map(|event| match cdn {
                Some(cdn) => links::rewrite_cdn_image(event, cdn),
                None => event,
            })
            .map(callouts::render_callout);

        let mut html_output = String::new();
        html::push_html(&mut html_output, events);

        let html_output = postprocess::apply(&html_output, &config.nofollow_exceptions);
        sanitize::sanitize(&html_output)
    }
}

impl Default for MarkdownProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a post body with a fresh processor.
pub fn render(markdown: &str, config: &TransformConfig) -> String {
    MarkdownProcessor::new().render(markdown, config)
}

/// Give headings without an explicit `{#id}` a slug id, unique per document.
fn attach_heading_ids(mut events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut open: Option<(usize, String)> = None;

    for i in 0..events.len() {
        let closed = match &events[i] {
            Event::Start(Tag::Heading { id: None, .. }) => {
                open = Some((i, String::new()));
                None
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some((_, title)) = open.as_mut() {
                    title.push_str(text);
                }
                None
            }
            Event::End(TagEnd::Heading(_)) => open.take(),
            _ => None,
        };

        let Some((start, title)) = closed else {
            continue;
        };
        let base = tag_slug(&title);
        if base.is_empty() {
            continue;
        }
        let count = seen.entry(base.clone()).or_insert(0);
        let unique = if *count == 0 {
            base
        } else {
            format!("{}-{}", base, count)
        };
        *count += 1;
        if let Event::Start(Tag::Heading { id, .. }) = &mut events[start] {
            *id = Some(CowStr::from(unique));
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render_plain(markdown: &str) -> String {
        render(markdown, &TransformConfig::default())
    }

    #[test]
    fn test_basic_markdown() {
        let html = render_plain("# Hello World\n\nThis is a **test**.");
        assert!(html.contains("<h1 id=\"hello-world\">Hello World</h1>"));
        assert!(html.contains("<strong>test</strong>"));
    }

    #[test]
    fn test_duplicate_headings_get_unique_ids() {
        let html = render_plain("## Menu\n\n## Menu\n\n## Other {#custom}\n");
        assert!(html.contains("id=\"menu\""));
        assert!(html.contains("id=\"menu-1\""));
        assert!(html.contains("id=\"custom\""));
    }

    #[test]
    fn test_tables() {
        let md = r#"
| Header 1 | Header 2 |
|----------|----------|
| Cell 1   | Cell 2   |
"#;
        let html = render_plain(md);
        assert!(html.contains("<table>"));
        assert!(html.contains("<th>Header 1</th>"));
    }

    #[test]
    fn test_code_blocks() {
        let html = render_plain("```rust\nfn main() {}\n```");
        assert!(html.contains("<pre class=\"code\">"));
        assert!(html.contains("main"));
    }

    #[test]
    fn test_cross_document_link() {
        let html = render_plain("See [ramen](../2024/tokyo-ramen.md#shops).");
        assert!(html.contains("href=\"/2024/tokyo-ramen/#shops\""));
        assert!(!html.contains("target=\"_blank\""));
    }

    #[test]
    fn test_youtube_link_becomes_embed() {
        let html = render_plain("[Video](https://youtu.be/dQw4w9WgXcQ)");
        assert!(html.contains("class=\"video-embed\""));
        assert!(html.contains("/embed/dQw4w9WgXcQ"));
    }

    #[test]
    fn test_external_link_attributes() {
        let config = TransformConfig {
            cdn: None,
            nofollow_exceptions: NofollowExceptions::new(["github.com"]),
        };
        let html = render(
            "[a](https://example.com) [b](https://www.github.com/x) [c](/local/)",
            &config,
        );
        assert!(html.contains(
            "<a href=\"https://example.com\" rel=\"noopener noreferrer nofollow\" target=\"_blank\">a</a>"
        ));
        assert!(html.contains(
            "<a href=\"https://www.github.com/x\" rel=\"noopener noreferrer\" target=\"_blank\">b</a>"
        ));
        assert!(html.contains("<a href=\"/local/\">c</a>"));
    }

    #[test]
    fn test_cdn_rewrite_only_when_enabled() {
        let md = "![Ramen](../../assets/2024/tokyo/ramen.jpg)";

        let html = render_plain(md);
        assert!(html.contains("src=\"../../assets/2024/tokyo/ramen.jpg\""));

        let mut cdn = CdnConfig::new("https://cdn.example.com");
        let config = TransformConfig {
            cdn: Some(cdn.clone()),
            nofollow_exceptions: NofollowExceptions::default(),
        };
        let html = render(md, &config);
        assert!(html.contains("src=\"https://cdn.example.com/2024/tokyo/ramen.jpg\""));
        assert!(html.contains("loading=\"lazy\""));

        cdn.enabled = false;
        let config = TransformConfig {
            cdn: Some(cdn),
            nofollow_exceptions: NofollowExceptions::default(),
        };
        assert!(render(md, &config).contains("src=\"../../assets/2024/tokyo/ramen.jpg\""));
    }

    #[test]
    fn test_callout() {
        let html = render_plain("> [!TIP]\n> Go early.\n");
        assert!(html.contains("class=\"callout callout-tip\""));
        assert!(html.contains("Go early."));
    }

    #[test]
    fn test_xss_payloads_are_neutralized() {
        let payloads = [
            "<script>alert(1)</script>",
            "<img src=x onerror=alert(1)>",
            "<a href=\"javascript:alert(1)\">x</a>",
            "[x](javascript:alert(1))",
            "<iframe src=\"javascript:alert(1)\"></iframe>",
            "<svg onload=alert(1)><path d=\"M0\"/></svg>",
            "<a href=\"JaVaScRiPt:alert(1)\">y</a>",
            "<a href=\"vbscript:msgbox(1)\">z</a>",
            "<div onclick=\"alert(1)\">click</div>",
            "<style>body{}</style><object data=\"x\"></object>",
            "<embed src=\"javascript:alert(1)\">",
            "<embed type=\"image/svg+xml\" src=\"x.svg\"/>",
            "`onerror=alert(1)` and `<img onload=x>`",
        ];
        for payload in payloads {
            let html = render_plain(&format!("Intro\n\n{payload}\n\nOutro")).to_lowercase();
            for forbidden in [
                "<script",
                "onerror=",
                "onload=",
                "onclick=",
                "javascript:",
                "vbscript:",
                "<style",
                "<object",
                "<embed",
            ] {
                assert!(
                    !html.contains(forbidden),
                    "{forbidden} survived in {html} for {payload}"
                );
            }
        }
    }

    #[test]
    fn test_footnote_reference_matches_definition() {
        let html = render_plain("Claim[^src].\n\n[^src]: Source.\n");
        let href = regex::Regex::new(r##"href="#([^"]+)""##)
            .unwrap()
            .captures(&html)
            .map(|c| c[1].to_string())
            .expect("footnote reference link");
        assert!(
            html.contains(&format!(r#"id="{href}""#)),
            "no target for #{href} in {html}"
        );
        assert!(html.contains("footnote-definition"));
    }

    #[test]
    fn test_deterministic() {
        let md = "# T\n\n[a](https://example.com)\n\n```rust\nlet x = 1;\n```\n";
        let config = TransformConfig::default();
        assert_eq!(render(md, &config), render(md, &config));
    }
}
