//! Plain-text summaries taken from the first paragraph of a post.

use pulldown_cmark::{Event, Parser, Tag, TagEnd};

pub const DEFAULT_EXCERPT_LENGTH: usize = 160;

/// Plain text of the first non-empty paragraph, cut to `max_chars`.
///
/// Headings, code blocks and raw HTML are never paragraphs here; image alt
/// text is skipped and inline markup is flattened.
pub fn extract_excerpt(markdown: &str, max_chars: usize) -> String {
    let mut text = String::new();
    let mut in_paragraph = false;
    let mut image_depth = 0usize;

    for event in Parser::new(markdown) {
        match event {
            Event::Start(Tag::Paragraph) => {
                in_paragraph = true;
                text.clear();
            }
            Event::End(TagEnd::Paragraph) => {
                in_paragraph = false;
                if !text.trim().is_empty() {
                    break;
                }
            }
            Event::Start(Tag::Image { .. }) => image_depth += 1,
            Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
            Event::Text(t) | Event::Code(t) if in_paragraph && image_depth == 0 => {
                text.push_str(&t);
            }
            Event::SoftBreak | Event::HardBreak if in_paragraph => text.push(' '),
            _ => {}
        }
    }

    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_at_word_boundary(&collapsed, max_chars)
}

fn truncate_at_word_boundary(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut = text
        .char_indices()
        .nth(max_chars)
        .map_or(text.len(), |(idx, _)| idx);
    let truncated = &text[..cut];

    match truncated.rfind(' ') {
        Some(space) if space > 0 => format!("{}...", truncated[..space].trim_end()),
        _ => format!("{truncated}..."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_paragraph_only() {
        let md = "# Title\n\nFirst *paragraph* with `code`.\n\nSecond paragraph.";
        assert_eq!(extract_excerpt(md, 160), "First paragraph with code.");
    }

    #[test]
    fn test_skips_code_and_html_blocks() {
        let md = "```\ncode\n```\n\n<div>html</div>\n\nReal text\nacross lines.";
        assert_eq!(extract_excerpt(md, 160), "Real text across lines.");
    }

    #[test]
    fn test_skips_image_only_paragraph() {
        let md = "![alt text](a.png)\n\nAfter the image.";
        assert_eq!(extract_excerpt(md, 160), "After the image.");
    }

    #[test]
    fn test_truncates_on_word_boundary() {
        let md = "The quick brown fox jumps over the lazy dog";
        assert_eq!(extract_excerpt(md, 18), "The quick brown...");
        assert_eq!(extract_excerpt(md, 100), md);
    }

    #[test]
    fn test_multibyte_text() {
        assert_eq!(truncate_at_word_boundary("東京の ラーメン 屋さん", 6), "東京の...");
        assert_eq!(truncate_at_word_boundary("ラーメンラーメン", 4), "ラーメン...");
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(extract_excerpt("", 160), "");
        assert_eq!(extract_excerpt("## Only a heading", 160), "");
    }
}
