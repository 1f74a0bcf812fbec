//! GitHub-style alert blockquotes (`> [!NOTE]`) rendered as callout boxes.

use pulldown_cmark::{BlockQuoteKind, CowStr, Event, Tag, TagEnd};

fn label(kind: BlockQuoteKind) -> (&'static str, &'static str) {
    match kind {
        BlockQuoteKind::Note => ("note", "Note"),
        BlockQuoteKind::Tip => ("tip", "Tip"),
        BlockQuoteKind::Important => ("important", "Important"),
        BlockQuoteKind::Warning => ("warning", "Warning"),
        BlockQuoteKind::Caution => ("caution", "Caution"),
    }
}

fn icon(kind: BlockQuoteKind) -> &'static str {
    match kind {
        BlockQuoteKind::Note => "\u{2139}",
        BlockQuoteKind::Tip => "\u{1F4A1}",
        BlockQuoteKind::Important => "\u{2757}",
        BlockQuoteKind::Warning => "\u{26A0}",
        BlockQuoteKind::Caution => "\u{1F6D1}",
    }
}

pub fn callout_open(kind: BlockQuoteKind) -> String {
    let (class, title) = label(kind);
    format!(
        "<div class=\"callout callout-{class}\">\n<p class=\"callout-title\"><span class=\"callout-icon\" aria-hidden=\"true\">{}</span>{title}</p>\n<div class=\"callout-body\">\n",
        icon(kind)
    )
}

pub fn render_callout(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Start(Tag::BlockQuote(Some(kind))) => Event::Html(CowStr::from(callout_open(kind))),
        Event::End(TagEnd::BlockQuote(Some(_))) => Event::Html(CowStr::Borrowed("</div>\n</div>\n")),
        other => other,
    }
}
