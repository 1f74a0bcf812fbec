//! Link and image target rewriting over markdown events.
//!
//! Every pass here is a pure `Event -> Event` function; anything that does
//! not match passes through untouched.

use pulldown_cmark::{CowStr, Event, Tag};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// How a link target is treated downstream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkKind {
    Internal,
    External,
    /// A YouTube watch or short link, with its video id
    YouTube(String),
}

/// Where rewritten asset images are served from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CdnConfig {
    #[serde(default)]
    pub enabled: bool,

    pub base_url: String,

    #[serde(default = "default_path_pattern")]
    pub path_pattern: String,
}

fn default_path_pattern() -> String {
    "{year}/{slug}/{filename}".to_string()
}

impl CdnConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            enabled: true,
            base_url: base_url.into(),
            path_pattern: default_path_pattern(),
        }
    }

    /// Join the base URL and the substituted path pattern with one `/`
    pub fn asset_url(&self, year: &str, slug: &str, filename: &str) -> String {
        let path = self
            .path_pattern
            .replace("{year}", year)
            .replace("{slug}", slug)
            .replace("{filename}", filename);
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

static CROSS_DOC_REGEX: OnceLock<Regex> = OnceLock::new();
static YOUTUBE_REGEX: OnceLock<Regex> = OnceLock::new();
static ASSET_REGEX: OnceLock<Regex> = OnceLock::new();

fn cross_doc_regex() -> &'static Regex {
    CROSS_DOC_REGEX.get_or_init(|| {
        Regex::new(r"^(?:\.\./)+(\d{4})/([^/#.?]+)(?:\.md)?/?(#.*)?$").unwrap()
    })
}

fn youtube_regex() -> &'static Regex {
    YOUTUBE_REGEX.get_or_init(|| {
        Regex::new(
            r"^(?:https?:)?//(?:www\.|m\.)?(?:youtube\.com/watch\?(?:[^#]*&)?v=|youtu\.be/)([A-Za-z0-9_-]{11})(?:[?&#/].*)?$",
        )
        .unwrap()
    })
}

fn asset_regex() -> &'static Regex {
    ASSET_REGEX.get_or_init(|| Regex::new(r"^\.\./\.\./assets/(\d{4})/([^/]+)/(.+)$").unwrap())
}

/// `http://`, `https://` and protocol-relative `//` targets
pub fn is_absolute(dest: &str) -> bool {
    let lower = dest.trim_start().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//")
}

pub fn youtube_video_id(dest: &str) -> Option<&str> {
    youtube_regex()
        .captures(dest.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

pub fn youtube_watch_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

pub fn classify_link(dest: &str) -> LinkKind {
    if let Some(id) = youtube_video_id(dest) {
        LinkKind::YouTube(id.to_string())
    } else if is_absolute(dest) {
        LinkKind::External
    } else {
        LinkKind::Internal
    }
}

/// Map a relative link to another post (`../2024/slug.md#part`) to its URL.
///
/// ```
/// use waypost_core::markdown::links::cross_document_target;
///
/// assert_eq!(cross_document_target("../2024/tokyo.md").as_deref(), Some("/2024/tokyo/"));
/// assert_eq!(cross_document_target("../2024/file.pdf"), None);
/// ```
pub fn cross_document_target(dest: &str) -> Option<String> {
    let caps = cross_doc_regex().captures(dest)?;
    let anchor = caps.get(3).map_or("", |m| m.as_str());
    Some(format!("/{}/{}/{}", &caps[1], &caps[2], anchor))
}

pub fn rewrite_cross_document(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = match cross_document_target(&dest_url) {
                Some(target) => CowStr::from(target),
                None => dest_url,
            };
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        other => other,
    }
}

/// Canonicalize YouTube targets so the embed post-process can recognize them.
///
/// Plain external links are left as-is here; their `rel`/`target` attributes
/// are added after HTML rendering.
pub fn mark_external(event: Event<'_>) -> Event<'_> {
    match event {
        Event::Start(Tag::Link {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = match classify_link(&dest_url) {
                LinkKind::YouTube(video) => CowStr::from(youtube_watch_url(&video)),
                LinkKind::External | LinkKind::Internal => dest_url,
            };
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        other => other,
    }
}

pub fn cdn_asset_target(dest: &str, cdn: &CdnConfig) -> Option<String> {
    let caps = asset_regex().captures(dest)?;
    Some(cdn.asset_url(&caps[1], &caps[2], &caps[3]))
}

pub fn rewrite_cdn_image<'a>(event: Event<'a>, cdn: &CdnConfig) -> Event<'a> {
    match event {
        Event::Start(Tag::Image {
            link_type,
            dest_url,
            title,
            id,
        }) => {
            let dest_url = match cdn_asset_target(&dest_url, cdn) {
                Some(target) => CowStr::from(target),
                None => dest_url,
            };
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            })
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cross_document_targets() {
        assert_eq!(
            cross_document_target("../2024/tokyo-food.md").as_deref(),
            Some("/2024/tokyo-food/")
        );
        assert_eq!(
            cross_document_target("../../2023/kyoto/").as_deref(),
            Some("/2023/kyoto/")
        );
        assert_eq!(
            cross_document_target("../2024/tokyo.md#ramen").as_deref(),
            Some("/2024/tokyo/#ramen")
        );
        assert_eq!(cross_document_target("../2024/file.pdf"), None);
        assert_eq!(cross_document_target("2024/tokyo.md"), None);
        assert_eq!(cross_document_target("../202/tokyo.md"), None);
    }

    #[test]
    fn test_classify_link() {
        assert_eq!(classify_link("https://example.com"), LinkKind::External);
        assert_eq!(classify_link("//cdn.example.com/x"), LinkKind::External);
        assert_eq!(classify_link("HTTP://EXAMPLE.COM"), LinkKind::External);
        assert_eq!(classify_link("/2024/post/"), LinkKind::Internal);
        assert_eq!(classify_link("mailto:me@example.com"), LinkKind::Internal);
        assert_eq!(
            classify_link("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            LinkKind::YouTube("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            classify_link("https://youtu.be/dQw4w9WgXcQ?t=42"),
            LinkKind::YouTube("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            classify_link("https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ"),
            LinkKind::YouTube("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            classify_link("https://www.youtube.com/channel/abc"),
            LinkKind::External
        );
    }

    #[test]
    fn test_mark_external_canonicalizes_youtube() {
        let event = Event::Start(Tag::Link {
            link_type: pulldown_cmark::LinkType::Inline,
            dest_url: "https://youtu.be/dQw4w9WgXcQ".into(),
            title: "".into(),
            id: "".into(),
        });
        match mark_external(event) {
            Event::Start(Tag::Link { dest_url, .. }) => {
                assert_eq!(&*dest_url, "https://www.youtube.com/watch?v=dQw4w9WgXcQ")
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn test_cdn_asset_target() {
        let cdn = CdnConfig::new("https://cdn.example.com/");
        assert_eq!(
            cdn_asset_target("../../assets/2024/tokyo/ramen.jpg", &cdn).as_deref(),
            Some("https://cdn.example.com/2024/tokyo/ramen.jpg")
        );
        assert_eq!(cdn_asset_target("./ramen.jpg", &cdn), None);
        assert_eq!(cdn_asset_target("../assets/2024/tokyo/ramen.jpg", &cdn), None);

        let custom = CdnConfig {
            enabled: true,
            base_url: "https://img.example.com".to_string(),
            path_pattern: "/blog/{year}-{slug}/{filename}".to_string(),
        };
        assert_eq!(
            cdn_asset_target("../../assets/2024/tokyo/a/b.png", &custom).as_deref(),
            Some("https://img.example.com/blog/2024-tokyo/a/b.png")
        );
    }

    #[test]
    fn test_other_events_pass_through() {
        let cdn = CdnConfig::new("https://cdn.example.com");
        let text = Event::Text("../../assets/2024/x/y.png".into());
        assert_eq!(rewrite_cdn_image(text.clone(), &cdn), text);
        assert_eq!(rewrite_cross_document(text.clone()), text);
        assert_eq!(mark_external(text.clone()), text);
    }
}
