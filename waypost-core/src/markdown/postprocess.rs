//! String passes over rendered HTML, applied before sanitization.

use regex::{Captures, Regex};
use std::collections::BTreeSet;
use std::sync::OnceLock;

/// Domains whose external links keep their ranking signal (no `nofollow`).
///
/// Entries are compared case-insensitively with a leading `www.` removed.
/// Only the exact host matches; subdomains are not exempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NofollowExceptions {
    domains: BTreeSet<String>,
}

impl NofollowExceptions {
    pub fn new<I, S>(domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            domains: domains
                .into_iter()
                .map(|d| normalize_host(d.as_ref()))
                .filter(|d| !d.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, host: &str) -> bool {
        self.domains.contains(&normalize_host(host))
    }
}

fn normalize_host(host: &str) -> String {
    let host = host.trim().to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

static YOUTUBE_ANCHOR_REGEX: OnceLock<Regex> = OnceLock::new();
static IMG_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static ANCHOR_TAG_REGEX: OnceLock<Regex> = OnceLock::new();
static HREF_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
static REL_TARGET_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
static LOADING_ATTR_REGEX: OnceLock<Regex> = OnceLock::new();
static HOST_REGEX: OnceLock<Regex> = OnceLock::new();

/// A whole `<a ...>...</a>` element pointing at a YouTube watch or short link.
fn youtube_anchor_regex() -> &'static Regex {
    YOUTUBE_ANCHOR_REGEX.get_or_init(|| {
        Regex::new(
            r#"(?is)<a\s[^>]*?href\s*=\s*["'](?:https?:)?//(?:www\.|m\.)?(?:youtube\.com/watch\?(?:[^"'#]*?&(?:amp;)?)?v=|youtu\.be/)([A-Za-z0-9_-]{11})[^"']*["'][^>]*>.*?</a>"#,
        )
        .unwrap()
    })
}

/// An opening `<img>` tag; group 1 is the attribute text.
fn img_tag_regex() -> &'static Regex {
    IMG_TAG_REGEX.get_or_init(|| Regex::new(r"(?i)<img\b([^>]*?)(\s*/?)>").unwrap())
}

/// An opening `<a>` tag; group 1 is the attribute text.
fn anchor_tag_regex() -> &'static Regex {
    ANCHOR_TAG_REGEX.get_or_init(|| Regex::new(r"(?i)<a\b([^>]*)>").unwrap())
}

fn href_attr_regex() -> &'static Regex {
    HREF_ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\bhref\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
    })
}

fn rel_target_attr_regex() -> &'static Regex {
    REL_TARGET_ATTR_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)\s+(?:rel|target)\s*=\s*(?:"[^"]*"|'[^']*'|[^\s"'>]+)"#).unwrap()
    })
}

fn loading_attr_regex() -> &'static Regex {
    LOADING_ATTR_REGEX.get_or_init(|| Regex::new(r"(?i)\sloading\s*=").unwrap())
}

fn host_regex() -> &'static Regex {
    HOST_REGEX.get_or_init(|| Regex::new(r"(?i)^(?:https?:)?//(?:[^@/?#]*@)?([^/:?#]+)").unwrap())
}

/// Run the post-render passes in their fixed order.
pub fn apply(html: &str, exceptions: &NofollowExceptions) -> String {
    let html = embed_youtube(html);
    let html = lazy_load_images(&html);
    external_link_attrs(&html, exceptions)
}

pub fn youtube_embed_html(id: &str) -> String {
    format!(
        "<div class=\"video-embed\"><iframe src=\"https://www.youtube.com/embed/{id}\" title=\"YouTube video\" frameborder=\"0\" allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture\" allowfullscreen loading=\"lazy\"></iframe></div>"
    )
}

/// Replace YouTube anchors with an embedded player.
pub fn embed_youtube(html: &str) -> String {
    youtube_anchor_regex()
        .replace_all(html, |caps: &Captures| youtube_embed_html(&caps[1]))
        .into_owned()
}

/// Add `loading="lazy"` to images that do not choose a loading mode.
pub fn lazy_load_images(html: &str) -> String {
    img_tag_regex()
        .replace_all(html, |caps: &Captures| {
            let attrs = &caps[1];
            if loading_attr_regex().is_match(attrs) {
                caps[0].to_string()
            } else {
                format!("<img{} loading=\"lazy\"{}>", attrs, &caps[2])
            }
        })
        .into_owned()
}

/// Host of an absolute URL, lowercased with `www.` removed.
pub fn link_host(url: &str) -> Option<String> {
    host_regex()
        .captures(url.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| normalize_host(m.as_str()))
}

/// Open external links in a new tab without leaking the opener.
pub fn external_link_attrs(html: &str, exceptions: &NofollowExceptions) -> String {
    anchor_tag_regex()
        .replace_all(html, |caps: &Captures| {
            let attrs = &caps[1];
            let Some(href) = href_attr_regex().captures(attrs).and_then(|h| {
                h.get(1)
                    .or_else(|| h.get(2))
                    .or_else(|| h.get(3))
                    .map(|m| m.as_str().to_string())
            }) else {
                return caps[0].to_string();
            };
            if !super::links::is_absolute(&href) {
                return caps[0].to_string();
            }

            let follow = link_host(&href).is_some_and(|host| exceptions.contains(&host));
            let rel = if follow {
                "noopener noreferrer"
            } else {
                "noopener noreferrer nofollow"
            };
            let attrs = rel_target_attr_regex().replace_all(attrs, "");
            format!("<a{} rel=\"{}\" target=\"_blank\">", attrs, rel)
        })
        .into_owned()
}
