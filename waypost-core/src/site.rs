//! Site model: tag index and year archive built from parsed posts.

use crate::models::Post;
use crate::slug::tag_slug;
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("Failed to read tag descriptions {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid tag descriptions {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Tag descriptions keyed by lowercased tag name
pub type TagDescriptions = HashMap<String, String>;

/// Every post carrying one tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TagData {
    pub name: String,
    pub slug: String,
    pub count: usize,
    pub posts: Vec<Post>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The complete in-memory site handed to renderers
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Site {
    pub name: String,
    /// Newest first
    pub posts: Vec<Post>,
    pub tags: BTreeMap<String, TagData>,
    pub posts_by_year: BTreeMap<String, Vec<Post>>,
}

impl Site {
    /// Tags ordered by post count, most used first, then by name
    pub fn tags_by_count(&self) -> Vec<&TagData> {
        let mut tags: Vec<&TagData> = self.tags.values().collect();
        tags.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        tags
    }

    /// Years with posts, newest first
    pub fn years(&self) -> Vec<&str> {
        self.posts_by_year.keys().rev().map(String::as_str).collect()
    }
}

static IMG_SRC_REGEX: OnceLock<Regex> = OnceLock::new();

fn img_src_regex() -> &'static Regex {
    IMG_SRC_REGEX.get_or_init(|| Regex::new(r#"(?i)<img\b[^>]*?\bsrc\s*=\s*"([^"]*)""#).unwrap())
}

/// `src` of the first image in rendered HTML
pub fn first_image(html: &str) -> Option<String> {
    img_src_regex()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().replace("&amp;", "&"))
        .filter(|src| !src.is_empty())
}

/// Build the site model from posts already sorted newest first.
pub fn build_site(name: &str, posts: Vec<Post>, descriptions: &TagDescriptions) -> Site {
    let mut tags: BTreeMap<String, TagData> = BTreeMap::new();
    let mut posts_by_year: BTreeMap<String, Vec<Post>> = BTreeMap::new();
    let mut finished = Vec::with_capacity(posts.len());

    for mut post in posts {
        post.tag_slugs = post
            .tags
            .iter()
            .map(|tag| (tag.clone(), tag_slug(tag)))
            .collect();
        post.image = first_image(&post.html);

        for tag in &post.tags {
            let entry = tags.entry(tag.clone()).or_insert_with(|| TagData {
                name: tag.clone(),
                slug: tag_slug(tag),
                count: 0,
                posts: Vec::new(),
                description: descriptions.get(&tag.to_lowercase()).cloned(),
            });
            entry.count += 1;
            entry.posts.push(post.clone());
        }

        posts_by_year
            .entry(post.year().to_string())
            .or_default()
            .push(post.clone());
        finished.push(post);
    }

    info!(
        posts = finished.len(),
        tags = tags.len(),
        years = posts_by_year.len(),
        "built site model"
    );

    Site {
        name: name.to_string(),
        posts: finished,
        tags,
        posts_by_year,
    }
}

/// Load a YAML map of tag name to description; keys are lowercased.
pub fn load_tag_descriptions(path: &Path) -> Result<TagDescriptions, SiteError> {
    let text = fs::read_to_string(path).map_err(|source| SiteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_tag_descriptions(&text).map_err(|source| SiteError::Yaml {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_tag_descriptions(yaml: &str) -> Result<TagDescriptions, serde_yaml::Error> {
    if yaml.trim().is_empty() {
        return Ok(TagDescriptions::new());
    }
    let raw: HashMap<String, String> = serde_yaml::from_str(yaml)?;
    Ok(raw
        .into_iter()
        .map(|(tag, description)| (tag.to_lowercase(), description))
        .collect())
}
