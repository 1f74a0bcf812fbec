//! Frontmatter splitting and parsing from markdown files.

use crate::models::Frontmatter;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrontmatterError {
    #[error("Missing `---` frontmatter fences")]
    MissingFence,

    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Frontmatter must be a YAML mapping")]
    NotAMapping,
}

static FRONTMATTER_REGEX: OnceLock<Regex> = OnceLock::new();

fn frontmatter_regex() -> &'static Regex {
    FRONTMATTER_REGEX.get_or_init(|| {
        Regex::new(r"(?s)\A\x{FEFF}?---[ \t]*\r?\n(?:(.*?)\r?\n)?---[ \t]*(?:\r?\n|\z)(.*)\z")
            .unwrap()
    })
}

/// Split a document into its YAML block and markdown body.
///
/// # Example
///
/// ```
/// use waypost_core::frontmatter::split_frontmatter;
///
/// let (yaml, body) = split_frontmatter("---\ntitle: Hi\n---\n# Body\n").unwrap();
/// assert_eq!(yaml, "title: Hi");
/// assert_eq!(body, "# Body\n");
/// ```
pub fn split_frontmatter(content: &str) -> Result<(&str, &str), FrontmatterError> {
    let captures = frontmatter_regex()
        .captures(content)
        .ok_or(FrontmatterError::MissingFence)?;
    let yaml = captures.get(1).map_or("", |m| m.as_str());
    let body = captures.get(2).map_or("", |m| m.as_str());
    Ok((yaml, body))
}

/// A document's frontmatter before any schema is applied.
#[derive(Debug)]
pub struct RawFrontmatter<'a> {
    pub yaml: &'a str,
    pub data: Mapping,
    pub body: &'a str,
}

impl RawFrontmatter<'_> {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Deserialize into the typed frontmatter.
    ///
    /// Reads from the YAML text rather than `data` so plain scalars such as
    /// `title: 2024` still land in string fields.
    pub fn typed(&self) -> Result<Frontmatter, serde_yaml::Error> {
        serde_yaml::from_str(self.yaml)
    }
}

/// Parse frontmatter from markdown content into an untyped mapping.
///
/// An empty block yields an empty mapping so required-field checks can
/// report what is missing.
pub fn parse_frontmatter(content: &str) -> Result<RawFrontmatter<'_>, FrontmatterError> {
    let (yaml, body) = split_frontmatter(content)?;

    if yaml.trim().is_empty() {
        return Ok(RawFrontmatter {
            yaml,
            data: Mapping::new(),
            body,
        });
    }

    let data = match serde_yaml::from_str::<Value>(yaml)? {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        _ => return Err(FrontmatterError::NotAMapping),
    };

    Ok(RawFrontmatter { yaml, data, body })
}

/// Text form of a scalar YAML value, `None` for null and collections.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}
