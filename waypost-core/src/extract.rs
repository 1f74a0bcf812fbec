//! Turn one markdown file into a [`Post`] or a categorized [`ParseError`].

use crate::date::{normalize_date, ACCEPTED_DATE_FORMATS};
use crate::frontmatter::{parse_frontmatter, scalar_text, FrontmatterError, RawFrontmatter};
use crate::markdown::{extract_excerpt, MarkdownProcessor, TransformConfig, DEFAULT_EXCERPT_LENGTH};
use crate::models::{post_url, ParseError, ParseErrorKind, Post};
use crate::slug::document_stem;
use crate::validate::{check_deprecated_location_field, validate_business_location, validate_tags};
use chrono::{Datelike, FixedOffset, Offset, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;

const YAML_SUGGESTION: &str =
    "Check the frontmatter between the `---` fences; quote titles and descriptions that contain colons, e.g. `title: \"Tokyo: a guide\"`";

/// Settings shared read-only by every extraction in a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub transform: TransformConfig,
    pub timezone: FixedOffset,
    pub excerpt_length: usize,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self {
            transform: TransformConfig::default(),
            timezone: Utc.fix(),
            excerpt_length: DEFAULT_EXCERPT_LENGTH,
        }
    }
}

/// Result of parsing one document.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(Post),
    Failed(ParseError),
}

impl ParseOutcome {
    pub fn post(&self) -> Option<&Post> {
        match self {
            ParseOutcome::Parsed(post) => Some(post),
            ParseOutcome::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ParseError> {
        match self {
            ParseOutcome::Parsed(_) => None,
            ParseOutcome::Failed(error) => Some(error),
        }
    }

    pub fn into_result(self) -> Result<Post, ParseError> {
        match self {
            ParseOutcome::Parsed(post) => Ok(post),
            ParseOutcome::Failed(error) => Err(error),
        }
    }
}

impl From<Result<Post, ParseError>> for ParseOutcome {
    fn from(result: Result<Post, ParseError>) -> Self {
        match result {
            Ok(post) => ParseOutcome::Parsed(post),
            Err(error) => ParseOutcome::Failed(error),
        }
    }
}

/// Read, validate and render a single markdown file.
pub fn parse_document(path: &Path, ctx: &RenderContext) -> ParseOutcome {
    debug!(path = %path.display(), "parsing document");
    let result = fs::read_to_string(path)
        .map_err(|e| {
            ParseError::new(path, ParseErrorKind::FileNotFound, format!("Cannot read file: {}", e))
                .with_suggestion("Check that the file exists and is valid UTF-8")
        })
        .and_then(|text| parse_text(path, &text, ctx));
    ParseOutcome::from(result)
}

/// Parse already-loaded document text; `path` names the source in errors.
pub fn parse_text(path: &Path, text: &str, ctx: &RenderContext) -> Result<Post, ParseError> {
    let raw = parse_frontmatter(text).map_err(|e| frontmatter_error(path, e))?;

    require_fields(&raw, path)?;

    if let Some(err) = check_deprecated_location_field(&raw.data, path) {
        return Err(err);
    }
    if let Some(err) = raw.get("tags").and_then(|tags| validate_tags(tags, path)) {
        return Err(err);
    }
    if let Some(err) = raw
        .get("business")
        .and_then(|business| validate_business_location(business, path))
    {
        return Err(err);
    }

    let fm = raw.typed().map_err(|e| {
        ParseError::new(
            path,
            ParseErrorKind::Unknown,
            format!("Frontmatter has an unexpected shape: {}", e),
        )
        .with_suggestion("Check field types: `tags` is a list of strings, `title` and `date` are text")
    })?;

    let published = normalize_date(&fm.date, ctx.timezone).ok_or_else(|| {
        ParseError::validation(path, format!("Unrecognized date `{}`", fm.date))
            .with_suggestion(format!("Write the date as {}", ACCEPTED_DATE_FORMATS))
    })?;

    let slug = match fm.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(slug) => slug.to_string(),
        None => document_stem(path).ok_or_else(|| {
            ParseError::new(path, ParseErrorKind::Unknown, "Cannot derive a slug from the file name")
                .with_suggestion("Add a `slug` field to the frontmatter")
        })?,
    };

    let body = raw.body;
    let excerpt = match fm.excerpt {
        Some(excerpt) if !excerpt.trim().is_empty() => excerpt,
        _ => extract_excerpt(body, ctx.excerpt_length),
    };
    let html = MarkdownProcessor::new().render(body, &ctx.transform);

    Ok(Post {
        url: post_url(published.year(), &slug),
        title: fm.title,
        date: published.to_rfc3339(),
        tags: fm.tags,
        tag_slugs: BTreeMap::new(),
        content: body.to_string(),
        slug,
        excerpt,
        html,
        image: None,
        category: fm.category,
        business: fm.business,
        source: path.to_path_buf(),
        published,
    })
}

fn frontmatter_error(path: &Path, error: FrontmatterError) -> ParseError {
    ParseError::new(path, ParseErrorKind::Yaml, error.to_string()).with_suggestion(YAML_SUGGESTION)
}

fn require_fields(raw: &RawFrontmatter<'_>, path: &Path) -> Result<(), ParseError> {
    let missing: Vec<&str> = ["title", "date"]
        .into_iter()
        .filter(|key| {
            raw.get(key)
                .and_then(scalar_text)
                .map_or(true, |value| value.trim().is_empty())
        })
        .collect();

    if missing.is_empty() {
        return Ok(());
    }
    Err(ParseError::new(
        path,
        ParseErrorKind::MissingField,
        format!("Missing required field(s): {}", missing.join(", ")),
    )
    .with_suggestion(format!("Add {} to the frontmatter", missing.join(" and "))))
}
