//! Directory aggregation: discover posts, parse them concurrently, and decide
//! which problems abort the build.

use crate::extract::{parse_document, ParseOutcome, RenderContext};
use crate::models::{ParseError, ParseErrorKind, Post};
use crate::report::{self, DEFAULT_PER_KIND_CAP};
use crate::slug::{document_stem, year_directory};
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Content directory not found: {}", .0.display())]
    MissingContentDir(PathBuf),

    #[error("Failed to scan content directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Parser task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{}\n{report}", fatal_headline(.validation, .strict))]
    Fatal {
        validation: usize,
        strict: usize,
        report: String,
    },
}

fn fatal_headline(validation: &usize, strict: &usize) -> String {
    match (*validation, *strict) {
        (v, 0) => format!("{} validation error(s)", v),
        (0, s) => format!("{} error(s) in strict mode", s),
        (v, s) => format!("{} validation error(s), {} error(s) in strict mode", v, s),
    }
}

/// Everything found in a content directory, before the fatal policy.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    /// Successfully parsed posts, newest first
    pub posts: Vec<Post>,
    /// Layout conflicts, per-file failures and URL collisions, in that order
    pub errors: Vec<ParseError>,
}

/// Walks a content directory and parses every post in it.
pub struct Aggregator {
    content_dir: PathBuf,
    ctx: Arc<RenderContext>,
    ignore_patterns: Vec<Regex>,
}

impl Aggregator {
    pub fn new(content_dir: impl Into<PathBuf>, ctx: Arc<RenderContext>) -> Self {
        Self {
            content_dir: content_dir.into(),
            ctx,
            ignore_patterns: Vec::new(),
        }
    }

    /// Skip files whose path relative to the content directory matches any
    /// pattern. Invalid patterns are logged and ignored.
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore_patterns = patterns
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(re) => Some(re),
                Err(err) => {
                    warn!("Invalid ignore pattern '{}': {}", pattern, err);
                    None
                }
            })
            .collect();
        self
    }

    /// Discover all markdown files, sorted by file name within each directory
    pub fn discover_markdown_files(&self) -> Result<Vec<PathBuf>, AggregateError> {
        if !self.content_dir.is_dir() {
            return Err(AggregateError::MissingContentDir(self.content_dir.clone()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.content_dir)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(e))
        {
            let entry = entry?;
            if !entry.file_type().is_file() || entry.path().extension() != Some(OsStr::new("md")) {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(&self.content_dir)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .to_string();
            if self.ignore_patterns.iter().any(|re| re.is_match(&rel)) {
                debug!("Ignoring {} due to ignore_patterns", rel);
                continue;
            }

            files.push(entry.into_path());
        }

        Ok(files)
    }

    /// Parse everything and return posts and errors without judging them.
    pub async fn collect(&self) -> Result<Collected, AggregateError> {
        let files = self.discover_markdown_files()?;
        info!(count = files.len(), "found content files");

        let layout = layout_conflicts(&self.content_dir, &files);
        let mut errors: Vec<ParseError> = layout
            .iter()
            .map(|(url, paths)| conflict_error(url, paths))
            .collect();
        let reported: BTreeSet<PathBuf> = layout.into_values().flatten().collect();

        let mut tasks = JoinSet::new();
        for (index, path) in files.into_iter().enumerate() {
            let ctx = Arc::clone(&self.ctx);
            tasks.spawn_blocking(move || (index, parse_document(&path, &ctx)));
        }

        let mut outcomes = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            outcomes.push(joined?);
        }
        outcomes.sort_by_key(|(index, _)| *index);

        let mut posts = Vec::new();
        for (_, outcome) in outcomes {
            match outcome {
                ParseOutcome::Parsed(post) => posts.push(post),
                ParseOutcome::Failed(err) => errors.push(err),
            }
        }

        errors.extend(detect_url_conflicts(&posts, &reported));
        sort_newest_first(&mut posts);

        info!(posts = posts.len(), errors = errors.len(), "parsed content");
        Ok(Collected { posts, errors })
    }

    /// Parse everything and apply the fatal policy.
    pub async fn parse_all(&self, strict: bool) -> Result<Vec<Post>, AggregateError> {
        let Collected { posts, errors } = self.collect().await?;
        // Files behind non-fatal errors never produced a post
        enforce_policy(&errors, strict)?;
        info!(count = posts.len(), "collected posts");
        Ok(posts)
    }
}

/// Parse every post under `content_dir` and apply the fatal policy.
pub async fn parse_all(
    content_dir: &Path,
    strict: bool,
    ctx: Arc<RenderContext>,
) -> Result<Vec<Post>, AggregateError> {
    Aggregator::new(content_dir, ctx).parse_all(strict).await
}

/// Parse every post under `content_dir`, returning posts and errors as found.
pub async fn collect(
    content_dir: &Path,
    ctx: Arc<RenderContext>,
) -> Result<Collected, AggregateError> {
    Aggregator::new(content_dir, ctx).collect().await
}

/// Validation errors always abort; other errors abort only in strict mode
/// and are otherwise logged.
pub fn enforce_policy(errors: &[ParseError], strict: bool) -> Result<(), AggregateError> {
    if errors.is_empty() {
        return Ok(());
    }

    let validation = errors
        .iter()
        .filter(|e| e.kind == ParseErrorKind::Validation)
        .count();
    let others = errors.len() - validation;
    let summary = report::summarize(errors, DEFAULT_PER_KIND_CAP);

    if validation > 0 || strict {
        error!("Content errors:\n{}", summary);
        return Err(AggregateError::Fatal {
            validation,
            strict: if strict { others } else { 0 },
            report: summary,
        });
    }

    warn!("Skipping {} file(s) with errors:\n{}", others, summary);
    Ok(())
}

/// Files that would publish under the same year and slug, keyed by the URL
/// they would share.
///
/// Only files below a four-digit year directory are grouped; anything else is
/// caught by [`detect_url_conflicts`] once dates are known.
fn layout_conflicts(root: &Path, files: &[PathBuf]) -> BTreeMap<String, Vec<PathBuf>> {
    let mut groups: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    for file in files {
        if let (Some(year), Some(stem)) = (year_directory(file, root), document_stem(file)) {
            groups
                .entry(format!("/{}/{}/", year, stem))
                .or_default()
                .push(file.clone());
        }
    }
    groups.retain(|_, paths| paths.len() > 1);
    groups
}

/// Posts whose derived URLs collide, e.g. through an explicit `slug`.
///
/// Groups made up only of files in `reported` were already flagged by the
/// layout check and are skipped.
pub fn detect_url_conflicts(posts: &[Post], reported: &BTreeSet<PathBuf>) -> Vec<ParseError> {
    let mut groups: BTreeMap<&str, Vec<PathBuf>> = BTreeMap::new();
    for post in posts {
        groups
            .entry(post.url.as_str())
            .or_default()
            .push(post.source.clone());
    }

    groups
        .into_iter()
        .filter(|(_, paths)| paths.len() > 1)
        .filter(|(_, paths)| !paths.iter().all(|p| reported.contains(p)))
        .map(|(url, paths)| conflict_error(url, &paths))
        .collect()
}

fn conflict_error(url: &str, paths: &[PathBuf]) -> ParseError {
    let listed: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    ParseError::validation(
        &paths[0],
        format!("Slug conflict: {} is produced by {}", url, listed.join(" and ")),
    )
    .with_suggestion("Keep only one of these files, or give one of them a different `slug`")
}

/// Newest first; posts with equal dates keep their discovery order.
pub fn sort_newest_first(posts: &mut [Post]) {
    posts.sort_by(|a, b| b.published.cmp(&a.published));
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    fn write(dir: &Path, rel: &str, contents: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn post(title: &str, date: &str) -> String {
        format!("---\ntitle: {title}\ndate: {date}\n---\nBody of {title}.\n")
    }

    fn site() -> TempDir {
        let dir = tempdir().unwrap();
        write(dir.path(), "2024/older.md", &post("Older", "2024-03-01"));
        write(dir.path(), "2025/newer.md", &post("Newer", "2025-06-01"));
        write(dir.path(), "2025/b-tie.md", &post("Tie B", "2025-01-01"));
        write(dir.path(), "2025/a-tie.md", &post("Tie A", "2025-01-01"));
        write(dir.path(), ".drafts/hidden.md", &post("Hidden", "2025-01-01"));
        write(dir.path(), "2025/notes.txt", "not markdown");
        dir
    }

    fn ctx() -> Arc<RenderContext> {
        Arc::new(RenderContext::default())
    }

    #[tokio::test]
    async fn test_parse_all_sorts_newest_first_with_stable_ties() {
        let dir = site();
        let posts = parse_all(dir.path(), true, ctx()).await.unwrap();
        let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Newer", "Tie A", "Tie B", "Older"]);
    }

    #[tokio::test]
    async fn test_runs_are_deterministic() {
        let dir = site();
        let first = parse_all(dir.path(), false, ctx()).await.unwrap();
        let second = parse_all(dir.path(), false, ctx()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_content_dir_is_fatal() {
        let dir = tempdir().unwrap();
        let result = parse_all(&dir.path().join("nope"), false, ctx()).await;
        assert!(matches!(result, Err(AggregateError::MissingContentDir(_))));
    }

    #[tokio::test]
    async fn test_non_validation_errors_skipped_unless_strict() {
        let dir = site();
        write(dir.path(), "2025/broken.md", "---\ntitle: [unclosed\n---\n");

        let posts = parse_all(dir.path(), false, ctx()).await.unwrap();
        assert_eq!(posts.len(), 4);

        let err = parse_all(dir.path(), true, ctx()).await.unwrap_err();
        match err {
            AggregateError::Fatal { validation, strict, report } => {
                assert_eq!(validation, 0);
                assert_eq!(strict, 1);
                assert!(report.contains("broken.md"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_validation_errors_always_fatal() {
        let dir = site();
        write(
            dir.path(),
            "2025/bad-tags.md",
            "---\ntitle: Bad\ndate: 2025-01-01\ntags: [new york]\n---\n",
        );
        let err = parse_all(dir.path(), false, ctx()).await.unwrap_err();
        assert!(err.to_string().starts_with("1 validation error(s)"));
        assert!(err.to_string().contains("new york"));
    }

    #[tokio::test]
    async fn test_layout_conflict_names_both_files() {
        let dir = tempdir().unwrap();
        write(dir.path(), "2025/post.md", &post("Flat", "2025-01-01"));
        write(dir.path(), "2025/post/README.md", &post("Bundle", "2025-01-02"));

        let err = parse_all(dir.path(), false, ctx()).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("2025/post.md"), "{message}");
        assert!(message.contains("2025/post/README.md"), "{message}");
        assert!(message.starts_with("1 validation error(s)"), "{message}");
    }

    #[tokio::test]
    async fn test_layout_conflict_reported_once() {
        let dir = tempdir().unwrap();
        write(dir.path(), "2025/post.md", &post("Flat", "2025-01-01"));
        write(dir.path(), "2025/post/README.md", &post("Bundle", "2025-01-02"));

        let collected = collect(dir.path(), ctx()).await.unwrap();
        assert_eq!(collected.posts.len(), 2);
        assert_eq!(collected.errors.len(), 1);
        assert!(collected.errors[0].message.contains("/2025/post/"));
    }

    #[test]
    fn test_url_conflict_not_fully_reported_still_flagged() {
        let dir = tempdir().unwrap();
        write(dir.path(), "2025/post.md", &post("Flat", "2025-01-01"));
        write(dir.path(), "2025/post/README.md", &post("Bundle", "2025-01-02"));
        write(dir.path(), "2025/other.md", "---\ntitle: Other\ndate: 2025-03-01\nslug: post\n---\n");

        let ctx = RenderContext::default();
        let posts: Vec<Post> = ["2025/post.md", "2025/post/README.md", "2025/other.md"]
            .iter()
            .filter_map(|rel| parse_document(&dir.path().join(rel), &ctx).into_result().ok())
            .collect();
        let reported: BTreeSet<PathBuf> = [
            dir.path().join("2025/post.md"),
            dir.path().join("2025/post/README.md"),
        ]
        .into_iter()
        .collect();

        let errors = detect_url_conflicts(&posts, &reported);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("other.md"));
    }

    #[tokio::test]
    async fn test_url_conflict_from_slug_field() {
        let dir = tempdir().unwrap();
        write(dir.path(), "2025/one.md", "---\ntitle: One\ndate: 2025-01-01\nslug: same\n---\n");
        write(dir.path(), "2025/two.md", "---\ntitle: Two\ndate: 2025-02-01\nslug: same\n---\n");

        let collected = collect(dir.path(), ctx()).await.unwrap();
        assert_eq!(collected.posts.len(), 2);
        assert_eq!(collected.errors.len(), 1);
        assert!(collected.errors[0].message.contains("/2025/same/"));
    }

    #[tokio::test]
    async fn test_ignore_patterns() {
        let dir = site();
        let aggregator =
            Aggregator::new(dir.path(), ctx()).with_ignore_patterns(&["^2024/".to_string()]);
        let files = aggregator.discover_markdown_files().unwrap();
        assert_eq!(files.len(), 3);
        assert!(files
            .iter()
            .all(|f| !f.strip_prefix(dir.path()).unwrap().starts_with("2024")));
    }

    #[test]
    fn test_discovery_skips_hidden_and_non_markdown() {
        let dir = site();
        let files = Aggregator::new(dir.path(), ctx()).discover_markdown_files().unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|f| f.strip_prefix(dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["2024/older.md", "2025/a-tie.md", "2025/b-tie.md", "2025/newer.md"]);
    }

    #[test]
    fn test_fatal_headline() {
        assert_eq!(fatal_headline(&3, &0), "3 validation error(s)");
        assert_eq!(fatal_headline(&0, &2), "2 error(s) in strict mode");
    }
}
