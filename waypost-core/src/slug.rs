//! Slug generation and document naming.

use std::path::{Component, Path};

/// Convert a tag name to a URL-safe slug
///
/// Rules:
/// - Lowercase
/// - Every run of non-alphanumeric characters becomes a single hyphen
/// - Trim leading/trailing hyphens
///
/// # Examples
///
/// ```
/// use waypost_core::tag_slug;
///
/// assert_eq!(tag_slug("Hello World"), "hello-world");
/// assert_eq!(tag_slug("Rust & Safety"), "rust-safety");
/// assert_eq!(tag_slug("C++ Programming"), "c-programming");
/// ```
pub fn tag_slug(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut pending_hyphen = false;

    for c in input.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Name a document is known by before its front-matter is read.
///
/// Bundled posts (`post/index.md`, `post/README.md`) take the name of their
/// directory; everything else uses the file stem.
pub fn document_stem(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    if file_name.eq_ignore_ascii_case("index.md") || file_name.eq_ignore_ascii_case("readme.md") {
        let parent = path.parent()?.file_name()?.to_str()?;
        return Some(parent.to_string());
    }
    path.file_stem()?.to_str().map(str::to_string)
}

/// Nearest ancestor directory of `path` (below `root`) named like a year.
pub fn year_directory(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .parent()?
        .components()
        .rev()
        .filter_map(|component| match component {
            Component::Normal(name) => name.to_str(),
            _ => None,
        })
        .find(|name| name.len() == 4 && name.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
}
