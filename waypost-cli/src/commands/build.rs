//! Build command implementation.

use super::load;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use waypost_core::{
    build_site as build_model, load_tag_descriptions, pages, PaginationData, Site,
    TagDescriptions,
};

pub struct BuildOptions {
    pub strict: bool,
    pub json: bool,
    pub output: Option<PathBuf>,
}

/// JSON handed to an external renderer
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SiteExport<'a> {
    site: &'a Site,
    /// Navigation for the paginated home listing
    pages: Vec<PaginationData>,
}

/// Parse all posts, apply the fatal policy and build the site model
pub async fn build_site(config_path: &Path, opts: BuildOptions) -> Result<()> {
    let (config, aggregator) = load(config_path)?;
    let strict = opts.strict || config.strict;

    tracing::info!("Building site: {}", config.site.name);

    let posts = aggregator
        .parse_all(strict)
        .await
        .context("Failed to parse content")?;

    let descriptions = match config.tag_descriptions_path() {
        Some(path) => load_tag_descriptions(&path).context("Failed to load tag descriptions")?,
        None => TagDescriptions::new(),
    };
    let site = build_model(&config.site.name, posts, &descriptions);

    if !opts.json {
        println!(
            "✓ Built {}: {} posts, {} tags, {} years",
            site.name,
            site.posts.len(),
            site.tags.len(),
            site.posts_by_year.len()
        );
        return Ok(());
    }

    let export = SiteExport {
        site: &site,
        pages: pages(&site.posts, config.page_size, "/")
            .into_iter()
            .map(|(data, _)| data)
            .collect(),
    };
    let payload = serde_json::to_string_pretty(&export)?;

    match opts.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {:?}", parent))?;
            }
            fs::write(&path, payload).with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Wrote site model to {:?}", path);
        }
        None => println!("{}", payload),
    }

    Ok(())
}
