//! Check content health and report every problem at once.

use super::load;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::Path;
use waypost_core::report::{self, DEFAULT_PER_KIND_CAP};
use waypost_core::ParseError;

#[derive(Serialize)]
struct CheckSummary<'a> {
    posts: usize,
    errors: usize,
    diagnostics: &'a [ParseError],
}

/// Parse everything without the fatal policy and print a grouped report.
pub async fn check_site(config_path: &Path, json: bool) -> Result<()> {
    let (_config, aggregator) = load(config_path)?;
    let collected = aggregator
        .collect()
        .await
        .context("Failed to scan content")?;

    let summary = CheckSummary {
        posts: collected.posts.len(),
        errors: collected.errors.len(),
        diagnostics: &collected.errors,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Check complete: {} posts, {} errors",
            summary.posts, summary.errors
        );
        for (kind, count) in report::counts(&collected.errors) {
            if count > 0 {
                println!("  {}: {}", kind, count);
            }
        }
        print!("{}", report::summarize(&collected.errors, DEFAULT_PER_KIND_CAP));
    }

    if !collected.errors.is_empty() {
        bail!("{} content error(s) found", collected.errors.len());
    }
    Ok(())
}
