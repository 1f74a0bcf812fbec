//! CLI command implementations.

pub mod build;
pub mod check;
pub mod init;

pub use build::{build_site, BuildOptions};
pub use check::check_site;
pub use init::init_project;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use waypost_core::{Aggregator, Config};

/// Load the config and set up an aggregator over its content directory.
pub(crate) fn load(config_path: &Path) -> Result<(Config, Aggregator)> {
    tracing::info!("Loading config from {:?}", config_path);
    let config = Config::from_file(config_path).context("Failed to load configuration")?;
    let ctx = config
        .render_context()
        .context("Invalid rendering configuration")?;
    let aggregator = Aggregator::new(config.content_dir(), Arc::new(ctx))
        .with_ignore_patterns(&config.ignore_patterns);
    Ok((config, aggregator))
}
