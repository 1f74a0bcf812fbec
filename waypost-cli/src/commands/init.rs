//! Init command implementation.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"site:
  name: My Blog

paths:
  content: content
  # tag_descriptions: tag-descriptions.yml

# Fixed offset applied to dates written without one
timezone: "+00:00"
excerpt_length: 160
page_size: 10
strict: false

# Hosts whose external links keep search-engine credit
nofollow_exceptions: []

# Regexes matched against paths relative to the content directory
ignore_patterns: []

# cdn:
#   enabled: true
#   base_url: https://cdn.example.com
#   path_pattern: "{year}/{slug}/{filename}"
"#;

/// Initialize a new waypost project
pub fn init_project(path: Option<&Path>) -> Result<()> {
    let root = path.unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(root).with_context(|| format!("Failed to create {:?}", root))?;

    write_config(root)?;
    scaffold_content(root)?;

    println!("✓ waypost initialized in {:?}", root);
    println!("  - Edit waypost.yml to customize site metadata");
    println!("  - Write posts in content/<year>/");
    Ok(())
}

fn write_config(root: &Path) -> Result<()> {
    let config_path = root.join("waypost.yml");
    if config_path.exists() {
        println!("waypost.yml already exists at {:?}", config_path);
        return Ok(());
    }

    fs::write(&config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {:?}", config_path))?;
    println!("Created {:?}", config_path);
    Ok(())
}

fn scaffold_content(root: &Path) -> Result<()> {
    let year_dir = root.join("content").join("2025");
    fs::create_dir_all(&year_dir).with_context(|| format!("Failed to create {:?}", year_dir))?;

    // Starter post
    let sample = year_dir.join("welcome.md");
    if !sample.exists() {
        fs::write(&sample, SAMPLE_POST).with_context(|| format!("Failed to write {:?}", sample))?;
        println!("Created {:?}", sample);
    }

    Ok(())
}

const SAMPLE_POST: &str = r#"---
title: Welcome to waypost
date: 2025-01-01
tags: [intro]
---

This is your first post. Edit `waypost.yml` to update site metadata, then run:

```bash
waypost check
waypost build --json
```

> [!TIP]
> Posts live in a directory named after their year and are served at `/{year}/{slug}/`.
"#;
