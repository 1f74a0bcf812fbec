//! # waypost-core
//!
//! Core library for the waypost static blog generator.
//!
//! This crate turns a directory of markdown posts with YAML frontmatter into
//! a validated, sanitized site model: posts, a tag index, year archives and
//! pagination metadata, ready for an external template renderer.

pub mod aggregate;
pub mod config;
pub mod date;
pub mod extract;
pub mod frontmatter;
pub mod markdown;
pub mod models;
pub mod paginate;
pub mod report;
pub mod site;
pub mod slug;
pub mod validate;

pub use aggregate::{collect, parse_all, AggregateError, Aggregator, Collected};
pub use config::{Config, ConfigError};
pub use extract::{parse_document, ParseOutcome, RenderContext};
pub use markdown::{render, CdnConfig, NofollowExceptions, TransformConfig};
pub use models::{Business, Frontmatter, ParseError, ParseErrorKind, PlaceType, Post};
pub use paginate::{page_url, pages, paginate, slice, PaginationData};
pub use site::{build_site, load_tag_descriptions, Site, SiteError, TagData, TagDescriptions};
pub use slug::tag_slug;
