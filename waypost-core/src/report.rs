//! Human-readable summaries of collected parse errors.

use crate::models::{ParseError, ParseErrorKind};
use std::collections::BTreeMap;
use std::fmt::Write;

pub const DEFAULT_PER_KIND_CAP: usize = 5;

/// Group errors by kind in reporting order, keeping encounter order within a kind.
pub fn group_by_kind(errors: &[ParseError]) -> BTreeMap<ParseErrorKind, Vec<&ParseError>> {
    let mut groups: BTreeMap<ParseErrorKind, Vec<&ParseError>> = BTreeMap::new();
    for error in errors {
        groups.entry(error.kind).or_default().push(error);
    }
    groups
}

/// Render a grouped report showing at most `per_kind_cap` entries per kind.
pub fn summarize(errors: &[ParseError], per_kind_cap: usize) -> String {
    let mut out = String::new();

    for (kind, group) in group_by_kind(errors) {
        let _ = writeln!(out, "{} ({}):", kind, group.len());
        for error in group.iter().take(per_kind_cap) {
            let _ = writeln!(out, "  {}: {}", error.file.display(), error.message);
            if let Some(suggestion) = &error.suggestion {
                let _ = writeln!(out, "    → {}", suggestion);
            }
        }
        if group.len() > per_kind_cap {
            let _ = writeln!(out, "  ... and {} more", group.len() - per_kind_cap);
        }
    }

    out
}

/// Count of errors per kind, every kind present (zero when absent).
pub fn counts(errors: &[ParseError]) -> Vec<(ParseErrorKind, usize)> {
    ParseErrorKind::ALL
        .iter()
        .map(|kind| (*kind, errors.iter().filter(|e| e.kind == *kind).count()))
        .collect()
}
