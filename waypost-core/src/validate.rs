//! Schema checks run on raw front-matter before it is deserialized.
//!
//! Each validator returns the first problem it finds as a `validation`
//! [`ParseError`] carrying a suggestion for the author.

use crate::frontmatter::scalar_text;
use crate::models::{ParseError, PlaceType};
use serde_yaml::{Mapping, Value};
use std::path::Path;

const EXAMPLE_PLACE_TYPES: &str =
    "Restaurant, CafeOrCoffeeShop, BarOrPub, Bakery, Hotel, Museum, Park, TouristAttraction";

/// Validate the `business` front-matter field (one mapping or a list).
pub fn validate_business_location(business: &Value, file: &Path) -> Option<ParseError> {
    match business {
        Value::Sequence(entries) => entries.iter().enumerate().find_map(|(i, entry)| {
            validate_business_entry(entry, &format!("business[{i}]"), file)
        }),
        entry => validate_business_entry(entry, "business", file),
    }
}

fn validate_business_entry(entry: &Value, label: &str, file: &Path) -> Option<ParseError> {
    let Some(fields) = entry.as_mapping() else {
        return Some(
            ParseError::validation(file, format!("`{label}` must be a mapping of fields"))
                .with_suggestion("Write the business as `type`, `name`, `address`, `lat` and `lng` keys"),
        );
    };

    let Some(place_type) = present(fields, "type") else {
        return Some(
            ParseError::validation(file, format!("`{label}` is missing `type`"))
                .with_suggestion(format!(
                    "Add a Schema.org place type, for example `type: Restaurant` (valid values include {EXAMPLE_PLACE_TYPES})"
                )),
        );
    };

    let type_name = scalar_text(place_type).unwrap_or_default();
    if PlaceType::from_name(&type_name).is_none() {
        return Some(
            ParseError::validation(
                file,
                format!("`{label}.type` has unknown place type `{type_name}`"),
            )
            .with_suggestion(format!(
                "Use one of the {} supported Schema.org types, e.g. {EXAMPLE_PLACE_TYPES}",
                PlaceType::ALL.len()
            )),
        );
    }

    let has_name = present(fields, "name")
        .and_then(scalar_text)
        .is_some_and(|name| !name.trim().is_empty());
    if !has_name {
        return Some(
            ParseError::validation(file, format!("`{label}` is missing a non-empty `name`"))
                .with_suggestion("Add the business name, e.g. `name: \"Cafe Example\"`"),
        );
    }

    if fields.contains_key("latitude") || fields.contains_key("longitude") {
        return Some(
            ParseError::validation(
                file,
                format!("`{label}` uses legacy `latitude`/`longitude` keys"),
            )
            .with_suggestion("Rename `latitude` to `lat` and `longitude` to `lng`"),
        );
    }

    let numeric = |key: &str| fields.get(key).is_some_and(Value::is_number);
    if !numeric("lat") || !numeric("lng") {
        return Some(
            ParseError::validation(file, format!("`{label}` is missing numeric `lat`/`lng`"))
                .with_suggestion(
                    "Coordinates are required: add numeric `lat` and `lng`, e.g. `lat: 35.6812` and `lng: 139.7671`",
                ),
        );
    }

    None
}

/// Reject tags that contain whitespace, listing every offender.
pub fn validate_tags(tags: &Value, file: &Path) -> Option<ParseError> {
    let entries: Vec<&Value> = match tags {
        Value::Sequence(seq) => seq.iter().collect(),
        Value::Null => Vec::new(),
        single => vec![single],
    };

    let offending: Vec<String> = entries
        .into_iter()
        .filter_map(|tag| match scalar_text(tag) {
            Some(text) if text.chars().any(char::is_whitespace) => Some(format!("\"{text}\"")),
            Some(_) => None,
            None => Some(format!("{} (not a string)", describe(tag))),
        })
        .collect();

    if offending.is_empty() {
        return None;
    }

    Some(
        ParseError::validation(
            file,
            format!("Tags must not contain spaces: {}", offending.join(", ")),
        )
        .with_suggestion("Use hyphens instead of spaces, e.g. `new-york` instead of `new york`"),
    )
}

/// Flag the legacy top-level `location` key.
pub fn check_deprecated_location_field(data: &Mapping, file: &Path) -> Option<ParseError> {
    if !data.contains_key("location") {
        return None;
    }
    Some(
        ParseError::validation(file, "The `location` field is no longer supported")
            .with_suggestion(
                "Replace `location` with a `business` block containing `type`, `name`, `address`, `lat` and `lng`",
            ),
    )
}

fn present<'a>(fields: &'a Mapping, key: &str) -> Option<&'a Value> {
    fields.get(key).filter(|value| !value.is_null())
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Null => "an empty value",
        _ => "a value",
    }
}
