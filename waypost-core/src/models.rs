//! Content model structs for posts, business locations, and parse errors.

use chrono::{DateTime, Datelike, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Schema.org Place types accepted for `business.type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceType {
    Restaurant,
    FastFoodRestaurant,
    CafeOrCoffeeShop,
    BarOrPub,
    Bakery,
    IceCreamShop,
    Brewery,
    Winery,
    Distillery,
    FoodEstablishment,
    LocalBusiness,
    Store,
    BookStore,
    ClothingStore,
    GroceryStore,
    ConvenienceStore,
    ShoppingCenter,
    LodgingBusiness,
    Hotel,
    Hostel,
    Motel,
    BedAndBreakfast,
    Resort,
    Campground,
    TouristAttraction,
    Museum,
    Park,
    Zoo,
    Aquarium,
    AmusementPark,
    Beach,
    LandmarksOrHistoricalBuildings,
    PlaceOfWorship,
    MovieTheater,
}

impl PlaceType {
    pub const ALL: [PlaceType; 34] = [
        PlaceType::Restaurant,
        PlaceType::FastFoodRestaurant,
        PlaceType::CafeOrCoffeeShop,
        PlaceType::BarOrPub,
        PlaceType::Bakery,
        PlaceType::IceCreamShop,
        PlaceType::Brewery,
        PlaceType::Winery,
        PlaceType::Distillery,
        PlaceType::FoodEstablishment,
        PlaceType::LocalBusiness,
        PlaceType::Store,
        PlaceType::BookStore,
        PlaceType::ClothingStore,
        PlaceType::GroceryStore,
        PlaceType::ConvenienceStore,
        PlaceType::ShoppingCenter,
        PlaceType::LodgingBusiness,
        PlaceType::Hotel,
        PlaceType::Hostel,
        PlaceType::Motel,
        PlaceType::BedAndBreakfast,
        PlaceType::Resort,
        PlaceType::Campground,
        PlaceType::TouristAttraction,
        PlaceType::Museum,
        PlaceType::Park,
        PlaceType::Zoo,
        PlaceType::Aquarium,
        PlaceType::AmusementPark,
        PlaceType::Beach,
        PlaceType::LandmarksOrHistoricalBuildings,
        PlaceType::PlaceOfWorship,
        PlaceType::MovieTheater,
    ];

    /// Exact (case-sensitive) lookup by Schema.org name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaceType::Restaurant => "Restaurant",
            PlaceType::FastFoodRestaurant => "FastFoodRestaurant",
            PlaceType::CafeOrCoffeeShop => "CafeOrCoffeeShop",
            PlaceType::BarOrPub => "BarOrPub",
            PlaceType::Bakery => "Bakery",
            PlaceType::IceCreamShop => "IceCreamShop",
            PlaceType::Brewery => "Brewery",
            PlaceType::Winery => "Winery",
            PlaceType::Distillery => "Distillery",
            PlaceType::FoodEstablishment => "FoodEstablishment",
            PlaceType::LocalBusiness => "LocalBusiness",
            PlaceType::Store => "Store",
            PlaceType::BookStore => "BookStore",
            PlaceType::ClothingStore => "ClothingStore",
            PlaceType::GroceryStore => "GroceryStore",
            PlaceType::ConvenienceStore => "ConvenienceStore",
            PlaceType::ShoppingCenter => "ShoppingCenter",
            PlaceType::LodgingBusiness => "LodgingBusiness",
            PlaceType::Hotel => "Hotel",
            PlaceType::Hostel => "Hostel",
            PlaceType::Motel => "Motel",
            PlaceType::BedAndBreakfast => "BedAndBreakfast",
            PlaceType::Resort => "Resort",
            PlaceType::Campground => "Campground",
            PlaceType::TouristAttraction => "TouristAttraction",
            PlaceType::Museum => "Museum",
            PlaceType::Park => "Park",
            PlaceType::Zoo => "Zoo",
            PlaceType::Aquarium => "Aquarium",
            PlaceType::AmusementPark => "AmusementPark",
            PlaceType::Beach => "Beach",
            PlaceType::LandmarksOrHistoricalBuildings => "LandmarksOrHistoricalBuildings",
            PlaceType::PlaceOfWorship => "PlaceOfWorship",
            PlaceType::MovieTheater => "MovieTheater",
        }
    }
}

impl fmt::Display for PlaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A point of interest attached to a post
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Business {
    #[serde(rename = "type")]
    pub place_type: PlaceType,

    pub name: String,

    #[serde(default)]
    pub address: String,

    pub lat: f64,
    pub lng: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuisine: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_range: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telephone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    #[serde(
        default,
        deserialize_with = "one_or_many",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub opening_hours: Vec<String>,
}

/// Frontmatter metadata from markdown files.
///
/// The legacy `location` key is never read here: documents carrying it are
/// rejected before typed deserialization.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Frontmatter {
    pub title: String,

    pub date: String,

    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub slug: Option<String>,

    #[serde(default)]
    pub excerpt: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    /// One object or a list in YAML; always a list here.
    #[serde(default, deserialize_with = "one_or_many")]
    pub business: Vec<Business>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(item)) => vec![item],
        Some(OneOrMany::Many(items)) => items,
    })
}

/// A single parsed blog post
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub title: String,

    /// RFC 3339 timestamp in the reference timezone
    pub date: String,

    pub tags: Vec<String>,

    /// Filled in by the site builder
    pub tag_slugs: BTreeMap<String, String>,

    /// Raw markdown body (without frontmatter)
    pub content: String,

    pub slug: String,

    /// `/{year}/{slug}/`
    pub url: String,

    pub excerpt: String,

    /// Rendered and sanitized HTML
    pub html: String,

    /// First image in `html`, filled in by the site builder
    pub image: Option<String>,

    pub category: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub business: Vec<Business>,

    #[serde(skip)]
    pub source: PathBuf,

    #[serde(skip)]
    pub published: DateTime<FixedOffset>,
}

impl Post {
    /// Publication year in the reference timezone
    pub fn year(&self) -> i32 {
        self.published.year()
    }
}

/// Build the canonical post URL
pub fn post_url(year: i32, slug: &str) -> String {
    format!("/{}/{}/", year, slug)
}

/// Category of a per-file parse failure.
///
/// Declaration order is the order used when reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    Validation,
    Yaml,
    MissingField,
    FileNotFound,
    Unknown,
}

impl ParseErrorKind {
    pub const ALL: [ParseErrorKind; 5] = [
        ParseErrorKind::Validation,
        ParseErrorKind::Yaml,
        ParseErrorKind::MissingField,
        ParseErrorKind::FileNotFound,
        ParseErrorKind::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParseErrorKind::Validation => "validation",
            ParseErrorKind::Yaml => "yaml",
            ParseErrorKind::MissingField => "missing_field",
            ParseErrorKind::FileNotFound => "file_not_found",
            ParseErrorKind::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A categorized failure to turn one file into a [`Post`].
///
/// These are collected, not thrown; the aggregator decides which ones abort
/// the run.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("{}: [{}] {}", .file.display(), .kind, .message)]
pub struct ParseError {
    pub file: PathBuf,
    pub kind: ParseErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl ParseError {
    pub fn new(file: &Path, kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self {
            file: file.to_path_buf(),
            kind,
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn validation(file: &Path, message: impl Into<String>) -> Self {
        Self::new(file, ParseErrorKind::Validation, message)
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}
