//! Governorate and place records.
//!
//! Field names and category strings are the persisted format, and category
//! strings double as catalog lookup keys, so both are fixed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Fixed classification of a place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Tourist Sites")]
    TouristSite,
    #[serde(rename = "Hotels & Accommodation")]
    Hotel,
    #[serde(rename = "Restaurants")]
    Restaurant,
    #[serde(rename = "Health Centers")]
    HealthCenter,
    #[serde(rename = "Sports Clubs")]
    Sports,
    #[serde(rename = "Cafes")]
    Cafe,
    #[serde(rename = "Shopping")]
    Shopping,
}

impl Category {
    pub const ALL: [Category; 7] = [
        Self::TouristSite,
        Self::Hotel,
        Self::Restaurant,
        Self::HealthCenter,
        Self::Sports,
        Self::Cafe,
        Self::Shopping,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TouristSite => "Tourist Sites",
            Self::Hotel => "Hotels & Accommodation",
            Self::Restaurant => "Restaurants",
            Self::HealthCenter => "Health Centers",
            Self::Sports => "Sports Clubs",
            Self::Cafe => "Cafes",
            Self::Shopping => "Shopping",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory(pub String);

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown category: {}", self.0)
    }
}

impl std::error::Error for UnknownCategory {}

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// A point of interest inside one governorate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Place {
    /// Unique within the owning governorate
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub category: Category,
    pub rating: f64,
    /// e.g. "5-Star Hotel"
    pub short_title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub image_url: String,
    pub google_maps_url: String,
    /// True if hand-entered, false if produced by the importer. Set once.
    pub is_manual: bool,
}

impl Place {
    /// Copy with only the description replaced.
    pub fn with_description(&self, description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..self.clone()
        }
    }
}

/// An administrative region of Asir.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Governorate {
    pub id: String,
    pub name: String,
    pub arabic_name: String,
    pub image_url: String,
    pub description: String,
    /// Display order
    pub places: Vec<Place>,
}

impl Governorate {
    pub fn place(&self, id: &str) -> Option<&Place> {
        self.places.iter().find(|p| p.id == id)
    }
}
