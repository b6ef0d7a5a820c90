//! Queries and edits over an in-memory governorate list.
//!
//! These operate on the list the admin is editing; nothing here touches
//! storage. Place ids stay unique within a governorate after every edit.

use std::collections::HashSet;

use thiserror::Error;

use crate::model::{Category, Governorate, Place};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("Governorate not found: {0}")]
    GovernorateNotFound(String),

    #[error("Place not found: {place_id} in {governorate_id}")]
    PlaceNotFound {
        governorate_id: String,
        place_id: String,
    },

    #[error("Duplicate place id: {0}")]
    DuplicatePlaceId(String),
}

pub fn find_governorate<'a>(list: &'a [Governorate], id: &str) -> Option<&'a Governorate> {
    list.iter().find(|g| g.id == id)
}

fn find_governorate_mut<'a>(
    list: &'a mut [Governorate],
    id: &str,
) -> Result<&'a mut Governorate, DirectoryError> {
    list.iter_mut()
        .find(|g| g.id == id)
        .ok_or_else(|| DirectoryError::GovernorateNotFound(id.to_string()))
}

/// Places of one category, in display order.
pub fn places_in_category(governorate: &Governorate, category: Category) -> Vec<&Place> {
    governorate
        .places
        .iter()
        .filter(|p| p.category == category)
        .collect()
}

/// `(id, name, place count)` per governorate, in list order.
pub fn place_counts(list: &[Governorate]) -> Vec<(&str, &str, usize)> {
    list.iter()
        .map(|g| (g.id.as_str(), g.name.as_str(), g.places.len()))
        .collect()
}

/// Append a batch of places to a governorate.
///
/// All or nothing: if any id collides with an existing place or with another
/// id in the batch, nothing is appended.
pub fn append_places(
    list: &mut [Governorate],
    governorate_id: &str,
    places: Vec<Place>,
) -> Result<usize, DirectoryError> {
    let governorate = find_governorate_mut(list, governorate_id)?;

    let mut seen: HashSet<&str> = governorate.places.iter().map(|p| p.id.as_str()).collect();
    for place in &places {
        if !seen.insert(place.id.as_str()) {
            return Err(DirectoryError::DuplicatePlaceId(place.id.clone()));
        }
    }

    let added = places.len();
    governorate.places.extend(places);
    tracing::debug!("Appended {} places to {}", added, governorate_id);
    Ok(added)
}

/// Remove exactly one place, returning it.
pub fn remove_place(
    list: &mut [Governorate],
    governorate_id: &str,
    place_id: &str,
) -> Result<Place, DirectoryError> {
    let governorate = find_governorate_mut(list, governorate_id)?;

    let index = governorate
        .places
        .iter()
        .position(|p| p.id == place_id)
        .ok_or_else(|| DirectoryError::PlaceNotFound {
            governorate_id: governorate_id.to_string(),
            place_id: place_id.to_string(),
        })?;

    let removed = governorate.places.remove(index);
    tracing::debug!("Removed place {} from {}", place_id, governorate_id);
    Ok(removed)
}
