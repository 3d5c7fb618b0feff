//! Per-user bookmark persistence.
//!
//! [`BookmarkStore`] is the trait the application layer talks to.
//! [`JsonFileStore`] implements it on top of a single JSON document on disk.

mod json_file;

pub use json_file::JsonFileStore;

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::normalize::NormalizedAsteroid;

/// A normalized asteroid as it sits in a user's catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedAsteroid {
    #[serde(flatten)]
    pub asteroid: NormalizedAsteroid,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    AlreadySaved,
}

/// Unordered per-user collection of bookmarked asteroids, unique by id.
pub trait BookmarkStore {
    fn list(&self, user: &str) -> Vec<SavedAsteroid>;

    /// Adds `asteroid` unless the user already saved the same id.
    fn save(&mut self, user: &str, asteroid: NormalizedAsteroid) -> Result<SaveOutcome>;

    /// Returns `true` if something was removed.
    fn remove(&mut self, user: &str, asteroid_id: &str) -> Result<bool>;
}
