use anyhow::{Context, Result, bail};
use chrono::Utc;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{BookmarkStore, SaveOutcome, SavedAsteroid};
use crate::normalize::NormalizedAsteroid;

/// Bookmarks for every user, kept in one JSON object on disk:
/// ```json
/// {
///   "ada@example.com": [{ "id": "3542519", "riskLevel": "HIGH", "savedAt": "..." }]
/// }
/// ```
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, Vec<SavedAsteroid>>,
}

impl JsonFileStore {
    /// Loads the store at `path`. A missing file is an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading bookmarks from {}", path.display()))?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content)
                    .with_context(|| format!("parsing bookmarks in {}", path.display()))?
            }
        } else {
            BTreeMap::new()
        };

        debug!(path = %path.display(), users = entries.len(), "Bookmark store loaded");
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes to a sibling temp file, then renames it over the store.
    fn persist(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(&self.entries)?)?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        bail!("{field} is required");
    }
    Ok(())
}

impl BookmarkStore for JsonFileStore {
    fn list(&self, user: &str) -> Vec<SavedAsteroid> {
        self.entries.get(user).cloned().unwrap_or_default()
    }

    fn save(&mut self, user: &str, asteroid: NormalizedAsteroid) -> Result<SaveOutcome> {
        require("user", user)?;
        require("asteroid id", &asteroid.id)?;
        require("asteroid name", &asteroid.name)?;

        let saved = self.entries.entry(user.to_string()).or_default();
        if saved.iter().any(|s| s.asteroid.id == asteroid.id) {
            debug!(user, id = %asteroid.id, "Asteroid already in catalog");
            return Ok(SaveOutcome::AlreadySaved);
        }

        info!(user, id = %asteroid.id, "Saving asteroid to catalog");
        saved.push(SavedAsteroid {
            asteroid,
            saved_at: Utc::now(),
        });
        self.persist()?;
        Ok(SaveOutcome::Saved)
    }

    fn remove(&mut self, user: &str, asteroid_id: &str) -> Result<bool> {
        require("user", user)?;
        require("asteroid id", asteroid_id)?;

        let Some(saved) = self.entries.get_mut(user) else {
            return Ok(false);
        };
        let before = saved.len();
        saved.retain(|s| s.asteroid.id != asteroid_id);
        let removed = saved.len() != before;

        if removed {
            info!(user, id = asteroid_id, "Removed asteroid from catalog");
            self.persist()?;
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::risk::RiskLevel;
    use chrono::NaiveDate;
    use std::env;
    use std::fs;

    fn temp_path(name: &str) -> PathBuf {
        env::temp_dir().join(name)
    }

    fn asteroid(id: &str) -> NormalizedAsteroid {
        NormalizedAsteroid {
            id: id.to_string(),
            name: format!("({id})"),
            close_approach_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            diameter_meters: 42.0,
            velocity_km_per_sec: 8.25,
            miss_distance_km: 7_500_000,
            hazardous: true,
            risk_score: 40,
            risk_level: RiskLevel::Moderate,
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let path = temp_path("neo_rater_bookmarks_missing.json");
        let _ = fs::remove_file(&path);

        let store = JsonFileStore::load(&path).unwrap();
        assert!(store.list("ada@example.com").is_empty());
    }

    #[test]
    fn test_save_dedups_by_id() {
        let path = temp_path("neo_rater_bookmarks_dedup.json");
        let _ = fs::remove_file(&path);

        let mut store = JsonFileStore::load(&path).unwrap();
        assert_eq!(store.save("ada", asteroid("1")).unwrap(), SaveOutcome::Saved);
        assert_eq!(store.save("ada", asteroid("1")).unwrap(), SaveOutcome::AlreadySaved);
        assert_eq!(store.save("bob", asteroid("1")).unwrap(), SaveOutcome::Saved);
        assert_eq!(store.list("ada").len(), 1);

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_persists_across_loads() {
        let path = temp_path("neo_rater_bookmarks_persist.json");
        let _ = fs::remove_file(&path);

        {
            let mut store = JsonFileStore::load(&path).unwrap();
            store.save("ada", asteroid("1")).unwrap();
            store.save("ada", asteroid("2")).unwrap();
        }

        let mut store = JsonFileStore::load(&path).unwrap();
        let ids: Vec<_> = store.list("ada").into_iter().map(|s| s.asteroid.id).collect();
        assert_eq!(ids, vec!["1", "2"]);

        assert!(store.remove("ada", "1").unwrap());
        assert!(!store.remove("ada", "1").unwrap());
        assert!(!store.remove("nobody", "2").unwrap());

        let reloaded = JsonFileStore::load(&path).unwrap();
        assert_eq!(reloaded.list("ada").len(), 1);

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["ada"][0]["riskLevel"], "MODERATE");
        assert!(raw["ada"][0]["savedAt"].is_string());

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_blank_user_is_rejected() {
        let path = temp_path("neo_rater_bookmarks_blank.json");
        let _ = fs::remove_file(&path);

        let mut store = JsonFileStore::load(&path).unwrap();
        assert!(store.save("  ", asteroid("1")).is_err());
        assert!(store.remove("ada", "").is_err());
        assert!(!path.exists());
    }
}
