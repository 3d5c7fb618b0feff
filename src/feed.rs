//! Typed contracts for NeoWs payloads.
//!
//! The feed is decoded in two steps: the outer envelope keeps every record as
//! raw JSON, and each record is then decoded on its own into a
//! [`RawNeoRecord`]. A record that is missing a required field fails alone
//! and never takes the rest of the batch with it.

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Body designator for the only approaches this crate scores.
pub const EARTH: &str = "Earth";

/// Top-level NeoWs `/feed` response.
///
/// `near_earth_objects` groups records by calendar date. Keys are kept sorted
/// so flattening is deterministic.
#[derive(Debug, Clone, Deserialize)]
pub struct RawFeed {
    #[serde(default)]
    pub element_count: Option<u64>,
    pub near_earth_objects: BTreeMap<String, Vec<Value>>,
}

impl RawFeed {
    /// Decodes a feed envelope from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not JSON or lack `near_earth_objects`.
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Total number of records across all dates, decodable or not.
    pub fn record_count(&self) -> usize {
        self.near_earth_objects.values().map(Vec::len).sum()
    }
}

/// One object as NeoWs describes it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNeoRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub neo_reference_id: Option<String>,
    #[serde(default)]
    pub nasa_jpl_url: Option<String>,
    #[serde(default)]
    pub absolute_magnitude_h: Option<f64>,
    pub estimated_diameter: EstimatedDiameter,
    pub is_potentially_hazardous_asteroid: bool,
    #[serde(default)]
    pub is_sentry_object: bool,
    pub close_approach_data: Vec<CloseApproachEvent>,
    #[serde(default)]
    pub orbital_data: Option<OrbitalData>,
}

/// Diameter bounds in every unit NeoWs reports. Only meters are required.
#[derive(Debug, Clone, Deserialize)]
pub struct EstimatedDiameter {
    pub meters: DiameterRange,
    #[serde(default)]
    pub kilometers: Option<DiameterRange>,
    #[serde(default)]
    pub miles: Option<DiameterRange>,
    #[serde(default)]
    pub feet: Option<DiameterRange>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DiameterRange {
    pub estimated_diameter_min: f64,
    pub estimated_diameter_max: f64,
}

/// A single predicted or observed pass near a body.
///
/// NeoWs sends the numeric quantities as strings; they are parsed during
/// normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct CloseApproachEvent {
    pub close_approach_date: NaiveDate,
    #[serde(default)]
    pub close_approach_date_full: Option<String>,
    #[serde(default)]
    pub epoch_date_close_approach: Option<i64>,
    pub relative_velocity: RelativeVelocity,
    pub miss_distance: MissDistance,
    pub orbiting_body: String,
}

impl CloseApproachEvent {
    pub fn is_earth(&self) -> bool {
        self.orbiting_body == EARTH
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelativeVelocity {
    pub kilometers_per_second: String,
    #[serde(default)]
    pub kilometers_per_hour: Option<String>,
    #[serde(default)]
    pub miles_per_hour: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MissDistance {
    pub kilometers: String,
    #[serde(default)]
    pub astronomical: Option<String>,
    #[serde(default)]
    pub lunar: Option<String>,
    #[serde(default)]
    pub miles: Option<String>,
}

/// Orbit solution attached to `/neo/{id}` lookups. Absent from feed records.
#[derive(Debug, Clone, Deserialize)]
pub struct OrbitalData {
    #[serde(default)]
    pub eccentricity: Option<String>,
    #[serde(default)]
    pub inclination: Option<String>,
    #[serde(default)]
    pub semi_major_axis: Option<String>,
    #[serde(default)]
    pub minimum_orbit_intersection: Option<String>,
    #[serde(default)]
    pub orbit_class: Option<OrbitClass>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrbitClass {
    #[serde(default)]
    pub orbit_class_type: Option<String>,
    #[serde(default)]
    pub orbit_class_description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_feed_without_objects_is_rejected() {
        let result = RawFeed::from_slice(br#"{"element_count": 0}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_feed_counts_records_across_dates() {
        let feed = RawFeed::from_slice(
            br#"{"near_earth_objects": {"2024-01-02": [{}, {}], "2024-01-01": [{}]}}"#,
        )
        .unwrap();
        assert_eq!(feed.record_count(), 3);
        let dates: Vec<_> = feed.near_earth_objects.keys().cloned().collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02"]);
    }

    #[test]
    fn test_record_missing_diameter_fails_to_decode() {
        let value = json!({
            "id": "1",
            "name": "(2024 AA)",
            "is_potentially_hazardous_asteroid": false,
            "close_approach_data": []
        });
        assert!(RawNeoRecord::deserialize(&value).is_err());
    }

    #[test]
    fn test_optional_units_may_be_missing() {
        let value = json!({
            "id": "2",
            "name": "(2024 AB)",
            "estimated_diameter": {
                "meters": {"estimated_diameter_min": 10.0, "estimated_diameter_max": 22.5}
            },
            "is_potentially_hazardous_asteroid": true,
            "close_approach_data": [{
                "close_approach_date": "2024-01-01",
                "relative_velocity": {"kilometers_per_second": "4.2"},
                "miss_distance": {"kilometers": "120000"},
                "orbiting_body": "Earth"
            }]
        });
        let record = RawNeoRecord::deserialize(&value).unwrap();
        assert!(!record.is_sentry_object);
        assert!(record.estimated_diameter.feet.is_none());
        assert!(record.close_approach_data[0].is_earth());
    }
}
