//! Flattens a date-grouped NeoWs feed into scored [`NormalizedAsteroid`]s.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::feed::{CloseApproachEvent, RawFeed, RawNeoRecord};
use crate::risk::{RiskInputs, RiskLevel, assess};

/// One object with its Earth approach selected and its risk derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedAsteroid {
    pub id: String,
    pub name: String,
    pub close_approach_date: NaiveDate,
    pub diameter_meters: f64,
    pub velocity_km_per_sec: f64,
    pub miss_distance_km: u64,
    pub hazardous: bool,
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

/// Why a record produced no [`NormalizedAsteroid`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordRejection {
    /// Expected filtering, not a failure.
    #[error("no close approach to Earth")]
    NoEarthApproach,

    #[error("record does not match the NeoWs shape: {0}")]
    Shape(String),

    #[error("{field} is not a usable quantity: {value:?}")]
    BadQuantity { field: &'static str, value: String },
}

/// Returns the first approach whose body is exactly `"Earth"`.
pub fn earth_approach(approaches: &[CloseApproachEvent]) -> Option<&CloseApproachEvent> {
    approaches.iter().find(|a| a.is_earth())
}

/// Parses a NeoWs numeric string as a finite, non-negative quantity.
pub fn parse_quantity(field: &'static str, raw: &str) -> Result<f64, RecordRejection> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| RecordRejection::BadQuantity {
            field,
            value: raw.to_string(),
        })
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Normalizes a single decoded record.
///
/// # Errors
///
/// [`RecordRejection::NoEarthApproach`] when no approach targets Earth, and
/// [`RecordRejection::BadQuantity`] when a numeric field cannot be used.
pub fn normalize_record(record: &RawNeoRecord) -> Result<NormalizedAsteroid, RecordRejection> {
    let approach =
        earth_approach(&record.close_approach_data).ok_or(RecordRejection::NoEarthApproach)?;

    let diameter_m = record.estimated_diameter.meters.estimated_diameter_max;
    if !diameter_m.is_finite() || diameter_m < 0.0 {
        return Err(RecordRejection::BadQuantity {
            field: "estimated_diameter_max",
            value: diameter_m.to_string(),
        });
    }
    let velocity_km_s = parse_quantity(
        "kilometers_per_second",
        &approach.relative_velocity.kilometers_per_second,
    )?;
    let miss_distance_km = parse_quantity("kilometers", &approach.miss_distance.kilometers)?;
    let hazardous = record.is_potentially_hazardous_asteroid;

    let risk = assess(&RiskInputs {
        diameter_m,
        miss_distance_km,
        velocity_km_s,
        hazardous,
    });

    Ok(NormalizedAsteroid {
        id: record.id.clone(),
        name: record.name.clone(),
        close_approach_date: approach.close_approach_date,
        diameter_meters: round_to(diameter_m, 2),
        velocity_km_per_sec: round_to(velocity_km_s, 2),
        miss_distance_km: miss_distance_km.round() as u64,
        hazardous,
        risk_score: risk.risk_score,
        risk_level: risk.risk_level,
    })
}

/// Decodes and normalizes one raw JSON record.
pub fn normalize_value(value: &Value) -> Result<NormalizedAsteroid, RecordRejection> {
    let record =
        RawNeoRecord::deserialize(value).map_err(|e| RecordRejection::Shape(e.to_string()))?;
    normalize_record(&record)
}

/// Flattens every date group of `feed`, in ascending date order.
///
/// Records without an Earth approach are filtered out; records that fail
/// decoding or carry unusable numbers are dropped and logged.
pub fn normalize_feed(feed: &RawFeed) -> Vec<NormalizedAsteroid> {
    let mut asteroids = Vec::with_capacity(feed.record_count());
    let mut filtered = 0usize;
    let mut rejected = 0usize;

    for (date, records) in &feed.near_earth_objects {
        for value in records {
            match normalize_value(value) {
                Ok(asteroid) => asteroids.push(asteroid),
                Err(RecordRejection::NoEarthApproach) => {
                    filtered += 1;
                    debug!(date = %date, id = ?value.get("id"), "No Earth approach, skipping");
                }
                Err(e) => {
                    rejected += 1;
                    warn!(date = %date, id = ?value.get("id"), error = %e, "Rejected NEO record");
                }
            }
        }
    }

    debug!(
        normalized = asteroids.len(),
        filtered, rejected, "Feed normalized"
    );
    asteroids
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn approach(body: &str, date: &str, velocity: &str, miss: &str) -> Value {
        json!({
            "close_approach_date": date,
            "close_approach_date_full": format!("{date} 12:00"),
            "relative_velocity": {"kilometers_per_second": velocity, "kilometers_per_hour": "0"},
            "miss_distance": {"kilometers": miss, "astronomical": "0.02", "lunar": "7.8"},
            "orbiting_body": body
        })
    }

    fn record(id: &str, diameter_max: f64, hazardous: bool, approaches: Vec<Value>) -> Value {
        json!({
            "id": id,
            "name": format!("({id})"),
            "estimated_diameter": {
                "meters": {"estimated_diameter_min": diameter_max / 2.0, "estimated_diameter_max": diameter_max}
            },
            "is_potentially_hazardous_asteroid": hazardous,
            "is_sentry_object": false,
            "close_approach_data": approaches
        })
    }

    fn feed(groups: Value) -> RawFeed {
        serde_json::from_value(json!({ "near_earth_objects": groups })).unwrap()
    }

    #[test]
    fn test_reference_record() {
        let value = record("3542519", 250.0, false, vec![approach("Earth", "2024-03-01", "12.5", "3000000")]);
        let a = normalize_value(&value).unwrap();

        assert_eq!(a.id, "3542519");
        assert_eq!(a.close_approach_date, NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(a.diameter_meters, 250.0);
        assert_eq!(a.velocity_km_per_sec, 12.5);
        assert_eq!(a.miss_distance_km, 3_000_000);
        assert!(!a.hazardous);
        assert_eq!(a.risk_score, 73);
        assert_eq!(a.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_only_other_bodies_yields_nothing() {
        let value = record("9", 40.0, false, vec![approach("Jupiter", "2024-03-01", "5", "1000")]);
        assert_eq!(normalize_value(&value), Err(RecordRejection::NoEarthApproach));

        let f = feed(json!({ "2024-03-01": [value] }));
        assert!(normalize_feed(&f).is_empty());
    }

    #[test]
    fn test_first_earth_approach_wins() {
        let value = record(
            "10",
            40.0,
            false,
            vec![
                approach("Mars", "2024-01-01", "1", "1"),
                approach("Earth", "2024-02-02", "7.123", "1234567.6"),
                approach("Earth", "2024-03-03", "9", "9"),
            ],
        );
        let a = normalize_value(&value).unwrap();
        assert_eq!(a.close_approach_date, NaiveDate::from_ymd_opt(2024, 2, 2).unwrap());
        assert_eq!(a.velocity_km_per_sec, 7.12);
        assert_eq!(a.miss_distance_km, 1_234_568);
    }

    #[test]
    fn test_body_match_is_case_sensitive() {
        let value = record("11", 40.0, false, vec![approach("earth", "2024-01-01", "1", "1")]);
        assert_eq!(normalize_value(&value), Err(RecordRejection::NoEarthApproach));
    }

    #[test]
    fn test_diameter_rounded_to_two_places() {
        let value = record("12", 123.456789, true, vec![approach("Earth", "2024-01-01", "1", "1")]);
        assert_eq!(normalize_value(&value).unwrap().diameter_meters, 123.46);
    }

    #[test]
    fn test_malformed_velocity_rejects_record() {
        let value = record("13", 40.0, false, vec![approach("Earth", "2024-01-01", "fast", "1")]);
        assert!(matches!(
            normalize_value(&value),
            Err(RecordRejection::BadQuantity { field: "kilometers_per_second", .. })
        ));
    }

    #[test]
    fn test_non_finite_miss_distance_rejects_record() {
        for bad in ["NaN", "inf", "-5"] {
            let value = record("14", 40.0, false, vec![approach("Earth", "2024-01-01", "1", bad)]);
            assert!(normalize_value(&value).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_missing_diameter_rejects_only_that_record() {
        let mut broken = record("15", 40.0, false, vec![approach("Earth", "2024-01-01", "1", "1")]);
        broken.as_object_mut().unwrap().remove("estimated_diameter");
        let good = record("16", 40.0, false, vec![approach("Earth", "2024-01-01", "1", "1")]);

        assert!(matches!(normalize_value(&broken), Err(RecordRejection::Shape(_))));

        let f = feed(json!({ "2024-01-01": [broken, good] }));
        let out = normalize_feed(&f);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "16");
    }

    #[test]
    fn test_feed_flattens_in_date_then_record_order() {
        let earth = |id: &str, date: &str| record(id, 10.0, false, vec![approach("Earth", date, "1", "1")]);
        let f = feed(json!({
            "2024-01-02": [earth("c", "2024-01-02"), earth("d", "2024-01-02")],
            "2024-01-01": [earth("a", "2024-01-01"), earth("b", "2024-01-01")]
        }));
        let ids: Vec<_> = normalize_feed(&f).into_iter().map(|a| a.id).collect();
        assert_eq!(ids, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = record("17", 250.0, false, vec![approach("Earth", "2024-03-01", "12.5", "3000000")]);
        let json = serde_json::to_value(normalize_value(&value).unwrap()).unwrap();
        assert_eq!(json["closeApproachDate"], "2024-03-01");
        assert_eq!(json["missDistanceKm"], 3_000_000);
        assert_eq!(json["riskLevel"], "HIGH");
        assert_eq!(json["riskScore"], 73);
    }
}
