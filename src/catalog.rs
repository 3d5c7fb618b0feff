//! Sorting and summary statistics over a normalized catalog.

use clap::ValueEnum;
use serde::Serialize;
use std::cmp::Ordering;

use crate::normalize::NormalizedAsteroid;
use crate::risk::RiskLevel;

/// Column a catalog can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortKey {
    CloseApproachDate,
    Diameter,
    Velocity,
    MissDistance,
    RiskScore,
    Hazardous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

fn compare(a: &NormalizedAsteroid, b: &NormalizedAsteroid, key: SortKey) -> Ordering {
    match key {
        SortKey::CloseApproachDate => a.close_approach_date.cmp(&b.close_approach_date),
        SortKey::Diameter => a.diameter_meters.total_cmp(&b.diameter_meters),
        SortKey::Velocity => a.velocity_km_per_sec.total_cmp(&b.velocity_km_per_sec),
        SortKey::MissDistance => a.miss_distance_km.cmp(&b.miss_distance_km),
        SortKey::RiskScore => a.risk_score.cmp(&b.risk_score),
        SortKey::Hazardous => a.hazardous.cmp(&b.hazardous),
    }
}

/// Stable sort; ties keep their feed order in both directions.
pub fn sort_asteroids(asteroids: &mut [NormalizedAsteroid], key: SortKey, direction: SortDirection) {
    asteroids.sort_by(|a, b| match direction {
        SortDirection::Ascending => compare(a, b, key),
        SortDirection::Descending => compare(b, a, key),
    });
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    pub count: usize,
    pub hazardous: usize,
    pub average_risk: u8,

    // tiers
    pub low: usize,
    pub moderate: usize,
    pub high: usize,
    pub critical: usize,

    pub closest_id: Option<String>,
    pub max_risk_id: Option<String>,
}

impl CatalogSummary {
    pub fn from_asteroids(asteroids: &[NormalizedAsteroid]) -> Self {
        let mut s = CatalogSummary {
            count: asteroids.len(),
            ..Default::default()
        };

        let mut risk_total = 0u64;
        for a in asteroids {
            risk_total += u64::from(a.risk_score);

            if a.hazardous {
                s.hazardous += 1;
            }

            match a.risk_level {
                RiskLevel::Low => s.low += 1,
                RiskLevel::Moderate => s.moderate += 1,
                RiskLevel::High => s.high += 1,
                RiskLevel::Critical => s.critical += 1,
            }
        }

        if s.count > 0 {
            s.average_risk = (risk_total as f64 / s.count as f64).round() as u8;
        }

        s.closest_id = asteroids
            .iter()
            .min_by_key(|a| a.miss_distance_km)
            .map(|a| a.id.clone());
        s.max_risk_id = asteroids
            .iter()
            .max_by_key(|a| a.risk_score)
            .map(|a| a.id.clone());

        s
    }

    pub fn pct(part: usize, total: usize) -> f64 {
        if total == 0 {
            0.0
        } else {
            (part as f64 / total as f64) * 100.0
        }
    }

    pub fn hazardous_pct(&self) -> f64 {
        Self::pct(self.hazardous, self.count)
    }
}
