//! Weighted risk scoring for a single close approach.
//!
//! Each physical observable is normalized against its own saturation point
//! before weighting, then a flat bonus is added for objects the upstream feed
//! flags as potentially hazardous.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Diameter at which the size term saturates.
pub const REFERENCE_DIAMETER_M: f64 = 300.0;
/// Miss distance at and beyond which the proximity term contributes nothing.
pub const REFERENCE_MISS_DISTANCE_KM: f64 = 50_000_000.0;
/// Relative velocity at which the speed term saturates.
pub const REFERENCE_VELOCITY_KM_S: f64 = 25.0;

const DIAMETER_WEIGHT: f64 = 30.0;
const DISTANCE_WEIGHT: f64 = 40.0;
const VELOCITY_WEIGHT: f64 = 20.0;
const HAZARD_BONUS: f64 = 10.0;
const MAX_SCORE: f64 = 100.0;

/// Discrete severity tier derived from a rounded risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// Maps a rounded score onto a tier. Thresholds are strict.
    ///
    /// | Score  | Level    |
    /// |--------|----------|
    /// | > 75   | CRITICAL |
    /// | > 50   | HIGH     |
    /// | > 25   | MODERATE |
    /// | <= 25  | LOW      |
    pub fn from_score(score: u8) -> Self {
        match score {
            s if s > 75 => RiskLevel::Critical,
            s if s > 50 => RiskLevel::High,
            s if s > 25 => RiskLevel::Moderate,
            _ => RiskLevel::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Moderate => "MODERATE",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Physical observables the scorer consumes.
///
/// Values are trusted: negative or non-finite inputs are not rejected here.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RiskInputs {
    pub diameter_m: f64,
    pub miss_distance_km: f64,
    pub velocity_km_s: f64,
    pub hazardous: bool,
}

/// Per-term contributions before summation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RiskTerms {
    pub diameter: f64,
    pub distance: f64,
    pub velocity: f64,
    pub hazard_bonus: f64,
}

impl RiskTerms {
    /// Unclamped, unrounded composite.
    pub fn total(&self) -> f64 {
        self.diameter + self.distance + self.velocity + self.hazard_bonus
    }
}

/// Final score and tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAssessment {
    pub risk_score: u8,
    pub risk_level: RiskLevel,
}

/// Computes the capped contribution of every term.
pub fn risk_terms(inputs: &RiskInputs) -> RiskTerms {
    RiskTerms {
        diameter: (inputs.diameter_m / REFERENCE_DIAMETER_M).min(1.0) * DIAMETER_WEIGHT,
        distance: (1.0 - (inputs.miss_distance_km / REFERENCE_MISS_DISTANCE_KM).min(1.0))
            * DISTANCE_WEIGHT,
        velocity: (inputs.velocity_km_s / REFERENCE_VELOCITY_KM_S).min(1.0) * VELOCITY_WEIGHT,
        hazard_bonus: if inputs.hazardous { HAZARD_BONUS } else { 0.0 },
    }
}

/// Scores a close approach: sum the terms, clamp to 100, round, then tier.
pub fn assess(inputs: &RiskInputs) -> RiskAssessment {
    let composite = risk_terms(inputs).total().min(MAX_SCORE);
    // Casting saturates, so a stray NaN lands on 0 instead of panicking.
    let risk_score = composite.round() as u8;

    RiskAssessment {
        risk_score,
        risk_level: RiskLevel::from_score(risk_score),
    }
}
