//! Confidence thresholding
//!
//! Pure mapping from a confidence score (0–100) to the discrete detection
//! flag, risk level, and stroke subtype. The boundary operators are part of
//! the published contract and intentionally asymmetric: detection is strict
//! `> 50` while the subtype band starts at 50 inclusive, and high risk
//! begins above 80 even though the hemorrhagic band begins at 85. Do not
//! reconcile them without a contract change.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse risk bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    /// Confidence at or below 60
    Low,
    /// Confidence above 60, at or below 80
    Moderate,
    /// Confidence above 80
    High,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Stroke subtype band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrokeType {
    /// Below the detection band
    None,
    /// Confidence in [50, 70)
    PossibleTia,
    /// Confidence in [70, 85)
    LikelyIschemic,
    /// Confidence at or above 85
    LikelyHemorrhagic,
}

impl StrokeType {
    /// Long-form label used in reports
    pub fn description(&self) -> &'static str {
        match self {
            StrokeType::None => "No Stroke Detected",
            StrokeType::PossibleTia => "Possible TIA (Transient Ischemic Attack)",
            StrokeType::LikelyIschemic => "Likely Ischemic Stroke",
            StrokeType::LikelyHemorrhagic => "Likely Hemorrhagic Stroke",
        }
    }
}

impl fmt::Display for StrokeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Discrete outcome of thresholding one confidence score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Strictly above 50
    pub detected: bool,
    /// Risk bucket
    pub risk: RiskLevel,
    /// Subtype band
    pub stroke_type: StrokeType,
}

/// Map a confidence score in [0, 100] to its discrete labels.
pub fn classify(confidence: f64) -> Decision {
    let detected = confidence > 50.0;

    let stroke_type = if confidence < 50.0 {
        StrokeType::None
    } else if confidence < 70.0 {
        StrokeType::PossibleTia
    } else if confidence < 85.0 {
        StrokeType::LikelyIschemic
    } else {
        StrokeType::LikelyHemorrhagic
    };

    let risk = if confidence > 80.0 {
        RiskLevel::High
    } else if confidence > 60.0 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Low
    };

    Decision { detected, risk, stroke_type }
}
