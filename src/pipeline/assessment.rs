//! Assessment record and recommendation selection

use crate::decision::{Decision, RiskLevel, StrokeType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prediction label for a detected stroke
const LABEL_DETECTED: &str = "Stroke Risk Detected";

/// Prediction label for a clear scan
const LABEL_CLEAR: &str = "No Stroke Detected";

/// Fixed recommendation list shown when stroke indicators are present
const DETECTED_RECOMMENDATIONS: [&str; 5] = [
    "Potential stroke indicators detected",
    "Consult a neurologist immediately",
    "Call emergency services if experiencing symptoms",
    "Check nearby hospitals for immediate care",
    "Download the medical report and bring to your doctor",
];

/// Fixed recommendation list shown for a clear result
const CLEAR_RECOMMENDATIONS: [&str; 5] = [
    "No immediate stroke indicators detected",
    "Regular checkups are still recommended",
    "Maintain healthy lifestyle habits",
    "Monitor your blood pressure regularly",
    "Follow a brain-healthy diet",
];

/// Final, immutable result of one pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    /// Human-readable prediction label
    pub prediction: String,

    /// Confidence score in [0, 100], rounded to two decimals
    pub confidence: f64,

    /// Detection flag: confidence strictly above 50
    pub stroke_detected: bool,

    /// Risk bucket
    pub risk_level: RiskLevel,

    /// Stroke subtype band
    pub stroke_type: StrokeType,

    /// Assessment time
    pub timestamp: DateTime<Utc>,

    /// Ordered recommendation list, selected by the detection flag
    pub recommendations: Vec<String>,

    /// Base64 PNG overlay; absent when no classifier ran or
    /// explainability degraded
    pub visualization: Option<String>,
}

impl Assessment {
    /// Join the score, decision, and optional visualization into the final
    /// record. Selection only; this step has no failure modes of its own.
    pub fn assemble(confidence: f64, decision: Decision, visualization: Option<String>) -> Self {
        let prediction = if decision.detected { LABEL_DETECTED } else { LABEL_CLEAR };
        let recommendations = if decision.detected {
            &DETECTED_RECOMMENDATIONS
        } else {
            &CLEAR_RECOMMENDATIONS
        };

        Self {
            prediction: prediction.to_string(),
            confidence,
            stroke_detected: decision.detected,
            risk_level: decision.risk,
            stroke_type: decision.stroke_type,
            timestamp: Utc::now(),
            recommendations: recommendations.iter().map(|s| s.to_string()).collect(),
            visualization,
        }
    }
}
