use serde::{Deserialize, Serialize};

use super::risk::{RiskCategory, RiskLevel};
use crate::constants::FALLBACK_RISK_PROBABILITY;
use crate::logic::features::StudentIdentity;
use crate::logic::interventions::Intervention;

/// `model_type` reported for fallback models and failed rows
pub const FALLBACK_MODEL_TYPE: &str = "fallback";

pub const UNKNOWN_STUDENT: &str = "Unknown Student";

/// Prediction for one input row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub student_id: String,
    pub name: String,
    pub grade_level: f64,
    pub current_gpa: f64,
    pub attendance_rate: f64,

    pub risk_probability: f64,
    pub risk_category: RiskCategory,
    pub risk_level: RiskLevel,
    pub confidence: f64,
    pub model_type: String,

    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub interventions: Vec<Intervention>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Display identity for row `index` (0-based)
pub fn display_identity(index: usize, identity: Option<&StudentIdentity>) -> (String, String) {
    let student_id = identity
        .and_then(|i| i.student_id.clone())
        .unwrap_or_else(|| format!("row-{}", index + 1));
    let name = identity
        .and_then(|i| i.name.clone())
        .unwrap_or_else(|| UNKNOWN_STUDENT.to_string());
    (student_id, name)
}

impl PredictionResult {
    /// Result for a row that could not be scored
    pub fn unable(
        index: usize,
        identity: Option<&StudentIdentity>,
        known: Option<(f64, f64, f64)>,
        error: String,
    ) -> Self {
        let (student_id, name) = display_identity(index, identity);
        let (grade_level, current_gpa, attendance_rate) = known.unwrap_or((0.0, 0.0, 0.0));

        Self {
            student_id,
            name,
            grade_level,
            current_gpa,
            attendance_rate,
            risk_probability: FALLBACK_RISK_PROBABILITY,
            risk_category: RiskCategory::Unknown,
            risk_level: RiskLevel::Warning,
            confidence: 0.0,
            model_type: FALLBACK_MODEL_TYPE.to_string(),
            risk_factors: Vec::new(),
            interventions: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}

// ============================================================================
// BATCH SUMMARY
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total: usize,
    pub low_risk: usize,
    pub moderate_risk: usize,
    pub high_risk: usize,
    pub unable_to_predict: usize,
    /// Mean risk over scored rows (0 when none)
    pub mean_risk: f64,
}

pub fn summarize(results: &[PredictionResult]) -> BatchSummary {
    let mut summary = BatchSummary {
        total: results.len(),
        ..Default::default()
    };

    let mut risk_sum = 0.0;
    for result in results {
        match result.risk_category {
            RiskCategory::Low => summary.low_risk += 1,
            RiskCategory::Moderate => summary.moderate_risk += 1,
            RiskCategory::High => summary.high_risk += 1,
            RiskCategory::Unknown => {
                summary.unable_to_predict += 1;
                continue;
            }
        }
        risk_sum += result.risk_probability;
    }

    let scored = summary.total - summary.unable_to_predict;
    if scored > 0 {
        summary.mean_risk = risk_sum / scored as f64;
    }
    summary
}
