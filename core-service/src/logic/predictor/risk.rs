use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{LOW_RISK_UPPER, MODERATE_RISK_UPPER};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskCategory {
    #[serde(rename = "Low Risk")]
    Low,
    #[serde(rename = "Moderate Risk")]
    Moderate,
    #[serde(rename = "High Risk")]
    High,
    #[serde(rename = "Unable to Predict")]
    Unknown,
}

impl RiskCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low Risk",
            Self::Moderate => "Moderate Risk",
            Self::High => "High Risk",
            Self::Unknown => "Unable to Predict",
        }
    }
}

impl fmt::Display for RiskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// UI severity of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Success,
    Warning,
    Danger,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Bucket a risk probability (risk < 0.3 low, < 0.7 moderate, else high)
pub fn categorize(risk: f64) -> (RiskCategory, RiskLevel) {
    if risk < LOW_RISK_UPPER {
        (RiskCategory::Low, RiskLevel::Success)
    } else if risk < MODERATE_RISK_UPPER {
        (RiskCategory::Moderate, RiskLevel::Warning)
    } else {
        (RiskCategory::High, RiskLevel::Danger)
    }
}

/// Distance from the decision midpoint, scaled to [0, 1]
pub fn confidence(risk: f64) -> f64 {
    ((risk - 0.5).abs() * 2.0).clamp(0.0, 1.0)
}
