use serde::{Deserialize, Serialize};

use crate::logic::features::{StudentRecord, BASE_FEATURES};
use crate::logic::synthetic::{Archetype, SyntheticStudent};

/// One labeled training row
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DatasetRecord {
    /// 1.0 = success, 0.0 = not
    pub label: f64,

    // Generator context (absent for real data)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archetype: Option<Archetype>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success_probability: Option<f64>,

    /// Raw columns; reconstructed exactly like an inference row
    pub features: StudentRecord,
}

impl DatasetRecord {
    pub fn new(label: f64, features: StudentRecord) -> Self {
        Self {
            label,
            archetype: None,
            success_probability: None,
            features,
        }
    }

    /// Synthetic student as a raw row keyed by canonical base-feature names
    pub fn from_synthetic(student: &SyntheticStudent) -> Self {
        let features = StudentRecord::from_pairs(BASE_FEATURES.iter().filter_map(|spec| {
            student
                .base
                .get(spec.name)
                .map(|value| (spec.name, serde_json::Value::from(value)))
        }));

        Self {
            label: student.label,
            archetype: Some(student.archetype),
            success_probability: Some(student.success_probability),
            features,
        }
    }

    pub fn is_success(&self) -> bool {
        self.label >= 0.5
    }
}
