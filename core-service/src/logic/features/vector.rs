//! Feature Vector - Core data structure for model input
//!
//! **Selected-feature vector with list hash**
//!
//! A trained model consumes only the features chosen at selection time, in
//! the order they were chosen. `FeatureList` is that ordered list (persisted
//! as a plain JSON array); `FeatureVector` is one row projected onto it.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::engineer::EngineeredFeatures;
use super::layout::{hash_names, FEATURE_VERSION};

// ============================================================================
// FEATURE LIST
// ============================================================================

/// Ordered feature names a model was trained on
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct FeatureList {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl FeatureList {
    pub fn new(names: Vec<String>) -> Self {
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, index }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// CRC32 over the ordered names
    pub fn hash(&self) -> u32 {
        hash_names(FEATURE_VERSION, self.names.iter().map(String::as_str))
    }
}

impl From<Vec<String>> for FeatureList {
    fn from(names: Vec<String>) -> Self {
        Self::new(names)
    }
}

impl From<FeatureList> for Vec<String> {
    fn from(list: FeatureList) -> Self {
        list.names
    }
}

// ============================================================================
// FEATURE VECTOR
// ============================================================================

/// One row projected onto a `FeatureList`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Hash of the list this vector was projected onto
    pub list_hash: u32,
    /// Values in list order
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// Project engineered features onto `list`.
    ///
    /// A listed name the engineered map lacks becomes 0.0 and is logged.
    pub fn project(engineered: &EngineeredFeatures, list: &FeatureList) -> Self {
        let values = list
            .names()
            .iter()
            .map(|name| {
                engineered.get(name).unwrap_or_else(|| {
                    log::debug!("[Features] '{}' missing from engineered map, using 0.0", name);
                    0.0
                })
            })
            .collect();

        Self {
            list_hash: list.hash(),
            values,
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get value by feature name (looked up through the list)
    pub fn get_by_name(&self, list: &FeatureList, name: &str) -> Option<f64> {
        list.position(name).and_then(|i| self.values.get(i).copied())
    }

    /// First non-finite value, if any
    pub fn first_non_finite(&self, list: &FeatureList) -> Option<(String, f64)> {
        self.values
            .iter()
            .enumerate()
            .find(|(_, v)| !v.is_finite())
            .map(|(i, v)| {
                let name = list.names().get(i).cloned().unwrap_or_else(|| format!("#{}", i));
                (name, *v)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::base::BaseFeatures;
    use crate::logic::features::engineer::engineer;

    fn list(names: &[&str]) -> FeatureList {
        FeatureList::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_project_in_list_order() {
        let base = BaseFeatures {
            current_gpa: 3.0,
            attendance_rate: 0.9,
            ..Default::default()
        };
        let engineered = engineer(&base);
        let features = list(&["gpa_squared", "attendance_rate", "current_gpa"]);
        let vector = FeatureVector::project(&engineered, &features);
        assert_eq!(vector.values, vec![9.0, 0.9, 3.0]);
        assert_eq!(vector.get_by_name(&features, "current_gpa"), Some(3.0));
    }

    #[test]
    fn test_project_missing_name_is_zero() {
        let engineered = engineer(&BaseFeatures::default());
        let features = list(&["current_gpa", "not_engineered"]);
        let vector = FeatureVector::project(&engineered, &features);
        assert_eq!(vector.values[1], 0.0);
    }

    #[test]
    fn test_feature_list_json_is_array() {
        let features = list(&["a", "b"]);
        let json = serde_json::to_string(&features).unwrap();
        assert_eq!(json, r#"["a","b"]"#);
        let back: FeatureList = serde_json::from_str(&json).unwrap();
        assert_eq!(back.position("b"), Some(1));
    }

    #[test]
    fn test_list_hash_depends_on_order() {
        assert_ne!(list(&["a", "b"]).hash(), list(&["b", "a"]).hash());
    }

    #[test]
    fn test_first_non_finite() {
        let features = list(&["a", "b"]);
        let vector = FeatureVector {
            list_hash: features.hash(),
            values: vec![1.0, f64::INFINITY],
        };
        assert_eq!(vector.first_non_finite(&features).map(|(n, _)| n), Some("b".to_string()));
    }
}
