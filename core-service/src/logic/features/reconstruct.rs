//! Inference Feature Reconstructor
//!
//! Turns one arbitrary `StudentRecord` into the exact vector a trained model
//! expects.
//!
//! # Steps
//! 1. Column mapping through the alias table (first usable synonym wins)
//! 2. Kind-aware value normalization (0-100 rates, 0-100 GPA, flags)
//! 3. Second-order derivation of unobserved base features from observed ones
//!    (history, scores and homework from GPA; disposition and engagement
//!    from a `TraitEstimate` anchored on GPA, scores and attendance)
//! 4. Defaulting for everything still missing
//! 5. `engineer()`
//! 6. Projection onto the persisted feature list, then scaling
//!
//! Nothing here is random and nothing depends on column order, so the same
//! row always reconstructs to the same vector.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::aliases::{lookup_name, lookup_number, lookup_text, STUDENT_ID_ALIASES};
use super::base::{BaseFeatures, FeatureKind, BASE_FEATURES};
use super::engineer::{engineer, EngineeredFeatures};
use super::record::StudentRecord;
use super::vector::{FeatureList, FeatureVector};
use super::ReconstructError;
use crate::logic::model::scaler::RobustScaler;

/// Identity fields read from a row (never model inputs except grade level)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentIdentity {
    pub student_id: Option<String>,
    pub name: Option<String>,
    pub grade_level: Option<f64>,
}

/// Base features resolved from one row
#[derive(Debug, Clone)]
pub struct ResolvedBase {
    pub base: BaseFeatures,
    pub identity: StudentIdentity,
    /// Base features read from a column
    pub observed: Vec<&'static str>,
    /// Base features estimated from observed ones
    pub derived: Vec<&'static str>,
    /// Base features that took their declared default
    pub defaulted: Vec<&'static str>,
}

/// Fully reconstructed row
#[derive(Debug, Clone)]
pub struct Reconstruction {
    pub resolved: ResolvedBase,
    pub engineered: EngineeredFeatures,
    pub vector: FeatureVector,
}

// ============================================================================
// NORMALIZATION
// ============================================================================

/// Top of the unweighted GPA scale
const GPA_CEILING: f64 = 4.0;

/// Largest value still read as a weighted GPA rather than a percentage
const WEIGHTED_GPA_MAX: f64 = 5.0;

/// Bring a raw column value onto the feature's canonical scale
pub fn normalize_value(kind: FeatureKind, value: f64) -> f64 {
    match kind {
        // Weighted GPA (honors / AP on a 5.0 scale) caps at the 4.0 ceiling
        FeatureKind::Gpa if value > GPA_CEILING && value <= WEIGHTED_GPA_MAX => GPA_CEILING,
        // 0-100 GPA (percentage grade) -> 4.0 scale
        FeatureKind::Gpa if value > WEIGHTED_GPA_MAX && value <= 100.0 => value / 25.0,
        FeatureKind::Attendance | FeatureKind::Rate if value > 1.0 && value <= 100.0 => {
            value / 100.0
        }
        FeatureKind::Flag => {
            if value >= 0.5 {
                1.0
            } else {
                0.0
            }
        }
        FeatureKind::Count if value < 0.0 => 0.0,
        _ => value,
    }
}

// ============================================================================
// BASE RESOLUTION
// ============================================================================

/// Steps 1-4: resolve a fully populated base map from a raw row
pub fn resolve_base(record: &StudentRecord) -> ResolvedBase {
    let view = record.normalized();
    let mut base = BaseFeatures::default();
    let mut observed: HashSet<&'static str> = HashSet::new();

    for spec in BASE_FEATURES {
        if let Some((_, raw)) = lookup_number(&view, spec.name) {
            base.set(spec.name, normalize_value(spec.kind, raw));
            observed.insert(spec.name);
        }
    }

    let derived = derive_unobserved(&mut base, &observed);

    let identity = StudentIdentity {
        student_id: lookup_text(&view, STUDENT_ID_ALIASES),
        name: lookup_name(&view),
        grade_level: observed.contains("grade_level").then_some(base.grade_level),
    };

    let mut observed_names = Vec::new();
    let mut defaulted = Vec::new();
    for spec in BASE_FEATURES {
        if observed.contains(spec.name) {
            observed_names.push(spec.name);
        } else if !derived.contains(&spec.name) {
            defaulted.push(spec.name);
        }
    }

    ResolvedBase {
        base,
        identity,
        observed: observed_names,
        derived,
        defaulted,
    }
}

/// Student profile estimated from observed anchor columns, each in (0, 1]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitEstimate {
    pub ability: f64,
    pub support: f64,
    pub motivation: f64,
}

const TRAIT_FLOOR: f64 = 0.05;

fn trait_clip(value: f64) -> f64 {
    value.clamp(TRAIT_FLOOR, 1.0)
}

impl TraitEstimate {
    /// Invert the typical GPA, test score, attendance and parent engagement
    /// relationships. `None` when no anchor column was observed.
    ///
    /// - ability: `gpa ≈ 4·a^0.8`, else `score ≈ 45 + 50·a`
    /// - support: `parent_engagement ≈ 0.15 + 0.75·f`, else
    ///   `attendance ≈ 0.6 + 0.25·a + 0.15·f`, else `f = a`
    /// - motivation: `motivation_score` if observed, else `(a + f) / 2`
    pub fn from_observed(base: &BaseFeatures, observed: &HashSet<&'static str>) -> Option<Self> {
        let seen = |name: &str| observed.contains(name);

        let mut ability = if seen("current_gpa") {
            Some(trait_clip((base.current_gpa / GPA_CEILING).max(0.0).powf(1.25)))
        } else if seen("average_test_score") {
            Some(trait_clip((base.average_test_score - 45.0) / 50.0))
        } else {
            None
        };

        let support = if seen("parent_engagement") {
            Some(trait_clip((base.parent_engagement - 0.15) / 0.75))
        } else if seen("attendance_rate") {
            match ability {
                Some(a) => Some(trait_clip((base.attendance_rate - 0.6 - 0.25 * a) / 0.15)),
                None => {
                    // Attendance alone: one shared level for ability and support
                    let level = trait_clip((base.attendance_rate - 0.6) / 0.4);
                    ability = Some(level);
                    Some(level)
                }
            }
        } else {
            ability
        };

        let (ability, support) = match (ability, support) {
            (Some(a), Some(f)) => (a, f),
            (None, Some(f)) => (f, f),
            (Some(a), None) => (a, a),
            (None, None) => return None,
        };

        let motivation = if seen("motivation_score") {
            trait_clip(base.motivation_score)
        } else {
            (ability + support) / 2.0
        };

        Some(Self {
            ability,
            support,
            motivation,
        })
    }

    /// Expected disposition and engagement values for this profile
    pub fn expected_features(&self) -> [(&'static str, f64); 11] {
        let a = self.ability;
        let f = self.support;
        let m = self.motivation;
        let rate = |v: f64| v.clamp(0.0, 1.0);
        [
            ("motivation_score", m),
            ("self_efficacy", rate(0.5 * m + 0.4 * a)),
            ("teacher_relationship", rate(0.2 + 0.4 * m + 0.3 * a)),
            ("peer_support", rate(0.3 + 0.3 * f + 0.3 * m)),
            ("class_participation", rate(0.2 + 0.5 * m + 0.2 * a)),
            ("parent_engagement", rate(0.15 + 0.75 * f)),
            ("study_hours_per_week", (1.0 + 10.0 * m * a).clamp(0.0, 25.0)),
            ("lms_logins_per_week", 2.0 + 8.0 * m),
            ("library_visits", 0.5 + 5.0 * a * m),
            ("office_hours_visits", 0.2 + 2.0 * m * a),
            ("extracurricular_count", 0.3 + 2.5 * (0.5 * m + 0.5 * f)),
        ]
    }
}

/// Estimate unobserved base features from observed ones.
///
/// A feature is derived only when its source was observed; otherwise it keeps
/// the declared default. Risk counts (discipline, absences, failures) are
/// never derived.
fn derive_unobserved(base: &mut BaseFeatures, observed: &HashSet<&'static str>) -> Vec<&'static str> {
    let mut derived = Vec::new();
    let missing = |name: &str| !observed.contains(name);
    let gpa_seen = observed.contains("current_gpa");
    let gpa = base.current_gpa;
    let traits = TraitEstimate::from_observed(base, observed);

    let mut put = |name: &'static str, value: f64, base: &mut BaseFeatures| {
        base.set(name, value);
        derived.push(name);
    };

    if gpa_seen && missing("previous_gpa") {
        put("previous_gpa", (gpa - 0.2).max(0.0), base);
    }
    if (gpa_seen || observed.contains("previous_gpa")) && missing("gpa_2_years_ago") {
        let previous = base.previous_gpa;
        put("gpa_2_years_ago", previous, base);
    }
    if observed.contains("attendance_rate") && missing("previous_attendance_rate") {
        let attendance = base.attendance_rate;
        put("previous_attendance_rate", attendance, base);
    }
    if gpa_seen {
        let estimated_score = 50.0 + 12.5 * gpa;
        for name in [
            "math_score",
            "reading_score",
            "science_score",
            "writing_score",
            "average_test_score",
        ] {
            if missing(name) {
                put(name, estimated_score, base);
            }
        }
        if missing("homework_completion_rate") {
            put("homework_completion_rate", (0.35 + 0.15 * gpa).clamp(0.0, 1.0), base);
        }
        if missing("homework_quality") {
            put("homework_quality", gpa / 4.0, base);
        }
        if missing("credits_earned_ratio") {
            put("credits_earned_ratio", (0.5 + gpa / 8.0).clamp(0.0, 1.0), base);
        }
    }
    if let Some(traits) = traits {
        for (name, value) in traits.expected_features() {
            if missing(name) {
                put(name, value, base);
            }
        }
    }
    if observed.contains("grade_level") && missing("age") {
        let age = base.grade_level + 5.0;
        put("age", age, base);
    }

    derived
}

// ============================================================================
// FULL RECONSTRUCTION
// ============================================================================

/// Reconstruct the model input vector for one row
pub fn reconstruct(
    record: &StudentRecord,
    feature_list: &FeatureList,
    scaler: Option<&RobustScaler>,
) -> Result<Reconstruction, ReconstructError> {
    reconstruct_resolved(resolve_base(record), feature_list, scaler)
}

/// Steps 5-6 for a row already resolved with `resolve_base`
pub fn reconstruct_resolved(
    resolved: ResolvedBase,
    feature_list: &FeatureList,
    scaler: Option<&RobustScaler>,
) -> Result<Reconstruction, ReconstructError> {
    if !resolved.defaulted.is_empty() {
        log::debug!(
            "[Reconstruct] {} base features defaulted: {:?}",
            resolved.defaulted.len(),
            resolved.defaulted
        );
    }

    let engineered = engineer(&resolved.base);
    let mut vector = FeatureVector::project(&engineered, feature_list);

    if let Some((feature, value)) = vector.first_non_finite(feature_list) {
        return Err(ReconstructError::NonFinite { feature, value });
    }

    if let Some(scaler) = scaler {
        if scaler.len() != vector.len() {
            return Err(ReconstructError::ScalerMismatch {
                expected: scaler.len(),
                actual: vector.len(),
            });
        }
        scaler.transform_row(&mut vector.values);
        if let Some((feature, value)) = vector.first_non_finite(feature_list) {
            return Err(ReconstructError::NonFinite { feature, value });
        }
    }

    Ok(Reconstruction {
        resolved,
        engineered,
        vector,
    })
}
