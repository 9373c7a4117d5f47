//! Base Features - canonical inputs to feature engineering
//!
//! Every base feature has a name, a kind and a default. The kind drives
//! value normalization and defaulting in the reconstructor; the default is
//! what a row gets when no column maps to the feature.
//!
//! Field order here is layout order (see `layout.rs`).

use serde::{Deserialize, Serialize};

/// How a base feature is measured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// 0.0 - 4.0 grade point average
    Gpa,
    /// 0.0 - 1.0 share of days present
    Attendance,
    /// 0.0 - 1.0 rate, ratio or probability
    Rate,
    /// 0 - 100 assessment score
    Score,
    /// Non-negative event count (risk counts default to 0)
    Count,
    /// 0 / 1 indicator
    Flag,
    /// Continuous quantity with a domain-plausible default
    Quantity,
}

/// Static description of one base feature
#[derive(Debug, Clone, Copy)]
pub struct BaseFeatureSpec {
    pub name: &'static str,
    pub kind: FeatureKind,
    pub default: f64,
}

macro_rules! base_features {
    ($($name:ident: $kind:ident = $default:expr,)*) => {
        /// Fully populated base feature map (BaseFeatureMap)
        #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
        pub struct BaseFeatures {
            $(pub $name: f64,)*
        }

        /// Base feature definitions in layout order
        pub const BASE_FEATURES: &[BaseFeatureSpec] = &[
            $(BaseFeatureSpec {
                name: stringify!($name),
                kind: FeatureKind::$kind,
                default: $default,
            },)*
        ];

        impl BaseFeatures {
            /// Get feature by name
            pub fn get(&self, name: &str) -> Option<f64> {
                match name {
                    $(stringify!($name) => Some(self.$name),)*
                    _ => None,
                }
            }

            /// Set feature by name; false if the name is not a base feature
            pub fn set(&mut self, name: &str, value: f64) -> bool {
                match name {
                    $(stringify!($name) => {
                        self.$name = value;
                        true
                    })*
                    _ => false,
                }
            }

            /// Values in layout order
            pub fn values(&self) -> Vec<f64> {
                vec![$(self.$name),*]
            }
        }

        impl Default for BaseFeatures {
            fn default() -> Self {
                Self {
                    $($name: $default,)*
                }
            }
        }
    };
}

base_features! {
    // === Academic ===
    current_gpa: Gpa = 2.5,
    previous_gpa: Gpa = 2.3,
    gpa_2_years_ago: Gpa = 2.3,
    attendance_rate: Attendance = 0.95,
    previous_attendance_rate: Attendance = 0.95,
    homework_completion_rate: Rate = 0.5,
    homework_quality: Rate = 0.5,
    class_participation: Rate = 0.5,
    credits_earned_ratio: Rate = 0.5,
    math_score: Score = 81.25,
    reading_score: Score = 81.25,
    science_score: Score = 81.25,
    writing_score: Score = 81.25,
    average_test_score: Score = 81.25,

    // === Behavior (risk counts) ===
    discipline_incidents: Count = 0.0,
    suspensions: Count = 0.0,
    tardies: Count = 0.0,
    absences_unexcused: Count = 0.0,
    behavior_warnings: Count = 0.0,
    peer_conflicts: Count = 0.0,
    assignments_missing: Count = 0.0,
    late_submissions: Count = 0.0,
    course_failures: Count = 0.0,

    // === Engagement & services ===
    extracurricular_count: Count = 0.0,
    library_visits: Count = 0.0,
    lms_logins_per_week: Count = 0.0,
    office_hours_visits: Count = 0.0,
    tutoring_sessions: Count = 0.0,
    counselor_meetings: Count = 0.0,
    school_changes: Count = 0.0,
    health_issues: Count = 0.0,
    early_warning_flags: Count = 0.0,

    // === Family & context ===
    parent_engagement: Rate = 0.5,
    parent_education_level: Quantity = 2.5,
    socioeconomic_status: Rate = 0.5,
    free_lunch_eligible: Flag = 0.0,
    home_internet_access: Flag = 1.0,
    single_parent_household: Flag = 0.0,
    english_learner: Flag = 0.0,
    special_education: Flag = 0.0,
    mentor_assigned: Flag = 0.0,

    // === Disposition & wellbeing ===
    motivation_score: Rate = 0.5,
    self_efficacy: Rate = 0.5,
    teacher_relationship: Rate = 0.5,
    peer_support: Rate = 0.5,
    sleep_hours: Quantity = 8.0,
    study_hours_per_week: Quantity = 5.0,
    grade_level: Quantity = 9.0,
    age: Quantity = 14.0,
}

/// Total number of base features
pub const BASE_FEATURE_COUNT: usize = 49;

/// Lookup the static spec for a base feature
pub fn base_spec(name: &str) -> Option<&'static BaseFeatureSpec> {
    BASE_FEATURES.iter().find(|spec| spec.name == name)
}

/// Subject score names used by mastery/consistency features
pub const SUBJECT_SCORES: [&str; 4] = ["math_score", "reading_score", "science_score", "writing_score"];

impl BaseFeatures {
    /// Subject scores in `SUBJECT_SCORES` order
    pub fn subject_scores(&self) -> [f64; 4] {
        [self.math_score, self.reading_score, self.science_score, self.writing_score]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_feature_count() {
        assert_eq!(BASE_FEATURES.len(), BASE_FEATURE_COUNT);
        assert_eq!(BaseFeatures::default().values().len(), BASE_FEATURE_COUNT);
    }

    #[test]
    fn test_get_set_by_name() {
        let mut features = BaseFeatures::default();
        assert_eq!(features.get("current_gpa"), Some(2.5));
        assert!(features.set("current_gpa", 3.1));
        assert_eq!(features.current_gpa, 3.1);
        assert!(!features.set("not_a_feature", 1.0));
        assert_eq!(features.get("not_a_feature"), None);
    }

    #[test]
    fn test_domain_defaults() {
        let defaults = BaseFeatures::default();
        assert_eq!(defaults.attendance_rate, 0.95);
        assert_eq!(defaults.current_gpa, 2.5);
        assert_eq!(defaults.discipline_incidents, 0.0);
        assert_eq!(defaults.early_warning_flags, 0.0);
        assert_eq!(base_spec("parent_engagement").map(|s| s.kind), Some(FeatureKind::Rate));
    }
}
