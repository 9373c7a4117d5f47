//! Feature Engineering - BaseFeatures -> EngineeredFeatures
//!
//! `engineer()` is pure and total: the same base map always yields the same
//! engineered map, and it is the only place derived features are computed.
//! Training and inference both call it; nothing here knows which one is
//! running.
//!
//! # Derived groups (layout order)
//! - polynomial terms of GPA and attendance
//! - pairwise and triple interaction products
//! - fixed-weight composites (academic excellence, family support,
//!   behavioral stability, engagement, support services)
//! - trend / momentum terms from multi-year deltas
//! - subject mastery and consistency
//! - count transforms and context composites
//! - risk / protective factor aggregates

use serde::{Deserialize, Serialize};

use super::base::BaseFeatures;

macro_rules! derived_features {
    ($($name:ident,)*) => {
        /// Features computed from base features
        #[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
        pub struct DerivedFeatures {
            $(pub $name: f64,)*
        }

        /// Derived feature names in layout order
        pub const DERIVED_FEATURES: &[&str] = &[$(stringify!($name),)*];

        impl DerivedFeatures {
            pub fn get(&self, name: &str) -> Option<f64> {
                match name {
                    $(stringify!($name) => Some(self.$name),)*
                    _ => None,
                }
            }

            pub fn values(&self) -> Vec<f64> {
                vec![$(self.$name),*]
            }
        }
    };
}

derived_features! {
    // Polynomial
    gpa_squared,
    gpa_cubed,
    attendance_squared,
    attendance_cubed,
    // Interactions
    gpa_x_attendance,
    gpa_x_parent_engagement,
    attendance_x_parent_engagement,
    gpa_x_homework_quality,
    gpa_attendance_homework,
    // Composites
    academic_excellence_score,
    family_support_score,
    behavioral_stability_score,
    engagement_score,
    support_services_score,
    // Trends
    gpa_trend,
    gpa_trajectory,
    gpa_acceleration,
    attendance_trend,
    academic_momentum,
    risk_momentum,
    // Subject mastery
    subject_mastery_avg,
    subject_consistency,
    subject_min,
    subject_range,
    // Count transforms & context
    missing_work_ratio,
    absence_days_estimate,
    log_discipline_incidents,
    log_unexcused_absences,
    behavioral_incident_total,
    socioeconomic_risk,
    wellbeing_score,
    motivation_composite,
    study_efficiency,
    age_grade_gap,
    // Aggregates
    cumulative_risk_factors,
    protective_factors_count,
    high_risk_indicator,
    protective_factor_strength,
    risk_protective_balance,
    overall_risk_index,
}

/// Total number of derived features
pub const DERIVED_FEATURE_COUNT: usize = 40;

/// Instructional days used to turn attendance into days missed
const SCHOOL_YEAR_DAYS: f64 = 180.0;

// ============================================================================
// RISK / PROTECTIVE CHECKS
// ============================================================================

/// Number of boolean risk checks
pub const RISK_CHECK_COUNT: usize = 12;

/// Number of boolean protective checks
pub const PROTECTIVE_CHECK_COUNT: usize = 9;

/// Boolean risk checks, named for explanations
pub fn risk_checks(b: &BaseFeatures) -> [(&'static str, bool); RISK_CHECK_COUNT] {
    [
        ("low_gpa", b.current_gpa < 2.0),
        ("poor_attendance", b.attendance_rate < 0.90),
        ("discipline_issues", b.discipline_incidents >= 2.0),
        ("suspension_history", b.suspensions >= 1.0),
        ("missing_assignments", b.assignments_missing >= 5.0),
        ("course_failures", b.course_failures >= 1.0),
        ("unexcused_absences", b.absences_unexcused >= 5.0),
        ("declining_grades", b.current_gpa - b.previous_gpa <= -0.3),
        ("low_homework_completion", b.homework_completion_rate < 0.6),
        ("early_warning_flags", b.early_warning_flags >= 1.0),
        ("frequent_school_changes", b.school_changes >= 2.0),
        (
            "economic_hardship",
            b.free_lunch_eligible >= 0.5 && b.single_parent_household >= 0.5,
        ),
    ]
}

/// Boolean protective checks
pub fn protective_checks(b: &BaseFeatures) -> [(&'static str, bool); PROTECTIVE_CHECK_COUNT] {
    [
        ("strong_gpa", b.current_gpa >= 3.0),
        ("excellent_attendance", b.attendance_rate >= 0.95),
        ("engaged_parents", b.parent_engagement >= 0.7),
        ("extracurricular_involvement", b.extracurricular_count >= 2.0),
        ("homework_consistency", b.homework_completion_rate >= 0.9),
        ("mentor_support", b.mentor_assigned >= 0.5),
        ("teacher_connection", b.teacher_relationship >= 0.7),
        ("peer_support", b.peer_support >= 0.7),
        ("high_motivation", b.motivation_score >= 0.7),
    ]
}

/// Names of the risk checks that fire for this student
pub fn active_risk_factors(b: &BaseFeatures) -> Vec<String> {
    risk_checks(b)
        .iter()
        .filter(|(_, fired)| *fired)
        .map(|(name, _)| name.to_string())
        .collect()
}

// ============================================================================
// ENGINEERED FEATURES
// ============================================================================

/// Base features plus derived features (EngineeredFeatureMap)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineeredFeatures {
    pub base: BaseFeatures,
    pub derived: DerivedFeatures,
}

impl EngineeredFeatures {
    /// Get any engineered feature (base or derived) by name
    pub fn get(&self, name: &str) -> Option<f64> {
        self.base.get(name).or_else(|| self.derived.get(name))
    }

    /// All values in engineered layout order
    pub fn values(&self) -> Vec<f64> {
        let mut values = self.base.values();
        values.extend(self.derived.values());
        values
    }
}

#[inline]
fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Engineer the full derived feature set from a fully-defaulted base map
pub fn engineer(base: &BaseFeatures) -> EngineeredFeatures {
    let b = base;
    let gpa = b.current_gpa;
    let att = b.attendance_rate;

    // --- Trends ---
    let gpa_trend = gpa - b.previous_gpa;
    let prior_trend = b.previous_gpa - b.gpa_2_years_ago;
    let attendance_trend = att - b.previous_attendance_rate;

    // --- Subjects ---
    let subjects = b.subject_scores();
    let subject_mean = subjects.iter().sum::<f64>() / subjects.len() as f64;
    let subject_var = subjects.iter().map(|s| (s - subject_mean).powi(2)).sum::<f64>()
        / subjects.len() as f64;
    let subject_min = subjects.iter().copied().fold(f64::INFINITY, f64::min);
    let subject_max = subjects.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    // --- Composites ---
    let academic_excellence_score = 0.4 * (gpa / 4.0)
        + 0.3 * (b.average_test_score / 100.0)
        + 0.2 * b.homework_quality
        + 0.1 * b.credits_earned_ratio;

    let family_support_score = 0.35 * b.parent_engagement
        + 0.2 * (b.parent_education_level / 5.0)
        + 0.2 * b.socioeconomic_status
        + 0.1 * b.home_internet_access
        + 0.15 * (1.0 - b.single_parent_household);

    let behavioral_load = 0.12 * b.discipline_incidents
        + 0.25 * b.suspensions
        + 0.03 * b.tardies
        + 0.04 * b.absences_unexcused
        + 0.08 * b.behavior_warnings
        + 0.05 * b.peer_conflicts;
    let behavioral_stability_score = 1.0 - behavioral_load.min(1.0);

    let engagement_score = 0.3 * b.homework_completion_rate
        + 0.25 * b.class_participation
        + 0.15 * (b.extracurricular_count / 3.0).min(1.0)
        + 0.15 * (b.lms_logins_per_week / 10.0).min(1.0)
        + 0.15 * (b.library_visits / 6.0).min(1.0);

    let support_services_score = 0.7
        * (0.1 * (b.tutoring_sessions + b.office_hours_visits + b.counselor_meetings)).min(1.0)
        + 0.3 * b.mentor_assigned;

    // --- Momentum ---
    let academic_momentum =
        0.5 * gpa_trend + 0.3 * attendance_trend * 4.0 + 0.2 * (b.homework_completion_rate - 0.75);
    let risk_momentum = 0.4 * (-gpa_trend).max(0.0)
        + 0.3 * (-attendance_trend).max(0.0) * 4.0
        + 0.2 * (b.discipline_incidents / 5.0).min(1.0)
        + 0.1 * (b.assignments_missing / 10.0).min(1.0);

    // --- Aggregates ---
    let risks = risk_checks(b);
    let protections = protective_checks(b);
    let cumulative_risk_factors = risks.iter().filter(|(_, fired)| *fired).count() as f64;
    let protective_factors_count = protections.iter().filter(|(_, held)| *held).count() as f64;

    let high_risk_indicator = if cumulative_risk_factors >= 4.0
        || gpa < 1.5
        || att < 0.8
        || b.suspensions >= 2.0
    {
        1.0
    } else {
        0.0
    };

    let protective_factor_strength = 0.25 * (gpa / 4.0).min(1.0)
        + 0.2 * att
        + 0.15 * b.parent_engagement
        + 0.1 * (b.extracurricular_count / 3.0).min(1.0)
        + 0.1 * b.teacher_relationship
        + 0.1 * b.peer_support
        + 0.1 * b.motivation_score;

    let attendance_term = clamp01((att - 0.6) / 0.4);
    let overall_risk_index = 0.3 * (1.0 - clamp01(academic_excellence_score))
        + 0.25 * (1.0 - attendance_term)
        + 0.2 * (1.0 - behavioral_stability_score)
        + 0.15 * (1.0 - clamp01(family_support_score))
        + 0.1 * (1.0 - clamp01(engagement_score));

    let derived = DerivedFeatures {
        gpa_squared: gpa.powi(2),
        gpa_cubed: gpa.powi(3),
        attendance_squared: att.powi(2),
        attendance_cubed: att.powi(3),

        gpa_x_attendance: gpa * att,
        gpa_x_parent_engagement: gpa * b.parent_engagement,
        attendance_x_parent_engagement: att * b.parent_engagement,
        gpa_x_homework_quality: gpa * b.homework_quality,
        gpa_attendance_homework: gpa * att * b.homework_completion_rate,

        academic_excellence_score,
        family_support_score,
        behavioral_stability_score,
        engagement_score,
        support_services_score,

        gpa_trend,
        gpa_trajectory: (gpa - b.gpa_2_years_ago) / 2.0,
        gpa_acceleration: gpa_trend - prior_trend,
        attendance_trend,
        academic_momentum,
        risk_momentum,

        subject_mastery_avg: subject_mean / 100.0,
        subject_consistency: 1.0 - (subject_var.sqrt() / 25.0).min(1.0),
        subject_min: subject_min / 100.0,
        subject_range: (subject_max - subject_min) / 100.0,

        missing_work_ratio: b.assignments_missing / (b.assignments_missing + 20.0),
        absence_days_estimate: (1.0 - att) * SCHOOL_YEAR_DAYS,
        log_discipline_incidents: b.discipline_incidents.max(0.0).ln_1p(),
        log_unexcused_absences: b.absences_unexcused.max(0.0).ln_1p(),
        behavioral_incident_total: b.discipline_incidents
            + 2.0 * b.suspensions
            + b.behavior_warnings
            + b.peer_conflicts,
        socioeconomic_risk: 0.4 * b.free_lunch_eligible
            + 0.3 * (1.0 - b.socioeconomic_status)
            + 0.15 * (1.0 - b.home_internet_access)
            + 0.15 * b.single_parent_household,
        wellbeing_score: 0.4 * (b.sleep_hours / 9.0).min(1.0)
            + 0.3 * (1.0 - (b.health_issues / 4.0).min(1.0))
            + 0.3 * b.peer_support,
        motivation_composite: 0.4 * b.motivation_score
            + 0.3 * b.self_efficacy
            + 0.3 * b.teacher_relationship,
        study_efficiency: (gpa / 4.0) / (1.0 + b.study_hours_per_week.max(0.0).ln_1p()),
        age_grade_gap: b.age - (b.grade_level + 5.0),

        cumulative_risk_factors,
        protective_factors_count,
        high_risk_indicator,
        protective_factor_strength,
        risk_protective_balance: protective_factors_count - cumulative_risk_factors,
        overall_risk_index,
    };

    EngineeredFeatures {
        base: *base,
        derived,
    }
}
