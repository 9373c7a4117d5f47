//! Column Alias Table
//!
//! Canonical base-feature name -> accepted column names, in priority order.
//! Lookups run against normalized column names (see `record.rs`), so every
//! alias here is already lowercase snake_case. The canonical name itself is
//! always tried first.

use super::record::NormalizedRecord;

/// Accepted synonyms per base feature (canonical name excluded)
pub const ALIASES: &[(&str, &[&str])] = &[
    ("current_gpa", &["gpa", "grade_avg", "current_grade", "cumulative_gpa", "gpa_current"]),
    ("previous_gpa", &["prior_gpa", "last_year_gpa", "gpa_previous", "prev_gpa"]),
    ("gpa_2_years_ago", &["gpa_two_years_ago", "gpa_2y", "gpa_prior_2"]),
    ("attendance_rate", &["attendance", "attendance_pct", "attendance_percent", "pct_attendance"]),
    ("previous_attendance_rate", &["prior_attendance", "last_year_attendance", "prev_attendance"]),
    ("homework_completion_rate", &["homework_completion", "hw_completion", "homework_rate"]),
    ("homework_quality", &["hw_quality", "homework_grade"]),
    ("class_participation", &["participation", "participation_rate"]),
    ("credits_earned_ratio", &["credits_ratio", "credit_completion", "credits_earned_pct"]),
    ("math_score", &["math", "math_grade", "math_test_score"]),
    ("reading_score", &["reading", "reading_grade", "ela_score", "english_score"]),
    ("science_score", &["science", "science_grade"]),
    ("writing_score", &["writing", "writing_grade"]),
    ("average_test_score", &["test_score", "avg_test_score", "standardized_test_score", "test_avg"]),
    ("discipline_incidents", &["discipline", "disciplinary_incidents", "behavior_incidents", "incidents"]),
    ("suspensions", &["suspension_count", "num_suspensions"]),
    ("tardies", &["tardy_count", "late_arrivals"]),
    ("absences_unexcused", &["unexcused_absences", "unexcused"]),
    ("behavior_warnings", &["warnings", "behavior_referrals", "referrals"]),
    ("peer_conflicts", &["conflicts"]),
    ("assignments_missing", &["missing_assignments", "missing_work"]),
    ("late_submissions", &["late_assignments", "late_work"]),
    ("course_failures", &["failed_courses", "courses_failed", "failures"]),
    ("extracurricular_count", &["extracurriculars", "activities", "clubs"]),
    ("library_visits", &["library_usage"]),
    ("lms_logins_per_week", &["lms_logins", "online_logins", "logins_per_week"]),
    ("office_hours_visits", &["office_hours"]),
    ("tutoring_sessions", &["tutoring", "tutoring_count"]),
    ("counselor_meetings", &["counseling_sessions", "counselor_visits"]),
    ("school_changes", &["schools_attended", "transfers", "mobility"]),
    ("health_issues", &["health_conditions", "medical_issues"]),
    ("early_warning_flags", &["warning_flags", "ews_flags", "early_warnings"]),
    ("parent_engagement", &["parental_involvement", "parent_involvement", "family_engagement"]),
    ("parent_education_level", &["parent_education", "parental_education"]),
    ("socioeconomic_status", &["ses", "socioeconomic", "income_level"]),
    ("free_lunch_eligible", &["free_lunch", "frl", "free_reduced_lunch", "lunch_status"]),
    ("home_internet_access", &["internet_access", "home_internet", "internet"]),
    ("single_parent_household", &["single_parent"]),
    ("english_learner", &["ell", "esl", "limited_english"]),
    ("special_education", &["iep", "sped", "special_ed"]),
    ("mentor_assigned", &["has_mentor", "mentor"]),
    ("motivation_score", &["motivation"]),
    ("self_efficacy", &["self_efficacy_score", "confidence_score"]),
    ("teacher_relationship", &["teacher_rapport", "teacher_connection"]),
    ("peer_support", &["peer_relationships", "friend_support"]),
    ("sleep_hours", &["sleep", "hours_of_sleep"]),
    ("study_hours_per_week", &["study_hours", "study_time", "weekly_study_hours"]),
    ("grade_level", &["grade", "year", "class_year", "grade_lvl"]),
    ("age", &["student_age", "age_years"]),
];

/// Identity columns carried into results
pub const STUDENT_ID_ALIASES: &[&str] = &["student_id", "id", "studentid", "student_number", "sid"];
pub const NAME_ALIASES: &[&str] = &["name", "student_name", "full_name"];
pub const FIRST_NAME_ALIASES: &[&str] = &["first_name", "firstname", "given_name"];
pub const LAST_NAME_ALIASES: &[&str] = &["last_name", "lastname", "surname", "family_name"];

/// Synonyms for a canonical base feature (empty if none are registered)
pub fn aliases_for(canonical: &str) -> &'static [&'static str] {
    ALIASES
        .iter()
        .find(|(name, _)| *name == canonical)
        .map(|(_, synonyms)| *synonyms)
        .unwrap_or(&[])
}

/// First usable numeric value for `canonical`: the canonical column, then
/// each synonym in order. Returns the matched column with the value.
pub fn lookup_number(
    record: &NormalizedRecord<'_>,
    canonical: &'static str,
) -> Option<(&'static str, f64)> {
    std::iter::once(canonical)
        .chain(aliases_for(canonical).iter().copied())
        .find_map(|column| record.number(column).map(|v| (column, v)))
}

/// First non-empty text value among `columns`
pub fn lookup_text(record: &NormalizedRecord<'_>, columns: &[&str]) -> Option<String> {
    columns.iter().find_map(|column| record.text(column))
}

/// Student display name: a name column, else first + last name
pub fn lookup_name(record: &NormalizedRecord<'_>) -> Option<String> {
    if let Some(name) = lookup_text(record, NAME_ALIASES) {
        return Some(name);
    }
    let first = lookup_text(record, FIRST_NAME_ALIASES);
    let last = lookup_text(record, LAST_NAME_ALIASES);
    match (first, last) {
        (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
        (Some(only), None) | (None, Some(only)) => Some(only),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::features::base::BASE_FEATURES;
    use crate::logic::features::record::StudentRecord;
    use serde_json::json;

    #[test]
    fn test_every_alias_names_a_base_feature() {
        for (canonical, _) in ALIASES {
            assert!(
                BASE_FEATURES.iter().any(|spec| spec.name == *canonical),
                "{} is not a base feature",
                canonical
            );
        }
    }

    #[test]
    fn test_synonyms_do_not_collide_across_features() {
        let mut seen = std::collections::HashSet::new();
        for (canonical, synonyms) in ALIASES {
            for synonym in *synonyms {
                assert!(seen.insert(*synonym), "{} reused (at {})", synonym, canonical);
            }
        }
    }

    #[test]
    fn test_canonical_wins_over_synonym() {
        let record = StudentRecord::from_pairs([("gpa", json!(2.0)), ("current_gpa", json!(3.5))]);
        let view = record.normalized();
        assert_eq!(lookup_number(&view, "current_gpa"), Some(("current_gpa", 3.5)));
    }

    #[test]
    fn test_first_synonym_with_value_wins() {
        let record = StudentRecord::from_pairs([
            ("GPA", json!(null)),
            ("Grade Avg", json!("3.1")),
            ("current_grade", json!(2.0)),
        ]);
        let view = record.normalized();
        assert_eq!(lookup_number(&view, "current_gpa"), Some(("grade_avg", 3.1)));
    }

    #[test]
    fn test_name_from_first_and_last() {
        let record = StudentRecord::from_pairs([("First Name", "Ada"), ("Last Name", "Lovelace")]);
        assert_eq!(lookup_name(&record.normalized()), Some("Ada Lovelace".to_string()));
    }
}
