//! Intervention recommendations from fired risk checks and risk level.

use serde::{Deserialize, Serialize};

use crate::logic::predictor::risk::RiskLevel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intervention {
    AcademicTutoring,
    AttendanceOutreach,
    BehaviorSupport,
    FamilyEngagement,
    Counseling,
    Mentoring,
    Monitoring,
}

impl Intervention {
    pub fn description(&self) -> &'static str {
        match self {
            Self::AcademicTutoring => "Schedule academic tutoring and a homework support plan",
            Self::AttendanceOutreach => "Start attendance outreach with the student and family",
            Self::BehaviorSupport => "Refer to behavior support and review the discipline record",
            Self::FamilyEngagement => "Arrange a family engagement meeting and connect resources",
            Self::Counseling => "Refer to the school counselor for a check-in",
            Self::Mentoring => "Assign a staff mentor with weekly contact",
            Self::Monitoring => "Keep monitoring grades and attendance each grading period",
        }
    }

    /// Intervention addressing one named risk check
    fn for_factor(factor: &str) -> Option<Self> {
        match factor {
            "low_gpa" | "course_failures" | "missing_assignments" | "low_homework_completion"
            | "declining_grades" => Some(Self::AcademicTutoring),
            "poor_attendance" | "unexcused_absences" => Some(Self::AttendanceOutreach),
            "discipline_issues" | "suspension_history" => Some(Self::BehaviorSupport),
            "economic_hardship" | "frequent_school_changes" => Some(Self::FamilyEngagement),
            "early_warning_flags" => Some(Self::Counseling),
            _ => None,
        }
    }
}

/// Recommended interventions, deduplicated, in a fixed order
pub fn recommend(risk_factors: &[String], level: RiskLevel) -> Vec<Intervention> {
    let mut picks: Vec<Intervention> = risk_factors
        .iter()
        .filter_map(|f| Intervention::for_factor(f))
        .collect();

    match level {
        RiskLevel::Danger => {
            picks.push(Intervention::Mentoring);
            picks.push(Intervention::Counseling);
        }
        RiskLevel::Warning if picks.is_empty() => picks.push(Intervention::Monitoring),
        _ => {}
    }

    picks.sort();
    picks.dedup();
    picks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factors(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_factors_map_to_interventions() {
        let picks = recommend(&factors(&["low_gpa", "course_failures", "poor_attendance"]), RiskLevel::Warning);
        assert_eq!(picks, vec![Intervention::AcademicTutoring, Intervention::AttendanceOutreach]);
    }

    #[test]
    fn test_danger_adds_mentoring_and_counseling() {
        let picks = recommend(&factors(&["early_warning_flags"]), RiskLevel::Danger);
        assert_eq!(picks, vec![Intervention::Counseling, Intervention::Mentoring]);
    }

    #[test]
    fn test_quiet_warning_gets_monitoring() {
        assert_eq!(recommend(&[], RiskLevel::Warning), vec![Intervention::Monitoring]);
        assert!(recommend(&[], RiskLevel::Success).is_empty());
    }

    #[test]
    fn test_unknown_factor_is_ignored() {
        assert!(recommend(&factors(&["left_handed"]), RiskLevel::Success).is_empty());
    }
}
