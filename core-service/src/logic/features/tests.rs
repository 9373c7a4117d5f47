//! Integration Tests for Feature Reconstruction
//!
//! Raw rows through alias mapping, defaulting, engineering and projection.

#[cfg(test)]
mod integration_tests {
    use serde_json::json;

    use crate::logic::features::engineer::active_risk_factors;
    use crate::logic::features::{
        engineer, engineered_layout, reconstruct, resolve_base, FeatureList, ReconstructError,
        StudentRecord,
    };
    use crate::logic::model::scaler::RobustScaler;

    fn full_list() -> FeatureList {
        FeatureList::new(engineered_layout().iter().map(|s| s.to_string()).collect())
    }

    fn list(names: &[&str]) -> FeatureList {
        FeatureList::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_empty_row_uses_defaults() {
        let resolved = resolve_base(&StudentRecord::new());
        assert!(resolved.observed.is_empty());
        assert!(resolved.derived.is_empty());
        assert_eq!(resolved.base.current_gpa, 2.5);
        assert_eq!(resolved.base.attendance_rate, 0.95);
        assert_eq!(resolved.base.discipline_incidents, 0.0);

        let rec = reconstruct(&StudentRecord::new(), &full_list(), None).unwrap();
        assert_eq!(rec.vector.len(), full_list().len());
    }

    #[test]
    fn test_alias_and_scale_normalization() {
        let record = StudentRecord::from_pairs([
            ("GPA", json!("3.6")),
            ("Attendance %", json!("92%")),
            ("Free Lunch", json!("yes")),
            ("Parent Involvement", json!(80)),
        ]);
        let resolved = resolve_base(&record);
        assert!((resolved.base.current_gpa - 3.6).abs() < 1e-12);
        assert!((resolved.base.attendance_rate - 0.92).abs() < 1e-12);
        assert_eq!(resolved.base.free_lunch_eligible, 1.0);
        assert!((resolved.base.parent_engagement - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_percentage_gpa_converted() {
        let record = StudentRecord::from_pairs([("current_gpa", json!(85))]);
        let resolved = resolve_base(&record);
        assert!((resolved.base.current_gpa - 3.4).abs() < 1e-12);
    }

    #[test]
    fn test_weighted_gpa_capped_not_read_as_percent() {
        for raw in [4.3, 4.7, 5.0] {
            let resolved = resolve_base(&StudentRecord::from_pairs([("current_gpa", json!(raw))]));
            assert_eq!(resolved.base.current_gpa, 4.0, "raw={}", raw);
            let factors = active_risk_factors(&resolved.base);
            assert!(!factors.contains(&"low_gpa".to_string()));
            assert!(!factors.contains(&"low_homework_completion".to_string()));
        }
        let percent = resolve_base(&StudentRecord::from_pairs([("current_gpa", json!(62))]));
        assert!((percent.base.current_gpa - 2.48).abs() < 1e-12);
    }

    #[test]
    fn test_disposition_and_engagement_follow_observed_anchors() {
        let strong = resolve_base(&StudentRecord::from_pairs([
            ("current_gpa", json!(3.8)),
            ("attendance_rate", json!(0.98)),
            ("discipline_incidents", json!(0)),
        ]));
        let weak = resolve_base(&StudentRecord::from_pairs([
            ("current_gpa", json!(1.6)),
            ("attendance_rate", json!(0.72)),
            ("discipline_incidents", json!(4)),
        ]));
        let (s, w) = (&strong.base, &weak.base);

        assert!(s.motivation_score > 0.9 && w.motivation_score < 0.4);
        assert!(s.self_efficacy > 0.8 && w.self_efficacy < 0.4);
        assert!(s.teacher_relationship > 0.8);
        assert!(s.study_hours_per_week > 9.0 && w.study_hours_per_week < 2.5);
        assert!(s.lms_logins_per_week > 9.0);
        assert!(s.extracurricular_count > 2.0);
        assert!(s.parent_engagement > 0.8 && w.parent_engagement < 0.45);
        for name in ["motivation_score", "study_hours_per_week", "library_visits"] {
            assert!(strong.derived.contains(&name));
            assert!(!strong.defaulted.contains(&name));
        }

        // Risk counts are only ever observed or defaulted
        assert_eq!(s.tardies, 0.0);
        assert_eq!(w.tardies, 0.0);
        assert!(weak.defaulted.contains(&"tardies"));
    }

    #[test]
    fn test_observed_disposition_anchors_the_estimate() {
        let record = StudentRecord::from_pairs([
            ("current_gpa", json!(3.8)),
            ("motivation_score", json!(0.2)),
            ("parent_engagement", json!(0.3)),
        ]);
        let resolved = resolve_base(&record);
        assert_eq!(resolved.base.motivation_score, 0.2);
        assert_eq!(resolved.base.parent_engagement, 0.3);
        assert!(resolved.base.study_hours_per_week < 4.0);

        // Attendance alone still estimates a profile but never a GPA
        let attendance_only = resolve_base(&StudentRecord::from_pairs([("attendance_rate", json!(0.98))]));
        assert_eq!(attendance_only.base.current_gpa, 2.5);
        assert!(attendance_only.derived.contains(&"motivation_score"));
    }

    #[test]
    fn test_second_order_derivation_from_gpa() {
        let record = StudentRecord::from_pairs([("current_gpa", json!(3.0)), ("grade_level", json!(10))]);
        let resolved = resolve_base(&record);
        let b = resolved.base;
        assert!((b.previous_gpa - 2.8).abs() < 1e-12);
        assert!((b.gpa_2_years_ago - 2.8).abs() < 1e-12);
        assert!((b.math_score - 87.5).abs() < 1e-12);
        assert!((b.homework_completion_rate - 0.8).abs() < 1e-12);
        assert!((b.homework_quality - 0.75).abs() < 1e-12);
        assert_eq!(b.age, 15.0);
        assert!(resolved.derived.contains(&"previous_gpa"));
        assert!(!resolved.defaulted.contains(&"previous_gpa"));
        assert_eq!(resolved.identity.grade_level, Some(10.0));
    }

    #[test]
    fn test_observed_values_are_never_overridden() {
        let record = StudentRecord::from_pairs([("current_gpa", json!(3.0)), ("previous_gpa", json!(3.4))]);
        let resolved = resolve_base(&record);
        assert_eq!(resolved.base.previous_gpa, 3.4);
        assert_eq!(resolved.base.gpa_2_years_ago, 3.4);
    }

    #[test]
    fn test_derivation_is_deterministic() {
        let record = StudentRecord::from_pairs([("gpa", json!(1.9)), ("attendance", json!(0.81))]);
        let a = reconstruct(&record, &full_list(), None).unwrap();
        let b = reconstruct(&record, &full_list(), None).unwrap();
        assert_eq!(a.vector, b.vector);
    }

    #[test]
    fn test_column_order_independence() {
        let pairs = vec![
            ("Student ID", json!("S-1")),
            ("gpa", json!(2.2)),
            ("attendance_rate", json!(0.88)),
            ("Discipline", json!(3)),
            ("current_grade", json!(3.9)),
        ];
        let mut reversed = pairs.clone();
        reversed.reverse();

        let forward = reconstruct(&StudentRecord::from_pairs(pairs), &full_list(), None).unwrap();
        let backward = reconstruct(&StudentRecord::from_pairs(reversed), &full_list(), None).unwrap();
        assert_eq!(forward.vector, backward.vector);
        assert_eq!(forward.resolved.identity, backward.resolved.identity);
    }

    #[test]
    fn test_projection_matches_list_order_and_length() {
        let features = list(&["overall_risk_index", "current_gpa", "gpa_squared"]);
        let record = StudentRecord::from_pairs([("current_gpa", json!(2.0))]);
        let rec = reconstruct(&record, &features, None).unwrap();
        assert_eq!(rec.vector.len(), 3);
        assert_eq!(rec.vector.values[1], 2.0);
        assert_eq!(rec.vector.values[2], 4.0);
        assert_eq!(rec.vector.values[0], engineer(&rec.resolved.base).derived.overall_risk_index);
    }

    #[test]
    fn test_non_finite_is_row_error() {
        let record = StudentRecord::from_pairs([("current_gpa", json!(1e200))]);
        let err = reconstruct(&record, &full_list(), None).unwrap_err();
        assert!(matches!(err, ReconstructError::NonFinite { .. }));
    }

    #[test]
    fn test_scaler_dimension_mismatch() {
        let scaler = RobustScaler::identity(2);
        let err = reconstruct(&StudentRecord::new(), &list(&["current_gpa"]), Some(&scaler)).unwrap_err();
        assert_eq!(err, ReconstructError::ScalerMismatch { expected: 2, actual: 1 });
    }

    #[test]
    fn test_identity_extraction() {
        let record = StudentRecord::from_pairs([
            ("StudentID", json!(1042)),
            ("First Name", json!("Grace")),
            ("Last Name", json!("Hopper")),
        ]);
        let identity = resolve_base(&record).identity;
        assert_eq!(identity.student_id.as_deref(), Some("1042"));
        assert_eq!(identity.name.as_deref(), Some("Grace Hopper"));
        assert_eq!(identity.grade_level, None);
    }
}
