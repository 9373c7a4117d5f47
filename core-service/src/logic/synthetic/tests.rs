//! Generator tests: determinism, ranges and archetype separability.

#[cfg(test)]
mod generator_tests {
    use std::collections::HashMap;

    use crate::logic::features::BaseFeatures;
    use crate::logic::synthetic::{generate, success_probability, Archetype};

    fn mean_by_archetype<F>(n: usize, seed: u64, value: F) -> HashMap<Archetype, f64>
    where
        F: Fn(&crate::logic::synthetic::SyntheticStudent) -> f64,
    {
        let mut sums: HashMap<Archetype, (f64, usize)> = HashMap::new();
        for student in generate(n, seed) {
            let entry = sums.entry(student.archetype).or_insert((0.0, 0));
            entry.0 += value(&student);
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(k, (sum, count))| (k, sum / count as f64))
            .collect()
    }

    #[test]
    fn test_same_seed_same_dataset() {
        assert_eq!(generate(50, 42), generate(50, 42));
        assert_ne!(generate(50, 42), generate(50, 43));
    }

    #[test]
    fn test_features_in_range() {
        for s in generate(500, 1) {
            let b = s.base;
            assert!((0.0..=4.0).contains(&b.current_gpa));
            assert!((0.3..=1.0).contains(&b.attendance_rate));
            assert!((0.0..=100.0).contains(&b.math_score));
            assert!(b.discipline_incidents >= 0.0 && b.discipline_incidents.fract() == 0.0);
            assert!(b.free_lunch_eligible == 0.0 || b.free_lunch_eligible == 1.0);
            assert!((3.0..=12.0).contains(&b.grade_level));
            assert!((0.0..=1.0).contains(&s.success_probability));
            assert!(s.label == 0.0 || s.label == 1.0);
            for t in [s.traits.base_ability, s.traits.family_support, s.traits.motivation] {
                assert!(t >= 0.05 && t <= 1.0);
            }
        }
    }

    #[test]
    fn test_every_archetype_appears() {
        let means = mean_by_archetype(2000, 7, |s| s.label);
        assert_eq!(means.len(), Archetype::ALL.len());
    }

    #[test]
    fn test_archetype_separability() {
        let means = mean_by_archetype(5000, 42, |s| s.label);
        let stars = means[&Archetype::AcademicStars];
        let high_risk = means[&Archetype::HighRiskStudents];
        assert!(stars - high_risk >= 0.5, "stars={} high_risk={}", stars, high_risk);
    }

    #[test]
    fn test_archetype_outcomes_are_ordered() {
        let means = mean_by_archetype(5000, 42, |s| s.success_probability);
        let ordered: Vec<f64> = Archetype::ALL.iter().map(|a| means[a]).collect();
        assert!(ordered.windows(2).all(|w| w[0] > w[1]), "{:?}", ordered);
    }

    #[test]
    fn test_success_probability_monotone_in_gpa() {
        let weak = BaseFeatures { current_gpa: 1.5, ..Default::default() };
        let strong = BaseFeatures { current_gpa: 3.8, ..Default::default() };
        assert!(success_probability(&strong, 1.0) > success_probability(&weak, 1.0));
    }
}
