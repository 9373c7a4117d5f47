//! Archetype Synthetic Data Generator
//!
//! # Sampling
//! 1. Archetype by selection probability
//! 2. Latent traits (base ability, family support, motivation) from the
//!    archetype's normals, clipped to (0.05, 1.0]
//! 3. Surface base features from the traits with noise; counts are Poisson
//!    with rates keyed off a composite risk term
//! 4. Success probability from the engineered surface features, times the
//!    archetype multiplier and a grade-level adjustment
//! 5. Label ~ Bernoulli(success probability)
//!
//! One seeded ChaCha8 stream drives everything, so a seed fully determines
//! the dataset.

use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Normal, Poisson};

use super::archetypes::{Archetype, TraitDist};
use crate::logic::features::{engineer, BaseFeatures};

/// Lower bound for clipped latent traits
const TRAIT_FLOOR: f64 = 0.05;

/// Latent traits behind one synthetic student
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatentTraits {
    pub base_ability: f64,
    pub family_support: f64,
    pub motivation: f64,
}

impl LatentTraits {
    /// Composite risk in [0, 1]; drives the Poisson count rates
    pub fn risk(&self) -> f64 {
        0.5 * (1.0 - self.base_ability) + 0.25 * (1.0 - self.family_support) + 0.25 * (1.0 - self.motivation)
    }
}

/// One generated student with its outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyntheticStudent {
    pub archetype: Archetype,
    pub traits: LatentTraits,
    pub base: BaseFeatures,
    pub success_probability: f64,
    /// 1.0 = success, 0.0 = not
    pub label: f64,
}

pub struct SyntheticGenerator {
    rng: ChaCha8Rng,
}

#[inline]
fn clip01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

impl SyntheticGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Generate `n` students
    pub fn generate(&mut self, n: usize) -> Vec<SyntheticStudent> {
        (0..n).map(|_| self.student()).collect()
    }

    pub fn student(&mut self) -> SyntheticStudent {
        let archetype = Archetype::select(self.rng.gen::<f64>());
        let profile = archetype.profile();

        let traits = LatentTraits {
            base_ability: self.trait_value(profile.base_ability),
            family_support: self.trait_value(profile.family_support),
            motivation: self.trait_value(profile.motivation),
        };

        let base = self.surface_features(&traits);
        let success_probability = success_probability(&base, profile.success_multiplier);
        let label = if self.rng.gen::<f64>() < success_probability { 1.0 } else { 0.0 };

        SyntheticStudent {
            archetype,
            traits,
            base,
            success_probability,
            label,
        }
    }

    // ------------------------------------------------------------------------
    // Sampling primitives
    // ------------------------------------------------------------------------

    fn normal(&mut self, mean: f64, std_dev: f64) -> f64 {
        Normal::new(mean, std_dev)
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or(mean)
    }

    fn noise(&mut self, std_dev: f64) -> f64 {
        self.normal(0.0, std_dev)
    }

    fn poisson(&mut self, lambda: f64) -> f64 {
        Poisson::new(lambda.max(1e-3))
            .map(|d| d.sample(&mut self.rng))
            .unwrap_or(0.0)
    }

    fn bernoulli(&mut self, p: f64) -> f64 {
        if self.rng.gen::<f64>() < clip01(p) {
            1.0
        } else {
            0.0
        }
    }

    fn trait_value(&mut self, dist: TraitDist) -> f64 {
        self.normal(dist.mean, dist.std_dev).clamp(TRAIT_FLOOR, 1.0)
    }

    // ------------------------------------------------------------------------
    // Surface features
    // ------------------------------------------------------------------------

    fn surface_features(&mut self, t: &LatentTraits) -> BaseFeatures {
        let a = t.base_ability;
        let f = t.family_support;
        let m = t.motivation;
        let r = t.risk();

        // Academic
        let current_gpa = (4.0 * a.powf(0.8) + self.noise(0.25)).clamp(0.0, 4.0);
        let previous_gpa = (current_gpa + self.noise(0.2) - 0.3 * (m - 0.5)).clamp(0.0, 4.0);
        let gpa_2_years_ago = (previous_gpa + self.noise(0.2) - 0.15 * (m - 0.5)).clamp(0.0, 4.0);
        let attendance_rate = (0.6 + 0.25 * a + 0.15 * f + self.noise(0.04)).clamp(0.3, 1.0);
        let previous_attendance_rate =
            (attendance_rate + self.noise(0.03) + 0.03 * (0.5 - m)).clamp(0.3, 1.0);

        let mut subject = || (45.0 + 50.0 * a + self.noise(7.0)).clamp(0.0, 100.0);
        let math_score = subject();
        let reading_score = subject();
        let science_score = subject();
        let writing_score = subject();
        let subject_mean = (math_score + reading_score + science_score + writing_score) / 4.0;
        let average_test_score = (subject_mean + self.noise(3.0)).clamp(0.0, 100.0);

        let socioeconomic_status = clip01(0.1 + 0.8 * f + self.noise(0.1));
        let grade_level = self.rng.gen_range(3u32..=12) as f64;
        let over_age = self.bernoulli(0.2 + 0.4 * r);

        BaseFeatures {
            current_gpa,
            previous_gpa,
            gpa_2_years_ago,
            attendance_rate,
            previous_attendance_rate,
            homework_completion_rate: clip01(0.3 + 0.4 * m + 0.25 * a + self.noise(0.08)),
            homework_quality: clip01(0.2 + 0.6 * a + 0.15 * m + self.noise(0.08)),
            class_participation: clip01(0.2 + 0.5 * m + 0.2 * a + self.noise(0.1)),
            credits_earned_ratio: clip01(0.55 + 0.45 * a + self.noise(0.05)),
            math_score,
            reading_score,
            science_score,
            writing_score,
            average_test_score,

            discipline_incidents: self.poisson(0.2 + 3.0 * r * r),
            suspensions: self.poisson(0.05 + 0.8 * r.powi(3)),
            tardies: self.poisson(1.0 + 8.0 * r),
            absences_unexcused: self.poisson(0.5 + 10.0 * r * r),
            behavior_warnings: self.poisson(0.3 + 4.0 * r * r),
            peer_conflicts: self.poisson(0.2 + 2.0 * r * r),
            assignments_missing: self.poisson(0.5 + 12.0 * r * r),
            late_submissions: self.poisson(1.0 + 6.0 * r),
            course_failures: self.poisson(0.02 + 2.5 * r.powi(3)),

            extracurricular_count: self.poisson(0.3 + 2.5 * (0.5 * m + 0.5 * f)),
            library_visits: self.poisson(0.5 + 5.0 * a * m),
            lms_logins_per_week: self.poisson(2.0 + 8.0 * m),
            office_hours_visits: self.poisson(0.2 + 2.0 * m * a),
            tutoring_sessions: self.poisson(0.3 + 2.0 * r),
            counselor_meetings: self.poisson(0.2 + 2.0 * r),
            school_changes: self.poisson(0.1 + 1.2 * (1.0 - f).powi(2)),
            health_issues: self.poisson(0.2 + 0.8 * (1.0 - f) * r),
            early_warning_flags: self.poisson(0.05 + 3.0 * r.powi(3)),

            parent_engagement: clip01(0.15 + 0.75 * f + self.noise(0.08)),
            parent_education_level: (1.0 + 4.0 * f + self.noise(0.5)).clamp(0.0, 5.0),
            socioeconomic_status,
            free_lunch_eligible: self.bernoulli(0.9 - 0.9 * socioeconomic_status),
            home_internet_access: self.bernoulli(0.6 + 0.4 * f),
            single_parent_household: self.bernoulli(0.45 - 0.35 * f),
            english_learner: self.bernoulli(0.1),
            special_education: self.bernoulli(0.08 + 0.1 * (1.0 - a)),
            mentor_assigned: self.bernoulli(0.1 + 0.3 * r),

            motivation_score: clip01(m + self.noise(0.05)),
            self_efficacy: clip01(0.5 * m + 0.4 * a + self.noise(0.08)),
            teacher_relationship: clip01(0.2 + 0.4 * m + 0.3 * a + self.noise(0.1)),
            peer_support: clip01(0.3 + 0.3 * f + 0.3 * m + self.noise(0.1)),
            sleep_hours: (6.0 + 2.5 * f + self.noise(0.7)).clamp(4.0, 10.0),
            study_hours_per_week: (1.0 + 10.0 * m * a + self.noise(1.5)).clamp(0.0, 25.0),
            grade_level,
            age: grade_level + 5.0 + over_age,
        }
    }
}

/// Success probability from surface features.
///
/// Weighted academic, attendance, engagement, subject mastery, behavioral
/// and support terms through a logistic link, then scaled by the archetype
/// multiplier and a grade-level adjustment.
pub fn success_probability(base: &BaseFeatures, multiplier: f64) -> f64 {
    let eng = engineer(base);
    let d = &eng.derived;

    let academic = (base.current_gpa / 4.0).clamp(0.0, 1.0).powf(1.5);
    let attendance = clip01((base.attendance_rate - 0.6) / 0.4);

    let raw = 0.35 * academic
        + 0.25 * attendance
        + 0.12 * clip01(d.engagement_score)
        + 0.12 * clip01(d.subject_mastery_avg)
        + 0.10 * clip01(d.behavioral_stability_score)
        + 0.06 * clip01(d.support_services_score);

    let logistic = 1.0 / (1.0 + (-10.0 * (raw - 0.55)).exp());
    let grade_adjustment = 1.0 - 0.015 * (base.grade_level - 9.0).max(0.0);

    clip01(logistic * multiplier * grade_adjustment)
}
