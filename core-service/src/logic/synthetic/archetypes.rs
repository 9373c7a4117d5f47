//! Student archetypes and their latent-trait distributions.

use serde::{Deserialize, Serialize};

/// Mean / standard deviation of one latent trait
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TraitDist {
    pub mean: f64,
    pub std_dev: f64,
}

const fn dist(mean: f64, std_dev: f64) -> TraitDist {
    TraitDist { mean, std_dev }
}

/// Generation parameters for one archetype
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeProfile {
    /// Selection probability (all profiles sum to 1)
    pub probability: f64,
    pub base_ability: TraitDist,
    pub family_support: TraitDist,
    pub motivation: TraitDist,
    /// Multiplier on the success probability
    pub success_multiplier: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    AcademicStars,
    HighPerformers,
    AverageStudents,
    AtRiskStudents,
    HighRiskStudents,
}

impl Archetype {
    /// All archetypes in selection order
    pub const ALL: [Archetype; 5] = [
        Archetype::AcademicStars,
        Archetype::HighPerformers,
        Archetype::AverageStudents,
        Archetype::AtRiskStudents,
        Archetype::HighRiskStudents,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AcademicStars => "academic_stars",
            Self::HighPerformers => "high_performers",
            Self::AverageStudents => "average_students",
            Self::AtRiskStudents => "at_risk_students",
            Self::HighRiskStudents => "high_risk_students",
        }
    }

    pub fn profile(&self) -> ArchetypeProfile {
        match self {
            Self::AcademicStars => ArchetypeProfile {
                probability: 0.15,
                base_ability: dist(0.9, 0.05),
                family_support: dist(0.85, 0.08),
                motivation: dist(0.9, 0.05),
                success_multiplier: 1.05,
            },
            Self::HighPerformers => ArchetypeProfile {
                probability: 0.25,
                base_ability: dist(0.75, 0.07),
                family_support: dist(0.7, 0.1),
                motivation: dist(0.75, 0.08),
                success_multiplier: 1.0,
            },
            Self::AverageStudents => ArchetypeProfile {
                probability: 0.30,
                base_ability: dist(0.55, 0.08),
                family_support: dist(0.55, 0.12),
                motivation: dist(0.55, 0.1),
                success_multiplier: 0.95,
            },
            Self::AtRiskStudents => ArchetypeProfile {
                probability: 0.20,
                base_ability: dist(0.38, 0.08),
                family_support: dist(0.4, 0.12),
                motivation: dist(0.4, 0.1),
                success_multiplier: 0.85,
            },
            Self::HighRiskStudents => ArchetypeProfile {
                probability: 0.10,
                base_ability: dist(0.22, 0.07),
                family_support: dist(0.25, 0.1),
                motivation: dist(0.25, 0.1),
                success_multiplier: 0.7,
            },
        }
    }

    /// Pick an archetype from a uniform draw in [0, 1)
    pub fn select(u: f64) -> Archetype {
        let mut cumulative = 0.0;
        for archetype in Self::ALL {
            cumulative += archetype.profile().probability;
            if u < cumulative {
                return archetype;
            }
        }
        Archetype::HighRiskStudents
    }
}

impl std::fmt::Display for Archetype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
