//! Synthetic Module - archetype-based training data
//!
//! Training never needs real student data: the generator produces labeled
//! students whose outcomes depend on their surface features, so a model
//! trained here transfers to real rows through the reconstructor.

pub mod archetypes;
pub mod generator;

#[cfg(test)]
mod tests;

pub use archetypes::{Archetype, ArchetypeProfile};
pub use generator::{success_probability, LatentTraits, SyntheticGenerator, SyntheticStudent};

/// Generate `n` students from `seed`
pub fn generate(n: usize, seed: u64) -> Vec<SyntheticStudent> {
    SyntheticGenerator::new(seed).generate(n)
}
