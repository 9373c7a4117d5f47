//! Feature Layout - Engineered Feature Schema
//!
//! **This file controls the engineered feature schema**
//!
//! ## Rules:
//! 1. Add feature → increment FEATURE_VERSION
//! 2. Change order → increment FEATURE_VERSION
//! 3. Remove feature → increment FEATURE_VERSION
//!
//! The engineered layout is every base feature (in `base.rs` order) followed
//! by every derived feature (in `engineer.rs` order). Artifacts record the
//! version and hash so a model trained on another layout is never fed
//! vectors from this one.

use std::collections::HashMap;

use crc32fast::Hasher;
use once_cell::sync::Lazy;

use super::base::{BASE_FEATURES, BASE_FEATURE_COUNT};
use super::engineer::{DERIVED_FEATURES, DERIVED_FEATURE_COUNT};

// ============================================================================
// FEATURE VERSION
// ============================================================================

/// Current engineered layout version
pub const FEATURE_VERSION: u8 = 1;

/// Total number of engineered features
pub const FEATURE_COUNT: usize = BASE_FEATURE_COUNT + DERIVED_FEATURE_COUNT;

// ============================================================================
// FEATURE LAYOUT
// ============================================================================

static LAYOUT: Lazy<Vec<&'static str>> = Lazy::new(|| {
    BASE_FEATURES
        .iter()
        .map(|spec| spec.name)
        .chain(DERIVED_FEATURES.iter().copied())
        .collect()
});

static LAYOUT_INDEX: Lazy<HashMap<&'static str, usize>> = Lazy::new(|| {
    LAYOUT
        .iter()
        .enumerate()
        .map(|(i, name)| (*name, i))
        .collect()
});

static LAYOUT_HASH: Lazy<u32> = Lazy::new(compute_layout_hash);

/// Engineered feature names in vector order
pub fn engineered_layout() -> &'static [&'static str] {
    &LAYOUT
}

// ============================================================================
// LAYOUT HASH
// ============================================================================

/// CRC32 over the version and an ordered list of names
pub fn hash_names<'a, I>(version: u8, names: I) -> u32
where
    I: IntoIterator<Item = &'a str>,
{
    let mut hasher = Hasher::new();
    hasher.update(&[version]);
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

/// Compute CRC32 hash of the engineered layout
pub fn compute_layout_hash() -> u32 {
    hash_names(FEATURE_VERSION, LAYOUT.iter().copied())
}

/// Cached layout hash
pub fn layout_hash() -> u32 {
    *LAYOUT_HASH
}

// ============================================================================
// LAYOUT VALIDATION
// ============================================================================

/// Error when a persisted layout doesn't match the running one
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error(
    "Feature layout mismatch: expected v{expected_version} (hash: {expected_hash:08x}), \
     got v{actual_version} (hash: {actual_hash:08x})"
)]
pub struct LayoutMismatchError {
    pub expected_version: u8,
    pub expected_hash: u32,
    pub actual_version: u8,
    pub actual_hash: u32,
}

/// Validate that persisted layout metadata matches the current layout
pub fn validate_layout(incoming_version: u8, incoming_hash: u32) -> Result<(), LayoutMismatchError> {
    let current_hash = layout_hash();

    if incoming_version != FEATURE_VERSION || incoming_hash != current_hash {
        return Err(LayoutMismatchError {
            expected_version: FEATURE_VERSION,
            expected_hash: current_hash,
            actual_version: incoming_version,
            actual_hash: incoming_hash,
        });
    }

    Ok(())
}

/// Names in `names` that are not engineered features
pub fn unknown_features<'a, I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    names
        .into_iter()
        .filter(|name| !LAYOUT_INDEX.contains_key(name))
        .map(str::to_string)
        .collect()
}

// ============================================================================
// FEATURE INDEX LOOKUP
// ============================================================================

/// Get engineered feature index by name
pub fn feature_index(name: &str) -> Option<usize> {
    LAYOUT_INDEX.get(name).copied()
}

/// Get engineered feature name by index
pub fn feature_name(index: usize) -> Option<&'static str> {
    LAYOUT.get(index).copied()
}
