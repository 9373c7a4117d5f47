//! Logic Module - pipeline engines
//!
//! ## Architecture
//! - `features/` - reconstruction, engineering and the versioned layout
//! - `synthetic/` - archetype-driven synthetic students
//! - `training/` - selection, base learners, stacking
//! - `model/` - classifiers, scaler, metrics
//! - `artifacts/` - run persistence and load strategies
//! - `predictor/` - fail-soft scoring service
//! - `dataset/` - labeled JSONL rows

pub mod artifacts;
pub mod config;
pub mod dataset;
pub mod features;
pub mod interventions;
pub mod model;
pub mod predictor;
pub mod synthetic;
pub mod training;
