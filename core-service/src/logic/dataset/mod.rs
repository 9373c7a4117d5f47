//! Dataset Module - labeled training rows on disk
//!
//! Stores synthetic or real labeled rows as JSONL with automatic rotation,
//! and reads them back for training. Rows keep their raw columns, so a
//! dataset trains through the same alias / default path as inference.

pub mod record;
pub mod writer;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

pub use record::DatasetRecord;
pub use writer::{load_records, DatasetWriter};

use crate::constants::APP_NAME;

/// Get the base directory for dataset storage
pub fn get_dataset_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("dataset")
}

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("Dataset IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Dataset serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed record at {file}:{line}: {source}")]
    Malformed {
        file: String,
        line: usize,
        source: serde_json::Error,
    },
}
