use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;

use super::DatasetError;
use crate::logic::dataset::record::DatasetRecord;

/// Default rotation size
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10 MB

pub struct DatasetWriter {
    file: Mutex<Option<File>>,
    base_dir: PathBuf,
    max_file_size: u64,
}

impl DatasetWriter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self, DatasetError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;

        Ok(Self {
            file: Mutex::new(None),
            base_dir,
            max_file_size: MAX_FILE_SIZE,
        })
    }

    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes.max(1);
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Append record to dataset log
    /// Handles file rotation automatically
    pub fn append(&self, record: &DatasetRecord) -> Result<(), DatasetError> {
        let mut file_guard = self.file.lock();

        // If file not open, continue the latest one or start fresh
        if file_guard.is_none() {
            let file = match self.find_latest_file()? {
                Some(path) => {
                    let f = OpenOptions::new().append(true).open(&path)?;
                    if f.metadata()?.len() < self.max_file_size {
                        f
                    } else {
                        self.create_new_file()?
                    }
                }
                None => self.create_new_file()?,
            };
            *file_guard = Some(file);
        }

        let should_rotate = match file_guard.as_ref() {
            Some(f) => f.metadata()?.len() >= self.max_file_size,
            None => false,
        };
        if should_rotate {
            *file_guard = Some(self.create_new_file()?);
        }

        if let Some(file) = file_guard.as_mut() {
            let json = serde_json::to_string(record)?;
            writeln!(file, "{}", json)?;
        }

        Ok(())
    }

    /// Append many records, returning how many were written
    pub fn append_all<'a, I>(&self, records: I) -> Result<usize, DatasetError>
    where
        I: IntoIterator<Item = &'a DatasetRecord>,
    {
        let mut count = 0;
        for record in records {
            self.append(record)?;
            count += 1;
        }
        Ok(count)
    }

    /// (file count, total size in MB, latest file name)
    pub fn get_stats(&self) -> Result<(usize, f32, String), DatasetError> {
        let files = dataset_files(&self.base_dir)?;
        let size: u64 = files
            .iter()
            .filter_map(|p| fs::metadata(p).ok())
            .map(|m| m.len())
            .sum();
        let latest = files
            .last()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .unwrap_or("None")
            .to_string();

        Ok((files.len(), size as f32 / 1024.0 / 1024.0, latest))
    }

    fn create_new_file(&self) -> Result<File, DatasetError> {
        // timestamp format: YYYY-MM-DD-HHMMSS-mmm-seq, sortable by name
        let stamp = Utc::now().format("%Y-%m-%d-%H%M%S-%3f").to_string();
        let mut n = 0u32;
        let mut path = self.base_dir.join(format!("dataset-{}-{:03}.jsonl", stamp, n));
        while path.exists() {
            n += 1;
            path = self.base_dir.join(format!("dataset-{}-{:03}.jsonl", stamp, n));
        }

        Ok(OpenOptions::new().create_new(true).append(true).open(path)?)
    }

    fn find_latest_file(&self) -> Result<Option<PathBuf>, DatasetError> {
        Ok(dataset_files(&self.base_dir)?.pop())
    }
}

/// `.jsonl` files in `dir`, sorted by name (timestamp order)
pub fn dataset_files(dir: &Path) -> Result<Vec<PathBuf>, DatasetError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|res| res.ok())
        .map(|e| e.path())
        .filter(|p| p.extension().map_or(false, |ext| ext == "jsonl"))
        .collect();
    paths.sort();
    Ok(paths)
}

/// Read records from one JSONL file or every JSONL file in a directory.
///
/// Blank lines are skipped; a malformed line is an error naming its position.
pub fn load_records(path: &Path) -> Result<Vec<DatasetRecord>, DatasetError> {
    let files = if path.is_dir() {
        dataset_files(path)?
    } else {
        vec![path.to_path_buf()]
    };

    let mut records = Vec::new();
    for file in files {
        let reader = BufReader::new(File::open(&file)?);
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record = serde_json::from_str(&line).map_err(|source| DatasetError::Malformed {
                file: file.display().to_string(),
                line: index + 1,
                source,
            })?;
            records.push(record);
        }
    }

    log::info!("Loaded {} dataset records from {}", records.len(), path.display());
    Ok(records)
}
