//! Student Risk Pipeline - CLI entry point
//!
//! Usage:
//!   risk-pipeline generate --count 1000 --output data/
//!   risk-pipeline train
//!   risk-pipeline train --dataset data/ --fast
//!   risk-pipeline predict students.jsonl --output results.json
//!   risk-pipeline info

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};

use student_risk_core::constants::{APP_NAME, APP_VERSION};
use student_risk_core::logic::artifacts::save_artifact;
use student_risk_core::logic::dataset::{get_dataset_dir, DatasetRecord, DatasetWriter};
use student_risk_core::logic::synthetic::generate;
use student_risk_core::{
    summarize, LoadStrategy, ModelArtifact, PipelineConfig, PredictorService, StudentRecord, TrainingConfig,
    TrainingSource,
};

#[derive(Parser)]
#[command(name = "risk-pipeline", version, about = "Student risk training and prediction pipeline")]
struct Cli {
    /// Artifact directory (overrides RISK_ARTIFACTS_DIR)
    #[arg(long, global = true)]
    artifacts_dir: Option<PathBuf>,

    /// Artifact load strategy: shared-run | latest-per-type
    #[arg(long, global = true)]
    load_strategy: Option<LoadStrategy>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write labeled synthetic students as JSONL
    Generate {
        #[arg(long, default_value_t = 1000)]
        count: usize,
        #[arg(long)]
        seed: Option<u64>,
        /// Dataset directory (defaults to the local data dir)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Train and persist a new model run
    Train {
        /// JSONL file or directory of labeled rows (synthetic when omitted)
        #[arg(long)]
        dataset: Option<PathBuf>,
        #[arg(long)]
        samples: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
        /// Smaller ensembles for a quick run
        #[arg(long)]
        fast: bool,
    },
    /// Score rows from a JSON array or JSONL file
    Predict {
        input: PathBuf,
        /// Write results here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Show the model the predictor would serve
    Info,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("Starting {} v{}", APP_NAME, APP_VERSION);

    let mut config = PipelineConfig::from_env();
    if let Some(dir) = cli.artifacts_dir {
        config.predictor.artifacts_dir = dir;
    }
    if let Some(strategy) = cli.load_strategy {
        config.predictor.load_strategy = strategy;
    }

    match cli.command {
        Command::Generate { count, seed, output } => {
            let dir = output.unwrap_or_else(get_dataset_dir);
            let seed = seed.unwrap_or(config.training.seed);
            let writer = DatasetWriter::new(&dir)?;
            let records: Vec<DatasetRecord> = generate(count, seed).iter().map(DatasetRecord::from_synthetic).collect();
            let written = writer.append_all(&records)?;
            let (files, size_mb, latest) = writer.get_stats()?;
            println!(
                "Wrote {} students to {} ({} files, {:.2} MB, latest {})",
                written,
                dir.display(),
                files,
                size_mb,
                latest
            );
        }
        Command::Train {
            dataset,
            samples,
            seed,
            fast,
        } => {
            let mut training = if fast {
                TrainingConfig {
                    seed: config.training.seed,
                    ..TrainingConfig::fast()
                }
            } else {
                config.training.clone()
            };
            if let Some(samples) = samples {
                training.samples = samples;
            }
            if let Some(seed) = seed {
                training.seed = seed;
            }
            let source = match dataset {
                Some(path) => TrainingSource::Dataset(path),
                None => TrainingSource::Synthetic,
            };

            let outcome = student_risk_core::train(&training, &source).context("training failed")?;
            println!("{}", outcome.report);

            let saved = save_artifact(&config.predictor.artifacts_dir, ModelArtifact::from_training(outcome))?;
            println!(
                "Saved run {} to {}",
                saved.metadata.run_timestamp,
                config.predictor.artifacts_dir.display()
            );
        }
        Command::Predict { input, output } => {
            let rows = read_rows(&input)?;
            let service = PredictorService::new(config.predictor.clone());
            let results = service.predict_parsed(&rows);

            let body = serde_json::json!({
                "model": service.get_model_info(),
                "summary": summarize(&results),
                "results": results,
            });
            let text = serde_json::to_string_pretty(&body)?;
            match output {
                Some(path) => {
                    fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
                    log::info!("Wrote {} predictions to {}", results.len(), path.display());
                }
                None => println!("{}", text),
            }
        }
        Command::Info => {
            let service = PredictorService::new(config.predictor.clone());
            println!("{}", serde_json::to_string_pretty(&service.get_model_info())?);
        }
    }

    Ok(())
}

/// Rows from a JSON array of objects or a JSONL file.
///
/// Only an unreadable file or a broken top-level array fails the call; a bad
/// element or line stays in place as an `Err` so the batch keeps its order.
fn read_rows(path: &Path) -> anyhow::Result<Vec<Result<StudentRecord, String>>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let trimmed = text.trim_start();

    if trimmed.starts_with('[') {
        let values: Vec<serde_json::Value> = serde_json::from_str(trimmed).context("parsing JSON array")?;
        return Ok(values
            .into_iter()
            .enumerate()
            .map(|(index, value)| {
                serde_json::from_value::<StudentRecord>(value).map_err(|e| {
                    log::warn!("[Predict] {}: element {} unreadable: {}", path.display(), index, e);
                    format!("element {}: {}", index, e)
                })
            })
            .collect());
    }

    Ok(text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<StudentRecord>(line).map_err(|e| {
                log::warn!("[Predict] {}:{} unreadable: {}", path.display(), index + 1, e);
                format!("line {}: {}", index + 1, e)
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_bad_jsonl_line_keeps_its_slot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.jsonl");
        fs::write(&path, "{\"gpa\": 3.1}\n{not json\n\n{\"gpa\": 1.8}\n").unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_ok());
        assert!(rows[1].as_ref().unwrap_err().starts_with("line 2:"));
        assert!(rows[2].is_ok());
    }

    #[test]
    fn test_bad_array_element_keeps_its_slot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rows.json");
        fs::write(&path, r#"[{"gpa": 3.1}, 7, {"gpa": 1.8}]"#).unwrap();

        let rows = read_rows(&path).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[1].as_ref().unwrap_err().starts_with("element 1:"));
    }
}
