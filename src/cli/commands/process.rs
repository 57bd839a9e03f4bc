//! Process command implementation
//!
//! This module implements the `process` command: read a JSON array of row
//! objects, anonymize it with a job configuration and write the processing
//! result as JSON.

use crate::anonymization::{AnonymizationConfig, AnonymizationEngine, ProcessingResult};
use crate::config::{load_config, load_job, ShroudConfig};
use crate::domain::{ShroudError, Table};
use anyhow::Context;
use clap::Args;
use std::fs;
use std::io::Write;
use std::path::Path;

/// Arguments for the process command
#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// JSON file holding an array of row objects
    #[arg(short, long)]
    pub input: String,

    /// JSON job file (defaults to the [anonymization] section of the config)
    #[arg(short, long)]
    pub job: Option<String>,

    /// Where to write the result (defaults to stdout)
    #[arg(short, long)]
    pub output: Option<String>,

    /// Seed for suppression and noise (overrides engine.seed)
    #[arg(long)]
    pub seed: Option<u64>,
}

impl ProcessArgs {
    /// Execute the process command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(input = %self.input, "Starting process command");

        // A config file is optional when the job comes from --job
        let config = if Path::new(config_path).exists() {
            match load_config(config_path) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("❌ Failed to load configuration file: {e}");
                    return Ok(2);
                }
            }
        } else {
            tracing::debug!(config_path = %config_path, "No configuration file, using defaults");
            ShroudConfig::default()
        };

        let job = match self.resolve_job(&config) {
            Ok(job) => job,
            Err(e) => {
                eprintln!("❌ {e}");
                return Ok(2);
            }
        };

        let table = read_table(&self.input)?;
        tracing::info!(
            rows = table.len(),
            columns = table.column_count(),
            "Loaded input table"
        );

        let seed = self.seed.or(config.engine.seed);
        let engine = AnonymizationEngine::with_seed(seed);
        let result = match engine.process(&table, &job) {
            Ok(result) => result,
            Err(e @ ShroudError::InvalidParameter { .. }) | Err(e @ ShroudError::Configuration(_)) => {
                eprintln!("❌ Invalid job configuration: {e}");
                return Ok(2);
            }
            Err(e) => return Err(e).context("Anonymization failed"),
        };

        self.write_result(&result)?;
        print_summary(&result);
        Ok(0)
    }

    fn resolve_job(&self, config: &ShroudConfig) -> anyhow::Result<AnonymizationConfig> {
        match &self.job {
            Some(path) => Ok(load_job(path)?),
            None => config.anonymization.clone().ok_or_else(|| {
                anyhow::anyhow!(
                    "No anonymization job: pass --job or add an [anonymization] section to the configuration"
                )
            }),
        }
    }

    fn write_result(&self, result: &ProcessingResult) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(result).context("Failed to serialize result")?;
        match &self.output {
            Some(path) => {
                fs::write(path, json)
                    .with_context(|| format!("Failed to write output file {path}"))?;
                tracing::info!(output = %path, "Result written");
            }
            None => {
                let stdout = std::io::stdout();
                let mut handle = stdout.lock();
                writeln!(handle, "{json}").context("Failed to write result to stdout")?;
            }
        }
        Ok(())
    }
}

/// Reads a JSON array of row objects into a table
pub fn read_table(path: impl AsRef<Path>) -> anyhow::Result<Table> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read input file {}", path.display()))?;
    let records: Vec<serde_json::Map<String, serde_json::Value>> = serde_json::from_str(&contents)
        .with_context(|| format!("Input file {} is not a JSON array of objects", path.display()))?;
    Table::from_records(records)
        .with_context(|| format!("Input file {} is not a valid table", path.display()))
}

fn print_summary(result: &ProcessingResult) {
    let metrics = &result.metrics;
    eprintln!("✅ Anonymization complete (run {})", result.run_id);
    eprintln!(
        "   Rows: {} → {}",
        metrics.original_rows, metrics.anonymized_rows
    );
    eprintln!(
        "   Columns: {} → {}",
        metrics.original_columns, metrics.anonymized_columns
    );
    eprintln!("   k-anonymity: {}", metrics.achieved_k);
    eprintln!("   l-diversity: {}", metrics.achieved_l);
    eprintln!(
        "   Information loss: {:.2}%",
        metrics.information_loss_percentage
    );
    for skipped in &result.skipped {
        eprintln!(
            "⚠️  Skipped {} on '{}': {}",
            skipped.technique.as_str(),
            skipped.column,
            skipped.reason
        );
    }
}
