//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Shroud configuration file and, optionally, a standalone job file.

use crate::anonymization::AnonymizationConfig;
use crate::config::{load_config, load_job};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Also validate a JSON job file
    #[arg(short, long)]
    pub job: Option<String>,
}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        // Loading also validates, so any failure here is a configuration error
        let config = match load_config(config_path) {
            Ok(c) => {
                println!("✅ Configuration is valid");
                c
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        println!();
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        match config.engine.seed {
            Some(seed) => println!("  Seed: {seed}"),
            None => println!("  Seed: (random)"),
        }
        if config.logging.local_enabled {
            println!(
                "  File Logging: {} ({})",
                config.logging.local_path, config.logging.local_rotation
            );
        } else {
            println!("  File Logging: disabled");
        }
        match &config.anonymization {
            Some(job) => print_job_summary("Default Job", job),
            None => println!("  Default Job: none"),
        }

        if let Some(job_path) = &self.job {
            println!();
            match load_job(job_path) {
                Ok(job) => {
                    println!("✅ Job file is valid: {job_path}");
                    print_job_summary("Job", &job);
                }
                Err(e) => {
                    println!("❌ Job file validation failed: {job_path}");
                    println!("   Error: {e}");
                    return Ok(2);
                }
            }
        }

        println!();
        Ok(0)
    }
}

fn print_job_summary(title: &str, job: &AnonymizationConfig) {
    println!("  {title}: {}", job.name.as_deref().unwrap_or("(unnamed)"));
    println!("    Column Mappings: {}", job.column_mappings.len());
    println!("    Techniques: {}", job.techniques.len());
    for spec in &job.techniques {
        let marker = if spec.technique.is_recognized() { "" } else { " (unrecognized, will be skipped)" };
        println!("      - {} on '{}'{marker}", spec.technique, spec.column);
    }
    println!("    Target k: {}", job.global_params.k);
    println!("    Target l: {}", job.global_params.l);
}
