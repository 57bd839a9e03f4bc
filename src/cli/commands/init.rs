//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "shroud.toml")]
    pub output: String,

    /// Include example values and comments
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Shroud configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let config_content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, config_content) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit the [anonymization] section of {} for your dataset", self.output);
                println!("  2. Validate configuration: shroud validate-config");
                println!("  3. Anonymize: shroud process --input data.json --output result.json");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5)
            }
        }
    }

    /// Generate minimal configuration
    fn generate_minimal_config() -> String {
        r#"# Shroud Configuration File
# Tabular dataset anonymization

[application]
log_level = "info"

[engine]
# seed = 42

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"

[anonymization]
name = "example"

[[anonymization.column_mappings]]
column = "id"
type = "identifier"

[[anonymization.column_mappings]]
column = "age"
type = "quasi-identifier"

[[anonymization.column_mappings]]
column = "disease"
type = "sensitive"

[[anonymization.techniques]]
column = "age"
technique = "generalization"
params = { bins = 3 }

[anonymization.global_params]
k = 2
l = 2
"#
        .to_string()
    }

    /// Generate configuration with examples and comments
    fn generate_config_with_examples() -> String {
        r#"# Shroud Configuration File
# Tabular dataset anonymization
#
# This file contains all configuration options with examples and explanations.
# Values of the form ${VAR_NAME} are replaced with environment variables.
# Any setting can also be overridden with SHROUD_<SECTION>_<KEY>.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# ============================================================================
# Engine Settings
# ============================================================================
[engine]
# Seed for suppression and noise. Leave unset for a fresh random run.
# seed = 42

# ============================================================================
# Logging Configuration
# ============================================================================
[logging]
# Enable JSON file logging in addition to the console
local_enabled = false

# Directory for log files
local_path = "./logs"

# Log rotation (daily or hourly)
local_rotation = "daily"

# ============================================================================
# Default Anonymization Job
# Used by `shroud process` when no --job file is given
# ============================================================================
[anonymization]
name = "patients"

# Column roles: identifier | quasi-identifier | sensitive | none
# Identifiers are removed, quasi-identifiers are generalized towards k,
# sensitive columns are measured for l-diversity.
[[anonymization.column_mappings]]
column = "patient_id"
type = "identifier"

[[anonymization.column_mappings]]
column = "age"
type = "quasi-identifier"

[[anonymization.column_mappings]]
column = "zip_code"
type = "quasi-identifier"

[[anonymization.column_mappings]]
column = "diagnosis"
type = "sensitive"

# Techniques run in order. Later techniques see earlier results.
#
# generalization:       bins (numeric, default 5) | levels (categorical, default 1)
# suppression:          threshold in [0, 1] (default 0.1)
# pseudonymization:     prefix (default "ID")
# masking:              mask_type = partial | email | phone
# differential_privacy: epsilon > 0 (default 1.0)

[[anonymization.techniques]]
column = "age"
technique = "generalization"
params = { bins = 4 }

[[anonymization.techniques]]
column = "zip_code"
technique = "generalization"
params = { levels = 3 }

[[anonymization.techniques]]
column = "email"
technique = "masking"
params = { mask_type = "email" }

[[anonymization.techniques]]
column = "salary"
technique = "differential_privacy"
params = { epsilon = 1.0 }

# Privacy targets
[anonymization.global_params]
k = 3
l = 2
"#
        .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_config;
    use tempfile::TempDir;

    #[test]
    fn test_init_args_defaults() {
        let args = InitArgs {
            output: "shroud.toml".to_string(),
            with_examples: false,
            force: false,
        };

        assert_eq!(args.output, "shroud.toml");
        assert!(!args.with_examples);
        assert!(!args.force);
    }

    #[test]
    fn test_generated_configs_parse() {
        for content in [
            InitArgs::generate_minimal_config(),
            InitArgs::generate_config_with_examples(),
        ] {
            let config = parse_config(&content).unwrap();
            assert!(config.anonymization.is_some());
        }
    }

    #[test]
    fn test_init_refuses_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("shroud.toml");
        fs::write(&path, "existing").unwrap();

        let mut args = InitArgs {
            output: path.to_string_lossy().into_owned(),
            with_examples: false,
            force: false,
        };
        assert_eq!(args.execute().unwrap(), 2);
        assert_eq!(fs::read_to_string(&path).unwrap(), "existing");

        args.force = true;
        assert_eq!(args.execute().unwrap(), 0);
        assert!(fs::read_to_string(&path).unwrap().contains("[anonymization]"));
    }
}
