//! Main anonymization engine
//!
//! This module provides the [`AnonymizationEngine`] that orchestrates a run
//! over one table.
//!
//! # Architecture
//!
//! A run is planned as an ordered list of [`Stage`]s and executed front to
//! back with no branching back:
//! - **DropIdentifiers**: identifier columns are removed
//! - **ApplyTechniques**: each technique spec runs in declaration order
//! - **KAnonymity**: quasi-identifiers are generalized, overwriting earlier output
//! - **LDiversity**: one diagnostic per sensitive column
//! - **NoChangesSentinel**: records that nothing had to change
//!
//! # Examples
//!
//! ```
//! use shroud::anonymization::{AnonymizationConfig, AnonymizationEngine};
//! use shroud::domain::Table;
//! use serde_json::json;
//!
//! let table: Table = serde_json::from_value(json!([
//!     {"name": "Ana", "email": "ana@example.com"},
//!     {"name": "Luis", "email": "luis@example.com"}
//! ]))?;
//! let config = AnonymizationConfig::from_json_str(r#"{
//!     "column_mappings": [{"column": "name", "type": "identifier"}],
//!     "techniques": [{"column": "email", "technique": "masking", "params": {"mask_type": "email"}}]
//! }"#)?;
//!
//! let outcome = AnonymizationEngine::new().run(&table, &config)?;
//! assert!(!outcome.table.has_column("name"));
//! assert!(outcome.details.contains_key("masking_email"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::anonymization::anonymizer::pseudonymization::{PseudonymStore, SessionPseudonyms};
use crate::anonymization::anonymizer::{self, TransformContext};
use crate::anonymization::config::{AnonymizationConfig, TechniqueKind};
use crate::anonymization::metrics::Metrics;
use crate::anonymization::passes::{k_anonymity_pass, l_diversity_pass};
use crate::anonymization::report::{
    TechniqueDetail, TechniqueDetails, K_ANONYMITY_KEY, L_DIVERSITY_KEY, NO_CHANGES_KEY,
};
use crate::anonymization::roles::{resolve_roles, RoleAssignment};
use crate::domain::{Result, Table};
use crate::{log_error_with_context, log_run_complete, log_stage_start, log_technique_applied};
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// One step of a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum Stage {
    /// Remove identifier columns
    DropIdentifiers,
    /// Apply technique specs in order
    ApplyTechniques,
    /// Generalize quasi-identifiers towards `k`
    KAnonymity { k: usize },
    /// Measure diversity of one sensitive column
    LDiversity { l: usize, column: String },
    /// Record that no change was required
    NoChangesSentinel,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DropIdentifiers => write!(f, "drop_identifiers"),
            Self::ApplyTechniques => write!(f, "apply_techniques"),
            Self::KAnonymity { k } => write!(f, "k_anonymity(k={k})"),
            Self::LDiversity { l, column } => write!(f, "l_diversity(l={l}, column={column})"),
            Self::NoChangesSentinel => write!(f, "no_changes_sentinel"),
        }
    }
}

/// Why a technique spec was not applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The column is not in the table (or was dropped as an identifier)
    ColumnNotFound,
    /// The technique name is unknown
    UnrecognizedTechnique,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColumnNotFound => f.write_str("column not found"),
            Self::UnrecognizedTechnique => f.write_str("unrecognized technique"),
        }
    }
}

/// A technique spec the run did not apply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedTechnique {
    /// Target column
    pub column: String,
    /// Requested technique
    pub technique: TechniqueKind,
    /// Why it was skipped
    pub reason: SkipReason,
}

/// Everything a run produced
#[derive(Debug, Clone, PartialEq)]
pub struct AnonymizationOutcome {
    /// Transformed table
    pub table: Table,
    /// Technique details in stage order
    pub details: TechniqueDetails,
    /// Resolved column roles
    pub roles: RoleAssignment,
    /// Technique specs that were not applied
    pub skipped: Vec<SkippedTechnique>,
    /// Executed plan
    pub stages: Vec<Stage>,
}

/// Result of [`AnonymizationEngine::process`]
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    /// Unique run identifier
    pub run_id: Uuid,
    /// Transformed rows
    pub anonymized: Table,
    /// Privacy and utility metrics
    pub metrics: Metrics,
    /// What every stage did
    pub technique_details: TechniqueDetails,
    /// Technique specs that were not applied
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<SkippedTechnique>,
    /// Wall-clock processing time
    pub processing_time_ms: u64,
    /// Completion timestamp
    pub completed_at: DateTime<Utc>,
}

/// Main anonymization engine
///
/// The engine holds only immutable options; every call works on its own copy
/// of the table with its own random source and pseudonym mappings, so one
/// engine can serve concurrent callers.
#[derive(Debug, Clone, Default)]
pub struct AnonymizationEngine {
    seed: Option<u64>,
}

impl AnonymizationEngine {
    /// Engine drawing randomness from entropy
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine whose runs are reproducible for a given seed
    pub fn with_seed(seed: Option<u64>) -> Self {
        Self { seed }
    }

    /// Seed used for each run, if any
    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    /// Builds the ordered stage list for a job
    pub fn plan(roles: &RoleAssignment, config: &AnonymizationConfig) -> Vec<Stage> {
        let mut stages = vec![Stage::DropIdentifiers, Stage::ApplyTechniques];
        let k = config.global_params.k;
        let l = config.global_params.l;

        if roles.has_quasi_identifiers() && k > 1 {
            stages.push(Stage::KAnonymity { k });
        }
        if roles.has_quasi_identifiers() && l > 1 {
            stages.extend(roles.diversity_targets().map(|column| Stage::LDiversity {
                l,
                column: column.clone(),
            }));
        }
        stages.push(Stage::NoChangesSentinel);
        stages
    }

    /// Runs a job over `table`
    ///
    /// Pseudonyms come from a fresh in-memory store per technique application.
    ///
    /// # Errors
    ///
    /// Invalid technique parameters (suppression threshold outside `[0, 1]`,
    /// non-positive epsilon, unknown mask type, wrongly typed values) abort the
    /// run. Specs naming absent columns or unknown techniques are skipped and
    /// listed in [`AnonymizationOutcome::skipped`].
    pub fn run(&self, table: &Table, config: &AnonymizationConfig) -> Result<AnonymizationOutcome> {
        self.execute(table, config, None)
    }

    /// Runs a job with a caller-owned pseudonym store
    ///
    /// Every pseudonymization in the run draws from `store`, so identifiers stay
    /// stable across runs sharing it.
    pub fn run_with_store(
        &self,
        table: &Table,
        config: &AnonymizationConfig,
        store: &mut dyn PseudonymStore,
    ) -> Result<AnonymizationOutcome> {
        self.execute(table, config, Some(store))
    }

    /// Runs a job and measures the result
    pub fn process(&self, table: &Table, config: &AnonymizationConfig) -> Result<ProcessingResult> {
        let start = Instant::now();
        let outcome = self.run(table, config)?;
        Self::finish(table, outcome, start)
    }

    /// Like [`process`](Self::process) with a caller-owned pseudonym store
    pub fn process_with_store(
        &self,
        table: &Table,
        config: &AnonymizationConfig,
        store: &mut dyn PseudonymStore,
    ) -> Result<ProcessingResult> {
        let start = Instant::now();
        let outcome = self.run_with_store(table, config, store)?;
        Self::finish(table, outcome, start)
    }

    fn finish(table: &Table, outcome: AnonymizationOutcome, start: Instant) -> Result<ProcessingResult> {
        let metrics = Metrics::compute(table, &outcome.table, &outcome.roles)?;
        let elapsed = start.elapsed();
        log_run_complete!(outcome.table.len(), elapsed);

        Ok(ProcessingResult {
            run_id: Uuid::new_v4(),
            anonymized: outcome.table,
            metrics,
            technique_details: outcome.details,
            skipped: outcome.skipped,
            processing_time_ms: elapsed.as_millis() as u64,
            completed_at: Utc::now(),
        })
    }

    fn execute(
        &self,
        table: &Table,
        config: &AnonymizationConfig,
        mut store: Option<&mut dyn PseudonymStore>,
    ) -> Result<AnonymizationOutcome> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let roles = resolve_roles(&config.column_mappings, &table.column_names());
        for column in &roles.unknown_columns {
            warn!(column = %column, "Column mapping refers to a column not in the table");
        }

        let stages = Self::plan(&roles, config);
        info!(
            job = config.name.as_deref().unwrap_or("unnamed"),
            rows = table.len(),
            columns = table.column_count(),
            stages = stages.len(),
            "Starting anonymization run"
        );

        let mut working = table.clone();
        let mut details = TechniqueDetails::new();
        let mut skipped = Vec::new();

        for stage in &stages {
            log_stage_start!(stage);
            match stage {
                Stage::DropIdentifiers => {
                    for column in &roles.identifiers {
                        if working.drop_column(column).is_some() {
                            details.insert(format!("identifier_{column}"), identifier_detail(column));
                        }
                    }
                }
                Stage::ApplyTechniques => {
                    for spec in &config.techniques {
                        let Some(values) = working.column(&spec.column) else {
                            skipped.push(skip(spec.column.clone(), &spec.technique, SkipReason::ColumnNotFound));
                            continue;
                        };
                        let Some(mut strategy) = anonymizer::for_spec(spec)? else {
                            skipped.push(skip(
                                spec.column.clone(),
                                &spec.technique,
                                SkipReason::UnrecognizedTechnique,
                            ));
                            continue;
                        };

                        let mut session = SessionPseudonyms::new();
                        let pseudonyms: &mut dyn PseudonymStore = match store.as_deref_mut() {
                            Some(shared) => shared,
                            None => &mut session,
                        };
                        let mut ctx = TransformContext {
                            rng: &mut rng,
                            pseudonyms,
                        };
                        let result = strategy
                            .anonymize_column(values, &mut ctx)
                            .inspect_err(|e| {
                                let context = format!(
                                    "Failed to apply {} to column '{}'",
                                    spec.technique, spec.column
                                );
                                log_error_with_context!(e, context);
                            })?;

                        log_technique_applied!(spec.technique, spec.column, result.changes.len());
                        working.replace_column(&spec.column, result.values)?;

                        let mut detail = TechniqueDetail::new(spec.technique.label(), result.explanation)
                            .with_column(spec.column.clone())
                            .with_params(spec.params.clone())
                            .with_changes(result.changes);
                        detail.range_mapping = result.range_mapping;
                        detail.fallback = result.fallback;
                        details.insert(format!("{}_{}", spec.technique, spec.column), detail);
                    }
                }
                Stage::KAnonymity { k } => {
                    let detail = k_anonymity_pass(&mut working, &roles.quasi_identifiers, *k)?;
                    details.insert(K_ANONYMITY_KEY, detail);
                }
                Stage::LDiversity { l, column } => {
                    let detail = l_diversity_pass(&working, &roles.quasi_identifiers, column, *l)?;
                    if let Some(error) = &detail.error {
                        warn!(column = %column, error = %error, "L-diversity check could not run");
                    }
                    let key = if roles.diversity_targets().next() == Some(column) {
                        L_DIVERSITY_KEY.to_string()
                    } else {
                        format!("{L_DIVERSITY_KEY}_{column}")
                    };
                    details.insert(key, detail);
                }
                Stage::NoChangesSentinel => {
                    if details.is_empty() {
                        details.insert(NO_CHANGES_KEY, no_changes_detail());
                    }
                }
            }
        }

        for entry in &skipped {
            warn!(
                column = %entry.column,
                technique = %entry.technique,
                reason = %entry.reason,
                "Technique skipped"
            );
        }

        Ok(AnonymizationOutcome {
            table: working,
            details,
            roles,
            skipped,
            stages,
        })
    }
}

fn skip(column: String, technique: &TechniqueKind, reason: SkipReason) -> SkippedTechnique {
    SkippedTechnique {
        column,
        technique: technique.clone(),
        reason,
    }
}

fn identifier_detail(column: &str) -> TechniqueDetail {
    TechniqueDetail::new(
        "Identifier Removal",
        "Direct identifiers make it possible to recognise a person without effort, so they are removed completely.",
    )
    .with_changes(vec![format!("Removed column '{column}' entirely")])
}

fn no_changes_detail() -> TechniqueDetail {
    TechniqueDetail::new(
        "No Changes",
        "The configuration did not require any anonymization technique, so the data was left as it was.",
    )
    .with_changes(vec!["No changes were required".to_string()])
}
