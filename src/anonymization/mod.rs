//! Anonymization module for Shroud
//!
//! This module turns a table plus a job configuration into an anonymized table,
//! a per-stage record of what changed and privacy/utility metrics.
//!
//! # Architecture
//!
//! The anonymization pipeline consists of:
//! - **Roles**: column mappings resolved into identifier, quasi-identifier and sensitive sets
//! - **Anonymizers**: per-column strategies (generalization, suppression,
//!   pseudonymization, masking, differential privacy)
//! - **Passes**: k-anonymity generalization and the l-diversity diagnostic
//! - **Metrics**: achieved k, achieved l and information loss
//!
//! # Usage
//!
//! ```rust,ignore
//! use shroud::anonymization::{AnonymizationConfig, AnonymizationEngine};
//!
//! let config = AnonymizationConfig::from_json_str(job_json)?;
//! let result = AnonymizationEngine::new().process(&table, &config)?;
//! println!("k = {}", result.metrics.achieved_k);
//! ```

pub mod anonymizer;
pub mod config;
pub mod engine;
pub mod metrics;
pub mod passes;
pub mod report;
pub mod roles;

// Re-export main types
pub use anonymizer::pseudonymization::{PseudonymStore, SessionPseudonyms};
pub use config::{AnonymizationConfig, ColumnMapping, ColumnRole, GlobalParams, TechniqueKind, TechniqueSpec};
pub use engine::{AnonymizationEngine, AnonymizationOutcome, ProcessingResult, SkipReason, Stage};
pub use metrics::Metrics;
pub use report::{TechniqueDetail, TechniqueDetails};
pub use roles::{resolve_roles, RoleAssignment};
