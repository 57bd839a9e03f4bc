// Shroud - Tabular Anonymization Engine
// Copyright (c) 2025 Shroud Contributors
// Licensed under the MIT License

//! # Shroud - Tabular Anonymization Engine
//!
//! Shroud anonymizes tabular datasets according to a declarative job
//! configuration and reports how much privacy was gained and how much
//! utility was lost.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Removing** direct identifiers
//! - **Transforming** columns with generalization, suppression,
//!   pseudonymization, masking and Laplace noise
//! - **Enforcing** k-anonymity over quasi-identifiers
//! - **Measuring** k-anonymity, l-diversity and information loss
//!
//! ## Architecture
//!
//! Shroud follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`anonymization`] - Job configuration, techniques, passes, metrics and the engine
//! - [`domain`] - Cell values, tables and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust
//! use shroud::anonymization::{AnonymizationConfig, AnonymizationEngine};
//! use shroud::domain::{Column, Table, Value};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let table = Table::new(vec![
//!     Column::new("id", (1..=4).map(Value::Int).collect()),
//!     Column::new("age", vec![Value::Int(23), Value::Int(35), Value::Int(47), Value::Int(59)]),
//! ])?;
//!
//! let job = AnonymizationConfig::from_json_str(
//!     r#"{
//!         "column_mappings": [
//!             {"column": "id", "type": "identifier"},
//!             {"column": "age", "type": "quasi-identifier"}
//!         ],
//!         "global_params": {"k": 2, "l": 2}
//!     }"#,
//! )?;
//!
//! let result = AnonymizationEngine::with_seed(Some(7)).process(&table, &job)?;
//! assert!(!result.anonymized.has_column("id"));
//! assert!(result.metrics.achieved_k >= 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Shroud uses the [`domain::ShroudError`] type for all library errors.
//! Specs naming missing columns or unknown techniques are skipped and
//! reported rather than raised; invalid technique parameters are errors.
//!
//! ## Logging
//!
//! Shroud uses structured logging with the `tracing` crate. Call
//! [`logging::init_logging`] once at startup to install a subscriber.

pub mod anonymization;
pub mod cli;
pub mod config;
pub mod domain;
pub mod logging;
