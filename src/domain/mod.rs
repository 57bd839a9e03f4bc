//! Domain models and types for Shroud.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Cell values** ([`Value`]) that are hashable and serialize as plain JSON scalars
//! - **Tables** ([`Table`], [`Column`]) stored column-major with positional rows
//! - **Error types** ([`ShroudError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T, ShroudError>`]:
//!
//! ```rust
//! use shroud::domain::{Column, Result, Table, Value};
//!
//! fn example() -> Result<usize> {
//!     let table = Table::new(vec![Column::new("age", vec![Value::Int(28)])])?;
//!     Ok(table.require_column("age")?.len())
//! }
//! # assert_eq!(example().unwrap(), 1);
//! ```

pub mod errors;
pub mod result;
pub mod table;
pub mod value;

// Re-export commonly used types for convenience
pub use errors::ShroudError;
pub use result::Result;
pub use table::{Column, Table};
pub use value::Value;
