//! csvql - a small SQL-dialect query engine for CSV text
//!
//! This crate provides:
//! - A tokenizer and parser for single SELECT / UPDATE / DELETE statements
//! - WHERE clauses with LIKE, IN and comparison predicates
//! - Column lookup that forgives case differences and small typos
//! - A CSV codec and a report with column profiles and diagnostics
//!
//! ```no_run
//! use csvql::QueryEngine;
//!
//! let report = QueryEngine::default().run("Name,Age\nBob,30\n", "SELECT Name FROM data");
//! println!("{}", report.result_text);
//! ```

pub mod config;
pub mod error;
pub mod sql;
pub mod table;

pub use config::{EngineConfig, HeaderMode};
pub use error::{Error, Result};
pub use sql::engine::{
    OperationKind, QueryEngine,
    report::{ColumnProfile, InferredType, QueryReport},
};
