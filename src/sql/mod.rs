//! Query processing module
//!
//! This module provides:
//! - `parser`: lexer, AST and statement parser
//! - `executor`: column resolution, WHERE evaluation and statement executors
//! - `engine`: query entry point and result assembly

pub mod engine;
pub mod executor;
pub mod parser;
