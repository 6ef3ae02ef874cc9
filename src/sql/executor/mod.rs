use tracing::warn;

use crate::{
    config::EngineConfig,
    error::Result,
    sql::{
        executor::{
            mutation::{Delete, Update},
            query::Select,
        },
        parser::ast::Statement,
    },
    table::{Row, Table},
};

pub mod filter;
mod mutation;
mod query;
pub mod resolve;

/// Statement executor
///
/// Borrows the table exclusively for the duration of one statement.
pub trait Executor {
    fn execute(self: Box<Self>, table: &mut Table, ctx: &mut Context) -> Result<ResultSet>;
}

/// Builds an executor from a parsed statement
impl dyn Executor {
    pub fn build(stmt: Statement) -> Box<dyn Executor> {
        match stmt {
            Statement::Select { columns, table_ref, filter } => {
                Select::new(columns, table_ref, filter)
            }
            Statement::Update { table_ref, column, value, filter } => {
                Update::new(table_ref, column, value, filter)
            }
            Statement::Delete { table_ref, filter } => Delete::new(table_ref, filter),
        }
    }
}

/// Execution result set
#[derive(Debug, PartialEq)]
pub enum ResultSet {
    /// Projected rows; the table itself is left untouched
    Select { columns: Vec<String>, rows: Vec<Row> },
    Update { column: String, count: usize },
    Delete { count: usize },
}

/// Per-invocation state threaded through every component
#[derive(Debug)]
pub struct Context {
    diagnostics: Vec<String>,
    fuzzy_columns: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(&EngineConfig::default())
    }
}

impl Context {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            diagnostics: Vec::new(),
            fuzzy_columns: config.fuzzy_columns,
        }
    }

    /// Records a non-fatal diagnostic
    pub fn warn(&mut self, msg: impl Into<String>) {
        let msg = msg.into();
        warn!(diagnostic = %msg);
        self.diagnostics.push(msg);
    }

    pub fn fuzzy_columns(&self) -> bool {
        self.fuzzy_columns
    }

    pub fn diagnostics(&self) -> &[String] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<String> {
        self.diagnostics
    }
}
