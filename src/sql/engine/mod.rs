use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    config::EngineConfig,
    error::{Error, Result},
    sql::{
        executor::{Context, Executor, ResultSet},
        parser::{
            Parser,
            lexer::{Keyword, Lexer, Token},
        },
    },
    table::{
        Table,
        codec::{CsvCodec, TabularCodec},
    },
};

pub mod report;

use report::{QueryReport, assemble};

/// Operation kind, decided by the leading keyword of the query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    Select,
    Update,
    Delete,
    Unsupported,
}

impl OperationKind {
    pub fn classify(query: &str) -> Self {
        match Lexer::new(query).next() {
            Some(Ok(Token::Keyword(Keyword::Select))) => OperationKind::Select,
            Some(Ok(Token::Keyword(Keyword::Update))) => OperationKind::Update,
            Some(Ok(Token::Keyword(Keyword::Delete))) => OperationKind::Delete,
            _ => OperationKind::Unsupported,
        }
    }
}

/// Runs single queries against tabular text.
///
/// Holds only configuration and the codec; every call works on its own copy
/// of the table, so one engine can serve concurrent callers.
pub struct QueryEngine<C: TabularCodec = CsvCodec> {
    codec: C,
    config: EngineConfig,
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl QueryEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            codec: CsvCodec::from_config(&config),
            config,
        }
    }
}

impl<C: TabularCodec> QueryEngine<C> {
    /// Uses a custom codec; `config.delimiter` and `config.header` are then up to the codec
    pub fn with_codec(codec: C, config: EngineConfig) -> Self {
        Self { codec, config }
    }

    /// Executes one query against the table text.
    ///
    /// Never fails: errors become a report that carries the original text,
    /// no column profiles and the error among its diagnostics.
    pub fn run(&self, table_text: &str, query: &str) -> QueryReport {
        let kind = OperationKind::classify(query);
        let mut ctx = Context::new(&self.config);
        debug!(?kind, query, "running query");

        let result = self
            .execute(table_text, query, &mut ctx)
            .and_then(|(table, result)| assemble(&self.codec, table_text, &table, result));
        match result {
            Ok(mut report) => {
                debug!(rows_affected = report.rows_affected, "query finished");
                report.diagnostics = ctx.into_diagnostics();
                report
            }
            Err(err) => {
                warn!(%err, "query failed");
                QueryReport::failure(kind, table_text, &err, ctx.into_diagnostics())
            }
        }
    }

    fn execute(&self, table_text: &str, query: &str, ctx: &mut Context) -> Result<(Table, ResultSet)> {
        if table_text.trim().is_empty() {
            return Err(Error::EmptyInput("table text".to_string()));
        }
        if query.trim().is_empty() {
            return Err(Error::EmptyInput("query".to_string()));
        }

        let stmt = Parser::new(query).parse()?;
        debug!(?stmt, "parsed statement");
        let mut table = self.codec.decode(table_text)?;
        let result = <dyn Executor>::build(stmt).execute(&mut table, ctx)?;
        Ok((table, result))
    }
}
