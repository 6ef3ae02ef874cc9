use std::string::FromUtf8Error;

use thiserror::Error;

/// Custom Result type for csvql operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for csvql
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// Table text or query text missing or blank
    #[error("{0} is empty")]
    EmptyInput(String),

    /// Leading keyword is not SELECT, UPDATE or DELETE
    #[error("unsupported operation '{0}': only SELECT, UPDATE and DELETE queries are supported")]
    UnsupportedOperation(String),

    #[error("{}", column_not_found(.column, .available, .candidates, *.used_as_table))]
    ColumnNotFound {
        column: String,
        available: Vec<String>,
        /// Close matches when more than one header was equally likely
        candidates: Vec<String>,
        /// The missing name is also the table reference of the statement
        used_as_table: bool,
    },

    #[error(
        "could not parse WHERE clause `{clause}` ({reason}); supported forms are \
         `<column> LIKE '<pattern>'`, `<column> IN ('<v1>', '<v2>', ...)` and \
         `<column> <op> '<value>'` with <op> one of =, !=, <>, >, <, >=, <="
    )]
    InvalidWhereClause { clause: String, reason: String },

    #[error("IN list in `{0}` has no quoted values; write it as IN ('<v1>', '<v2>', ...)")]
    EmptyInList(String),

    #[error("invalid {statement} syntax: {reason}. Expected: {usage}")]
    InvalidStatementSyntax {
        statement: &'static str,
        reason: String,
        usage: &'static str,
    },

    #[error("unsupported comparison operator '{0}'; use one of =, !=, <>, >, <, >=, <=")]
    UnsupportedComparisonOperator(String),

    #[error("DELETE without a WHERE clause is too dangerous and was refused; add a WHERE condition")]
    UnsafeDelete,

    /// Lexer or parser error below the statement level
    #[error("parse error {0}")]
    Parse(String),

    /// Tabular text could not be decoded or encoded
    #[error("codec error {0}")]
    Codec(String),

    #[error("internal error {0}")]
    Internal(String),
}

impl Error {
    /// Wraps a low-level parse error into the syntax error of a statement kind.
    pub fn into_syntax(self, statement: &'static str, usage: &'static str) -> Self {
        match self {
            Error::Parse(reason) => Error::InvalidStatementSyntax { statement, reason, usage },
            err => err,
        }
    }
}

fn column_not_found(
    column: &str,
    available: &[String],
    candidates: &[String],
    used_as_table: bool,
) -> String {
    let mut msg = format!(
        "column '{}' not found. Available columns: {}",
        column,
        available.join(", ")
    );
    if !candidates.is_empty() {
        msg.push_str(&format!(". Did you mean one of: {}?", candidates.join(", ")));
    }
    if used_as_table {
        msg.push_str(&format!(
            ". Note: '{}' is also used as the table name; the name after FROM/UPDATE is only \
             a placeholder for the loaded table (e.g. `data`), column names belong in the \
             column list, SET or WHERE",
            column
        ));
    }
    msg
}

impl From<csv::Error> for Error {
    fn from(value: csv::Error) -> Self {
        Error::Codec(value.to_string())
    }
}

impl From<regex::Error> for Error {
    fn from(value: regex::Error) -> Self {
        Error::Internal(value.to_string())
    }
}

impl From<FromUtf8Error> for Error {
    fn from(value: FromUtf8Error) -> Self {
        Error::Codec(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn test_column_not_found_message() {
        let err = Error::ColumnNotFound {
            column: "Salary".to_string(),
            available: vec!["Name".to_string(), "Age".to_string()],
            candidates: vec![],
            used_as_table: false,
        };
        assert_eq!(err.to_string(), "column 'Salary' not found. Available columns: Name, Age");

        let err = Error::ColumnNotFound {
            column: "people".to_string(),
            available: vec!["Name".to_string()],
            candidates: vec![],
            used_as_table: true,
        };
        assert!(err.to_string().contains("also used as the table name"));
    }

    #[test]
    fn test_into_syntax() {
        let err = Error::Parse("missing SET".into()).into_syntax("UPDATE", "UPDATE <table> SET ...");
        assert!(matches!(err, Error::InvalidStatementSyntax { statement: "UPDATE", .. }));

        let err = Error::UnsafeDelete.into_syntax("DELETE", "");
        assert_eq!(err, Error::UnsafeDelete);
    }
}
