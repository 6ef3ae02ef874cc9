/// Abstract Syntax Tree (AST) node definitions for query statements
#[derive(Debug, PartialEq)]
pub enum Statement {
    /// SELECT statement
    Select {
        columns: Projection,
        /// Placeholder name after FROM
        table_ref: String,
        filter: Option<Filter>,
    },
    /// UPDATE statement, exactly one assignment
    Update {
        table_ref: String,
        column: String,
        value: String,
        filter: Option<Filter>,
    },
    /// DELETE statement
    Delete {
        table_ref: String,
        filter: Option<Filter>,
    },
}

/// Column list of a SELECT
#[derive(Debug, PartialEq)]
pub enum Projection {
    All,
    Columns(Vec<String>),
}

/// WHERE clause after parsing
#[derive(Debug, PartialEq, Clone)]
pub enum Filter {
    Predicate(Predicate),
    /// The clause matched none of the supported predicate shapes
    Invalid { clause: String, reason: String },
}

/// The three supported predicate shapes
#[derive(Debug, PartialEq, Clone)]
pub enum Predicate {
    /// `<column> LIKE '<pattern>'`
    Like { column: String, pattern: String },
    /// `<column> IN ('<v1>', ...)`, never empty
    In { column: String, values: Vec<String> },
    /// `<column> <op> '<value>'`
    Comparison {
        column: String,
        op: CompareOp,
        value: String,
    },
}

impl Predicate {
    pub fn column(&self) -> &str {
        match self {
            Predicate::Like { column, .. }
            | Predicate::In { column, .. }
            | Predicate::Comparison { column, .. } => column,
        }
    }
}

/// Comparison operators
#[derive(Debug, PartialEq, Clone)]
pub enum CompareOp {
    Equal,
    /// `!=` or `<>`
    NotEqual,
    GreaterThan,
    LessThan,
    GreaterThanOrEqual,
    LessThanOrEqual,
    /// Operator-shaped token that is not a supported operator
    Unknown(String),
}

impl CompareOp {
    pub fn from_str(op: &str) -> Self {
        match op {
            "=" => CompareOp::Equal,
            "!=" | "<>" => CompareOp::NotEqual,
            ">" => CompareOp::GreaterThan,
            "<" => CompareOp::LessThan,
            ">=" => CompareOp::GreaterThanOrEqual,
            "<=" => CompareOp::LessThanOrEqual,
            op => CompareOp::Unknown(op.to_string()),
        }
    }
}
