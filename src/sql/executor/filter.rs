//! WHERE clause evaluation

use std::collections::HashSet;

use regex::Regex;
use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        executor::{Context, resolve::resolve_column},
        parser::ast::{CompareOp, Filter, Predicate},
    },
    table::{Table, Value, parse_number},
};

/// Indices of the rows a statement applies to, in table order.
///
/// No filter selects every row. A clause that could not be parsed selects
/// nothing and leaves a diagnostic; other errors abort the statement.
pub fn matching_rows(
    filter: Option<&Filter>,
    table: &Table,
    table_ref: &str,
    ctx: &mut Context,
) -> Result<Vec<usize>> {
    let Some(filter) = filter else {
        return Ok((0..table.rows.len()).collect());
    };
    match evaluate(filter, table, table_ref, ctx) {
        Ok(indices) => {
            debug!(matched = indices.len(), "where clause evaluated");
            Ok(indices)
        }
        Err(err @ Error::InvalidWhereClause { .. }) => {
            ctx.warn(format!("{}; no rows matched", err));
            Ok(Vec::new())
        }
        Err(err) => Err(err),
    }
}

/// Evaluates a WHERE clause against every row of the table
pub fn evaluate(
    filter: &Filter,
    table: &Table,
    table_ref: &str,
    ctx: &mut Context,
) -> Result<Vec<usize>> {
    let predicate = match filter {
        Filter::Predicate(predicate) => predicate,
        Filter::Invalid { clause, reason } => {
            return Err(Error::InvalidWhereClause {
                clause: clause.clone(),
                reason: reason.clone(),
            });
        }
    };
    let column = resolve_column(predicate.column(), &table.headers, table_ref, ctx)?;
    let cells = table.column_values(&column);

    Ok(match predicate {
        Predicate::Like { pattern, .. } => {
            let regex = like_to_regex(pattern)?;
            positions(cells, |cell| regex.is_match(&cell.to_string()))
        }
        Predicate::In { values, .. } => {
            let values = values.iter().map(|v| v.to_lowercase()).collect::<HashSet<_>>();
            positions(cells, |cell| values.contains(&cell.to_string().to_lowercase()))
        }
        Predicate::Comparison { op: CompareOp::Unknown(op), .. } => {
            let err = Error::UnsupportedComparisonOperator(op.clone());
            ctx.warn(format!("{}; rows compared with it were excluded", err));
            Vec::new()
        }
        Predicate::Comparison { op, value, .. } => {
            positions(cells, |cell| matches!(compare(cell, op, value), Ok(true)))
        }
    })
}

fn positions<'a>(
    cells: impl Iterator<Item = &'a Value>,
    mut predicate: impl FnMut(&Value) -> bool,
) -> Vec<usize> {
    cells
        .enumerate()
        .filter_map(|(i, cell)| predicate(cell).then_some(i))
        .collect()
}

/// Compiles a LIKE pattern into a case-insensitive, fully anchored regex.
///
/// `%` matches any run of characters and `_` exactly one; everything else is literal.
pub fn like_to_regex(pattern: &str) -> Result<Regex> {
    let mut regex = String::with_capacity(pattern.len() * 2 + 8);
    regex.push_str("(?is)^");
    let mut literal = [0u8; 4];
    for c in pattern.chars() {
        match c {
            '%' => regex.push_str(".*"),
            '_' => regex.push('.'),
            c => regex.push_str(&regex::escape(c.encode_utf8(&mut literal))),
        }
    }
    regex.push('$');
    Ok(Regex::new(&regex)?)
}

/// Compares a cell against a literal.
///
/// When both sides read as numbers the comparison is numeric. Otherwise
/// equality is a case-insensitive string match and ordering never matches.
/// Blank cells read as 0, so they take part in numeric comparisons.
pub fn compare(cell: &Value, op: &CompareOp, literal: &str) -> Result<bool> {
    let numbers = cell.as_number().zip(parse_number(literal));
    let text_equal = || cell.to_string().to_lowercase() == literal.to_lowercase();

    Ok(match op {
        CompareOp::Equal => numbers.map_or_else(text_equal, |(a, b)| a == b),
        CompareOp::NotEqual => !numbers.map_or_else(text_equal, |(a, b)| a == b),
        CompareOp::GreaterThan => numbers.is_some_and(|(a, b)| a > b),
        CompareOp::LessThan => numbers.is_some_and(|(a, b)| a < b),
        CompareOp::GreaterThanOrEqual => numbers.is_some_and(|(a, b)| a >= b),
        CompareOp::LessThanOrEqual => numbers.is_some_and(|(a, b)| a <= b),
        CompareOp::Unknown(op) => return Err(Error::UnsupportedComparisonOperator(op.clone())),
    })
}
