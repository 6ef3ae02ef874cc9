//! Result assembly: column profiles, summary and the serialized table

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::{
    error::{Error, Result},
    sql::{engine::OperationKind, executor::ResultSet},
    table::{Table, Value, codec::TabularCodec, parse_number},
};

/// Structured outcome of one query
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryReport {
    pub operation: OperationKind,
    /// Final table text; the untouched input when nothing changed or the query failed
    pub result_text: String,
    pub summary: String,
    /// Rows updated or deleted; rows returned for SELECT
    pub rows_affected: usize,
    pub affected_columns: Vec<String>,
    pub column_profiles: Vec<ColumnProfile>,
    pub diagnostics: Vec<String>,
    pub is_projection: bool,
    /// Source text alongside a SELECT projection
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_table_text: Option<String>,
    /// Failure message when the query could not run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl QueryReport {
    /// Report for a query that failed: the input comes back unchanged
    pub fn failure(
        operation: OperationKind,
        table_text: &str,
        err: &Error,
        mut diagnostics: Vec<String>,
    ) -> Self {
        let summary = match err {
            Error::EmptyInput(_) => format!("Nothing to run: {}.", err),
            _ => format!("The query could not be run: {}.", err),
        };
        diagnostics.push(err.to_string());
        Self {
            operation,
            result_text: table_text.to_string(),
            summary,
            rows_affected: 0,
            affected_columns: Vec::new(),
            column_profiles: Vec::new(),
            diagnostics,
            is_projection: false,
            original_table_text: None,
            error: Some(err.to_string()),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Number,
    Boolean,
    Date,
    String,
}

/// Statistics of one column of the final table
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnProfile {
    pub name: String,
    pub inferred_type: InferredType,
    pub non_null_count: usize,
    pub unique_value_count: usize,
}

/// Builds the report for an executed statement.
///
/// `table` is the table after execution; for SELECT it is the unchanged source.
/// Diagnostics are attached by the caller.
pub fn assemble<C: TabularCodec>(
    codec: &C,
    original_text: &str,
    table: &Table,
    result: ResultSet,
) -> Result<QueryReport> {
    let total = table.rows.len();
    let report = match result {
        ResultSet::Select { columns, rows } => {
            let projection = Table {
                headers: columns,
                rows,
                synthetic_headers: table.synthetic_headers,
            };
            let count = projection.rows.len();
            QueryReport {
                operation: OperationKind::Select,
                result_text: codec.encode(&projection)?,
                summary: format!(
                    "Selected {} of {}, showing {} column{}: {}.",
                    plural(count, "row"),
                    plural(total, "row"),
                    projection.headers.len(),
                    if projection.headers.len() == 1 { "" } else { "s" },
                    projection.headers.join(", ")
                ),
                rows_affected: count,
                affected_columns: projection.headers.clone(),
                column_profiles: profile_columns(&projection),
                diagnostics: Vec::new(),
                is_projection: true,
                original_table_text: Some(original_text.to_string()),
                error: None,
            }
        }
        ResultSet::Update { column, count } => QueryReport {
            operation: OperationKind::Update,
            result_text: encode_changed(codec, original_text, table, count)?,
            summary: if count == 0 {
                "No rows matched the UPDATE condition; the table is unchanged.".to_string()
            } else {
                format!(
                    "Updated {} of {}, setting column '{}'.",
                    plural(count, "row"),
                    plural(total, "row"),
                    column
                )
            },
            rows_affected: count,
            affected_columns: vec![column],
            column_profiles: profile_columns(table),
            diagnostics: Vec::new(),
            is_projection: false,
            original_table_text: None,
            error: None,
        },
        ResultSet::Delete { count } => QueryReport {
            operation: OperationKind::Delete,
            result_text: encode_changed(codec, original_text, table, count)?,
            summary: if count == 0 {
                "No rows matched the DELETE condition; the table is unchanged.".to_string()
            } else {
                format!("Deleted {}; {} remaining.", plural(count, "row"), plural(total, "row"))
            },
            rows_affected: count,
            affected_columns: Vec::new(),
            column_profiles: profile_columns(table),
            diagnostics: Vec::new(),
            is_projection: false,
            original_table_text: None,
            error: None,
        },
    };
    Ok(report)
}

// An untouched table is returned as the exact input text
fn encode_changed<C: TabularCodec>(
    codec: &C,
    original_text: &str,
    table: &Table,
    count: usize,
) -> Result<String> {
    if count == 0 {
        Ok(original_text.to_string())
    } else {
        codec.encode(table)
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 { format!("{} {}", n, noun) } else { format!("{} {}s", n, noun) }
}

/// Profiles every header column of the table
pub fn profile_columns(table: &Table) -> Vec<ColumnProfile> {
    table
        .headers
        .iter()
        .map(|name| {
            let values = table
                .column_values(name)
                .filter(|v| !v.is_blank())
                .collect::<Vec<_>>();
            ColumnProfile {
                name: name.clone(),
                inferred_type: values.first().map_or(InferredType::String, |v| infer_type(v)),
                non_null_count: values.len(),
                unique_value_count: values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<HashSet<_>>()
                    .len(),
            }
        })
        .collect()
}

/// Type of a column judged from its first non-blank value
fn infer_type(value: &Value) -> InferredType {
    match value {
        Value::Integer(_) | Value::Float(_) => InferredType::Number,
        Value::Boolean(_) => InferredType::Boolean,
        Value::String(s) if parse_number(s).is_some() => InferredType::Number,
        Value::String(s) if is_date(s.trim()) => InferredType::Date,
        _ => InferredType::String,
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

fn is_date(s: &str) -> bool {
    DATE_FORMATS.iter().any(|f| NaiveDate::parse_from_str(s, f).is_ok())
        || DATETIME_FORMATS.iter().any(|f| NaiveDateTime::parse_from_str(s, f).is_ok())
        || DateTime::parse_from_rfc3339(s).is_ok()
        || DateTime::parse_from_rfc2822(s).is_ok()
}

#[cfg(test)]
mod tests {
    use super::{InferredType, assemble, profile_columns};
    use crate::{
        error::{Error, Result},
        sql::{
            engine::{OperationKind, report::QueryReport},
            executor::ResultSet,
        },
        table::codec::{CsvCodec, TabularCodec},
    };

    const TEXT: &str = "Name,Age,Joined,Member\nBob,30,2021-03-04,true\nAmy,17,,false\nbob,,2020-01-01,\n";

    #[test]
    fn test_profile_columns() -> Result<()> {
        let table = CsvCodec::default().decode(TEXT)?;
        let profiles = profile_columns(&table);
        let summary = profiles
            .iter()
            .map(|p| (p.name.as_str(), p.inferred_type, p.non_null_count, p.unique_value_count))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![
                ("Name", InferredType::String, 3, 3),
                ("Age", InferredType::Number, 2, 2),
                ("Joined", InferredType::Date, 2, 2),
                ("Member", InferredType::Boolean, 2, 2),
            ]
        );
        Ok(())
    }

    #[test]
    fn test_profile_of_empty_column() -> Result<()> {
        let table = CsvCodec::default().decode("a,b\n1,\n2,  \n")?;
        let profiles = profile_columns(&table);
        assert_eq!(profiles[1].inferred_type, InferredType::String);
        assert_eq!(profiles[1].non_null_count, 0);
        assert_eq!(profiles[1].unique_value_count, 0);
        Ok(())
    }

    #[test]
    fn test_unchanged_update_returns_input_text() -> Result<()> {
        let text = "Name ,Age\n\"Bob\",30\n";
        let codec = CsvCodec::default();
        let table = codec.decode(text)?;
        let report = assemble(&codec, text, &table, ResultSet::Update { column: "Age".into(), count: 0 })?;
        assert_eq!(report.result_text, text);
        assert_eq!(report.rows_affected, 0);
        assert!(report.summary.contains("unchanged"));
        Ok(())
    }

    #[test]
    fn test_select_report() -> Result<()> {
        let codec = CsvCodec::default();
        let table = codec.decode(TEXT)?;
        let rows = vec![table.rows[1].clone()];
        let report = assemble(
            &codec,
            TEXT,
            &table,
            ResultSet::Select { columns: table.headers.clone(), rows },
        )?;
        assert!(report.is_projection);
        assert_eq!(report.original_table_text.as_deref(), Some(TEXT));
        assert_eq!(report.result_text, "Name,Age,Joined,Member\nAmy,17,,false\n");
        assert_eq!(report.summary, "Selected 1 row of 3 rows, showing 4 columns: Name, Age, Joined, Member.");
        assert_eq!(report.column_profiles[1].non_null_count, 1);
        Ok(())
    }

    #[test]
    fn test_failure_report() {
        let err = Error::UnsafeDelete;
        let report = QueryReport::failure(OperationKind::Delete, TEXT, &err, vec!["earlier".into()]);
        assert!(report.is_failure());
        assert_eq!(report.result_text, TEXT);
        assert!(report.column_profiles.is_empty());
        assert_eq!(report.diagnostics, vec!["earlier".to_string(), err.to_string()]);
    }

    #[test]
    fn test_report_json() -> Result<()> {
        let report = QueryReport::failure(OperationKind::Unsupported, "a\n1\n", &Error::EmptyInput("query".into()), vec![]);
        let json = serde_json::to_value(&report).map_err(|e| Error::Internal(e.to_string()))?;
        assert_eq!(json["operation"], "UNSUPPORTED");
        assert_eq!(json["resultText"], "a\n1\n");
        assert_eq!(json["summary"], "Nothing to run: query is empty.");
        assert!(json.get("originalTableText").is_none());
        Ok(())
    }
}
