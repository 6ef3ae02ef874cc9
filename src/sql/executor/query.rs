use tracing::debug;

use crate::{
    error::Result,
    sql::{
        executor::{Context, ResultSet, filter::matching_rows, resolve::resolve_column},
        parser::ast::{Filter, Projection},
    },
    table::{Row, Table, Value},
};

use super::Executor;

/// SELECT executor - filters and projects rows without touching the table
pub struct Select {
    columns: Projection,
    table_ref: String,
    filter: Option<Filter>,
}

impl Select {
    pub fn new(columns: Projection, table_ref: String, filter: Option<Filter>) -> Box<Self> {
        Box::new(Self { columns, table_ref, filter })
    }
}

impl Executor for Select {
    fn execute(self: Box<Self>, table: &mut Table, ctx: &mut Context) -> Result<ResultSet> {
        let Self { columns, table_ref, filter } = *self;
        if table.has_column_ignore_case(&table_ref) {
            ctx.warn(format!(
                "'{}' after FROM is a column name; the table name is only a placeholder \
                 for the loaded data and is ignored",
                table_ref
            ));
        }

        let columns = match columns {
            Projection::All => table.headers.clone(),
            Projection::Columns(requested) => {
                let mut columns: Vec<String> = Vec::with_capacity(requested.len());
                for name in requested {
                    let column = resolve_column(&name, &table.headers, &table_ref, ctx)?;
                    if columns.contains(&column) {
                        ctx.warn(format!("Column '{}' is selected more than once; keeping the first", column));
                        continue;
                    }
                    columns.push(column);
                }
                columns
            }
        };

        let indices = matching_rows(filter.as_ref(), table, &table_ref, ctx)?;
        let passthrough = columns == table.headers;
        debug!(rows = indices.len(), passthrough, "select");

        let rows = indices
            .into_iter()
            .map(|i| {
                let row = &table.rows[i];
                if passthrough {
                    row.clone()
                } else {
                    project(row, &columns)
                }
            })
            .collect();
        Ok(ResultSet::Select { columns, rows })
    }
}

/// Restricts a row to `columns`, filling absent cells with `Null`
fn project(row: &Row, columns: &[String]) -> Row {
    columns
        .iter()
        .map(|c| (c.clone(), row.get(c).cloned().unwrap_or(Value::Null)))
        .collect()
}
