use std::collections::{BTreeSet, HashSet};

use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::{
        executor::{Context, ResultSet, filter::matching_rows, resolve::resolve_column},
        parser::ast::Filter,
    },
    table::{Table, Value},
};

use super::Executor;

/// UPDATE executor
pub struct Update {
    table_ref: String,
    column: String,
    value: String,
    filter: Option<Filter>,
}

impl Update {
    pub fn new(table_ref: String, column: String, value: String, filter: Option<Filter>) -> Box<Self> {
        Box::new(Self { table_ref, column, value, filter })
    }
}

impl Executor for Update {
    fn execute(self: Box<Self>, table: &mut Table, ctx: &mut Context) -> Result<ResultSet> {
        let column = resolve_column(&self.column, &table.headers, &self.table_ref, ctx)?;
        // Row identities, so a row matched twice is still updated once
        let targets = matching_rows(self.filter.as_ref(), table, &self.table_ref, ctx)?
            .into_iter()
            .collect::<BTreeSet<_>>();

        // Same inference as the codec, so '18' is stored as a number
        let value = Value::infer(&self.value);
        for &i in &targets {
            table.rows[i].insert(column.clone(), value.clone());
        }

        debug!(column = %column, count = targets.len(), "update");
        Ok(ResultSet::Update { column, count: targets.len() })
    }
}

/// DELETE executor, refuses to run without a WHERE clause
pub struct Delete {
    table_ref: String,
    filter: Option<Filter>,
}

impl Delete {
    pub fn new(table_ref: String, filter: Option<Filter>) -> Box<Self> {
        Box::new(Self { table_ref, filter })
    }
}

impl Executor for Delete {
    fn execute(self: Box<Self>, table: &mut Table, ctx: &mut Context) -> Result<ResultSet> {
        let Self { table_ref, filter } = *self;
        let Some(filter) = filter else {
            return Err(Error::UnsafeDelete);
        };

        let before = table.rows.len();
        let matched = matching_rows(Some(&filter), table, &table_ref, ctx)?
            .into_iter()
            .collect::<HashSet<_>>();
        // Keep every row the filter did not match, in order
        let rows = std::mem::take(&mut table.rows);
        table.rows = rows
            .into_iter()
            .enumerate()
            .filter(|(i, _)| !matched.contains(i))
            .map(|(_, row)| row)
            .collect();

        let count = before - table.rows.len();
        debug!(count, remaining = table.rows.len(), "delete");
        Ok(ResultSet::Delete { count })
    }
}
