//! Conversion between delimited text and `Table`

use std::collections::HashSet;

use tracing::debug;

use crate::{
    config::{EngineConfig, HeaderMode},
    error::{Error, Result},
    table::{Row, Table, Value, parse_number},
};

/// Decodes raw text into a table and encodes a table back into text
pub trait TabularCodec {
    fn decode(&self, text: &str) -> Result<Table>;
    fn encode(&self, table: &Table) -> Result<String>;
}

/// CSV codec backed by the `csv` crate
#[derive(Debug, Clone)]
pub struct CsvCodec {
    delimiter: u8,
    header: HeaderMode,
}

impl Default for CsvCodec {
    fn default() -> Self {
        Self::new(b',', HeaderMode::Detect)
    }
}

impl CsvCodec {
    pub fn new(delimiter: u8, header: HeaderMode) -> Self {
        Self { delimiter, header }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.delimiter, config.header)
    }
}

impl TabularCodec for CsvCodec {
    fn decode(&self, text: &str) -> Result<Table> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_reader(text.as_bytes());
        let mut records = reader
            .records()
            .collect::<std::result::Result<Vec<_>, _>>()?
            .into_iter();

        let Some(first) = records.next() else {
            return Ok(Table::default());
        };
        let first = first.iter().collect::<Vec<_>>();

        let has_header = match self.header {
            HeaderMode::Present => true,
            HeaderMode::Absent => false,
            HeaderMode::Detect => looks_like_header(&first),
        };
        let headers = if has_header {
            header_names(&first)
        } else {
            (1..=first.len()).map(|i| format!("column_{}", i)).collect()
        };

        let mut rows = Vec::new();
        if !has_header {
            rows.push(make_row(&headers, first.into_iter()));
        }
        for record in records {
            if record.len() > headers.len() {
                debug!(
                    fields = record.len(),
                    columns = headers.len(),
                    "dropping extra fields of a record"
                );
            }
            rows.push(make_row(&headers, record.iter()));
        }

        let mut table = Table::new(headers, rows);
        table.synthetic_headers = !has_header;
        Ok(table)
    }

    fn encode(&self, table: &Table) -> Result<String> {
        if table.headers.is_empty() {
            return Ok(String::new());
        }
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(vec![]);
        if !table.synthetic_headers {
            writer.write_record(&table.headers)?;
        }
        for row in &table.rows {
            writer.write_record(
                table
                    .headers
                    .iter()
                    .map(|h| row.get(h).map(|v| v.to_string()).unwrap_or_default()),
            )?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| Error::Codec(e.to_string()))?;
        Ok(String::from_utf8(bytes)?)
    }
}

// A header row has at least one name; its non-blank fields are distinct,
// non-numeric and non-boolean. Blank fields are named by `header_names`.
fn looks_like_header(fields: &[&str]) -> bool {
    let mut seen = HashSet::new();
    let mut names = fields.iter().map(|f| f.trim()).filter(|f| !f.is_empty()).peekable();
    names.peek().is_some()
        && names.all(|f| {
            matches!(Value::infer(f), Value::String(_))
                && parse_number(f).is_none()
                && seen.insert(f.to_string())
        })
}

// Trims names, fills blanks and suffixes duplicates so every name is a unique key
fn header_names(fields: &[&str]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(fields.len());
    for (i, field) in fields.iter().enumerate() {
        let base = match field.trim() {
            "" => format!("column_{}", i + 1),
            name => name.to_string(),
        };
        let mut name = base.clone();
        let mut n = 2;
        while names.contains(&name) {
            name = format!("{}_{}", base, n);
            n += 1;
        }
        names.push(name);
    }
    names
}

fn make_row<'a>(headers: &[String], fields: impl Iterator<Item = &'a str>) -> Row {
    headers
        .iter()
        .zip(fields)
        .map(|(h, f)| (h.clone(), Value::infer(f)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{CsvCodec, TabularCodec};
    use crate::{config::HeaderMode, error::Result, table::Value};

    #[test]
    fn test_decode_with_header() -> Result<()> {
        let table = CsvCodec::default().decode("Name,Age,Member\nBob,30,true\nAmy,17,\n")?;
        assert_eq!(table.headers, vec!["Name", "Age", "Member"]);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[0]["Name"], Value::String("Bob".into()));
        assert_eq!(table.rows[0]["Age"], Value::Integer(30));
        assert_eq!(table.rows[0]["Member"], Value::Boolean(true));
        assert_eq!(table.rows[1]["Member"], Value::Null);
        assert!(!table.synthetic_headers);
        Ok(())
    }

    #[test]
    fn test_decode_detects_missing_header() -> Result<()> {
        let table = CsvCodec::default().decode("Bob,30\nAmy,17\n")?;
        assert_eq!(table.headers, vec!["column_1", "column_2"]);
        assert_eq!(table.rows.len(), 2);
        assert!(table.synthetic_headers);

        let table = CsvCodec::new(b',', HeaderMode::Present).decode("Bob,30\nAmy,17\n")?;
        assert_eq!(table.headers, vec!["Bob", "30"]);
        assert_eq!(table.rows.len(), 1);
        Ok(())
    }

    #[test]
    fn test_decode_sparse_and_wide_records() -> Result<()> {
        let table = CsvCodec::default().decode("a,b,c\n1\n1,2,3,4\n")?;
        assert_eq!(table.rows[0].len(), 1);
        assert!(!table.rows[0].contains_key("b"));
        assert_eq!(table.rows[1].len(), 3);
        Ok(())
    }

    #[test]
    fn test_detect_header_with_trailing_delimiter() -> Result<()> {
        let table = CsvCodec::default().decode("Name,Age,\nBob,30,\n")?;
        assert_eq!(table.headers, vec!["Name", "Age", "column_3"]);
        assert!(!table.synthetic_headers);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0]["Age"], Value::Integer(30));

        let table = CsvCodec::default().decode(",\nBob,30\n")?;
        assert!(table.synthetic_headers);
        let table = CsvCodec::default().decode("Name,,Name\nBob,1,2\n")?;
        assert!(table.synthetic_headers);
        Ok(())
    }

    #[test]
    fn test_header_names_are_unique() -> Result<()> {
        let table = CsvCodec::new(b',', HeaderMode::Present).decode("id, ,id\n1,2,3\n")?;
        assert_eq!(table.headers, vec!["id", "column_2", "id_2"]);
        Ok(())
    }

    #[test]
    fn test_encode() -> Result<()> {
        let codec = CsvCodec::default();
        let text = "Name,Age\nBob,30\n\"Smith, Amy\",17\n";
        assert_eq!(codec.encode(&codec.decode(text)?)?, text);

        let codec = CsvCodec::new(b';', HeaderMode::Absent);
        let text = "Bob;30\nAmy;\n";
        assert_eq!(codec.encode(&codec.decode(text)?)?, text);
        Ok(())
    }

    #[test]
    fn test_empty_text() -> Result<()> {
        let table = CsvCodec::default().decode("")?;
        assert!(table.headers.is_empty());
        assert_eq!(CsvCodec::default().encode(&table)?, "");
        Ok(())
    }
}
