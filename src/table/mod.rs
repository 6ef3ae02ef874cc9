//! In-memory table model
//!
//! - `Value`: a single cell (text, number, boolean or absent)
//! - `Row`: column name to cell mapping
//! - `Table`: ordered header plus ordered rows
//! - `codec`: conversion between delimited text and `Table`

use std::{collections::BTreeMap, fmt::Display};

pub mod codec;

/// Runtime value of a single cell
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
}

impl Value {
    /// Infers the value of a raw cell.
    ///
    /// Numbers are only recognised when they print back to the same text, so
    /// cells like `007` or `2.50` stay strings and re-encode unchanged. Other
    /// cells are normalised: booleans print in lowercase and whitespace-only
    /// cells become empty.
    pub fn infer(raw: &str) -> Self {
        let text = raw.trim();
        if text.is_empty() {
            return Value::Null;
        }
        if text.eq_ignore_ascii_case("true") {
            return Value::Boolean(true);
        }
        if text.eq_ignore_ascii_case("false") {
            return Value::Boolean(false);
        }
        if text.len() == raw.len() {
            if let Ok(i) = text.parse::<i64>() {
                if i.to_string() == text {
                    return Value::Integer(i);
                }
            }
            if let Ok(f) = text.parse::<f64>() {
                if f.is_finite() && f.to_string() == text {
                    return Value::Float(f);
                }
            }
        }
        Value::String(raw.to_string())
    }

    /// Null or whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// Numeric reading of the cell, following `parse_number` on its string form
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            v => parse_number(&v.to_string()),
        }
    }
}

/// String form of a value: what LIKE, IN and comparisons look at
impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => f.write_str(v),
        }
    }
}

/// Lenient numeric parsing used by comparisons and type inference.
///
/// Blank text reads as 0, `Infinity` and `0x`/`0o`/`0b` integers are numbers,
/// exponent forms like `1e10` are numbers. Rust-only spellings such as `inf`
/// or `NaN` are not.
pub fn parse_number(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() {
        return Some(0.0);
    }
    match text {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }
    for (prefix, radix) in [("0x", 16), ("0o", 8), ("0b", 2)] {
        if let (Some(head), Some(digits)) = (text.get(..2), text.get(2..)) {
            if head.eq_ignore_ascii_case(prefix) && !digits.is_empty() {
                return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
            }
        }
    }
    if text.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    text.parse::<f64>().ok()
}

static NULL: Value = Value::Null;

/// A row maps column names to values; absent keys are absent cells
pub type Row = BTreeMap<String, Value>;

/// Ordered header plus ordered rows.
///
/// Every row's key set is a subset of `headers`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
    /// Header names were generated rather than read from the text
    pub synthetic_headers: bool,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Row>) -> Self {
        Self { headers, rows, synthetic_headers: false }
    }

    /// Whether some header equals `name` ignoring case
    pub fn has_column_ignore_case(&self, name: &str) -> bool {
        self.headers.iter().any(|h| h.to_lowercase() == name.to_lowercase())
    }

    /// Cell values of one column in row order; absent cells read as `Null`
    pub fn column_values<'a>(&'a self, col_name: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.rows.iter().map(move |row| row.get(col_name).unwrap_or(&NULL))
    }
}
