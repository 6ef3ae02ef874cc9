//! Engine configuration
//!
//! Controls how table text is decoded and how forgiving column lookup is.

use serde::{Deserialize, Serialize};

/// How the first record of the table text is treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderMode {
    /// First record is always the header
    Present,
    /// No header; columns are named `column_1`, `column_2`, ...
    Absent,
    /// First record is the header when it looks like one
    Detect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Field delimiter of the table text
    pub delimiter: u8,
    pub header: HeaderMode,
    /// Auto-correct column names that are one or two typos away from a header
    pub fuzzy_columns: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            header: HeaderMode::Detect,
            fuzzy_columns: true,
        }
    }
}

impl EngineConfig {
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_header(mut self, header: HeaderMode) -> Self {
        self.header = header;
        self
    }

    pub fn with_fuzzy_columns(mut self, fuzzy_columns: bool) -> Self {
        self.fuzzy_columns = fuzzy_columns;
        self
    }
}
