//! Column name resolution with case and typo correction

use std::cmp::min;

use tracing::debug;

use crate::{
    error::{Error, Result},
    sql::executor::Context,
};

/// Maps a requested column name onto a header name.
///
/// Exact matches win. Otherwise a unique case-insensitive match, then (when
/// enabled) a unique closest name within a small edit distance, is used in
/// its place with a diagnostic. Anything else is `ColumnNotFound`.
pub fn resolve_column(
    name: &str,
    headers: &[String],
    table_ref: &str,
    ctx: &mut Context,
) -> Result<String> {
    if headers.iter().any(|h| h == name) {
        return Ok(name.to_string());
    }

    let lower = name.to_lowercase();
    let same_case = headers
        .iter()
        .filter(|h| h.to_lowercase() == lower)
        .collect::<Vec<_>>();
    let candidates = match same_case.as_slice() {
        [header] => return Ok(substitute(name, header, ctx)),
        [] if ctx.fuzzy_columns() => close_matches(&lower, headers),
        [] => Vec::new(),
        several => several.iter().map(|h| h.to_string()).collect(),
    };
    if same_case.is_empty() {
        if let [header] = candidates.as_slice() {
            return Ok(substitute(name, header, ctx));
        }
    }

    debug!(column = name, "column not found");
    Err(Error::ColumnNotFound {
        column: name.to_string(),
        available: headers.to_vec(),
        candidates,
        used_as_table: lower == table_ref.to_lowercase(),
    })
}

fn substitute(name: &str, header: &str, ctx: &mut Context) -> String {
    ctx.warn(format!(
        "Column '{}' not found; did you mean '{}'? Using '{}'.",
        name, header, header
    ));
    header.to_string()
}

/// Headers at the smallest edit distance within the allowed threshold
fn close_matches(lower: &str, headers: &[String]) -> Vec<String> {
    let threshold = if lower.chars().count() <= 4 { 1 } else { 2 };
    let scored = headers
        .iter()
        .map(|h| (damerau_levenshtein_distance(lower, &h.to_lowercase()), h))
        .filter(|(d, _)| *d <= threshold)
        .collect::<Vec<_>>();
    let Some(best) = scored.iter().map(|(d, _)| *d).min() else {
        return Vec::new();
    };
    scored
        .into_iter()
        .filter(|(d, _)| *d == best)
        .map(|(_, h)| h.clone())
        .collect()
}

/// Optimal string alignment distance: insertions, deletions, substitutions
/// and adjacent transpositions each cost 1
fn damerau_levenshtein_distance(s1: &str, s2: &str) -> usize {
    let chars1: Vec<char> = s1.chars().collect();
    let chars2: Vec<char> = s2.chars().collect();
    let (len1, len2) = (chars1.len(), chars2.len());
    if len1 == 0 || len2 == 0 {
        return len1.max(len2);
    }

    let mut matrix = vec![vec![0usize; len2 + 1]; len1 + 1];
    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=len2 {
        matrix[0][j] = j;
    }

    for i in 1..=len1 {
        for j in 1..=len2 {
            let cost = if chars1[i - 1] == chars2[j - 1] { 0 } else { 1 };
            matrix[i][j] = min(
                min(matrix[i - 1][j] + 1, matrix[i][j - 1] + 1),
                matrix[i - 1][j - 1] + cost,
            );
            if i > 1 && j > 1 && chars1[i - 1] == chars2[j - 2] && chars1[i - 2] == chars2[j - 1] {
                matrix[i][j] = min(matrix[i][j], matrix[i - 2][j - 2] + 1);
            }
        }
    }
    matrix[len1][len2]
}

#[cfg(test)]
mod tests {
    use super::{damerau_levenshtein_distance, resolve_column};
    use crate::{
        config::EngineConfig,
        error::{Error, Result},
        sql::executor::Context,
    };

    fn headers() -> Vec<String> {
        vec!["Name".to_string(), "Age".to_string(), "City".to_string()]
    }

    #[test]
    fn test_exact_match() -> Result<()> {
        let mut ctx = Context::default();
        assert_eq!(resolve_column("Age", &headers(), "data", &mut ctx)?, "Age");
        assert!(ctx.diagnostics().is_empty());
        Ok(())
    }

    #[test]
    fn test_case_mismatch_is_corrected() -> Result<()> {
        let mut ctx = Context::default();
        assert_eq!(resolve_column("age", &headers(), "data", &mut ctx)?, "Age");
        assert_eq!(ctx.diagnostics().len(), 1);
        assert!(ctx.diagnostics()[0].contains("did you mean 'Age'"));
        Ok(())
    }

    #[test]
    fn test_typo_is_corrected() -> Result<()> {
        let mut ctx = Context::default();
        assert_eq!(resolve_column("naem", &headers(), "data", &mut ctx)?, "Name");
        assert_eq!(ctx.diagnostics().len(), 1);

        let mut ctx = Context::new(&EngineConfig::default().with_fuzzy_columns(false));
        assert!(matches!(
            resolve_column("naem", &headers(), "data", &mut ctx),
            Err(Error::ColumnNotFound { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_missing_column() {
        let mut ctx = Context::default();
        match resolve_column("Salary", &headers(), "data", &mut ctx) {
            Err(Error::ColumnNotFound { available, used_as_table, .. }) => {
                assert_eq!(available, headers());
                assert!(!used_as_table);
            }
            res => panic!("unexpected {:?}", res),
        }

        match resolve_column("people", &headers(), "People", &mut ctx) {
            Err(Error::ColumnNotFound { used_as_table, .. }) => assert!(used_as_table),
            res => panic!("unexpected {:?}", res),
        }
    }

    #[test]
    fn test_ambiguous_matches_are_not_guessed() {
        let mut ctx = Context::default();
        let headers = vec!["name".to_string(), "NAME".to_string()];
        match resolve_column("Name", &headers, "data", &mut ctx) {
            Err(Error::ColumnNotFound { candidates, .. }) => assert_eq!(candidates.len(), 2),
            res => panic!("unexpected {:?}", res),
        }

        let headers = vec!["cat".to_string(), "car".to_string()];
        assert!(resolve_column("cab", &headers, "data", &mut ctx).is_err());
        assert!(ctx.diagnostics().is_empty());
    }

    #[test]
    fn test_distance() {
        assert_eq!(damerau_levenshtein_distance("", "abc"), 3);
        assert_eq!(damerau_levenshtein_distance("naem", "name"), 1);
        assert_eq!(damerau_levenshtein_distance("kitten", "sitting"), 3);
    }
}
