//! Text rendering of ad hoc query results.

use std::fmt;

const ROW_SEPARATOR: &str = "--------";

/// Result of an administrative statement, ready to be posted as a reply.
///
/// # Examples
///
/// ```
/// use tally_database::QueryReport;
///
/// let report = QueryReport::rows(vec![vec![
///     ("date".to_string(), "2024-05-01".to_string()),
///     ("count".to_string(), "3".to_string()),
/// ]]);
/// assert_eq!(report.to_string(), "date: 2024-05-01\ncount: 3\n(1 row)");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryReport {
    rows: Vec<Vec<(String, String)>>,
    affected: usize,
}

impl QueryReport {
    /// A report listing returned rows as `(column, value)` pairs.
    pub fn rows(rows: Vec<Vec<(String, String)>>) -> Self {
        let affected = rows.len();
        Self { rows, affected }
    }

    /// A report for a statement that returned no rows.
    pub fn affected(affected: usize) -> Self {
        Self {
            rows: Vec::new(),
            affected,
        }
    }

    /// Build a row from a JSON object. Columns come out sorted by name.
    pub(crate) fn json_row(row: &serde_json::Value) -> Vec<(String, String)> {
        match row {
            serde_json::Value::Object(columns) => columns
                .iter()
                .map(|(name, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => s.clone(),
                        serde_json::Value::Null => "NULL".to_string(),
                        other => other.to_string(),
                    };
                    (name.clone(), value)
                })
                .collect(),
            other => vec![("?column?".to_string(), other.to_string())],
        }
    }
}

impl fmt::Display for QueryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                writeln!(f, "{}", ROW_SEPARATOR)?;
            }
            for (column, value) in row {
                writeln!(f, "{}: {}", column, value)?;
            }
        }
        match self.affected {
            1 => write!(f, "(1 row)"),
            n => write!(f, "({} rows)", n),
        }
    }
}
