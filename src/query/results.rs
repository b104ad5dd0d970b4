use crate::query::RawResultSet;

/// Header used by the sentinel returned when a query produced no data rows.
pub const NO_DATA_HEADER: &str = "No Data";

/// Uniform tabular shape for one completed query: a header row plus string
/// cell rows aligned positionally to the headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableResult {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl TableResult {
    /// The fixed "no data" sentinel: `(["No Data"], [[""]])`. Downstream
    /// code checks for this exact shape rather than for emptiness, so a
    /// legitimate one-column, one-row result is never mistaken for it.
    pub fn no_data() -> Self {
        Self {
            headers: vec![NO_DATA_HEADER.to_string()],
            rows: vec![vec![String::new()]],
        }
    }

    pub fn is_no_data(&self) -> bool {
        self.headers.len() == 1
            && self.headers[0] == NO_DATA_HEADER
            && self.rows.len() == 1
            && self.rows[0] == [String::new()]
    }

    pub fn has_data(&self) -> bool {
        !self.is_no_data() && !self.rows.is_empty()
    }
}

/// Convert a raw result set into a `TableResult`.
///
/// The first raw row supplies the column headers; every later row maps
/// positionally onto them, with an explicit empty string substituted for
/// any cell the service omitted. A result set with no data rows (or no
/// rows at all) becomes the "no data" sentinel.
pub fn materialize(raw: &RawResultSet) -> TableResult {
    if raw.rows.len() <= 1 {
        return TableResult::no_data();
    }

    let headers: Vec<String> = raw.rows[0]
        .cells
        .iter()
        .map(|c| c.clone().unwrap_or_default())
        .collect();

    let rows = raw.rows[1..]
        .iter()
        .map(|row| {
            (0..headers.len())
                .map(|i| row.cells.get(i).cloned().flatten().unwrap_or_default())
                .collect()
        })
        .collect();

    TableResult { headers, rows }
}

/// Render a table as markdown-style pipe rows for the narrative prompt.
/// Deterministic: row order is preserved exactly as materialized.
pub fn markdown_block(table: &TableResult) -> String {
    let mut lines = Vec::with_capacity(table.rows.len() + 1);
    lines.push(format!("| {} |", table.headers.join(" | ")));
    for row in &table.rows {
        lines.push(format!("| {} |", row.join(" | ")));
    }
    lines.join("\n")
}
