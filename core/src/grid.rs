//! Raw season results grid and cell parsing.
//!
//! A grid is indexed by home team (rows) and away team (columns). Each
//! cell is the raw text of an "h-a" score, or a gap. Construction checks
//! the structure; parsing individual cells never fails.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ForecastError, ForecastResult},
    types::{Goals, TeamId},
};

/// Label of the index column in a results matrix header.
pub const INDEX_HEADER: &str = "Home \\ Away";

/// Dash variants seen in scraped scores, normalised to '-' before splitting.
/// The mojibake form comes from a UTF-8 en dash decoded as Windows-1252.
const DASH_VARIANTS: [&str; 5] = ["â€“", "\u{2013}", "\u{2014}", "\u{2212}", "\u{2010}"];

/// Charset mis-decoding placeholder.
const REPLACEMENT_CHAR: char = '\u{FFFD}';

/// One parsed cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cell {
    Score { home: Goals, away: Goals },
    /// Not yet played: missing, blank or a bare hyphen.
    Unplayed,
    /// Encoding garbage.
    Corrupted,
    /// Anything else, e.g. "P-P" or a double-digit score.
    Malformed(String),
}

impl Cell {
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else { return Cell::Unplayed };
        if raw.contains(REPLACEMENT_CHAR) {
            return Cell::Corrupted;
        }

        let mut text = raw.trim().to_string();
        for dash in DASH_VARIANTS {
            if text.contains(dash) {
                text = text.replace(dash, "-");
            }
        }
        if text.is_empty() || text == "-" {
            return Cell::Unplayed;
        }

        let bytes = text.as_bytes();
        if bytes.len() == 3 && bytes[1] == b'-' && bytes[0].is_ascii_digit() && bytes[2].is_ascii_digit() {
            return Cell::Score { home: bytes[0] - b'0', away: bytes[2] - b'0' };
        }
        Cell::Malformed(raw.to_string())
    }

    pub fn is_excluded(&self) -> bool {
        matches!(self, Cell::Unplayed | Cell::Corrupted)
    }
}

/// Serialised shape of a grid: one header row and the data rows, each
/// starting with the home team label.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawGrid {
    pub header: Vec<String>,
    pub rows:   Vec<Vec<Option<String>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub label: String,
    pub cells: Vec<Option<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultsGrid {
    columns: Vec<TeamId>,
    rows:    Vec<GridRow>,
}

impl ResultsGrid {
    /// Build from a header (`INDEX_HEADER` then away team labels) and rows
    /// (home team label then one cell per column).
    pub fn from_table(header: Vec<String>, rows: Vec<Vec<Option<String>>>) -> ForecastResult<Self> {
        let mut header = header.into_iter();
        match header.next() {
            Some(first) if first.trim() == INDEX_HEADER => {}
            Some(first) => {
                return Err(ForecastError::schema(format!(
                    "expected index column '{INDEX_HEADER}', found '{first}'"
                )))
            }
            None => return Err(ForecastError::schema("grid has no header")),
        }

        let columns: Vec<TeamId> = header.map(|c| c.trim().to_string()).collect();
        if columns.is_empty() {
            return Err(ForecastError::schema("grid has no away team columns"));
        }
        ensure_unique(&columns, "column")?;

        let mut parsed = Vec::with_capacity(rows.len());
        for (i, row) in rows.into_iter().enumerate() {
            let mut cells = row.into_iter();
            let label = match cells.next() {
                Some(Some(label)) if !label.trim().is_empty() => label.trim().to_string(),
                _ => return Err(ForecastError::schema(format!("row {i} has no home team label"))),
            };
            let cells: Vec<Option<String>> = cells.collect();
            if cells.len() != columns.len() {
                return Err(ForecastError::schema(format!(
                    "row '{label}' has {} cells, header has {} columns",
                    cells.len(),
                    columns.len()
                )));
            }
            parsed.push(GridRow { label, cells });
        }
        let labels: Vec<String> = parsed.iter().map(|r| r.label.clone()).collect();
        ensure_unique(&labels, "row")?;

        // A non-square grid has no diagonal to pair rows with columns, so
        // every row label must itself be a column.
        if parsed.len() != columns.len() {
            if let Some(row) = parsed.iter().find(|r| !columns.contains(&r.label)) {
                return Err(ForecastError::schema(format!(
                    "row '{}' matches no column in a {}x{} grid",
                    row.label,
                    parsed.len(),
                    columns.len()
                )));
            }
        }

        Ok(Self { columns, rows: parsed })
    }

    pub fn from_raw(raw: RawGrid) -> ForecastResult<Self> {
        Self::from_table(raw.header, raw.rows)
    }

    /// Parse the JSON form of a `RawGrid`. Bad JSON is a schema error.
    pub fn from_json(json: &str) -> ForecastResult<Self> {
        let raw: RawGrid = serde_json::from_str(json)
            .map_err(|e| ForecastError::schema(format!("unreadable grid: {e}")))?;
        Self::from_raw(raw)
    }

    pub fn columns(&self) -> &[TeamId] {
        &self.columns
    }

    pub fn rows(&self) -> &[GridRow] {
        &self.rows
    }

    pub fn column_index(&self, team_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == team_id)
    }

    pub fn row_index(&self, label: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.label == label)
    }

    /// Team identity of row `i`: its own label when that is also a column,
    /// else the column on the diagonal. Construction guarantees one of the two.
    pub fn team_for_row(&self, i: usize) -> TeamId {
        let label = &self.rows[i].label;
        if self.column_index(label).is_some() {
            label.clone()
        } else {
            self.columns[i].clone()
        }
    }

    /// True when `(row, col)` is a team playing itself.
    pub fn is_self_cell(&self, row: usize, col: usize) -> bool {
        self.team_for_row(row) == self.columns[col]
    }

    pub fn cell(&self, row: usize, col: usize) -> Cell {
        Cell::parse(self.rows[row].cells[col].as_deref())
    }
}

fn ensure_unique(labels: &[String], kind: &str) -> ForecastResult<()> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label.as_str()) {
            return Err(ForecastError::schema(format!("duplicate {kind} label '{label}'")));
        }
    }
    Ok(())
}
