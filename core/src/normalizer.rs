//! Grid Normalizer: results grid → per-team goal sequences.
//!
//! Rows give a team's home record, columns its away record. Excluded
//! cells (unplayed, corrupted, malformed) are skipped, never zero-filled,
//! so every sequence holds exactly one value per usable fixture.

use std::collections::BTreeMap;

use crate::{
    error::Diagnostic,
    grid::{Cell, ResultsGrid},
    history::{GoalSequence, TeamHistory},
    types::TeamId,
};

#[derive(Debug, Clone, Default)]
pub struct Normalized {
    pub teams:    BTreeMap<TeamId, TeamHistory>,
    pub warnings: Vec<Diagnostic>,
}

/// One venue's worth of a team's record.
#[derive(Debug, Clone, Default)]
pub(crate) struct VenueRecord {
    pub scored:   GoalSequence,
    pub conceded: GoalSequence,
    pub warnings: Vec<Diagnostic>,
}

pub fn normalize(grid: &ResultsGrid) -> Normalized {
    let mut out = Normalized::default();

    for row in 0..grid.rows().len() {
        let home = home_record(grid, row);
        for warning in &home.warnings {
            log::warn!("skipping {warning}");
        }
        out.warnings.extend(home.warnings);
        let entry = out.teams.entry(grid.team_for_row(row)).or_default();
        entry.home_scored = home.scored;
        entry.home_conceded = home.conceded;
    }

    for (col, team) in grid.columns().iter().enumerate() {
        // Malformed cells were already reported while walking the rows.
        let away = away_record(grid, col);
        let entry = out.teams.entry(team.clone()).or_default();
        entry.away_scored = away.scored;
        entry.away_conceded = away.conceded;
    }

    out
}

/// Walk row `row`: the home team's goals come first in each cell.
pub(crate) fn home_record(grid: &ResultsGrid, row: usize) -> VenueRecord {
    let mut record = VenueRecord::default();
    for col in 0..grid.columns().len() {
        if grid.is_self_cell(row, col) {
            continue;
        }
        match grid.cell(row, col) {
            Cell::Score { home, away } => {
                record.scored.push(home);
                record.conceded.push(away);
            }
            Cell::Malformed(raw) => record.warnings.push(malformed(grid, row, col, raw)),
            Cell::Unplayed | Cell::Corrupted => {}
        }
    }
    record
}

/// Walk column `col`: the away team's goals come second in each cell.
pub(crate) fn away_record(grid: &ResultsGrid, col: usize) -> VenueRecord {
    let mut record = VenueRecord::default();
    for row in 0..grid.rows().len() {
        if grid.is_self_cell(row, col) {
            continue;
        }
        match grid.cell(row, col) {
            Cell::Score { home, away } => {
                record.scored.push(away);
                record.conceded.push(home);
            }
            Cell::Malformed(raw) => record.warnings.push(malformed(grid, row, col, raw)),
            Cell::Unplayed | Cell::Corrupted => {}
        }
    }
    record
}

fn malformed(grid: &ResultsGrid, row: usize, col: usize, raw: String) -> Diagnostic {
    let row_label = grid.rows()[row].label.clone();
    let column = grid.columns()[col].clone();
    Diagnostic::MalformedCell { season: None, row: row_label, column, raw }
}
