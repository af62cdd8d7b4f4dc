//! Promotion Resolver.
//!
//! A newly promoted team has no record in the league's current grid, so
//! its history is lifted from an earlier season's grid. Those grids name
//! home rows by full club name and away columns by short id, hence both
//! are needed.

use serde::{Deserialize, Serialize};

use crate::{
    error::{ForecastError, ForecastResult},
    grid::ResultsGrid,
    history::TeamHistory,
    normalizer::{away_record, home_record},
    types::TeamId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromotionOverride {
    /// Short id, e.g. "LEE". Also the column label in the source grid.
    pub team_id:       TeamId,
    /// Full name, e.g. "Leeds United". The row label in the source grid.
    pub team_name:     String,
    /// Season label of the grid to borrow from.
    pub source_season: String,
}

/// Extract one team's record from `source`. A missing row or column is an
/// error: a silently empty history would make the team lose every trial.
pub fn resolve_promoted(team_id: &str, team_name: &str, source: &ResultsGrid) -> ForecastResult<TeamHistory> {
    let row = source
        .row_index(team_name)
        .ok_or_else(|| ForecastError::lookup("team row", team_name))?;
    let col = source
        .column_index(team_id)
        .ok_or_else(|| ForecastError::lookup("team column", team_id))?;

    let home = home_record(source, row);
    let away = away_record(source, col);
    for warning in home.warnings.iter().chain(away.warnings.iter()) {
        log::warn!("{team_id}: skipping {warning}");
    }

    Ok(TeamHistory {
        home_scored:   home.scored,
        home_conceded: home.conceded,
        away_scored:   away.scored,
        away_conceded: away.conceded,
    })
}
