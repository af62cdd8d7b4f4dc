//! Run events, in fixture order. The runner persists them as its event log.

use crate::{
    scoreline::ScorelineEntry,
    simulator::SimulationResult,
    types::{RunId, TeamId},
};
use serde::{Deserialize, Serialize};

/// Variants are only ever appended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ForecastEvent {
    RunInitialized {
        run_id: RunId,
        seed:   u64,
        teams:  usize,
    },
    FixtureSimulated {
        index:       usize,
        home:        TeamId,
        away:        TeamId,
        result:      SimulationResult,
        most_likely: Option<ScorelineEntry>,
    },
    FixtureFailed {
        index:  usize,
        home:   TeamId,
        away:   TeamId,
        reason: String,
    },
}

impl ForecastEvent {
    /// Stable name for the event_type column.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. }   => "run_initialized",
            Self::FixtureSimulated { .. } => "fixture_simulated",
            Self::FixtureFailed { .. }    => "fixture_failed",
        }
    }
}
