use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::TeamId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// The grid is missing structure the normalizer relies on.
    #[error("Schema error: {reason}")]
    Schema { reason: String },

    /// A promoted team (or its source season) could not be found.
    #[error("Lookup error: {what} '{key}' not found")]
    Lookup { what: &'static str, key: String },

    #[error("Invalid trial count: {trials} (must be between 1 and {max})", max = crate::config::MAX_TRIALS)]
    InvalidTrials { trials: u64 },

    #[error("Cannot rank scorelines from an empty sample set")]
    EmptySamples,

    #[error("Simulation cancelled after {completed} trials")]
    Cancelled { completed: u64 },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl ForecastError {
    pub fn schema(reason: impl Into<String>) -> Self {
        Self::Schema { reason: reason.into() }
    }

    pub fn lookup(what: &'static str, key: impl Into<String>) -> Self {
        Self::Lookup { what, key: key.into() }
    }
}

pub type ForecastResult<T> = Result<T, ForecastError>;

/// Non-fatal conditions. Collected into reports and logged; never abort work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A cell that is neither a score nor a known sentinel. Skipped.
    MalformedCell {
        season: Option<String>,
        row:    String,
        column: String,
        raw:    String,
    },
    /// A team has no usable fixtures in one or more sequences.
    EmptyHistory { team: TeamId },
}

impl Diagnostic {
    /// Attach a season label to a cell diagnostic raised before it was known.
    pub fn in_season(self, label: &str) -> Self {
        match self {
            Self::MalformedCell { row, column, raw, .. } => Self::MalformedCell {
                season: Some(label.to_string()),
                row,
                column,
                raw,
            },
            other => other,
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedCell { season, row, column, raw } => write!(
                f,
                "malformed cell {row} v {column} ({}): {raw:?}",
                season.as_deref().unwrap_or("unknown season")
            ),
            Self::EmptyHistory { team } => write!(f, "{team} has no usable history"),
        }
    }
}
