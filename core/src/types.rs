//! Shared primitive types used across the forecaster.

use serde::{Deserialize, Serialize};

/// Short team identifier, e.g. "ARS". Grid columns are labelled with it.
pub type TeamId = String;

/// Goals scored by one side in one fixture. Single digit in practice.
pub type Goals = u8;

/// The canonical run identifier.
pub type RunId = String;

/// A scheduled match. Owned by the caller's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub home: TeamId,
    pub away: TeamId,
}

impl Fixture {
    pub fn new(home: impl Into<TeamId>, away: impl Into<TeamId>) -> Self {
        Self { home: home.into(), away: away.into() }
    }
}
