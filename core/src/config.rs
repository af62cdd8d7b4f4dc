use serde::{Deserialize, Serialize};

use crate::error::{ForecastError, ForecastResult};

pub const DEFAULT_TRIALS: u64 = 10_000;
pub const DEFAULT_TOP_K: usize = 10;
/// Upper bound on trials per fixture. Run time grows linearly with trials.
pub const MAX_TRIALS: u64 = 100_000_000;

/// How a trial draws each side's goals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimulationMode {
    /// Resample the team's own goal record with replacement.
    #[default]
    Empirical,
    /// Poisson draw at the harmonic mean of attack and opposing defence rates.
    Poisson,
}

impl std::str::FromStr for SimulationMode {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empirical" => Ok(Self::Empirical),
            "poisson" => Ok(Self::Poisson),
            other => Err(ForecastError::InvalidConfig {
                reason: format!("unknown simulation mode '{other}'"),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_trials")]
    pub trials: u64,
    #[serde(default)]
    pub mode: SimulationMode,
    /// Only the most recent `n` fixtures of each sequence are sampled.
    #[serde(default)]
    pub form_window: Option<usize>,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_trials() -> u64 {
    DEFAULT_TRIALS
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            trials:      DEFAULT_TRIALS,
            mode:        SimulationMode::default(),
            form_window: None,
            top_k:       DEFAULT_TOP_K,
        }
    }
}

impl SimulationConfig {
    pub fn with_trials(mut self, trials: u64) -> Self {
        self.trials = trials;
        self
    }

    pub fn with_mode(mut self, mode: SimulationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn validate(&self) -> ForecastResult<()> {
        if self.trials == 0 || self.trials > MAX_TRIALS {
            return Err(ForecastError::InvalidTrials { trials: self.trials });
        }
        if self.top_k == 0 {
            return Err(ForecastError::InvalidConfig { reason: "top_k must be >= 1".into() });
        }
        if self.form_window == Some(0) {
            return Err(ForecastError::InvalidConfig { reason: "form_window must be >= 1".into() });
        }
        if self.trials < 1_000 {
            log::debug!("{} trials is below the 1,000 recommended for stable estimates", self.trials);
        }
        Ok(())
    }
}
