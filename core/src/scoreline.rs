//! Scoreline Ranker.
//!
//! Joint scoreline probabilities are the product of each side's marginal
//! goal distribution. This treats home and away goals as independent
//! given the two teams, which ignores game-state effects in real matches.

use serde::{Deserialize, Serialize};

use crate::{
    error::{ForecastError, ForecastResult},
    types::Goals,
};

/// Goal counts 0..=MAX_GOALS are tracked; higher counts fall into the top bucket.
pub const MAX_GOALS: Goals = 9;
const BUCKETS: usize = MAX_GOALS as usize + 1;

/// Per-bucket goal tallies for one side. Fixed size whatever the trial count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalCounts {
    counts: [u64; BUCKETS],
    total:  u64,
}

impl GoalCounts {
    pub fn from_samples(samples: &[Goals]) -> Self {
        let mut counts = Self::default();
        for &g in samples {
            counts.record(g);
        }
        counts
    }

    pub fn record(&mut self, goals: Goals) {
        self.counts[goals.min(MAX_GOALS) as usize] += 1;
        self.total += 1;
    }

    pub fn count(&self, goals: Goals) -> u64 {
        self.counts[goals.min(MAX_GOALS) as usize]
    }

    /// Number of values recorded.
    pub fn total(&self) -> u64 {
        self.total
    }
}

/// One side's marginal goal distribution over 0..=9 ("9" meaning 9+).
#[derive(Debug, Clone, PartialEq)]
pub struct GoalDistribution {
    probs: [f64; BUCKETS],
}

impl GoalDistribution {
    pub fn from_counts(counts: &GoalCounts) -> ForecastResult<Self> {
        if counts.total == 0 {
            return Err(ForecastError::EmptySamples);
        }
        let n = counts.total as f64;
        let mut probs = [0.0; BUCKETS];
        for (p, &c) in probs.iter_mut().zip(counts.counts.iter()) {
            *p = c as f64 / n;
        }
        Ok(Self { probs })
    }

    pub fn from_samples(samples: &[Goals]) -> ForecastResult<Self> {
        Self::from_counts(&GoalCounts::from_samples(samples))
    }

    pub fn prob(&self, goals: Goals) -> f64 {
        self.probs[goals.min(MAX_GOALS) as usize]
    }

    pub fn probs(&self) -> &[f64] {
        &self.probs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScorelineEntry {
    pub home_goals:  Goals,
    pub away_goals:  Goals,
    pub probability: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScorelineTable {
    pub entries: Vec<ScorelineEntry>,
}

impl ScorelineTable {
    /// Every scoreline with non-zero probability, most likely first.
    pub fn from_marginals(home: &GoalDistribution, away: &GoalDistribution) -> Self {
        let mut entries = Vec::with_capacity(BUCKETS * BUCKETS);
        for h in 0..=MAX_GOALS {
            for a in 0..=MAX_GOALS {
                let probability = home.prob(h) * away.prob(a);
                if probability > 0.0 {
                    entries.push(ScorelineEntry { home_goals: h, away_goals: a, probability });
                }
            }
        }
        entries.sort_by(|x, y| {
            y.probability
                .total_cmp(&x.probability)
                .then_with(|| (x.home_goals, x.away_goals).cmp(&(y.home_goals, y.away_goals)))
        });
        Self { entries }
    }

    /// Keep the `k` most likely entries. `k` past the end is clamped.
    pub fn truncate(mut self, k: usize) -> Self {
        self.entries.truncate(k);
        self
    }

    pub fn most_likely(&self) -> Option<&ScorelineEntry> {
        self.entries.first()
    }

    pub fn total_probability(&self) -> f64 {
        self.entries.iter().map(|e| e.probability).sum()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Rank scorelines from per-trial goal samples.
pub fn rank_scorelines(home_samples: &[Goals], away_samples: &[Goals], top_k: usize) -> ForecastResult<ScorelineTable> {
    rank_from_counts(&GoalCounts::from_samples(home_samples), &GoalCounts::from_samples(away_samples), top_k)
}

/// Rank scorelines from a simulation run's goal tallies.
pub fn rank_from_counts(home: &GoalCounts, away: &GoalCounts, top_k: usize) -> ForecastResult<ScorelineTable> {
    let home = GoalDistribution::from_counts(home)?;
    let away = GoalDistribution::from_counts(away)?;
    Ok(ScorelineTable::from_marginals(&home, &away).truncate(top_k))
}
