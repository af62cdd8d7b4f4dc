//! Match Simulator: Monte Carlo estimate of one fixture's outcome.
//!
//! RULE: A simulation owns its RNG. Identical seed, histories and config
//! give a bit-identical result. Empty histories never panic; they sample
//! as a zero rate and the result is flagged low confidence.

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::{
    config::{SimulationConfig, SimulationMode},
    error::{ForecastError, ForecastResult},
    history::TeamHistory,
    rng::TrialRng,
    scoreline::GoalCounts,
    types::Goals,
};

/// Trials between cooperative cancellation checks.
pub const CANCEL_CHECK_INTERVAL: u64 = 1_024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub home_win_prob:       f64,
    pub draw_prob:           f64,
    pub away_win_prob:       f64,
    pub expected_home_goals: f64,
    pub expected_away_goals: f64,
    pub trials:              u64,
    pub seed:                u64,
    /// At least one sampled sequence was empty.
    pub low_confidence:      bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationRun {
    pub result:     SimulationResult,
    /// Goals drawn per side across all trials, as tallies.
    pub home_goals: GoalCounts,
    pub away_goals: GoalCounts,
}

/// Harmonic mean of two rates; 0 when either is 0. Pulled toward the
/// smaller rate, so a strong attack meeting a strong defence scores less.
pub fn harmonic_mean(a: f64, b: f64) -> f64 {
    if a <= 0.0 || b <= 0.0 {
        return 0.0;
    }
    2.0 * a * b / (a + b)
}

enum GoalModel<'a> {
    Empirical { home: &'a [Goals], away: &'a [Goals] },
    Poisson { home_rate: f64, away_rate: f64 },
}

impl GoalModel<'_> {
    fn draw(&self, rng: &mut TrialRng) -> (Goals, Goals) {
        match self {
            GoalModel::Empirical { home, away } => {
                let h = rng.pick(home).unwrap_or(0);
                let a = rng.pick(away).unwrap_or(0);
                (h, a)
            }
            GoalModel::Poisson { home_rate, away_rate } => {
                let h = rng.poisson(*home_rate);
                let a = rng.poisson(*away_rate);
                (h, a)
            }
        }
    }
}

pub fn simulate(
    home: &TeamHistory,
    away: &TeamHistory,
    config: &SimulationConfig,
    rng: &mut TrialRng,
) -> ForecastResult<SimulationRun> {
    run_trials(home, away, config, rng, None)
}

/// As `simulate`, but stops between trials once `cancel` is set.
pub fn simulate_with_cancel(
    home: &TeamHistory,
    away: &TeamHistory,
    config: &SimulationConfig,
    rng: &mut TrialRng,
    cancel: &AtomicBool,
) -> ForecastResult<SimulationRun> {
    run_trials(home, away, config, rng, Some(cancel))
}

/// One-shot entry point with the default model. Without a seed one is
/// drawn from OS entropy and reported in the result.
pub fn simulate_fixture(
    home: &TeamHistory,
    away: &TeamHistory,
    trials: u64,
    seed: Option<u64>,
) -> ForecastResult<SimulationResult> {
    let mut rng = match seed {
        Some(seed) => TrialRng::from_seed(seed),
        None => TrialRng::from_entropy(),
    };
    let config = SimulationConfig::default().with_trials(trials);
    Ok(simulate(home, away, &config, &mut rng)?.result)
}

fn run_trials(
    home: &TeamHistory,
    away: &TeamHistory,
    config: &SimulationConfig,
    rng: &mut TrialRng,
    cancel: Option<&AtomicBool>,
) -> ForecastResult<SimulationRun> {
    config.validate()?;

    let (home, away): (Cow<'_, TeamHistory>, Cow<'_, TeamHistory>) = match config.form_window {
        Some(n) => (Cow::Owned(home.recent(n)), Cow::Owned(away.recent(n))),
        None => (Cow::Borrowed(home), Cow::Borrowed(away)),
    };

    let (model, low_confidence) = match config.mode {
        SimulationMode::Empirical => (
            GoalModel::Empirical {
                home: home.home_scored.values(),
                away: away.away_scored.values(),
            },
            home.home_scored.is_empty() || away.away_scored.is_empty(),
        ),
        SimulationMode::Poisson => (
            GoalModel::Poisson {
                home_rate: harmonic_mean(home.home_scored.mean(), away.away_conceded.mean()),
                away_rate: harmonic_mean(away.away_scored.mean(), home.home_conceded.mean()),
            },
            home.home_scored.is_empty()
                || home.home_conceded.is_empty()
                || away.away_scored.is_empty()
                || away.away_conceded.is_empty(),
        ),
    };
    if low_confidence {
        log::warn!("simulating with empty goal history; missing data samples as 0 goals");
    }

    let trials = config.trials;
    let mut home_counts = GoalCounts::default();
    let mut away_counts = GoalCounts::default();
    let (mut home_wins, mut draws, mut away_wins) = (0u64, 0u64, 0u64);
    let (mut home_goals, mut away_goals) = (0u64, 0u64);

    for trial in 0..trials {
        if let Some(flag) = cancel {
            if trial % CANCEL_CHECK_INTERVAL == 0 && flag.load(Ordering::Relaxed) {
                return Err(ForecastError::Cancelled { completed: trial });
            }
        }

        let (h, a) = model.draw(rng);
        if h > a {
            home_wins += 1;
        } else if a > h {
            away_wins += 1;
        } else {
            draws += 1;
        }
        home_goals += h as u64;
        away_goals += a as u64;
        home_counts.record(h);
        away_counts.record(a);
    }

    let n = trials as f64;
    let result = SimulationResult {
        home_win_prob:       home_wins as f64 / n,
        draw_prob:           draws as f64 / n,
        away_win_prob:       away_wins as f64 / n,
        expected_home_goals: home_goals as f64 / n,
        expected_away_goals: away_goals as f64 / n,
        trials,
        seed: rng.seed(),
        low_confidence,
    };
    log::debug!(
        "simulated {trials} trials: H={:.3} D={:.3} A={:.3} xG={:.2}-{:.2}",
        result.home_win_prob,
        result.draw_prob,
        result.away_win_prob,
        result.expected_home_goals,
        result.expected_away_goals
    );

    Ok(SimulationRun { result, home_goals: home_counts, away_goals: away_counts })
}
