//! The gameweek engine: forecasts every fixture of a matchday.
//!
//! RULES:
//!   - The history store is read-only for the engine's whole life.
//!   - Fixture i always draws from the RNG stream derived for slot i,
//!     so results do not depend on how rayon schedules the work.
//!   - One failed fixture never stops the others.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use rayon::prelude::*;

use crate::{
    config::SimulationConfig,
    error::{ForecastError, ForecastResult},
    event::ForecastEvent,
    history::HistoryStore,
    rng::RngBank,
    scoreline::{rank_from_counts, ScorelineEntry, ScorelineTable},
    simulator::{simulate_with_cancel, SimulationResult},
    types::{Fixture, RunId},
};

#[derive(Debug, Clone, PartialEq)]
pub struct FixturePrediction {
    pub index:      usize,
    pub fixture:    Fixture,
    pub result:     SimulationResult,
    pub scorelines: ScorelineTable,
}

impl FixturePrediction {
    pub fn most_likely(&self) -> Option<&ScorelineEntry> {
        self.scorelines.most_likely()
    }
}

#[derive(Debug, Clone)]
pub struct FixtureFailure {
    pub index:   usize,
    pub fixture: Fixture,
    pub error:   ForecastError,
}

#[derive(Debug, Clone, Default)]
pub struct GameweekForecast {
    pub predictions: Vec<FixturePrediction>,
    pub failures:    Vec<FixtureFailure>,
    pub events:      Vec<ForecastEvent>,
}

pub struct ForecastEngine {
    pub run_id: RunId,
    rng_bank:   RngBank,
    store:      HistoryStore,
    config:     SimulationConfig,
    cancel:     Arc<AtomicBool>,
}

impl ForecastEngine {
    pub fn new(run_id: RunId, seed: u64, store: HistoryStore, config: SimulationConfig) -> ForecastResult<Self> {
        config.validate()?;
        Ok(Self {
            run_id,
            rng_bank: RngBank::new(seed),
            store,
            config,
            cancel: Arc::new(AtomicBool::new(false)),
        })
    }

    pub fn seed(&self) -> u64 {
        self.rng_bank.master_seed()
    }

    pub fn store(&self) -> &HistoryStore {
        &self.store
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Shared flag; setting it stops in-flight simulations at their next check.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// Forecast one fixture in slot `index`.
    pub fn predict_fixture(&self, index: usize, fixture: &Fixture) -> ForecastResult<FixturePrediction> {
        let home = self.store.get_or_empty(&fixture.home);
        let away = self.store.get_or_empty(&fixture.away);
        if home.is_empty() {
            log::warn!("{}: no history, forecasting as goalless", fixture.home);
        }
        if away.is_empty() {
            log::warn!("{}: no history, forecasting as goalless", fixture.away);
        }

        let mut rng = self.rng_bank.for_fixture(index as u64);
        let run = simulate_with_cancel(&home, &away, &self.config, &mut rng, &self.cancel)?;
        let scorelines = rank_from_counts(&run.home_goals, &run.away_goals, self.config.top_k)?;

        Ok(FixturePrediction {
            index,
            fixture: fixture.clone(),
            result: run.result,
            scorelines,
        })
    }

    /// Forecast all fixtures in parallel. Output keeps fixture order.
    pub fn predict_gameweek(&self, fixtures: &[Fixture]) -> GameweekForecast {
        if self.cancel.load(Ordering::Relaxed) {
            log::warn!("run {} was cancelled before the gameweek started", self.run_id);
        }

        let outcomes: Vec<ForecastResult<FixturePrediction>> = fixtures
            .par_iter()
            .enumerate()
            .map(|(i, fixture)| self.predict_fixture(i, fixture))
            .collect();

        let mut forecast = GameweekForecast::default();
        forecast.events.push(ForecastEvent::RunInitialized {
            run_id: self.run_id.clone(),
            seed:   self.seed(),
            teams:  self.store.len(),
        });

        for (index, (fixture, outcome)) in fixtures.iter().zip(outcomes).enumerate() {
            match outcome {
                Ok(prediction) => {
                    forecast.events.push(ForecastEvent::FixtureSimulated {
                        index,
                        home:        fixture.home.clone(),
                        away:        fixture.away.clone(),
                        result:      prediction.result.clone(),
                        most_likely: prediction.most_likely().copied(),
                    });
                    forecast.predictions.push(prediction);
                }
                Err(error) => {
                    log::warn!("fixture {} v {} failed: {error}", fixture.home, fixture.away);
                    forecast.events.push(ForecastEvent::FixtureFailed {
                        index,
                        home:   fixture.home.clone(),
                        away:   fixture.away.clone(),
                        reason: error.to_string(),
                    });
                    forecast.failures.push(FixtureFailure {
                        index,
                        fixture: fixture.clone(),
                        error,
                    });
                }
            }
        }

        log::info!(
            "run {}: {} fixtures forecast, {} failed",
            self.run_id,
            forecast.predictions.len(),
            forecast.failures.len()
        );
        forecast
    }
}
