//! Matchday forecasting core.
//!
//! Raw season grids → normalized goal histories → Monte Carlo match
//! simulation → ranked scorelines. No file or database I/O happens here.

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod grid;
pub mod history;
pub mod normalizer;
pub mod promotion;
pub mod rng;
pub mod scoreline;
pub mod simulator;
pub mod types;

pub use history::build_team_history;
pub use scoreline::rank_scorelines;
pub use simulator::simulate_fixture;
