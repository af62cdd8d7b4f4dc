//! Goal History Store.
//!
//! RULE: The store is built once per run and never mutated afterwards.
//! A later run replaces it wholesale. Sequences keep fixture order
//! (earliest season first) so recency can be recovered by callers.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    error::{Diagnostic, ForecastError, ForecastResult},
    grid::ResultsGrid,
    normalizer::normalize,
    promotion::{resolve_promoted, PromotionOverride},
    types::{Goals, TeamId},
};

/// Ordered goal values, one per fixture played.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GoalSequence(Vec<Goals>);

impl GoalSequence {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(&mut self, goals: Goals) {
        self.0.push(goals);
    }

    pub fn extend_from(&mut self, other: &GoalSequence) {
        self.0.extend_from_slice(&other.0);
    }

    pub fn values(&self) -> &[Goals] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Mean goals per fixture; 0.0 when there is no history.
    pub fn mean(&self) -> f64 {
        if self.0.is_empty() {
            return 0.0;
        }
        self.0.iter().map(|&g| g as f64).sum::<f64>() / self.0.len() as f64
    }

    /// The last `n` values, oldest first.
    pub fn recent(&self, n: usize) -> GoalSequence {
        let start = self.0.len().saturating_sub(n);
        Self(self.0[start..].to_vec())
    }
}

impl From<Vec<Goals>> for GoalSequence {
    fn from(values: Vec<Goals>) -> Self {
        Self(values)
    }
}

/// Per-team goal record, home and away.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamHistory {
    pub home_scored:   GoalSequence,
    pub home_conceded: GoalSequence,
    pub away_scored:   GoalSequence,
    pub away_conceded: GoalSequence,
}

impl TeamHistory {
    pub fn is_empty(&self) -> bool {
        self.fixtures_played() == 0
    }

    /// True when any sequence is empty, i.e. some sampling path has no data.
    pub fn has_gaps(&self) -> bool {
        self.home_scored.is_empty()
            || self.home_conceded.is_empty()
            || self.away_scored.is_empty()
            || self.away_conceded.is_empty()
    }

    pub fn fixtures_played(&self) -> usize {
        self.home_scored.len() + self.away_scored.len()
    }

    /// Append another history's sequences after this one's.
    pub fn append(&mut self, later: &TeamHistory) {
        self.home_scored.extend_from(&later.home_scored);
        self.home_conceded.extend_from(&later.home_conceded);
        self.away_scored.extend_from(&later.away_scored);
        self.away_conceded.extend_from(&later.away_conceded);
    }

    /// Form window: the last `n` fixtures at each venue, so up to `n` home
    /// and `n` away fixtures. Home and away games are not interleaved by
    /// date in a grid, so there is no overall "last n matches".
    pub fn recent(&self, n: usize) -> TeamHistory {
        TeamHistory {
            home_scored:   self.home_scored.recent(n),
            home_conceded: self.home_conceded.recent(n),
            away_scored:   self.away_scored.recent(n),
            away_conceded: self.away_conceded.recent(n),
        }
    }
}

/// Immutable team → history mapping for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryStore {
    teams: BTreeMap<TeamId, TeamHistory>,
}

impl HistoryStore {
    pub fn get(&self, team: &str) -> Option<&TeamHistory> {
        self.teams.get(team)
    }

    /// Unknown teams have an empty history, not an error.
    pub fn get_or_empty(&self, team: &str) -> TeamHistory {
        self.teams.get(team).cloned().unwrap_or_default()
    }

    pub fn teams(&self) -> impl Iterator<Item = (&TeamId, &TeamHistory)> {
        self.teams.iter()
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

impl FromIterator<(TeamId, TeamHistory)> for HistoryStore {
    fn from_iter<I: IntoIterator<Item = (TeamId, TeamHistory)>>(iter: I) -> Self {
        Self { teams: iter.into_iter().collect() }
    }
}

/// Concatenate per-team sequences across seasons, in the order given.
pub fn merge(seasons: &[BTreeMap<TeamId, TeamHistory>]) -> HistoryStore {
    let mut teams: BTreeMap<TeamId, TeamHistory> = BTreeMap::new();
    for season in seasons {
        for (team, history) in season {
            teams.entry(team.clone()).or_default().append(history);
        }
    }
    HistoryStore { teams }
}

// ── Building from raw grids ──────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonRole {
    /// Merged into the store.
    #[default]
    League,
    /// Only consulted by promotion overrides.
    PromotionSource,
}

#[derive(Debug, Clone)]
pub struct SeasonGrid {
    pub season: String,
    pub role:   SeasonRole,
    pub grid:   ResultsGrid,
}

impl SeasonGrid {
    pub fn league(season: impl Into<String>, grid: ResultsGrid) -> Self {
        Self { season: season.into(), role: SeasonRole::League, grid }
    }

    pub fn promotion_source(season: impl Into<String>, grid: ResultsGrid) -> Self {
        Self { season: season.into(), role: SeasonRole::PromotionSource, grid }
    }
}

/// Something that could not be used. Scoped to one season or one team.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildFailure {
    Season { season: String, error: ForecastError },
    Promotion { team: TeamId, error: ForecastError },
}

#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub store:    HistoryStore,
    pub failures: Vec<BuildFailure>,
    pub warnings: Vec<Diagnostic>,
    pub seasons_used: usize,
}

/// Normalize every league season, seed promoted teams from their source
/// seasons, then merge earliest first. Seasons are expected in
/// chronological order; promotions apply to the latest league season.
pub fn build_team_history(seasons: &[SeasonGrid], promotions: &[PromotionOverride]) -> BuildReport {
    let mut report = BuildReport::default();
    let mut partials: Vec<BTreeMap<TeamId, TeamHistory>> = Vec::new();

    for season in seasons.iter().filter(|s| s.role == SeasonRole::League) {
        let normalized = normalize(&season.grid);
        log::debug!(
            "season {}: {} teams, {} malformed cells",
            season.season,
            normalized.teams.len(),
            normalized.warnings.len()
        );
        report
            .warnings
            .extend(normalized.warnings.into_iter().map(|w| w.in_season(&season.season)));
        partials.push(normalized.teams);
        report.seasons_used += 1;
    }

    if !promotions.is_empty() {
        match partials.last_mut() {
            Some(current) => {
                for promotion in promotions {
                    match apply_promotion(seasons, promotion) {
                        Ok(history) => {
                            log::debug!(
                                "promoted {} seeded from {} ({} fixtures)",
                                promotion.team_id,
                                promotion.source_season,
                                history.fixtures_played()
                            );
                            current.insert(promotion.team_id.clone(), history);
                        }
                        Err(error) => {
                            log::warn!("promotion {} skipped: {error}", promotion.team_id);
                            report.failures.push(BuildFailure::Promotion {
                                team: promotion.team_id.clone(),
                                error,
                            });
                        }
                    }
                }
            }
            None => {
                for promotion in promotions {
                    report.failures.push(BuildFailure::Promotion {
                        team:  promotion.team_id.clone(),
                        error: ForecastError::lookup("league season", "<none>"),
                    });
                }
            }
        }
    }

    report.store = merge(&partials);

    for (team, history) in report.store.teams() {
        if history.has_gaps() {
            log::warn!("{team}: empty goal sequence after merge");
            report.warnings.push(Diagnostic::EmptyHistory { team: team.clone() });
        }
    }

    log::info!(
        "history built: {} teams from {} seasons, {} failures, {} warnings",
        report.store.len(),
        report.seasons_used,
        report.failures.len(),
        report.warnings.len()
    );
    report
}

/// Build a store from grids that have not been parsed yet. A grid that
/// fails its schema check is recorded and skipped; the rest still load.
pub fn build_from_tables(
    tables: Vec<(String, SeasonRole, ForecastResult<ResultsGrid>)>,
    promotions: &[PromotionOverride],
) -> BuildReport {
    let mut schema_failures = Vec::new();
    let mut seasons = Vec::new();
    for (season, role, grid) in tables {
        match grid {
            Ok(grid) => seasons.push(SeasonGrid { season, role, grid }),
            Err(error) => {
                log::warn!("season {season} skipped: {error}");
                schema_failures.push(BuildFailure::Season { season, error });
            }
        }
    }
    let mut report = build_team_history(&seasons, promotions);
    schema_failures.append(&mut report.failures);
    report.failures = schema_failures;
    report
}

fn apply_promotion(seasons: &[SeasonGrid], promotion: &PromotionOverride) -> ForecastResult<TeamHistory> {
    let source = seasons
        .iter()
        .find(|s| s.season == promotion.source_season)
        .ok_or_else(|| ForecastError::lookup("source season", promotion.source_season.clone()))?;
    resolve_promoted(&promotion.team_id, &promotion.team_name, &source.grid)
}
