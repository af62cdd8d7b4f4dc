use std::path::{Path, PathBuf};

use anyhow::Context;
use matchday_core::{
    config::SimulationConfig,
    error::{ForecastError, ForecastResult},
    grid::ResultsGrid,
    history::SeasonRole,
    promotion::PromotionOverride,
    types::Fixture,
};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonFile {
    pub season: String,
    #[serde(default)]
    pub role: SeasonRole,
    /// Grid JSON, relative to the run config's directory.
    pub path: PathBuf,
}

/// A gameweek run: which seasons to learn from and which fixtures to forecast.
#[derive(Debug, Clone, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub seed: Option<u64>,
    pub seasons: Vec<SeasonFile>,
    #[serde(default)]
    pub promotions: Vec<PromotionOverride>,
    pub fixtures: Vec<Fixture>,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(skip)]
    base_dir: PathBuf,
}

impl RunConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read {}", path.display()))?;
        let mut config: RunConfig = serde_json::from_str(&content)
            .with_context(|| format!("Cannot parse {}", path.display()))?;
        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.seasons.iter().all(|s| s.role != SeasonRole::League) {
            anyhow::bail!("at least one league season is required");
        }
        if self.fixtures.is_empty() {
            anyhow::bail!("no fixtures to forecast");
        }
        for fixture in &self.fixtures {
            if fixture.home == fixture.away {
                anyhow::bail!("fixture {} v {} has the same team on both sides", fixture.home, fixture.away);
            }
        }
        self.simulation.validate()?;
        Ok(())
    }

    /// Read every season's grid. An unreadable or malformed file becomes
    /// that season's error; the caller decides to skip it.
    pub fn load_grids(&self) -> Vec<(String, SeasonRole, ForecastResult<ResultsGrid>)> {
        self.seasons
            .iter()
            .map(|s| {
                let path = self.base_dir.join(&s.path);
                log::debug!("loading season {} from {}", s.season, path.display());
                let grid = std::fs::read_to_string(&path)
                    .map_err(|e| ForecastError::schema(format!("cannot read {}: {e}", path.display())))
                    .and_then(|json| ResultsGrid::from_json(&json));
                (s.season.clone(), s.role, grid)
            })
            .collect()
    }
}
