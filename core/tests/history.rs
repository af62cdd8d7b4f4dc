use std::collections::BTreeMap;

use matchday_core::{
    build_team_history,
    error::{Diagnostic, ForecastError},
    grid::ResultsGrid,
    history::{build_from_tables, merge, BuildFailure, GoalSequence, SeasonGrid, SeasonRole, TeamHistory},
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn season_a() -> ResultsGrid {
    ResultsGrid::from_json(
        r#"{
            "header": ["Home \\ Away", "ARS", "CHE", "LIV"],
            "rows": [
                ["Arsenal",   null,  "2-0", "1-3"],
                ["Chelsea",   "1-1", null,  "0-1"],
                ["Liverpool", "2-2", "4-0", null]
            ]
        }"#,
    )
    .unwrap()
}

fn season_b() -> ResultsGrid {
    ResultsGrid::from_json(
        r#"{
            "header": ["Home \\ Away", "ARS", "CHE", "MCI"],
            "rows": [
                ["Arsenal",         null,  "3-1", "0-0"],
                ["Chelsea",         "2-1", null,  "-"],
                ["Manchester City", "5-0", "1-2", null]
            ]
        }"#,
    )
    .unwrap()
}

fn seq(values: &[u8]) -> GoalSequence {
    GoalSequence::from(values.to_vec())
}

// ── Tests ────────────────────────────────────────────────────────────────────

/// Sequences concatenate earliest season first.
#[test]
fn merge_preserves_season_order() {
    let mut first = BTreeMap::new();
    first.insert("ARS".to_string(), TeamHistory { home_scored: seq(&[1, 2]), ..Default::default() });
    let mut second = BTreeMap::new();
    second.insert("ARS".to_string(), TeamHistory { home_scored: seq(&[3]), ..Default::default() });
    second.insert("CHE".to_string(), TeamHistory { away_scored: seq(&[0]), ..Default::default() });

    let store = merge(&[first, second]);

    assert_eq!(store.get("ARS").unwrap().home_scored.values(), &[1, 2, 3]);
    assert_eq!(store.get("CHE").unwrap().away_scored.values(), &[0]);
}

#[test]
fn build_merges_all_league_seasons() {
    let seasons = vec![SeasonGrid::league("2018-19", season_a()), SeasonGrid::league("2019-20", season_b())];
    let report = build_team_history(&seasons, &[]);

    assert!(report.failures.is_empty());
    assert_eq!(report.seasons_used, 2);
    assert_eq!(report.store.len(), 4);

    let ars = report.store.get("ARS").unwrap();
    assert_eq!(ars.home_scored.values(), &[2, 1, 3, 0]);
    assert_eq!(ars.away_scored.values(), &[1, 2, 1, 0]);
}

/// Same inputs, same store. No hidden randomness at this stage.
#[test]
fn build_is_idempotent() {
    let seasons = vec![SeasonGrid::league("2018-19", season_a()), SeasonGrid::league("2019-20", season_b())];

    let first = build_team_history(&seasons, &[]);
    let second = build_team_history(&seasons, &[]);

    assert_eq!(first.store, second.store);
    assert_eq!(first.warnings, second.warnings);
}

/// Teams that appear nowhere resolve to an empty history.
#[test]
fn unknown_team_has_empty_history() {
    let report = build_team_history(&[SeasonGrid::league("2018-19", season_a())], &[]);
    let nobody = report.store.get_or_empty("XYZ");

    assert!(nobody.is_empty());
    assert_eq!(nobody.fixtures_played(), 0);
    assert_eq!(nobody.home_scored.mean(), 0.0);
}

/// A season failing its schema check is skipped; the rest still load.
#[test]
fn schema_failure_is_local_to_one_season() {
    let broken = ResultsGrid::from_json(r#"{ "header": ["Club", "ARS"], "rows": [] }"#);
    let tables = vec![
        ("2017-18".to_string(), SeasonRole::League, broken),
        ("2018-19".to_string(), SeasonRole::League, Ok(season_a())),
    ];

    let report = build_from_tables(tables, &[]);

    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        &report.failures[0],
        BuildFailure::Season { season, error: ForecastError::Schema { .. } } if season == "2017-18"
    ));
    assert_eq!(report.seasons_used, 1);
    assert_eq!(report.store.len(), 3);
}

/// Teams with an empty sequence are flagged, not dropped.
#[test]
fn empty_sequences_raise_warning() {
    let grid = ResultsGrid::from_json(
        r#"{
            "header": ["Home \\ Away", "ARS", "CHE"],
            "rows": [["Arsenal", null, "1-0"], ["Chelsea", "-", null]]
        }"#,
    )
    .unwrap();
    let report = build_team_history(&[SeasonGrid::league("2020-21", grid)], &[]);

    assert!(report.warnings.contains(&Diagnostic::EmptyHistory { team: "ARS".into() }));
    assert!(report.warnings.contains(&Diagnostic::EmptyHistory { team: "CHE".into() }));
    assert_eq!(report.store.len(), 2);
}

/// Malformed-cell warnings carry the season they came from.
#[test]
fn malformed_cell_warning_names_season() {
    let grid = ResultsGrid::from_json(
        r#"{
            "header": ["Home \\ Away", "ARS", "CHE"],
            "rows": [["Arsenal", null, "abandoned"], ["Chelsea", "1-0", null]]
        }"#,
    )
    .unwrap();
    let report = build_team_history(&[SeasonGrid::league("2020-21", grid)], &[]);

    assert!(report.warnings.iter().any(|w| matches!(
        w,
        Diagnostic::MalformedCell { season: Some(s), raw, .. } if s == "2020-21" && raw == "abandoned"
    )));
}

#[test]
fn form_window_keeps_most_recent_fixtures() {
    let history = TeamHistory {
        home_scored:   seq(&[0, 1, 2, 3, 4]),
        home_conceded: seq(&[5]),
        away_scored:   seq(&[]),
        away_conceded: seq(&[1, 1]),
    };
    let recent = history.recent(3);

    assert_eq!(recent.home_scored.values(), &[2, 3, 4]);
    assert_eq!(recent.home_conceded.values(), &[5]);
    assert!(recent.away_scored.is_empty());
    assert_eq!(recent.away_conceded.values(), &[1, 1]);
}
