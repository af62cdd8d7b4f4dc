use matchday_core::{
    error::{Diagnostic, ForecastError},
    grid::{Cell, ResultsGrid},
    normalizer::normalize,
};

// ── Helpers ──────────────────────────────────────────────────────────────────

fn values(seq: &matchday_core::history::GoalSequence) -> Vec<u8> {
    seq.values().to_vec()
}

const SEASON: &str = r#"{
    "header": ["Home \\ Away", "ARS", "CHE", "LIV", "MCI"],
    "rows": [
        ["Arsenal",         null,       "2-1",  "-",    "0–3"],
        ["Chelsea",         "1-1",      null,   "�",    " "],
        ["Liverpool",       "4â€“0",    "2-2",  null,   "1-0"],
        ["Manchester City", "P-P",      "3-1",  "",     null]
    ]
}"#;

// ── Tests ────────────────────────────────────────────────────────────────────

/// A "2-1" in row Arsenal, column Chelsea lands in four sequences.
#[test]
fn single_score_feeds_both_teams() {
    let grid = ResultsGrid::from_json(
        r#"{
            "header": ["Home \\ Away", "Arsenal", "Chelsea"],
            "rows": [
                ["Arsenal", null, "2-1"],
                ["Chelsea", null, null]
            ]
        }"#,
    )
    .unwrap();

    let out = normalize(&grid);
    let arsenal = &out.teams["Arsenal"];
    let chelsea = &out.teams["Chelsea"];

    assert_eq!(values(&arsenal.home_scored), vec![2]);
    assert_eq!(values(&arsenal.home_conceded), vec![1]);
    assert_eq!(values(&chelsea.away_scored), vec![1]);
    assert_eq!(values(&chelsea.away_conceded), vec![2]);

    assert!(arsenal.away_scored.is_empty());
    assert!(chelsea.home_scored.is_empty());
    assert!(out.warnings.is_empty());
}

/// Each sequence holds exactly one value per usable cell in its row/column.
#[test]
fn extraction_is_complete() {
    let grid = ResultsGrid::from_json(SEASON).unwrap();
    let out = normalize(&grid);

    for (row, _) in grid.rows().iter().enumerate() {
        let team = grid.team_for_row(row);
        let usable = (0..grid.columns().len())
            .filter(|&col| !grid.is_self_cell(row, col))
            .filter(|&col| matches!(grid.cell(row, col), Cell::Score { .. }))
            .count();
        let history = &out.teams[&team];
        assert_eq!(history.home_scored.len(), usable, "{team} home_scored");
        assert_eq!(history.home_conceded.len(), usable, "{team} home_conceded");
    }

    for (col, team) in grid.columns().iter().enumerate() {
        let usable = (0..grid.rows().len())
            .filter(|&row| !grid.is_self_cell(row, col))
            .filter(|&row| matches!(grid.cell(row, col), Cell::Score { .. }))
            .count();
        let history = &out.teams[team];
        assert_eq!(history.away_scored.len(), usable, "{team} away_scored");
        assert_eq!(history.away_conceded.len(), usable, "{team} away_conceded");
    }
}

/// Gaps are dropped, not zero-filled, and order is kept.
#[test]
fn excluded_cells_are_skipped_in_order() {
    let grid = ResultsGrid::from_json(SEASON).unwrap();
    let out = normalize(&grid);

    // Arsenal at home: 2-1 v CHE, unplayed v LIV, 0-3 (en dash) v MCI.
    assert_eq!(values(&out.teams["ARS"].home_scored), vec![2, 0]);
    assert_eq!(values(&out.teams["ARS"].home_conceded), vec![1, 3]);

    // Chelsea at home: only the 1-1 with Arsenal survives.
    assert_eq!(values(&out.teams["CHE"].home_scored), vec![1]);

    // Arsenal away: 1-1 at CHE, 4-0 (mojibake dash) at LIV; P-P at MCI is skipped.
    assert_eq!(values(&out.teams["ARS"].away_scored), vec![1, 0]);
    assert_eq!(values(&out.teams["ARS"].away_conceded), vec![1, 4]);
}

/// Square grids with full-name rows map row i onto column i.
#[test]
fn full_name_rows_map_to_short_columns() {
    let grid = ResultsGrid::from_json(SEASON).unwrap();
    let out = normalize(&grid);

    assert_eq!(out.teams.len(), 4);
    assert!(out.teams.contains_key("MCI"));
    assert!(!out.teams.contains_key("Manchester City"));
    assert_eq!(values(&out.teams["MCI"].home_scored), vec![3]);
}

/// Unparseable cells are reported once each and skipped.
#[test]
fn malformed_cells_warn_and_skip() {
    let grid = ResultsGrid::from_json(SEASON).unwrap();
    let out = normalize(&grid);

    assert_eq!(out.warnings.len(), 1, "only P-P is malformed: {:?}", out.warnings);
    assert_eq!(
        out.warnings[0],
        Diagnostic::MalformedCell {
            season: None,
            row:    "Manchester City".into(),
            column: "ARS".into(),
            raw:    "P-P".into(),
        }
    );
}

/// Double-digit scores are reported rather than guessed at.
#[test]
fn double_digit_scores_are_reported() {
    let grid = ResultsGrid::from_json(
        r#"{
            "header": ["Home \\ Away", "A", "B"],
            "rows": [["A", null, "10-2"], ["B", "1-0", null]]
        }"#,
    )
    .unwrap();
    let out = normalize(&grid);
    assert!(out.teams["A"].home_scored.is_empty());
    assert_eq!(values(&out.teams["A"].away_conceded), vec![1]);
    assert_eq!(out.warnings.len(), 1);
}

// ── Schema errors ────────────────────────────────────────────────────────────

#[test]
fn missing_index_column_is_schema_error() {
    let err = ResultsGrid::from_json(
        r#"{ "header": ["Team", "A", "B"], "rows": [["A", null, "1-0"]] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ForecastError::Schema { .. }), "got {err:?}");
}

#[test]
fn ragged_row_is_schema_error() {
    let err = ResultsGrid::from_json(
        r#"{ "header": ["Home \\ Away", "A", "B"], "rows": [["A", null]] }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ForecastError::Schema { .. }), "got {err:?}");
}

#[test]
fn duplicate_labels_are_schema_errors() {
    let dup_column = ResultsGrid::from_json(
        r#"{ "header": ["Home \\ Away", "A", "A"], "rows": [] }"#,
    );
    assert!(matches!(dup_column, Err(ForecastError::Schema { .. })));

    let dup_row = ResultsGrid::from_json(
        r#"{
            "header": ["Home \\ Away", "A", "B"],
            "rows": [["A", null, "1-0"], ["A", "0-0", null]]
        }"#,
    );
    assert!(matches!(dup_row, Err(ForecastError::Schema { .. })));
}

#[test]
fn unreadable_json_is_schema_error() {
    let err = ResultsGrid::from_json("not json").unwrap_err();
    assert!(matches!(err, ForecastError::Schema { .. }));
}

/// Full-name rows off the diagonal cannot be paired with their columns.
#[test]
fn unaligned_rows_in_non_square_grid_are_schema_errors() {
    let err = ResultsGrid::from_json(
        r#"{
            "header": ["Home \\ Away", "ARS", "CHE", "LIV"],
            "rows": [
                ["Arsenal", null,  "2-1", "1-0"],
                ["Chelsea", "0-0", null,  "3-1"]
            ]
        }"#,
    )
    .unwrap_err();
    assert!(matches!(err, ForecastError::Schema { .. }), "got {err:?}");
}

/// Rows named by column id may cover only part of the columns.
#[test]
fn non_square_grid_with_id_rows_is_accepted() {
    let grid = ResultsGrid::from_json(
        r#"{
            "header": ["Home \\ Away", "ARS", "CHE", "LIV"],
            "rows": [
                ["ARS", null,  "2-1", "1-0"],
                ["CHE", "0-0", null,  "3-1"]
            ]
        }"#,
    )
    .unwrap();
    let out = normalize(&grid);

    assert_eq!(out.teams.keys().cloned().collect::<Vec<_>>(), vec!["ARS", "CHE", "LIV"]);
    assert_eq!(values(&out.teams["ARS"].home_scored), vec![2, 1]);
    assert_eq!(values(&out.teams["ARS"].away_scored), vec![0]);
    assert!(out.teams["LIV"].home_scored.is_empty());
    assert_eq!(values(&out.teams["LIV"].away_conceded), vec![1, 3]);
}
