//! Configuration tests - JSON loading feeding a live session

use blockfall::core::{ConfigError, GameConfig, GameSession, ScriptedSource};
use blockfall::types::{GameCommand, PieceKind, Pos, TICK_MS};

#[test]
fn test_small_board_from_json_clears_with_one_bar() {
    let config = GameConfig::from_json_str(
        r#"{ "board": { "width": 4, "height": 4 }, "spawn": { "x": -1, "y": 0 } }"#,
    )
    .unwrap();
    assert_eq!(config.bounds().x_min, -2);
    assert_eq!(config.bounds().y_max, 2);

    let mut session =
        GameSession::new(&config, ScriptedSource::new([PieceKind::I, PieceKind::O])).unwrap();
    session.start().unwrap();

    let report = session.step(&[GameCommand::HardDrop], TICK_MS);
    let event = report.locked.unwrap();
    assert_eq!(event.lines_cleared, 1);
    assert_eq!(report.spawned, Some(PieceKind::O));
    // Only the new square remains
    assert_eq!(session.grid().occupied_count(), 4);
}

#[test]
fn test_custom_timing_from_json() {
    let config =
        GameConfig::from_json_str(r#"{ "step_interval_ms": 100, "lock_delay_ms": 50 }"#).unwrap();
    let mut session = GameSession::new(&config, ScriptedSource::new([PieceKind::T])).unwrap();
    session.start().unwrap();

    let y = session.active().unwrap().anchor().y;
    session.step(&[], 100);
    assert_eq!(session.active().unwrap().anchor().y, y - 1);
}

#[test]
fn test_spawn_that_does_not_fit_is_rejected() {
    let err = GameConfig::from_json_str(r#"{ "spawn": { "x": 4, "y": 8 } }"#).unwrap_err();
    assert!(matches!(err, ConfigError::SpawnOutOfBounds { .. }));
    assert!(err.to_string().contains("(4, 8)"));
}

#[test]
fn test_unknown_pivot_is_a_json_error() {
    let mut value: serde_json::Value =
        serde_json::from_str(&GameConfig::default().to_json_string().unwrap()).unwrap();
    value["shapes"][0]["pivot"] = serde_json::Value::from("diagonal");

    let err = GameConfig::from_json_str(&value.to_string()).unwrap_err();
    assert!(matches!(err, ConfigError::Json(_)));
}

#[test]
fn test_custom_kick_table_is_used() {
    let mut config = GameConfig::default();
    // Only ever try the unkicked position
    for shape in &mut config.shapes {
        for row in &mut shape.kicks {
            row.truncate(1);
        }
    }
    let mut session = GameSession::new(&config, ScriptedSource::new([PieceKind::I])).unwrap();
    session.spawn_at(PieceKind::I, Pos::new(0, 0)).unwrap();
    session.step(&[GameCommand::RotateCw], 0);
    for _ in 0..6 {
        session.step(&[GameCommand::MoveLeft], 0);
    }
    assert_eq!(session.active().unwrap().anchor().x, -5);

    // Against the wall the bar can no longer lie flat
    let report = session.step(&[GameCommand::RotateCw], 0);
    assert!(!report.rotated);
    assert_eq!(session.active().unwrap().rotation(), 1);
}
