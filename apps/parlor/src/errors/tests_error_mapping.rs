// Unit tests for error mapping - pure game errors without HTTP transport
use crate::errors::{ConfigError, ErrorCode, GameError};
use crate::AppError;

#[test]
fn maps_validation_to_422() {
    let app: AppError = GameError::validation("not your turn").into();
    assert_eq!(app.code(), ErrorCode::ValidationError);
    assert_eq!(app.status().as_u16(), 422);
}

#[test]
fn maps_config_with_parameter_detail() {
    let err = GameError::config("hand_size", 20, "8-14");
    assert_eq!(err.code(), ErrorCode::ConfigError);
    assert_eq!(
        err.to_string(),
        "invalid value for hand_size: 20; allowed: 8-14"
    );

    let app: AppError = err.into();
    assert_eq!(app.code().as_str(), "CONFIG_ERROR");
    assert_eq!(app.status().as_u16(), 422);
}

#[test]
fn maps_protocol_to_400() {
    let app: AppError = GameError::protocol("unknown message type: frobnicate").into();
    assert_eq!(app.code(), ErrorCode::ProtocolError);
    assert_eq!(app.status().as_u16(), 400);
}

#[test]
fn maps_invariant_to_500() {
    let app: AppError = GameError::invariant("started game without state").into();
    assert_eq!(app.code(), ErrorCode::Internal);
    assert_eq!(app.status().as_u16(), 500);
}

#[test]
fn config_error_converts_into_game_error() {
    let err: GameError = ConfigError::new("num_players", 9, "2-8").into();
    assert!(matches!(err, GameError::Config(ref c) if c.parameter == "num_players"));
    assert!(!err.is_validation());
}

#[test]
fn malformed_json_is_a_protocol_error() {
    let parse = serde_json::from_str::<serde_json::Value>("{nope").unwrap_err();
    let err: GameError = parse.into();
    assert_eq!(err.code(), ErrorCode::ProtocolError);
}
