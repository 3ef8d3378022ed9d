use actix_web::http::StatusCode;
use actix_web::test;
use parlor_test_support::problem_details::assert_problem_details;
use serde_json::{json, Value};

use crate::support::app_builder::test_state;
use crate::support::auth::bearer;
use crate::support::create_test_app;

#[actix_web::test]
async fn create_then_fetch_a_game() {
    let app = create_test_app(test_state()).await;

    let req = test::TestRequest::post()
        .uri("/api/games")
        .insert_header(bearer(7))
        .set_json(json!({ "game_mode": "hearts", "config": { "countdown": false } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["game_mode"], "hearts");
    let game_id = created["game_id"].as_i64().expect("game id");
    assert!(game_id > 0);

    let req = test::TestRequest::get()
        .uri(&format!("/api/games/{game_id}"))
        .insert_header(bearer(8))
        .to_request();
    let summary: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(summary["game_id"], game_id);
    assert_eq!(summary["owner"], 7);
    assert_eq!(summary["config"]["countdown"], false);
    assert_eq!(summary["live"], false);
}

#[actix_web::test]
async fn creating_a_game_needs_a_token() {
    let app = create_test_app(test_state()).await;

    let req = test::TestRequest::post()
        .uri("/api/games")
        .set_json(json!({ "game_mode": "gin" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(
        resp,
        "UNAUTHORIZED_MISSING_BEARER",
        StatusCode::UNAUTHORIZED,
        None,
    )
    .await;
}

#[actix_web::test]
async fn a_garbled_token_is_rejected() {
    let app = create_test_app(test_state()).await;

    let req = test::TestRequest::post()
        .uri("/api/games")
        .insert_header(("Authorization", "Bearer not-a-jwt"))
        .set_json(json!({ "game_mode": "gin" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "UNAUTHORIZED_INVALID_JWT", StatusCode::UNAUTHORIZED, None)
        .await;
}

#[actix_web::test]
async fn bad_config_never_creates_a_game() {
    let app = create_test_app(test_state()).await;

    let req = test::TestRequest::post()
        .uri("/api/games")
        .insert_header(bearer(1))
        .set_json(json!({ "game_mode": "rush", "config": { "num_tiles": "lots" } }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "CONFIG_ERROR", StatusCode::UNPROCESSABLE_ENTITY, None).await;

    let req = test::TestRequest::get()
        .uri("/api/games/1")
        .insert_header(bearer(1))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "GAME_NOT_FOUND", StatusCode::NOT_FOUND, Some("1")).await;
}

#[actix_web::test]
async fn game_ids_must_be_positive_numbers() {
    let app = create_test_app(test_state()).await;

    for path in ["/api/games/abc", "/api/games/0", "/api/games/-4"] {
        let req = test::TestRequest::get()
            .uri(path)
            .insert_header(bearer(1))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_problem_details(resp, "BAD_REQUEST", StatusCode::BAD_REQUEST, Some("Invalid game id"))
            .await;
    }
}
