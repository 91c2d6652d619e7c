//! End-to-end session tests against a mock collection service.
//!
//! These drive the real `HttpCollectorClient` through the controller, so the
//! wire bodies asserted here are exactly what a live service would receive.

use glimpse_core::{GlimpseError, HttpCollectorClient, Phase, SessionController};
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn nine_pixel_image() -> serde_json::Value {
    json!({
        "game_id": "g-1",
        "image": [0.0, 0.2, 0.4, 0.6, 0.8, 1.0, 0.1, 0.3, 0.5]
    })
}

async fn controller_against(server: &MockServer) -> SessionController {
    let client =
        HttpCollectorClient::with_base_url(server.uri(), 5).expect("Failed to create client");
    SessionController::new(Box::new(client), "it-user")
}

#[tokio::test]
async fn test_full_game_round_trip() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/start_game"))
        .and(body_json(json!({ "user_id": "it-user" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(nine_pixel_image()))
        .expect(2) // initial start + restart after finish
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/record_turn"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/end_game"))
        .and(body_partial_json(json!({
            "game_id": "g-1",
            "final_guess": 4,
            "num_turns": 2,
            "trajectory": [[0, 0], [1, 2]],
            "thought_trajectory": ["dark corner", "bright center-right"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut controller = controller_against(&mock_server).await;
    controller.start().await.unwrap();
    assert_eq!(controller.phase(), Phase::Active);
    assert_eq!(controller.session().unwrap().grid.side(), 3);

    controller.select(0, 0).unwrap();
    controller.set_reasoning("dark corner").unwrap();
    assert_eq!(controller.commit_turn().await.unwrap(), 1);

    controller.select(1, 2).unwrap();
    controller.set_weight(4, 0.8).unwrap();
    controller.set_reasoning("bright center-right").unwrap();
    assert_eq!(controller.commit_turn().await.unwrap(), 2);

    controller.request_finish().unwrap();
    let guess = controller.confirm_finish().await.unwrap();

    assert_eq!(guess, 4);
    assert_eq!(controller.finished_games(), 1);
    assert_eq!(controller.phase(), Phase::Active);
    assert_eq!(controller.session().unwrap().turns(), 0);
}

#[tokio::test]
async fn test_recorder_outage_keeps_local_state_retryable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/start_game"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nine_pixel_image()))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/record_turn"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down for maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let mut controller = controller_against(&mock_server).await;
    controller.start().await.unwrap();
    controller.select(2, 1).unwrap();
    controller.set_reasoning("bottom stroke").unwrap();

    let result = controller.commit_turn().await;
    assert!(matches!(result, Err(GlimpseError::Api(_))));

    let session = controller.session().unwrap();
    assert_eq!(session.turns(), 0);
    assert!(session.mask.is_hidden(2, 1).unwrap());
    assert_eq!(session.selected, Some((2, 1)));
    assert_eq!(session.reasoning, "bottom stroke");
}

#[tokio::test]
async fn test_skip_never_touches_the_finalizer() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/start_game"))
        .respond_with(ResponseTemplate::new(200).set_body_json(nine_pixel_image()))
        .expect(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/end_game"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let mut controller = controller_against(&mock_server).await;
    controller.start().await.unwrap();
    controller.request_finish().unwrap();
    controller.skip().await.unwrap();

    assert_eq!(controller.phase(), Phase::Active);
    assert_eq!(controller.finished_games(), 0);
}

#[tokio::test]
async fn test_non_square_image_fails_session_start() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/start_game"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "game_id": "g-bad",
            "image": [0.1, 0.2, 0.3]
        })))
        .mount(&mock_server)
        .await;

    let mut controller = controller_against(&mock_server).await;
    let result = controller.start().await;

    assert!(matches!(
        result,
        Err(GlimpseError::MalformedPuzzle { pixels: 3 })
    ));
    assert_eq!(controller.phase(), Phase::Uninitialized);
    assert!(controller.session().is_none());
}
