//! End-to-end HTTP tests against a served router.

mod common;

use serde_json::{Value, json};

use addrmatch::gateway::{MatchResponse, STATUS_HEADER};
use common::spawn_mock_server;

#[tokio::test]
async fn test_health_endpoint_returns_ok() {
    let server = spawn_mock_server(&["深圳市南山区"])
        .await
        .expect("Server should start");

    let response = reqwest::get(format!("{}/healthz", server.url()))
        .await
        .expect("Health check should succeed");

    assert!(response.status().is_success());
    assert_eq!(response.headers()[STATUS_HEADER], "healthy");
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_ready_endpoint_reports_loaded_artifacts() {
    let server = spawn_mock_server(&["深圳市南山区", "北京市", "深圳市南山区"])
        .await
        .expect("Server should start");

    let body: Value = reqwest::get(format!("{}/ready", server.url()))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "ok");
    assert_eq!(body["components"]["catalog"], "ready");
    assert_eq!(body["components"]["summary"]["catalog_entries"], 2);
    assert_eq!(body["components"]["summary"]["segmenter"], "max-match");
}

#[tokio::test]
async fn test_match_round_trip() {
    let server = spawn_mock_server(&["北京市", "深圳市南山区"])
        .await
        .expect("Server should start");

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/v1/match", server.url()))
        .json(&json!({"query": "深圳市南山区"}))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.headers()[STATUS_HEADER], "matched");

    let body: MatchResponse = response.json().await.unwrap();
    assert_eq!(body.candidate.as_deref(), Some("深圳市南山区"));
    assert!((body.score.unwrap() - 0.9).abs() < 1e-6);
    assert_eq!(body.message, "best match: 深圳市南山区\nscore: 0.9000");
}

#[tokio::test]
async fn test_repeated_queries_agree() {
    let server = spawn_mock_server(&["北京市", "深圳市", "深圳市南山区"])
        .await
        .expect("Server should start");

    let client = reqwest::Client::new();
    let mut bodies = Vec::new();
    for _ in 0..3 {
        let body: MatchResponse = client
            .post(format!("{}/v1/match", server.url()))
            .json(&json!({"query": "深圳市"}))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        bodies.push(body);
    }

    assert!(bodies.windows(2).all(|pair| pair[0] == pair[1]));
}

#[tokio::test]
async fn test_blank_query_asks_for_input() {
    let server = spawn_mock_server(&["深圳市南山区"])
        .await
        .expect("Server should start");

    let body: MatchResponse = reqwest::Client::new()
        .post(format!("{}/v1/match", server.url()))
        .json(&json!({"query": ""}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body.status, "empty_input");
    assert_eq!(body.message, "please enter an address");
    assert!(body.score.is_none());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let server = spawn_mock_server(&["深圳市南山区"])
        .await
        .expect("Server should start");

    let response = reqwest::Client::new()
        .post(format!("{}/v1/match", server.url()))
        .json(&json!({"query": 42}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.headers()[STATUS_HEADER], "invalid_request");
}
