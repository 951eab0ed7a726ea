//! HTTP endpoint tests for the autofill API
//!
//! Uses axum-test to drive the full router. Model-backed paths are only
//! exercised up to their validation layer; the review endpoints run the
//! whole save-gated workflow end to end against in-memory state.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Bytes;
use axum_test::TestServer;
use serde_json::{json, Value};
use tokio::sync::RwLock;

use crate::llm::ModelClient;
use crate::retrieval::ChunkIndex;
use crate::state::AppState;

fn test_state() -> Arc<AppState> {
    let index = ChunkIndex::load(PathBuf::from("does/not/exist/chunks.json"))
        .expect("missing index loads as empty");
    Arc::new(AppState {
        model: ModelClient::from_env(reqwest::Client::new()),
        index: RwLock::new(index),
        sessions: RwLock::new(HashMap::new()),
    })
}

fn create_test_server() -> TestServer {
    let app = crate::router(test_state()).expect("router builds");
    TestServer::new(app).unwrap()
}

async fn create_session(server: &TestServer) -> Value {
    let response = server
        .post("/api/review")
        .json(&json!({
            "autofilled_fields": {
                "client_name": "Jane Doe",
                "risk_disclosure": null
            },
            "explanations": {
                "client_name": "From profile"
            }
        }))
        .await;
    response.assert_status_ok();
    response.json::<Value>()
}

#[tokio::test]
async fn health_returns_ok() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "ok");
}

#[tokio::test]
async fn root_banner_names_the_service() {
    let server = create_test_server();
    let response = server.get("/").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["service"], "autofill-api");
}

#[tokio::test]
async fn autofill_rejects_short_advisor_notes() {
    let server = create_test_server();
    let response = server
        .post("/autofill")
        .json(&json!({"advisor_notes": "abcd", "form_type": "suitability"}))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["code"], "INVALID_REQUEST");
}

#[tokio::test]
async fn autofill_rejects_short_form_type() {
    let server = create_test_server();
    let response = server
        .post("/autofill")
        .json(&json!({"advisor_notes": "valid advisor notes", "form_type": "ab"}))
        .await;
    response.assert_status_bad_request();
}

#[tokio::test]
async fn docs_reload_reports_chunk_count() {
    let server = create_test_server();
    let response = server.post("/docs/reload").await;
    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["chunks_loaded"], 0);
}

#[tokio::test]
async fn non_pdf_upload_is_rejected() {
    let server = create_test_server();
    let body = concat!(
        "--boundary\r\n",
        "Content-Disposition: form-data; name=\"file\"; filename=\"notes.txt\"\r\n",
        "Content-Type: text/plain\r\n\r\n",
        "hello\r\n",
        "--boundary\r\n",
        "Content-Disposition: form-data; name=\"form_type\"\r\n\r\n",
        "suitability\r\n",
        "--boundary--\r\n",
    );

    let response = server
        .post("/autofill-from-pdf")
        .content_type("multipart/form-data; boundary=boundary")
        .bytes(Bytes::from_static(body.as_bytes()))
        .await;

    response.assert_status_bad_request();
    assert_eq!(
        response.json::<Value>()["error"],
        "Only PDF files are supported."
    );
}

#[tokio::test]
async fn create_review_starts_at_first_field() {
    let server = create_test_server();
    let session = create_session(&server).await;

    assert_eq!(session["current_index"], 0);
    assert_eq!(session["length"], 2);
    assert_eq!(session["terminal"], false);
    assert_eq!(session["current_saved"], false);
    assert_eq!(session["field"]["label"], "Client Name");
    assert_eq!(session["field"]["draft"], "Jane Doe");
    assert_eq!(session["field"]["reason"], "From profile");
}

#[tokio::test]
async fn create_review_with_empty_extraction_uses_placeholders() {
    let server = create_test_server();
    let response = server
        .post("/api/review")
        .json(&json!({"autofilled_fields": {}, "explanations": {}}))
        .await;
    response.assert_status_ok();
    let session = response.json::<Value>();
    assert_eq!(session["length"], 6);
    assert_eq!(session["field"]["label"], "Client Age");
    assert_eq!(session["field"]["value"], "");
}

#[tokio::test]
async fn next_without_save_is_a_conflict_and_does_not_move() {
    let server = create_test_server();
    let session = create_session(&server).await;
    let id = session["id"].as_str().unwrap();

    let response = server.post(&format!("/api/review/{id}/next")).await;
    assert_eq!(response.status_code(), 409);
    assert_eq!(response.json::<Value>()["code"], "NOT_SAVED");

    let current = server.get(&format!("/api/review/{id}")).await.json::<Value>();
    assert_eq!(current["current_index"], 0);
}

#[tokio::test]
async fn edit_save_next_walks_forward() {
    let server = create_test_server();
    let session = create_session(&server).await;
    let id = session["id"].as_str().unwrap();

    server
        .post(&format!("/api/review/{id}/edit"))
        .json(&json!({"text": "John Doe"}))
        .await
        .assert_status_ok();

    let saved = server.post(&format!("/api/review/{id}/save")).await;
    saved.assert_status_ok();
    assert_eq!(saved.json::<Value>()["current_saved"], true);

    let advanced = server.post(&format!("/api/review/{id}/next")).await;
    advanced.assert_status_ok();
    let body = advanced.json::<Value>();
    assert_eq!(body["current_index"], 1);
    assert_eq!(body["field"]["label"], "Risk Disclosure");
    // Null extraction value arrived as an empty draft
    assert_eq!(body["field"]["draft"], "");
}

#[tokio::test]
async fn editing_after_save_closes_the_gate_again() {
    let server = create_test_server();
    let session = create_session(&server).await;
    let id = session["id"].as_str().unwrap();

    server.post(&format!("/api/review/{id}/save")).await.assert_status_ok();
    server
        .post(&format!("/api/review/{id}/edit"))
        .json(&json!({"text": "changed after save"}))
        .await
        .assert_status_ok();

    let response = server.post(&format!("/api/review/{id}/next")).await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn back_is_always_allowed_and_preserves_saves() {
    let server = create_test_server();
    let session = create_session(&server).await;
    let id = session["id"].as_str().unwrap();

    server.post(&format!("/api/review/{id}/save")).await.assert_status_ok();
    server.post(&format!("/api/review/{id}/next")).await.assert_status_ok();

    let back = server.post(&format!("/api/review/{id}/back")).await;
    back.assert_status_ok();
    let body = back.json::<Value>();
    assert_eq!(body["current_index"], 0);
    assert_eq!(body["current_saved"], true);

    // Back at index 0 stays put
    let again = server.post(&format!("/api/review/{id}/back")).await;
    assert_eq!(again.json::<Value>()["current_index"], 0);
}

#[tokio::test]
async fn full_walk_reaches_terminal_and_rejects_further_edits() {
    let server = create_test_server();
    let session = create_session(&server).await;
    let id = session["id"].as_str().unwrap();
    let length = session["length"].as_u64().unwrap();

    for _ in 0..length {
        server.post(&format!("/api/review/{id}/save")).await.assert_status_ok();
        server.post(&format!("/api/review/{id}/next")).await.assert_status_ok();
    }

    let current = server.get(&format!("/api/review/{id}")).await.json::<Value>();
    assert_eq!(current["terminal"], true);
    assert!(current.get("field").is_none());

    let late_edit = server
        .post(&format!("/api/review/{id}/edit"))
        .json(&json!({"text": "too late"}))
        .await;
    assert_eq!(late_edit.status_code(), 409);
    assert_eq!(late_edit.json::<Value>()["code"], "TERMINAL");
}

#[tokio::test]
async fn clear_discards_the_draft() {
    let server = create_test_server();
    let session = create_session(&server).await;
    let id = session["id"].as_str().unwrap();

    let cleared = server.post(&format!("/api/review/{id}/clear")).await;
    cleared.assert_status_ok();
    let body = cleared.json::<Value>();
    assert_eq!(body["field"]["draft"], "");
    // The original suggested value is untouched
    assert_eq!(body["field"]["value"], "Jane Doe");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let server = create_test_server();
    let response = server
        .get("/api/review/00000000-0000-0000-0000-000000000000")
        .await;
    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn new_extraction_result_gets_an_independent_session() {
    let server = create_test_server();
    let first = create_session(&server).await;
    let second = create_session(&server).await;

    assert_ne!(first["id"], second["id"]);

    // Advancing the second session leaves the first untouched
    let second_id = second["id"].as_str().unwrap();
    server.post(&format!("/api/review/{second_id}/save")).await.assert_status_ok();
    server.post(&format!("/api/review/{second_id}/next")).await.assert_status_ok();

    let first_id = first["id"].as_str().unwrap();
    let first_now = server.get(&format!("/api/review/{first_id}")).await.json::<Value>();
    assert_eq!(first_now["current_index"], 0);
}
