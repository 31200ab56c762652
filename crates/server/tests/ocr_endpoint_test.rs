//! # OCR Endpoint Tests
//!
//! Drives `POST /api/ocr` over real HTTP with a mocked Gemini backend.

mod common;

use common::{upload_form, TestApp, GEMINI_ENDPOINT};
use httpmock::Method::POST;
use kycocr_test_utils::candidate_envelope;
use reqwest::multipart::Form;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::time::Duration;

const FAKE_PDF: &[u8] = b"%PDF-1.4 not a real document";

#[tokio::test]
async fn test_health_and_root() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;

    let health = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await?;
    assert_eq!(health.status(), StatusCode::OK);
    assert_eq!(health.text().await?, "OK");

    let root = app.client.get(&app.address).send().await?;
    assert_eq!(root.status(), StatusCode::OK);
    assert!(root.text().await?.contains("/api/ocr"));
    Ok(())
}

#[tokio::test]
async fn test_bank_upload_returns_normalized_details() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let gemini = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GEMINI_ENDPOINT)
                .query_param("key", "test-key")
                .body_contains(r#""mimeType":"application/pdf""#)
                .body_contains(r#""required":["account_number","routing_number"]"#);
            then.status(200).json_body(candidate_envelope(&json!({
                "details": { "account_number": "1234 5678 901", "routing_number": "123456789" }
            })));
        })
        .await;

    let response = app
        .post_ocr(upload_form("BANK", "cheque.pdf", "application/pdf", FAKE_PDF))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(
        body,
        json!({
            "type": "BANK",
            "details": { "account_number": "12345678901", "routing_number": "123456789" }
        })
    );
    gemini.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_mime_type_is_guessed_from_extension() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let gemini = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST)
                .path(GEMINI_ENDPOINT)
                .body_contains(r#""mimeType":"application/pdf""#);
            then.status(200)
                .json_body(candidate_envelope(&json!({ "details": { "tin_number": "99" } })));
        })
        .await;

    let response = app
        .post_ocr(upload_form(
            "TIN",
            "certificate.pdf",
            "application/octet-stream",
            FAKE_PDF,
        ))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body["details"]["tin_number"], "99");
    gemini.assert_async().await;
    Ok(())
}

#[tokio::test]
async fn test_provider_failure_returns_empty_details() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_ENDPOINT);
            then.status(500).body("internal");
        })
        .await;

    let response = app
        .post_ocr(upload_form("NID", "nid.pdf", "application/pdf", FAKE_PDF))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "type": "NID", "details": {} }));
    Ok(())
}

#[tokio::test]
async fn test_missing_required_field_returns_empty_details() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    app.mock_server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_ENDPOINT);
            then.status(200)
                .json_body(candidate_envelope(&json!({ "details": { "name": "A" } })));
        })
        .await;

    let response = app
        .post_ocr(upload_form("NID", "nid.pdf", "application/pdf", FAKE_PDF))
        .await?;

    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "type": "NID", "details": {} }));
    Ok(())
}

#[tokio::test]
async fn test_missing_file_returns_empty_details_without_provider_call() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let gemini = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_ENDPOINT);
            then.status(200).json_body(json!({}));
        })
        .await;

    let response = app.post_ocr(Form::new().text("type", "BO")).await?;

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await?;
    assert_eq!(body, json!({ "type": "BO", "details": {} }));
    assert_eq!(gemini.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_invalid_type_is_rejected() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let gemini = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_ENDPOINT);
            then.status(200).json_body(json!({}));
        })
        .await;

    let response = app
        .post_ocr(upload_form("PASSPORT", "p.pdf", "application/pdf", FAKE_PDF))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert!(body["error"]
        .as_str()
        .is_some_and(|message| message.contains("PASSPORT")));
    assert_eq!(gemini.hits_async().await, 0);
    Ok(())
}

#[tokio::test]
async fn test_document_type_is_case_sensitive() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;

    let response = app
        .post_ocr(upload_form("nid", "n.pdf", "application/pdf", FAKE_PDF))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn test_missing_type_is_rejected() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let part = reqwest::multipart::Part::bytes(FAKE_PDF.to_vec())
        .file_name("x.pdf")
        .mime_str("application/pdf")?;

    let response = app.post_ocr(Form::new().part("file", part)).await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await?;
    assert_eq!(body["error"], "Missing 'type' field.");
    Ok(())
}

#[tokio::test]
async fn test_concurrent_identical_uploads_share_one_provider_call() -> anyhow::Result<()> {
    let app = TestApp::spawn().await?;
    let gemini = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_ENDPOINT);
            then.status(200)
                .delay(Duration::from_millis(300))
                .json_body(candidate_envelope(&json!({ "details": { "bo_id": "1201 9500" } })));
        })
        .await;

    let upload = || app.post_ocr(upload_form("BO", "bo.pdf", "application/pdf", FAKE_PDF));
    let (a, b, c) = tokio::join!(upload(), upload(), upload());

    for response in [a?, b?, c?] {
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await?;
        assert_eq!(body, json!({ "type": "BO", "details": { "bo_id": "12019500" } }));
    }
    assert_eq!(gemini.hits_async().await, 1);
    Ok(())
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() -> anyhow::Result<()> {
    let app = TestApp::spawn_with("max_upload_bytes: 1024").await?;
    let gemini = app
        .mock_server
        .mock_async(|when, then| {
            when.method(POST).path(GEMINI_ENDPOINT);
            then.status(200).json_body(json!({}));
        })
        .await;

    let response = app
        .post_ocr(upload_form("NID", "big.pdf", "application/pdf", &[b'x'; 8192]))
        .await?;

    assert!(response.status().is_client_error());
    assert_eq!(gemini.hits_async().await, 0);
    Ok(())
}
