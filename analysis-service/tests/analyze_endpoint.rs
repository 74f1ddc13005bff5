//! End-to-end tests against a running server with a mock relay.
//!
//! Run with: cargo test -p analysis-service --test analyze_endpoint

use std::sync::Arc;
use std::time::Duration;

use analysis_service::config::AnalysisConfig;
use analysis_service::services::providers::UpstreamAnalyzer;
use analysis_service::services::providers::mock::MockAnalyzer;
use analysis_service::startup::Application;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde_json::{Value, json};

/// Spawn the application on a random port with the given relay mock.
async fn spawn_app(upstream: Arc<dyn UpstreamAnalyzer>) -> u16 {
    std::env::set_var("ENVIRONMENT", "test");
    std::env::set_var("APP__PORT", "0");
    std::env::set_var("WORKER_VERSION", "w-test");

    let config = AnalysisConfig::load().expect("Failed to load config");
    let app = Application::build(config, upstream)
        .await
        .expect("Failed to build application");
    let port = app.port();

    tokio::spawn(async move {
        let _ = app.run_until_stopped().await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    port
}

/// Minimal PNG header with the given dimensions, base64-encoded. The size
/// gate only reads IHDR, so no pixel data is needed.
fn png_base64(width: u32, height: u32) -> String {
    let mut bytes = vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];
    bytes.extend_from_slice(&[0x00, 0x00, 0x00, 0x0d]);
    bytes.extend_from_slice(b"IHDR");
    bytes.extend_from_slice(&width.to_be_bytes());
    bytes.extend_from_slice(&height.to_be_bytes());
    STANDARD.encode(&bytes)
}

#[tokio::test]
async fn ping_and_version_report_worker_identity() {
    let port = spawn_app(Arc::new(MockAnalyzer::replying(json!({"ok": true})))).await;
    let client = Client::new();

    let response = client
        .get(format!("http://localhost:{}/ping", port))
        .send()
        .await
        .expect("Failed to send request");
    assert!(response.status().is_success());
    assert_eq!(
        response.headers().get("x-worker-version").unwrap(),
        "w-test"
    );
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["ok"], true);
    assert_eq!(body["schema_version"], 2);

    let body: Value = client
        .get(format!("http://localhost:{}/version", port))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("json body");
    assert_eq!(body["version"], "w-test");
}

#[tokio::test]
async fn proxy_ping_reports_relay_probe() {
    let port = spawn_app(Arc::new(MockAnalyzer::replying(json!({"ok": true})))).await;
    let client = Client::new();

    let body: Value = client
        .get(format!("http://localhost:{}/proxy_ping", port))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("json body");

    assert_eq!(body["ok"], true);
    assert_eq!(body["proxy_status"], 200);
    assert_eq!(body["proxy_ping"]["ok"], true);
}

#[tokio::test]
async fn analyze_rejects_missing_or_placeholder_image() {
    let port = spawn_app(Arc::new(MockAnalyzer::replying(json!({"ok": true})))).await;
    let client = Client::new();

    for payload in [json!({}), json!({"image": "test"}), json!({"image": "short"})] {
        let response = client
            .post(format!("http://localhost:{}/analyze", port))
            .json(&payload)
            .send()
            .await
            .expect("Failed to send request");
        assert_eq!(response.status().as_u16(), 422);

        let body: Value = response.json().await.expect("json body");
        assert_eq!(body["ok"], false);
        assert_eq!(body["error_code"], "INVALID_IMAGE");
        assert_eq!(body["is_stool_image"], false);
        assert_eq!(body["headline"], "图片信息不足，无法分析");
        // Even rejections are fully shaped.
        assert!(body["ui_strings"]["sections"].as_array().unwrap().len() >= 4);
    }
}

#[tokio::test]
async fn analyze_rejects_undersized_image() {
    let port = spawn_app(Arc::new(MockAnalyzer::replying(json!({"ok": true})))).await;
    let client = Client::new();

    let response = client
        .post(format!("http://localhost:{}/analyze", port))
        .json(&json!({"image": png_base64(256, 256)}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn analyze_rejects_non_json_body() {
    let port = spawn_app(Arc::new(MockAnalyzer::replying(json!({"ok": true})))).await;
    let client = Client::new();

    let response = client
        .post(format!("http://localhost:{}/analyze", port))
        .body("image bytes")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status().as_u16(), 422);
}

#[tokio::test]
async fn analyze_happy_path_normalizes_relay_reply() {
    let upstream = MockAnalyzer::replying(json!({
        "ok": true,
        "is_stool_image": true,
        "headline": "偏软，多为饮食相关",
        "score": 42,
        "risk_level": "medium",
        "stool_features": {"bristol_type": 5, "color_desc": "黄褐"},
        "reasoning_bullets": ["颜色均匀", "无可见血丝"]
    }));
    let port = spawn_app(Arc::new(upstream)).await;
    let client = Client::new();

    let response = client
        .post(format!("http://localhost:{}/analyze", port))
        .json(&json!({
            "image": png_base64(800, 800),
            "context": {"foods_eaten": "米饭"}
        }))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers().get("x-proxy-version").unwrap(),
        "mock-proxy-1"
    );
    assert_eq!(
        response.headers().get("x-openai-model").unwrap(),
        "mock-model"
    );

    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["ok"], true);
    assert_eq!(body["schema_version"], 2);
    assert_eq!(body["headline"], "偏软，多为饮食相关");
    assert_eq!(body["risk_level"], "medium");
    assert_eq!(body["model_used"], "mock-model");
    assert_eq!(body["proxy_version"], "mock-proxy-1");
    assert_eq!(body["bristol_type"], 5);
    // Floors applied on top of the partial reply.
    assert!(body["reasoning_bullets"].as_array().unwrap().len() >= 5);
    assert!(body["red_flags"].as_array().unwrap().len() >= 5);
    assert!(body["follow_up_questions"].as_array().unwrap().len() >= 6);
    // Caller context is echoed and woven into the interpretation.
    assert_eq!(body["input_echo"]["context"]["foods_eaten"], "米饭");
    assert!(
        body["interpretation"]["how_context_affects"][0]
            .as_str()
            .unwrap()
            .contains("米饭")
    );
}

#[tokio::test]
async fn analyze_relay_http_error_answers_shaped_200() {
    let upstream = MockAnalyzer::erroring(502, json!({"ok": false, "message": "upstream down"}));
    let port = spawn_app(Arc::new(upstream)).await;
    let client = Client::new();

    let response = client
        .post(format!("http://localhost:{}/analyze", port))
        .json(&json!({"image": png_base64(800, 800)}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["ok"], false);
    assert_eq!(body["error_code"], "PROXY_ERROR");
    assert_eq!(body["headline"], "服务暂不可用，请稍后重试");
    assert_eq!(body["ui_strings"]["sections"][0]["title"], "重试建议");
    assert!(body["red_flags"].as_array().unwrap().len() >= 5);
}

#[tokio::test]
async fn analyze_unreachable_relay_answers_shaped_200() {
    let port = spawn_app(Arc::new(MockAnalyzer::unreachable())).await;
    let client = Client::new();

    let response = client
        .post(format!("http://localhost:{}/analyze", port))
        .json(&json!({"image": png_base64(800, 800)}))
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(
        response.headers().get("x-proxy-version").unwrap(),
        "unknown"
    );
    let body: Value = response.json().await.expect("json body");
    assert_eq!(body["error_code"], "PROXY_ERROR");
    assert_eq!(body["proxy_version"], "unknown");
}

#[tokio::test]
async fn analyze_negative_classification_from_relay() {
    let upstream = MockAnalyzer::replying(json!({
        "ok": true,
        "is_stool_image": false,
        "explanation": "画面中是玩具"
    }));
    let port = spawn_app(Arc::new(upstream)).await;
    let client = Client::new();

    let body: Value = client
        .post(format!("http://localhost:{}/analyze", port))
        .json(&json!({"image": png_base64(800, 800)}))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("json body");

    assert_eq!(body["is_stool_image"], false);
    assert_eq!(body["stool_features"], Value::Null);
    assert_eq!(body["risk_level"], "unknown");
    assert_eq!(body["image_validation"]["status"], "not_stool");
    assert_eq!(body["ui_strings"]["tags"][0], "非大便图片");
}
