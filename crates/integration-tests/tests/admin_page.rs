//! Admin page, static assets and health endpoints.

#![allow(clippy::unwrap_used)]

use catalog_integration_tests::TestApp;
use reqwest::StatusCode;
use serde_json::{Value, json};

#[tokio::test]
async fn test_admin_page_lists_products() {
    let app = TestApp::spawn().await.unwrap();

    app.client
        .post(app.url("/products"))
        .json(&json!({"name": "Desk Lamp", "price": 35, "color": "brass"}))
        .send()
        .await
        .unwrap();

    let resp = app.client.get(app.url("/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()["content-type"].to_str().unwrap().to_owned();
    assert!(content_type.starts_with("text/html"));

    let html = resp.text().await.unwrap();
    assert!(html.contains("integration-host"));
    assert!(html.contains("fallback"));
    assert!(html.contains("Desk Lamp"));
    assert!(html.contains("$35.00"));
    assert!(html.contains("/static/js/ui.js"));
}

#[tokio::test]
async fn test_static_assets_are_served() {
    let app = TestApp::spawn().await.unwrap();

    for path in ["/static/js/ui.js", "/static/css/app.css", "/static/img/placeholder.svg"] {
        let resp = app.client.get(app.url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::spawn().await.unwrap();

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    let resp = app.client.get(app.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["source"], "fallback");
}
