mod common;

use common::TestApp;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "ticketing-service");
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/ready"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn metrics_are_exposed() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/metrics"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);
}
