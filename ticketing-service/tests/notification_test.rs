//! Notification CRUD integration tests.

mod common;

use common::TestApp;
use serde_json::json;

async fn create_notification(app: &TestApp, user_id: &str, title: &str) -> String {
    let response = app
        .client
        .post(app.url("/notifications"))
        .json(&json!({
            "kind": "booking_reminder",
            "title": title,
            "message": "Your ferry departs in 24 hours.",
            "user_id": user_id,
            "additional_data": { "actionRequired": true }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    body["notification_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn notification_lifecycle_read_archive_delete() {
    let app = TestApp::spawn().await;

    let id = create_notification(&app, "U0001", "Trip reminder").await;

    // Inbox holds it, unread.
    let inbox: serde_json::Value = app
        .client
        .get(app.url("/notifications/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(inbox.as_array().unwrap().len(), 1);
    assert_eq!(inbox[0]["is_read"], false);

    let count: serde_json::Value = app
        .client
        .get(app.url("/notifications/U0001/unread-count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["unread_count"], 1);

    // Mark read.
    let response = app
        .client
        .put(app.url(&format!("/notifications/{}/read", id)))
        .json(&json!({ "user_id": "U0001" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let count: serde_json::Value = app
        .client
        .get(app.url("/notifications/U0001/unread-count"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(count["unread_count"], 0);

    // Archive moves it out of the inbox.
    app.client
        .put(app.url(&format!("/notifications/{}/archive", id)))
        .json(&json!({ "user_id": "U0001" }))
        .send()
        .await
        .unwrap();
    let inbox: serde_json::Value = app
        .client
        .get(app.url("/notifications/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(inbox.as_array().unwrap().is_empty());

    let archived: serde_json::Value = app
        .client
        .get(app.url("/notifications/U0001/archived"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(archived.as_array().unwrap().len(), 1);

    // Delete.
    let response = app
        .client
        .delete(app.url(&format!("/notifications/{}", id)))
        .json(&json!({ "user_id": "U0001" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let archived: serde_json::Value = app
        .client
        .get(app.url("/notifications/U0001/archived"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(archived.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn notifications_are_scoped_to_their_user() {
    let app = TestApp::spawn().await;

    let id = create_notification(&app, "U0001", "For user one").await;

    // Another user cannot act on it.
    let response = app
        .client
        .put(app.url(&format!("/notifications/{}/read", id)))
        .json(&json!({ "user_id": "U0002" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    let inbox: serde_json::Value = app
        .client
        .get(app.url("/notifications/U0002"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(inbox.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn create_notification_validates_fields() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/notifications"))
        .json(&json!({
            "kind": "booking_reminder",
            "title": "",
            "message": "x",
            "user_id": "U0001"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);
}
