//! Announcement integration tests.

mod common;

use common::TestApp;
use serde_json::json;

async fn create_announcement(app: &TestApp, body: serde_json::Value) -> String {
    let response = app
        .client
        .post(app.url("/announcements"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    body["announcement_id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn sent_announcements_are_visible_drafts_are_not() {
    let app = TestApp::spawn().await;

    create_announcement(
        &app,
        json!({
            "title": "Service advisory",
            "message": "Afternoon sailings delayed",
            "status": "sent",
            "author": "Operations",
            "priority": "high"
        }),
    )
    .await;
    create_announcement(
        &app,
        json!({
            "title": "Unfinished draft",
            "message": "Not yet published",
            "author": "Operations"
        }),
    )
    .await;

    let visible: serde_json::Value = app
        .client
        .get(app.url("/announcements/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let list = visible.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["title"], "Service advisory");
}

#[tokio::test]
async fn targeted_announcements_reach_only_their_users() {
    let app = TestApp::spawn().await;

    create_announcement(
        &app,
        json!({
            "title": "VIP boarding change",
            "message": "Use gate 3",
            "status": "sent",
            "author": "Operations",
            "target_users": ["U0002"]
        }),
    )
    .await;

    let for_u1: serde_json::Value = app
        .client
        .get(app.url("/announcements/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(for_u1.as_array().unwrap().is_empty());

    let for_u2: serde_json::Value = app
        .client
        .get(app.url("/announcements/U0002"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(for_u2.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn priority_filter_and_ordering() {
    let app = TestApp::spawn().await;

    for (title, priority) in [("Low note", "low"), ("Critical alert", "critical")] {
        create_announcement(
            &app,
            json!({
                "title": title,
                "message": "...",
                "status": "sent",
                "author": "Operations",
                "priority": priority
            }),
        )
        .await;
    }

    let all: serde_json::Value = app
        .client
        .get(app.url("/announcements/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let list = all.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["title"], "Critical alert", "highest priority first");

    let critical_only: serde_json::Value = app
        .client
        .get(app.url("/announcements/U0001?priority=critical"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(critical_only.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn mark_read_and_status_transitions() {
    let app = TestApp::spawn().await;

    let id = create_announcement(
        &app,
        json!({
            "title": "Service advisory",
            "message": "Afternoon sailings delayed",
            "status": "sent",
            "author": "Operations"
        }),
    )
    .await;

    let read: serde_json::Value = app
        .client
        .put(app.url(&format!("/announcements/{}/read", id)))
        .json(&json!({ "user_id": "U0001" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(read["read_by"][0], "U0001");

    // Deactivating hides it.
    let response = app
        .client
        .put(app.url(&format!("/announcements/{}/status", id)))
        .json(&json!({ "status": "sent", "is_active": false }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let visible: serde_json::Value = app
        .client
        .get(app.url("/announcements/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(visible.as_array().unwrap().is_empty());
}
