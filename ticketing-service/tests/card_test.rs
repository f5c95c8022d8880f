//! Card lifecycle and load integration tests.

mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn card_creation_and_lookup() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(app.url("/card"))
        .json(&json!({
            "user_id": "U0001",
            "card_number": "4000-0001",
            "card_type": "regular"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["balance"], "0.00");
    assert_eq!(body["status"], "active");

    let card: serde_json::Value = app
        .client
        .get(app.url("/card/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(card["card_number"], "4000-0001");
}

#[tokio::test]
async fn second_card_for_a_user_conflicts() {
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "0.00").await;

    let response = app
        .client
        .post(app.url("/card"))
        .json(&json!({
            "user_id": "U0001",
            "card_number": "4000-9999",
            "card_type": "regular"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn missing_card_is_404() {
    let app = TestApp::spawn().await;
    let response = app
        .client
        .get(app.url("/card/U0404"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn buyload_credits_and_appends_a_load_entry() {
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "50.00").await;

    let response = app
        .client
        .post(app.url("/buyload/U0001"))
        .json(&json!({ "amount": 200 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["new_balance"], "250.00");

    let history: serde_json::Value = app
        .client
        .get(app.url("/card-history/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["kind"], "load");
    assert_eq!(entries[0]["payment"], "200.00");
    assert_eq!(entries[0]["status"], "confirmed");

    // The load also lands as a notification.
    let notified = app
        .wait_for(|| async {
            let count: serde_json::Value = app
                .client
                .get(app.url("/notifications/U0001/unread-count"))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            count["unread_count"] == 1
        })
        .await;
    assert!(notified, "card_loaded notification never arrived");
}

#[tokio::test]
async fn buyload_rejects_bad_amounts() {
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "50.00").await;

    let response = app
        .client
        .post(app.url("/buyload/U0001"))
        .json(&json!({ "amount": -5 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    let response = app
        .client
        .post(app.url("/buyload/U0001"))
        .json(&json!({ "amount": "not-a-number" }))
        .send()
        .await
        .unwrap();
    assert!(response.status().is_client_error());

    let card: serde_json::Value = app
        .client
        .get(app.url("/card/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(card["balance"], "50.00");
}

#[tokio::test]
async fn buyload_without_a_card_is_404() {
    let app = TestApp::spawn().await;
    let response = app
        .client
        .post(app.url("/buyload/U0404"))
        .json(&json!({ "amount": 100 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn card_update_flags_status() {
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "75.00").await;

    let response = app
        .client
        .put(app.url("/card/4000-U0001"))
        .json(&json!({ "status": "blocked" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["status"], "blocked");

    // A blocked card cannot buy tickets.
    app.seed_schedule("SCH-1").await;
    let response = app
        .client
        .post(app.url("/eticket"))
        .json(&common::purchase_body("U0001", "BK-1", "10.00", "SCH-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn card_update_with_no_fields_is_400() {
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "75.00").await;

    let response = app
        .client
        .put(app.url("/card/4000-U0001"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn history_is_newest_first() {
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "0.00").await;

    for amount in [10, 20, 30] {
        app.client
            .post(app.url("/buyload/U0001"))
            .json(&json!({ "amount": amount }))
            .send()
            .await
            .unwrap();
    }

    let history: serde_json::Value = app
        .client
        .get(app.url("/card-history/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["payment"], "30.00");
    assert_eq!(entries[2]["payment"], "10.00");
}
