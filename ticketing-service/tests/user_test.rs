//! User profile integration tests.

mod common;

use common::TestApp;
use serde_json::json;

#[tokio::test]
async fn registration_assigns_sequential_ids() {
    let app = TestApp::spawn().await;

    let first: serde_json::Value = app
        .client
        .post(app.url("/users"))
        .json(&json!({
            "first_name": "Maria",
            "last_name": "Cruz",
            "email": "maria@example.com",
            "phone": "09170000000"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["user_id"], "U0001");
    assert_eq!(first["name"], "Maria Cruz");

    let second: serde_json::Value = app
        .client
        .post(app.url("/users"))
        .json(&json!({
            "first_name": "Jose",
            "last_name": "Reyes",
            "email": "jose@example.com",
            "phone": "09170000001"
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["user_id"], "U0002");
}

#[tokio::test]
async fn duplicate_email_or_phone_conflicts() {
    let app = TestApp::spawn().await;

    let body = json!({
        "first_name": "Maria",
        "last_name": "Cruz",
        "email": "maria@example.com",
        "phone": "09170000000"
    });
    app.client
        .post(app.url("/users"))
        .json(&body)
        .send()
        .await
        .unwrap();

    // Same email, different phone.
    let response = app
        .client
        .post(app.url("/users"))
        .json(&json!({
            "first_name": "Impostor",
            "last_name": "Cruz",
            "email": "maria@example.com",
            "phone": "09179999999"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);

    // Same phone, different email.
    let response = app
        .client
        .post(app.url("/users"))
        .json(&json!({
            "first_name": "Impostor",
            "last_name": "Cruz",
            "email": "other@example.com",
            "phone": "09170000000"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 409);
}

#[tokio::test]
async fn profile_update_emits_a_notification() {
    let app = TestApp::spawn().await;

    app.client
        .post(app.url("/users"))
        .json(&json!({
            "first_name": "Maria",
            "last_name": "Cruz",
            "email": "maria@example.com",
            "phone": "09170000000"
        }))
        .send()
        .await
        .unwrap();

    let response = app
        .client
        .post(app.url("/edituser/U0001"))
        .json(&json!({ "name": "Maria R. Cruz", "birthdate": "1990-04-12" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Maria R. Cruz");
    assert_eq!(body["birthdate"], "1990-04-12");

    let notified = app
        .wait_for(|| async {
            let inbox: serde_json::Value = app
                .client
                .get(app.url("/notifications/U0001"))
                .send()
                .await
                .unwrap()
                .json()
                .await
                .unwrap();
            inbox
                .as_array()
                .map(|a| a.iter().any(|n| n["kind"] == "profile_update"))
                .unwrap_or(false)
        })
        .await;
    assert!(notified, "profile_update notification never arrived");
}

#[tokio::test]
async fn unknown_user_is_404() {
    let app = TestApp::spawn().await;
    let response = app
        .client
        .get(app.url("/user/U0404"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}
