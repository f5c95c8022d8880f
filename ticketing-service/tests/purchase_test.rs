//! E-ticket purchase integration tests.

mod common;

use common::{purchase_body, TestApp};

#[tokio::test]
async fn purchase_succeeds_and_debits_the_card() {
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "500.00").await;
    app.seed_schedule("SCH-1").await;

    let response = app
        .client
        .post(app.url("/eticket"))
        .json(&purchase_body("U0001", "BK-2025-0001", "500.00", "SCH-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "eTicket created successfully");
    assert_eq!(body["booking_reference"], "BK-2025-0001");
    assert!(body["eticket_id"].as_str().is_some());

    // Balance drained to exactly zero, serialized with cents.
    let card: serde_json::Value = app
        .client
        .get(app.url("/card/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(card["balance"], "0.00");

    // Exactly one e-ticket exists under the reference.
    let ticket: serde_json::Value = app
        .client
        .get(app.url("/eticket/BK-2025-0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ticket["status"], "active");
    assert_eq!(ticket["total_fare"], "500.00");

    // Passenger counter incremented by the passenger count.
    let schedules: serde_json::Value = app
        .client
        .get(app.url("/schedule"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(schedules[0]["passenger_booked"], 2);
    assert_eq!(schedules[0]["vehicle_booked"], 0);

    // Dashboard projection written alongside.
    let bookings: serde_json::Value = app
        .client
        .get(app.url("/actbooking/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bookings.as_array().unwrap().len(), 1);
    assert_eq!(bookings[0]["booking_id"], "BK-2025-0001");
    assert_eq!(bookings[0]["passengers"], 2);
    assert_eq!(bookings[0]["is_paid"], true);

    // Purchase ledger entry appended.
    let history: serde_json::Value = app
        .client
        .get(app.url("/card-history/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["kind"], "purchase");
    assert_eq!(history[0]["payment"], "500.00");

    // Notification and ticket email land asynchronously.
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
            count["unread_count"] == 1 && app.email.send_count() == 1
        })
        .await;
    assert!(notified, "booking notification and email never arrived");

    let sent = app.email.sent_messages();
    assert_eq!(sent[0].to, "traveler@example.com");
    assert!(sent[0].attachment.is_some());
}

#[tokio::test]
async fn insufficient_funds_returns_402_and_changes_nothing() {
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "100.00").await;
    app.seed_schedule("SCH-1").await;

    let response = app
        .client
        .post(app.url("/eticket"))
        .json(&purchase_body("U0001", "BK-1", "150.00", "SCH-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 402);

    let card: serde_json::Value = app
        .client
        .get(app.url("/card/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(card["balance"], "100.00");

    assert_eq!(
        app.client
            .get(app.url("/eticket/BK-1"))
            .send()
            .await
            .unwrap()
            .status(),
        404
    );

    let schedules: serde_json::Value = app
        .client
        .get(app.url("/schedule"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(schedules[0]["passenger_booked"], 0);

    let bookings: serde_json::Value = app
        .client
        .get(app.url("/actbooking/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(bookings.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn purchase_without_an_active_card_returns_404() {
    let app = TestApp::spawn().await;
    app.seed_schedule("SCH-1").await;

    let response = app
        .client
        .post(app.url("/eticket"))
        .json(&purchase_body("U0404", "BK-1", "100.00", "SCH-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn purchase_validation_rejects_bad_requests() {
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "500.00").await;
    app.seed_schedule("SCH-1").await;

    // No passengers.
    let mut body = purchase_body("U0001", "BK-1", "100.00", "SCH-1");
    body["passengers"] = serde_json::json!([]);
    let response = app
        .client
        .post(app.url("/eticket"))
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 422);

    // Non-positive fare.
    let response = app
        .client
        .post(app.url("/eticket"))
        .json(&purchase_body("U0001", "BK-1", "0", "SCH-1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);

    // Nothing was charged along the way.
    let card: serde_json::Value = app
        .client
        .get(app.url("/card/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(card["balance"], "500.00");
}

#[tokio::test]
async fn concurrent_purchases_on_one_card_cannot_overspend() {
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "500.00").await;
    app.seed_schedule("SCH-1").await;

    let first = app
        .client
        .post(app.url("/eticket"))
        .json(&purchase_body("U0001", "BK-A", "300.00", "SCH-1"));
    let second = app
        .client
        .post(app.url("/eticket"))
        .json(&purchase_body("U0001", "BK-B", "300.00", "SCH-1"));

    let (ra, rb) = tokio::join!(first.send(), second.send());
    let statuses = [ra.unwrap().status(), rb.unwrap().status()];

    let successes = statuses.iter().filter(|s| s.as_u16() == 200).count();
    let rejections = statuses.iter().filter(|s| s.as_u16() == 402).count();
    assert_eq!(successes, 1, "only one 300.00 purchase fits in 500.00");
    assert_eq!(rejections, 1);

    let card: serde_json::Value = app
        .client
        .get(app.url("/card/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(card["balance"], "200.00");
}

#[tokio::test]
async fn duplicate_submission_double_debits_and_double_books() {
    // No idempotency key is accepted: a client retry of the same purchase
    // charges and books twice. This pins the current behavior.
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "1000.00").await;
    app.seed_schedule("SCH-1").await;

    for _ in 0..2 {
        let response = app
            .client
            .post(app.url("/eticket"))
            .json(&purchase_body("U0001", "BK-DUP", "500.00", "SCH-1"))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
    }

    let card: serde_json::Value = app
        .client
        .get(app.url("/card/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(card["balance"], "0.00");

    let bookings: serde_json::Value = app
        .client
        .get(app.url("/actbooking/U0001"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(bookings.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn concurrent_bookings_accumulate_schedule_counters_exactly() {
    let app = TestApp::spawn().await;
    app.seed_schedule("SCH-1").await;

    // Five users, each booking two passengers concurrently.
    for i in 0..5 {
        app.seed_card(&format!("U000{}", i), "1000.00").await;
    }

    let mut requests = Vec::new();
    for i in 0..5 {
        let request = app
            .client
            .post(app.url("/eticket"))
            .json(&purchase_body(
                &format!("U000{}", i),
                &format!("BK-{}", i),
                "250.00",
                "SCH-1",
            ));
        requests.push(request.send());
    }
    for response in futures::future::join_all(requests).await {
        assert_eq!(response.unwrap().status(), 200);
    }

    let schedules: serde_json::Value = app
        .client
        .get(app.url("/schedule"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(schedules[0]["passenger_booked"], 10);
}

#[tokio::test]
async fn manifest_lists_bookings_for_the_sailing() {
    let app = TestApp::spawn().await;
    app.seed_card("U0001", "1000.00").await;
    app.seed_schedule("SCH-1").await;

    app.client
        .post(app.url("/eticket"))
        .json(&purchase_body("U0001", "BK-1", "400.00", "SCH-1"))
        .send()
        .await
        .unwrap();

    let manifest: serde_json::Value = app
        .client
        .get(app.url("/schedule/SCH-1/manifest"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(manifest.as_array().unwrap().len(), 1);
    assert_eq!(manifest[0]["booking_id"], "BK-1");

    assert_eq!(
        app.client
            .get(app.url("/schedule/NOPE/manifest"))
            .send()
            .await
            .unwrap()
            .status(),
        404
    );
}
