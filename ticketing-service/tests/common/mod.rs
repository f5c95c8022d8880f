//! Common test utilities for ticketing-service integration tests.

use secrecy::Secret;
use service_core::config::Config as CommonConfig;
use std::sync::Arc;
use std::sync::Once;
use std::time::Duration;

use ticketing_service::config::{MongoConfig, SmtpConfig, TicketingConfig};
use ticketing_service::models::{Card, Schedule};
use ticketing_service::services::{MockEmailProvider, Stores, TicketSummaryRenderer};
use ticketing_service::startup::Application;

static INIT: Once = Once::new();

/// Initialize tracing for tests (only once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("info,ticketing_service=debug")
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn test_config() -> TicketingConfig {
    TicketingConfig {
        common: CommonConfig { port: 0 },
        log_level: "debug".to_string(),
        otlp_endpoint: None,
        mongodb: MongoConfig {
            uri: Secret::new(String::new()),
            database: "ticketing_test".to_string(),
        },
        smtp: SmtpConfig {
            host: "localhost".to_string(),
            port: 587,
            user: String::new(),
            password: Secret::new(String::new()),
            from_email: "noreply@example.com".to_string(),
            from_name: "Ferry Ticketing".to_string(),
            enabled: false,
        },
    }
}

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    pub stores: Stores,
    pub email: Arc<MockEmailProvider>,
}

impl TestApp {
    /// Spawn the application on a random port with in-memory stores and the
    /// recording email provider.
    pub async fn spawn() -> Self {
        init_tracing();

        let stores = Stores::in_memory();
        let email = Arc::new(MockEmailProvider::new(true));

        let app = Application::with_components(
            test_config(),
            None,
            stores.clone(),
            email.clone(),
            Arc::new(TicketSummaryRenderer),
        )
        .await
        .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint.
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }

        TestApp {
            address,
            client,
            stores,
            email,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Seed a card with a given balance directly through the store handle.
    pub async fn seed_card(&self, user_id: &str, balance: &str) {
        let mut card = Card::new(
            user_id.to_string(),
            format!("4000-{}", user_id),
            "regular".to_string(),
        );
        card.balance = balance.parse().expect("valid balance");
        self.stores
            .ledger
            .create_card(card)
            .await
            .expect("Failed to seed card");
    }

    /// Seed a sailing schedule with zeroed counters.
    pub async fn seed_schedule(&self, schedcde: &str) {
        self.stores
            .capacity
            .upsert_schedule(Schedule {
                schedcde: schedcde.to_string(),
                departure_location: "Lucena".to_string(),
                arrival_location: "Marinduque".to_string(),
                depart_date: "2025-06-01".to_string(),
                depart_time: "08:00".to_string(),
                arrive_date: "2025-06-01".to_string(),
                arrive_time: "11:30".to_string(),
                shipping_line: "Starhorse".to_string(),
                passenger_capacity: 400,
                vehicle_capacity: 60,
                passenger_booked: 0,
                vehicle_booked: 0,
            })
            .await
            .expect("Failed to seed schedule");
    }

    /// Poll until `check` returns true or the deadline passes.
    pub async fn wait_for<F, Fut>(&self, mut check: F) -> bool
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = bool>,
    {
        for _ in 0..100 {
            if check().await {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

/// A purchase request body with two passengers and no vehicle.
pub fn purchase_body(user_id: &str, reference: &str, fare: &str, schedcde: &str) -> serde_json::Value {
    serde_json::json!({
        "user_id": user_id,
        "email": "traveler@example.com",
        "passengers": [
            { "name": "Maria Cruz", "contact": "09170000000" },
            { "name": "Jose Cruz", "contact": "09170000001" }
        ],
        "vehicle_detail": [],
        "departure_location": "Lucena",
        "arrival_location": "Marinduque",
        "depart_date": "2025-06-01",
        "depart_time": "08:00",
        "arrive_date": "2025-06-01",
        "arrive_time": "11:30",
        "shipping_line": "Starhorse",
        "has_vehicle": false,
        "card_type": "regular",
        "booking_reference": reference,
        "total_fare": fare,
        "schedcde": schedcde
    })
}
