//! Prometheus metrics for ticketing-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram_vec, CounterVec, HistogramVec, TextEncoder,
};

/// Ticket issuance counter by outcome.
pub static TICKETS_ISSUED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ticketing_tickets_issued_total",
        "Total number of ticket purchase attempts",
        &["status"] // ok, card_not_found, insufficient_funds, error
    )
    .expect("Failed to register tickets_issued_total")
});

/// Card load counter by outcome.
pub static CARD_LOADS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ticketing_card_loads_total",
        "Total number of card load attempts",
        &["status"] // ok, card_not_found, error
    )
    .expect("Failed to register card_loads_total")
});

/// Notification writer outcomes.
pub static NOTIFICATIONS_EMITTED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ticketing_notifications_emitted_total",
        "Total number of notifications drained from the emit channel",
        &["status"] // written, failed
    )
    .expect("Failed to register notifications_emitted_total")
});

/// Ticket email delivery outcomes.
pub static EMAILS_SENT_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "ticketing_emails_sent_total",
        "Total number of ticket email delivery attempts",
        &["status"] // ok, failed
    )
    .expect("Failed to register emails_sent_total")
});

/// Database query duration histogram.
pub static DB_QUERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "ticketing_db_query_duration_seconds",
        "Database query duration in seconds",
        &["operation"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .expect("Failed to register db_query_duration")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&TICKETS_ISSUED_TOTAL);
    Lazy::force(&CARD_LOADS_TOTAL);
    Lazy::force(&NOTIFICATIONS_EMITTED_TOTAL);
    Lazy::force(&EMAILS_SENT_TOTAL);
    Lazy::force(&DB_QUERY_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
