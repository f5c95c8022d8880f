use service_core::observability::init_tracing;
use ticketing_service::config::TicketingConfig;
use ticketing_service::services::init_metrics;
use ticketing_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = TicketingConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        "ticketing-service",
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );
    init_metrics();

    let app = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    app.run_until_stopped().await
}
