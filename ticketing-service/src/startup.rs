//! Application startup and lifecycle management.

use axum::{
    routing::{get, post, put},
    Router,
};
use secrecy::ExposeSecret;
use service_core::error::AppError;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::TicketingConfig;
use crate::handlers;
use crate::services::{
    delivery::RetryConfig, EmailDelivery, EmailProvider, MockEmailProvider, NotificationEmitter,
    SmtpProvider, Stores, TicketIssuer, TicketRenderer, TicketSummaryRenderer, TicketingDb,
};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: TicketingConfig,
    /// Absent when the service runs on in-memory stores.
    pub db: Option<TicketingDb>,
    pub stores: Stores,
    pub notifier: NotificationEmitter,
    pub issuer: TicketIssuer,
}

/// Application container for managing server lifecycle.
pub struct Application {
    port: u16,
    listener: TcpListener,
    state: AppState,
}

impl Application {
    /// Build the application with the given configuration: MongoDB stores
    /// when a URI is configured, in-memory stores otherwise; SMTP email when
    /// enabled, the recording mock otherwise.
    pub async fn build(config: TicketingConfig) -> Result<Self, AppError> {
        let (db, stores) = if config.mongodb.uri.expose_secret().is_empty() {
            tracing::warn!("MONGODB_URI not set; using in-memory stores");
            (None, Stores::in_memory())
        } else {
            let db = TicketingDb::connect(
                config.mongodb.uri.expose_secret(),
                &config.mongodb.database,
            )
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;
            db.initialize_indexes().await.map_err(|e| {
                tracing::error!("Failed to initialize database indexes: {}", e);
                e
            })?;
            let stores = Stores::mongo(&db);
            (Some(db), stores)
        };

        let email_provider: Arc<dyn EmailProvider> = if config.smtp.enabled {
            match SmtpProvider::new(config.smtp.clone()) {
                Ok(provider) => {
                    tracing::info!("SMTP email provider initialized");
                    Arc::new(provider)
                }
                Err(e) => {
                    tracing::warn!("Failed to initialize SMTP provider: {}. Using mock.", e);
                    Arc::new(MockEmailProvider::new(true))
                }
            }
        } else {
            tracing::info!("SMTP provider disabled, using mock email provider");
            Arc::new(MockEmailProvider::new(true))
        };

        Self::with_components(
            config,
            db,
            stores,
            email_provider,
            Arc::new(TicketSummaryRenderer),
        )
        .await
    }

    /// Wire explicitly constructed components. The test harness uses this to
    /// inject in-memory stores and the recording email provider.
    pub async fn with_components(
        config: TicketingConfig,
        db: Option<TicketingDb>,
        stores: Stores,
        email_provider: Arc<dyn EmailProvider>,
        renderer: Arc<dyn TicketRenderer>,
    ) -> Result<Self, AppError> {
        let notifier = NotificationEmitter::spawn(stores.notifications.clone());
        let issuer = TicketIssuer::new(
            stores.ledger.clone(),
            stores.capacity.clone(),
            stores.bookings.clone(),
            notifier.clone(),
            EmailDelivery::new(email_provider, RetryConfig::default()),
            renderer,
        );

        let state = AppState {
            config: config.clone(),
            db,
            stores,
            notifier,
            issuer,
        };

        // Port 0 binds a random port for testing.
        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Ticketing service listening on port {}", port);

        Ok(Self {
            port,
            listener,
            state,
        })
    }

    /// Get the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Get the application state (store handles included) for test seeding.
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Run the application until stopped.
    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        let app = router(self.state);
        axum::serve(self.listener, app).await
    }
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ready", get(handlers::readiness_check))
        .route("/metrics", get(handlers::metrics_endpoint))
        .route("/card", post(handlers::create_card))
        // GET is addressed by user id, PUT by card number.
        .route("/card/:id", get(handlers::get_card).put(handlers::update_card))
        .route("/buyload/:user_id", post(handlers::buy_load))
        .route("/card-history/:user_id", get(handlers::card_history))
        .route("/eticket", post(handlers::purchase_eticket))
        .route("/eticket/:reference", get(handlers::get_eticket))
        .route("/schedule", get(handlers::list_schedules))
        .route(
            "/schedule/:schedcde/manifest",
            get(handlers::schedule_manifest),
        )
        .route("/actbooking/:user_id", get(handlers::active_bookings))
        .route("/notifications", post(handlers::create_notification))
        .route(
            "/notifications/:id",
            get(handlers::list_notifications).delete(handlers::delete_notification),
        )
        .route(
            "/notifications/:id/archived",
            get(handlers::archived_notifications),
        )
        .route(
            "/notifications/:id/unread-count",
            get(handlers::unread_count),
        )
        .route(
            "/notifications/:id/read",
            put(handlers::mark_notification_read),
        )
        .route(
            "/notifications/:id/archive",
            put(handlers::archive_notification),
        )
        .route("/users", post(handlers::create_user))
        .route("/user/:user_id", get(handlers::get_user))
        .route("/edituser/:user_id", post(handlers::edit_user))
        .route("/announcements", post(handlers::create_announcement))
        .route("/announcements/:id", get(handlers::list_announcements))
        .route(
            "/announcements/:id/read",
            put(handlers::mark_announcement_read),
        )
        .route(
            "/announcements/:id/status",
            put(handlers::update_announcement_status),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
