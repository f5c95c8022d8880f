use mongodb::{
    bson::doc,
    options::{ClientOptions, IndexOptions},
    Client as MongoClient, Collection, Database, IndexModel,
};
use service_core::error::AppError;

use crate::models::{
    ActiveBooking, Announcement, Card, Eticket, LedgerEntry, Notification, Schedule, User,
};

#[derive(Clone)]
pub struct TicketingDb {
    client: MongoClient,
    db: Database,
}

impl TicketingDb {
    pub async fn connect(uri: &str, database: &str) -> Result<Self, AppError> {
        tracing::info!(database = %database, "Connecting to MongoDB");
        let mut client_options = ClientOptions::parse(uri).await.map_err(|e| {
            tracing::error!("Failed to parse MongoDB connection string: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        client_options.app_name = Some("ticketing-service".to_string());

        let client = MongoClient::with_options(client_options).map_err(|e| {
            tracing::error!("Failed to create MongoDB client: {}", e);
            AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
        })?;
        let db = client.database(database);
        tracing::info!(database = %database, "MongoDB client initialized");
        Ok(Self { client, db })
    }

    pub async fn initialize_indexes(&self) -> Result<(), AppError> {
        tracing::info!("Creating MongoDB indexes for ticketing-service");

        // One card per user, globally unique card numbers.
        let user_idx = IndexModel::builder()
            .keys(doc! { "user_id": 1 })
            .options(
                IndexOptions::builder()
                    .name("card_user_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        let number_idx = IndexModel::builder()
            .keys(doc! { "card_number": 1 })
            .options(
                IndexOptions::builder()
                    .name("card_number_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.cards()
            .create_indexes([user_idx, number_idx], None)
            .await
            .map_err(index_err("card"))?;

        let history_idx = IndexModel::builder()
            .keys(doc! { "user_id": 1, "date_transaction": -1 })
            .options(
                IndexOptions::builder()
                    .name("history_user_date_idx".to_string())
                    .build(),
            )
            .build();
        self.card_history()
            .create_index(history_idx, None)
            .await
            .map_err(index_err("card history"))?;

        let sched_idx = IndexModel::builder()
            .keys(doc! { "schedcde": 1 })
            .options(
                IndexOptions::builder()
                    .name("schedule_code_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.schedules()
            .create_index(sched_idx, None)
            .await
            .map_err(index_err("schedule"))?;

        let eticket_user_idx = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_utc": -1 })
            .options(
                IndexOptions::builder()
                    .name("eticket_user_idx".to_string())
                    .build(),
            )
            .build();
        let eticket_ref_idx = IndexModel::builder()
            .keys(doc! { "booking_reference": 1 })
            .options(
                IndexOptions::builder()
                    .name("eticket_reference_idx".to_string())
                    .build(),
            )
            .build();
        self.etickets()
            .create_indexes([eticket_user_idx, eticket_ref_idx], None)
            .await
            .map_err(index_err("eticket"))?;

        let booking_user_idx = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_utc": -1 })
            .options(
                IndexOptions::builder()
                    .name("booking_user_idx".to_string())
                    .build(),
            )
            .build();
        let booking_sailing_idx = IndexModel::builder()
            .keys(doc! { "shipping_line": 1, "depart_date": 1 })
            .options(
                IndexOptions::builder()
                    .name("booking_sailing_idx".to_string())
                    .build(),
            )
            .build();
        self.active_bookings()
            .create_indexes([booking_user_idx, booking_sailing_idx], None)
            .await
            .map_err(index_err("active booking"))?;

        let notif_user_idx = IndexModel::builder()
            .keys(doc! { "user_id": 1, "created_utc": -1 })
            .options(
                IndexOptions::builder()
                    .name("notification_user_idx".to_string())
                    .build(),
            )
            .build();
        let notif_unread_idx = IndexModel::builder()
            .keys(doc! { "user_id": 1, "is_read": 1 })
            .options(
                IndexOptions::builder()
                    .name("notification_unread_idx".to_string())
                    .build(),
            )
            .build();
        self.notifications()
            .create_indexes([notif_user_idx, notif_unread_idx], None)
            .await
            .map_err(index_err("notification"))?;

        let user_email_idx = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_email_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        let user_phone_idx = IndexModel::builder()
            .keys(doc! { "phone": 1 })
            .options(
                IndexOptions::builder()
                    .name("user_phone_idx".to_string())
                    .unique(true)
                    .build(),
            )
            .build();
        self.users()
            .create_indexes([user_email_idx, user_phone_idx], None)
            .await
            .map_err(index_err("user"))?;

        tracing::info!("Successfully created all MongoDB indexes");
        Ok(())
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.client
            .database("admin")
            .run_command(doc! { "ping": 1 }, None)
            .await
            .map_err(|e| {
                tracing::error!("MongoDB health check failed: {}", e);
                AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
            })?;
        Ok(())
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn cards(&self) -> Collection<Card> {
        self.db.collection("cards")
    }

    pub fn card_history(&self) -> Collection<LedgerEntry> {
        self.db.collection("card_history")
    }

    pub fn schedules(&self) -> Collection<Schedule> {
        self.db.collection("schedules")
    }

    pub fn etickets(&self) -> Collection<Eticket> {
        self.db.collection("etickets")
    }

    pub fn active_bookings(&self) -> Collection<ActiveBooking> {
        self.db.collection("active_bookings")
    }

    pub fn notifications(&self) -> Collection<Notification> {
        self.db.collection("notifications")
    }

    pub fn users(&self) -> Collection<User> {
        self.db.collection("users")
    }

    pub fn announcements(&self) -> Collection<Announcement> {
        self.db.collection("announcements")
    }
}

fn index_err(what: &'static str) -> impl Fn(mongodb::error::Error) -> AppError {
    move |e| {
        tracing::error!("Failed to create {} indexes: {}", what, e);
        AppError::DatabaseError(anyhow::anyhow!(e.to_string()))
    }
}
