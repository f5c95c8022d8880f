//! Persistence contracts for the platform's stores.
//!
//! Each store is a trait so the backing implementation is an explicitly
//! constructed, passed-in handle: MongoDB in production, in-memory when no
//! database is configured and in the test harness.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::sync::Arc;

use crate::models::{
    ActiveBooking, Announcement, AnnouncementPriority, AnnouncementStatus, Card, CardUpdate,
    Eticket, LedgerEntry, Notification, Schedule, User,
};
use crate::services::database::TicketingDb;

pub use memory::{
    InMemoryAnnouncementStore, InMemoryBookingStore, InMemoryCapacityStore, InMemoryLedgerStore,
    InMemoryNotificationStore, InMemoryUserStore,
};
pub use mongo::{
    MongoAnnouncementStore, MongoBookingStore, MongoCapacityStore, MongoLedgerStore,
    MongoNotificationStore, MongoUserStore,
};

/// Profile fields accepted by user creation; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub birthdate: Option<String>,
}

/// Partial profile update.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birthdate: Option<String>,
}

impl UserUpdate {
    pub fn updated_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.email.is_some() {
            fields.push("email");
        }
        if self.phone.is_some() {
            fields.push("phone");
        }
        if self.birthdate.is_some() {
            fields.push("birthdate");
        }
        fields
    }
}

/// Card balances and the append-only transaction history.
///
/// Credit and debit are read-modify-write against the persisted balance and
/// must serialize concurrent mutations of the same card: two in-flight
/// mutations must never both observe a stale balance.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Create a card; `Conflict` when the user already holds one or the card
    /// number is taken.
    async fn create_card(&self, card: Card) -> Result<Card, AppError>;

    async fn get_card(&self, user_id: &str) -> Result<Option<Card>, AppError>;

    async fn update_card(&self, card_number: &str, update: CardUpdate) -> Result<Card, AppError>;

    /// Add to the balance; `NotFound` when the user has no card.
    async fn credit(&self, user_id: &str, amount: Decimal) -> Result<Card, AppError>;

    /// Subtract from the balance of the user's active card. `NotFound` when
    /// no active card exists (checked before the balance),
    /// `InsufficientFunds` when the balance is below `amount`. A committed
    /// debit never leaves the balance negative.
    async fn debit(&self, user_id: &str, amount: Decimal) -> Result<Card, AppError>;

    async fn append_history(&self, entry: &LedgerEntry) -> Result<(), AppError>;

    /// Entries for a user, newest first.
    async fn history_for_user(&self, user_id: &str) -> Result<Vec<LedgerEntry>, AppError>;
}

/// Per-schedule booked-passenger/vehicle counters.
#[async_trait]
pub trait CapacityStore: Send + Sync {
    /// Atomic increment; no upper bound is enforced here.
    async fn increment_booked(
        &self,
        schedcde: &str,
        passenger_delta: i32,
        vehicle_delta: i32,
    ) -> Result<(), AppError>;

    async fn list_schedules(&self) -> Result<Vec<Schedule>, AppError>;

    async fn get_schedule(&self, schedcde: &str) -> Result<Option<Schedule>, AppError>;

    /// Seed/ops path: insert or replace a schedule by its code.
    async fn upsert_schedule(&self, schedule: Schedule) -> Result<(), AppError>;
}

/// Canonical e-ticket records plus the denormalized dashboard projection.
/// No uniqueness constraint on booking references; callers generate
/// collision-resistant ones.
#[async_trait]
pub trait BookingStore: Send + Sync {
    async fn create_eticket(&self, ticket: &Eticket) -> Result<String, AppError>;

    async fn create_active_booking(&self, booking: &ActiveBooking) -> Result<String, AppError>;

    async fn eticket_by_reference(&self, reference: &str) -> Result<Option<Eticket>, AppError>;

    async fn etickets_for_user(&self, user_id: &str) -> Result<Vec<Eticket>, AppError>;

    async fn active_bookings_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ActiveBooking>, AppError>;

    /// Sailing manifest: bookings for a line on a given departure date.
    async fn bookings_for_schedule(
        &self,
        shipping_line: &str,
        depart_date: &str,
    ) -> Result<Vec<ActiveBooking>, AppError>;
}

/// Notification records keyed by user.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn insert(&self, notification: &Notification) -> Result<(), AppError>;

    /// Newest first; `archived` selects the archive instead of the inbox.
    async fn list_for_user(
        &self,
        user_id: &str,
        archived: bool,
    ) -> Result<Vec<Notification>, AppError>;

    async fn mark_read(
        &self,
        notification_id: &str,
        user_id: &str,
    ) -> Result<Notification, AppError>;

    async fn archive(&self, notification_id: &str, user_id: &str)
        -> Result<Notification, AppError>;

    async fn delete(&self, notification_id: &str, user_id: &str) -> Result<(), AppError>;

    async fn unread_count(&self, user_id: &str) -> Result<u64, AppError>;
}

/// User profiles.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Assigns the next sequential user id; `Conflict` on duplicate email or
    /// phone.
    async fn create(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn get(&self, user_id: &str) -> Result<Option<User>, AppError>;

    async fn update(&self, user_id: &str, changes: UserUpdate) -> Result<User, AppError>;
}

/// Platform announcements.
#[async_trait]
pub trait AnnouncementStore: Send + Sync {
    async fn create(&self, announcement: &Announcement) -> Result<(), AppError>;

    /// Sent, active, unexpired announcements visible to the user, highest
    /// priority first.
    async fn active_for_user(
        &self,
        user_id: &str,
        kind: Option<&str>,
        priority: Option<AnnouncementPriority>,
    ) -> Result<Vec<Announcement>, AppError>;

    async fn mark_read(
        &self,
        announcement_id: &str,
        user_id: &str,
    ) -> Result<Announcement, AppError>;

    async fn set_status(
        &self,
        announcement_id: &str,
        status: AnnouncementStatus,
        is_active: bool,
    ) -> Result<Announcement, AppError>;
}

/// The full set of store handles wired into the application state.
#[derive(Clone)]
pub struct Stores {
    pub ledger: Arc<dyn LedgerStore>,
    pub capacity: Arc<dyn CapacityStore>,
    pub bookings: Arc<dyn BookingStore>,
    pub notifications: Arc<dyn NotificationStore>,
    pub users: Arc<dyn UserStore>,
    pub announcements: Arc<dyn AnnouncementStore>,
}

impl Stores {
    pub fn mongo(db: &TicketingDb) -> Self {
        Self {
            ledger: Arc::new(MongoLedgerStore::new(db)),
            capacity: Arc::new(MongoCapacityStore::new(db)),
            bookings: Arc::new(MongoBookingStore::new(db)),
            notifications: Arc::new(MongoNotificationStore::new(db)),
            users: Arc::new(MongoUserStore::new(db)),
            announcements: Arc::new(MongoAnnouncementStore::new(db)),
        }
    }

    pub fn in_memory() -> Self {
        Self {
            ledger: Arc::new(InMemoryLedgerStore::default()),
            capacity: Arc::new(InMemoryCapacityStore::default()),
            bookings: Arc::new(InMemoryBookingStore::default()),
            notifications: Arc::new(InMemoryNotificationStore::default()),
            users: Arc::new(InMemoryUserStore::default()),
            announcements: Arc::new(InMemoryAnnouncementStore::default()),
        }
    }
}
