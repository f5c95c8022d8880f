//! MongoDB-backed store implementations.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, DateTime as BsonDateTime},
    error::{ErrorKind, WriteFailure},
    options::{FindOneAndUpdateOptions, FindOptions, ReplaceOptions, ReturnDocument},
    Collection,
};
use rust_decimal::Decimal;
use service_core::error::AppError;
use tracing::instrument;

use crate::models::{
    money::round2, ActiveBooking, Announcement, AnnouncementPriority, AnnouncementStatus, Card,
    CardStatus, CardUpdate, Eticket, LedgerEntry, Notification, Schedule, User,
};
use crate::services::database::TicketingDb;
use crate::services::metrics::DB_QUERY_DURATION;
use crate::services::stores::{
    AnnouncementStore, BookingStore, CapacityStore, LedgerStore, NewUser, NotificationStore,
    UserStore, UserUpdate,
};

/// Attempts before a compare-and-set balance mutation gives up.
const BALANCE_CAS_RETRIES: u32 = 5;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::Write(WriteFailure::WriteError(ref write_err)) if write_err.code == 11000
    )
}

fn db_err(context: &'static str) -> impl Fn(mongodb::error::Error) -> AppError {
    move |e| {
        tracing::error!("{}: {}", context, e);
        AppError::DatabaseError(anyhow::anyhow!("{}: {}", context, e))
    }
}

// -----------------------------------------------------------------------------
// Ledger
// -----------------------------------------------------------------------------

#[derive(Clone)]
pub struct MongoLedgerStore {
    cards: Collection<Card>,
    history: Collection<LedgerEntry>,
}

impl MongoLedgerStore {
    pub fn new(db: &TicketingDb) -> Self {
        Self {
            cards: db.cards(),
            history: db.card_history(),
        }
    }

    /// Apply a balance delta with a compare-and-set on the stored balance.
    /// The filter pins the balance the mutation was computed from, so two
    /// concurrent mutations of the same card can never both win; the loser
    /// re-reads and retries.
    async fn mutate_balance(
        &self,
        user_id: &str,
        amount: Decimal,
        is_debit: bool,
    ) -> Result<Card, AppError> {
        let amount = round2(amount);

        for _ in 0..BALANCE_CAS_RETRIES {
            let mut filter = doc! { "user_id": user_id };
            if is_debit {
                filter.insert("status", CardStatus::Active.as_str());
            }

            let card = self
                .cards
                .find_one(filter.clone(), None)
                .await
                .map_err(db_err("Failed to read card"))?
                .ok_or_else(|| {
                    if is_debit {
                        AppError::NotFound(anyhow::anyhow!("Active card not found"))
                    } else {
                        AppError::NotFound(anyhow::anyhow!("Card not found"))
                    }
                })?;

            if is_debit && card.balance < amount {
                return Err(AppError::InsufficientFunds(anyhow::anyhow!(
                    "Card balance {} is below {}",
                    card.balance,
                    amount
                )));
            }

            let new_balance = if is_debit {
                round2(card.balance - amount)
            } else {
                round2(card.balance + amount)
            };

            filter.insert("balance", card.balance.to_string());
            let updated = self
                .cards
                .find_one_and_update(
                    filter,
                    doc! {
                        "$set": {
                            "balance": new_balance.to_string(),
                            "last_active": BsonDateTime::now(),
                        }
                    },
                    FindOneAndUpdateOptions::builder()
                        .return_document(ReturnDocument::After)
                        .build(),
                )
                .await
                .map_err(db_err("Failed to update card balance"))?;

            if let Some(card) = updated {
                return Ok(card);
            }
            // Another writer advanced the balance first; re-read and retry.
        }

        Err(AppError::Conflict(anyhow::anyhow!(
            "Card for user {} is under concurrent mutation",
            user_id
        )))
    }
}

#[async_trait]
impl LedgerStore for MongoLedgerStore {
    #[instrument(skip(self, card), fields(user_id = %card.user_id))]
    async fn create_card(&self, card: Card) -> Result<Card, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_card"])
            .start_timer();

        self.cards.insert_one(&card, None).await.map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::Conflict(anyhow::anyhow!(
                    "User {} already has a card or the card number is in use",
                    card.user_id
                ))
            } else {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create card: {}", e))
            }
        })?;

        timer.observe_duration();
        tracing::info!(user_id = %card.user_id, card_type = %card.card_type, "Card created");
        Ok(card)
    }

    #[instrument(skip(self))]
    async fn get_card(&self, user_id: &str) -> Result<Option<Card>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_card"])
            .start_timer();
        let card = self
            .cards
            .find_one(doc! { "user_id": user_id }, None)
            .await
            .map_err(db_err("Failed to get card"))?;
        timer.observe_duration();
        Ok(card)
    }

    #[instrument(skip(self, update))]
    async fn update_card(&self, card_number: &str, update: CardUpdate) -> Result<Card, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_card"])
            .start_timer();

        let mut set = doc! { "last_active": BsonDateTime::now() };
        if let Some(card_type) = &update.card_type {
            set.insert("card_type", card_type);
        }
        if let Some(status) = update.status {
            set.insert("status", status.as_str());
        }

        let card = self
            .cards
            .find_one_and_update(
                doc! { "card_number": card_number },
                doc! { "$set": set },
                FindOneAndUpdateOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build(),
            )
            .await
            .map_err(db_err("Failed to update card"))?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Card not found")))?;

        timer.observe_duration();
        Ok(card)
    }

    #[instrument(skip(self))]
    async fn credit(&self, user_id: &str, amount: Decimal) -> Result<Card, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["credit_card"])
            .start_timer();
        let card = self.mutate_balance(user_id, amount, false).await?;
        timer.observe_duration();
        Ok(card)
    }

    #[instrument(skip(self))]
    async fn debit(&self, user_id: &str, amount: Decimal) -> Result<Card, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["debit_card"])
            .start_timer();
        let card = self.mutate_balance(user_id, amount, true).await?;
        timer.observe_duration();
        Ok(card)
    }

    #[instrument(skip(self, entry), fields(user_id = %entry.user_id, kind = %entry.kind))]
    async fn append_history(&self, entry: &LedgerEntry) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["append_history"])
            .start_timer();
        self.history
            .insert_one(entry, None)
            .await
            .map_err(db_err("Failed to append history entry"))?;
        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self))]
    async fn history_for_user(&self, user_id: &str) -> Result<Vec<LedgerEntry>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["history_for_user"])
            .start_timer();
        let options = FindOptions::builder()
            .sort(doc! { "date_transaction": -1 })
            .build();
        let cursor = self
            .history
            .find(doc! { "user_id": user_id }, options)
            .await
            .map_err(db_err("Failed to query history"))?;
        let entries = cursor
            .try_collect()
            .await
            .map_err(db_err("Failed to collect history"))?;
        timer.observe_duration();
        Ok(entries)
    }
}

// -----------------------------------------------------------------------------
// Capacity counters
// -----------------------------------------------------------------------------

#[derive(Clone)]
pub struct MongoCapacityStore {
    schedules: Collection<Schedule>,
}

impl MongoCapacityStore {
    pub fn new(db: &TicketingDb) -> Self {
        Self {
            schedules: db.schedules(),
        }
    }
}

#[async_trait]
impl CapacityStore for MongoCapacityStore {
    #[instrument(skip(self))]
    async fn increment_booked(
        &self,
        schedcde: &str,
        passenger_delta: i32,
        vehicle_delta: i32,
    ) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["increment_booked"])
            .start_timer();

        let result = self
            .schedules
            .update_one(
                doc! { "schedcde": schedcde },
                doc! {
                    "$inc": {
                        "passenger_booked": passenger_delta,
                        "vehicle_booked": vehicle_delta,
                    }
                },
                None,
            )
            .await
            .map_err(db_err("Failed to increment schedule counters"))?;

        timer.observe_duration();

        if result.matched_count == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Schedule {} not found",
                schedcde
            )));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_schedules(&self) -> Result<Vec<Schedule>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_schedules"])
            .start_timer();
        let options = FindOptions::builder().sort(doc! { "schedcde": 1 }).build();
        let cursor = self
            .schedules
            .find(doc! {}, options)
            .await
            .map_err(db_err("Failed to query schedules"))?;
        let schedules = cursor
            .try_collect()
            .await
            .map_err(db_err("Failed to collect schedules"))?;
        timer.observe_duration();
        Ok(schedules)
    }

    #[instrument(skip(self))]
    async fn get_schedule(&self, schedcde: &str) -> Result<Option<Schedule>, AppError> {
        let schedule = self
            .schedules
            .find_one(doc! { "schedcde": schedcde }, None)
            .await
            .map_err(db_err("Failed to get schedule"))?;
        Ok(schedule)
    }

    #[instrument(skip(self, schedule), fields(schedcde = %schedule.schedcde))]
    async fn upsert_schedule(&self, schedule: Schedule) -> Result<(), AppError> {
        self.schedules
            .replace_one(
                doc! { "schedcde": &schedule.schedcde },
                &schedule,
                ReplaceOptions::builder().upsert(true).build(),
            )
            .await
            .map_err(db_err("Failed to upsert schedule"))?;
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Bookings
// -----------------------------------------------------------------------------

#[derive(Clone)]
pub struct MongoBookingStore {
    etickets: Collection<Eticket>,
    active_bookings: Collection<ActiveBooking>,
}

impl MongoBookingStore {
    pub fn new(db: &TicketingDb) -> Self {
        Self {
            etickets: db.etickets(),
            active_bookings: db.active_bookings(),
        }
    }
}

#[async_trait]
impl BookingStore for MongoBookingStore {
    #[instrument(skip(self, ticket), fields(booking_reference = %ticket.booking_reference))]
    async fn create_eticket(&self, ticket: &Eticket) -> Result<String, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_eticket"])
            .start_timer();
        self.etickets
            .insert_one(ticket, None)
            .await
            .map_err(db_err("Failed to create eticket"))?;
        timer.observe_duration();
        Ok(ticket.eticket_id.clone())
    }

    #[instrument(skip(self, booking), fields(booking_id = %booking.booking_id))]
    async fn create_active_booking(&self, booking: &ActiveBooking) -> Result<String, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_active_booking"])
            .start_timer();
        self.active_bookings
            .insert_one(booking, None)
            .await
            .map_err(db_err("Failed to create active booking"))?;
        timer.observe_duration();
        Ok(booking.booking_id.clone())
    }

    #[instrument(skip(self))]
    async fn eticket_by_reference(&self, reference: &str) -> Result<Option<Eticket>, AppError> {
        let ticket = self
            .etickets
            .find_one(doc! { "booking_reference": reference }, None)
            .await
            .map_err(db_err("Failed to get eticket"))?;
        Ok(ticket)
    }

    #[instrument(skip(self))]
    async fn etickets_for_user(&self, user_id: &str) -> Result<Vec<Eticket>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_utc": -1 })
            .build();
        let cursor = self
            .etickets
            .find(doc! { "user_id": user_id }, options)
            .await
            .map_err(db_err("Failed to query etickets"))?;
        let tickets = cursor
            .try_collect()
            .await
            .map_err(db_err("Failed to collect etickets"))?;
        Ok(tickets)
    }

    #[instrument(skip(self))]
    async fn active_bookings_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ActiveBooking>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["active_bookings_for_user"])
            .start_timer();
        let options = FindOptions::builder()
            .sort(doc! { "created_utc": -1 })
            .build();
        let cursor = self
            .active_bookings
            .find(doc! { "user_id": user_id }, options)
            .await
            .map_err(db_err("Failed to query active bookings"))?;
        let bookings = cursor
            .try_collect()
            .await
            .map_err(db_err("Failed to collect active bookings"))?;
        timer.observe_duration();
        Ok(bookings)
    }

    #[instrument(skip(self))]
    async fn bookings_for_schedule(
        &self,
        shipping_line: &str,
        depart_date: &str,
    ) -> Result<Vec<ActiveBooking>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_utc": 1 })
            .build();
        let cursor = self
            .active_bookings
            .find(
                doc! { "shipping_line": shipping_line, "depart_date": depart_date },
                options,
            )
            .await
            .map_err(db_err("Failed to query sailing manifest"))?;
        let bookings = cursor
            .try_collect()
            .await
            .map_err(db_err("Failed to collect sailing manifest"))?;
        Ok(bookings)
    }
}

// -----------------------------------------------------------------------------
// Notifications
// -----------------------------------------------------------------------------

#[derive(Clone)]
pub struct MongoNotificationStore {
    notifications: Collection<Notification>,
}

impl MongoNotificationStore {
    pub fn new(db: &TicketingDb) -> Self {
        Self {
            notifications: db.notifications(),
        }
    }
}

#[async_trait]
impl NotificationStore for MongoNotificationStore {
    #[instrument(skip(self, notification), fields(user_id = %notification.user_id, kind = %notification.kind))]
    async fn insert(&self, notification: &Notification) -> Result<(), AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["insert_notification"])
            .start_timer();
        self.notifications
            .insert_one(notification, None)
            .await
            .map_err(db_err("Failed to insert notification"))?;
        timer.observe_duration();
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_for_user(
        &self,
        user_id: &str,
        archived: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let options = FindOptions::builder()
            .sort(doc! { "created_utc": -1 })
            .limit(100)
            .build();
        let cursor = self
            .notifications
            .find(
                doc! { "user_id": user_id, "is_archived": archived },
                options,
            )
            .await
            .map_err(db_err("Failed to query notifications"))?;
        let notifications = cursor
            .try_collect()
            .await
            .map_err(db_err("Failed to collect notifications"))?;
        Ok(notifications)
    }

    #[instrument(skip(self))]
    async fn mark_read(
        &self,
        notification_id: &str,
        user_id: &str,
    ) -> Result<Notification, AppError> {
        self.notifications
            .find_one_and_update(
                doc! { "notification_id": notification_id, "user_id": user_id },
                doc! { "$set": { "is_read": true } },
                FindOneAndUpdateOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build(),
            )
            .await
            .map_err(db_err("Failed to mark notification read"))?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Notification not found")))
    }

    #[instrument(skip(self))]
    async fn archive(
        &self,
        notification_id: &str,
        user_id: &str,
    ) -> Result<Notification, AppError> {
        self.notifications
            .find_one_and_update(
                doc! { "notification_id": notification_id, "user_id": user_id },
                doc! { "$set": { "is_archived": true } },
                FindOneAndUpdateOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build(),
            )
            .await
            .map_err(db_err("Failed to archive notification"))?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Notification not found")))
    }

    #[instrument(skip(self))]
    async fn delete(&self, notification_id: &str, user_id: &str) -> Result<(), AppError> {
        let result = self
            .notifications
            .delete_one(
                doc! { "notification_id": notification_id, "user_id": user_id },
                None,
            )
            .await
            .map_err(db_err("Failed to delete notification"))?;
        if result.deleted_count == 0 {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Notification not found"
            )));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn unread_count(&self, user_id: &str) -> Result<u64, AppError> {
        let count = self
            .notifications
            .count_documents(
                doc! { "user_id": user_id, "is_read": false, "is_archived": false },
                None,
            )
            .await
            .map_err(db_err("Failed to count unread notifications"))?;
        Ok(count)
    }
}

// -----------------------------------------------------------------------------
// Users
// -----------------------------------------------------------------------------

#[derive(Clone)]
pub struct MongoUserStore {
    users: Collection<User>,
}

impl MongoUserStore {
    pub fn new(db: &TicketingDb) -> Self {
        Self { users: db.users() }
    }
}

#[async_trait]
impl UserStore for MongoUserStore {
    #[instrument(skip(self, new_user), fields(email = %new_user.email))]
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_user"])
            .start_timer();

        let options = FindOptions::builder()
            .sort(doc! { "created_utc": -1 })
            .limit(1)
            .build();
        let mut cursor = self
            .users
            .find(doc! {}, options)
            .await
            .map_err(db_err("Failed to query last user"))?;
        let last = cursor
            .try_next()
            .await
            .map_err(db_err("Failed to read last user"))?;

        let user = User {
            user_id: User::next_user_id(last.as_ref().map(|u| u.user_id.as_str())),
            name: new_user.name,
            email: new_user.email,
            phone: new_user.phone,
            birthdate: new_user.birthdate,
            status: crate::models::UserStatus::Active,
            created_utc: chrono::Utc::now(),
        };

        self.users.insert_one(&user, None).await.map_err(|e| {
            if is_duplicate_key(&e) {
                AppError::Conflict(anyhow::anyhow!("Email or phone number already exists"))
            } else {
                AppError::DatabaseError(anyhow::anyhow!("Failed to create user: {}", e))
            }
        })?;

        timer.observe_duration();
        tracing::info!(user_id = %user.user_id, "User created");
        Ok(user)
    }

    #[instrument(skip(self))]
    async fn get(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let user = self
            .users
            .find_one(doc! { "user_id": user_id }, None)
            .await
            .map_err(db_err("Failed to get user"))?;
        Ok(user)
    }

    #[instrument(skip(self, changes))]
    async fn update(&self, user_id: &str, changes: UserUpdate) -> Result<User, AppError> {
        let mut set = doc! {};
        if let Some(name) = &changes.name {
            set.insert("name", name);
        }
        if let Some(email) = &changes.email {
            set.insert("email", email);
        }
        if let Some(phone) = &changes.phone {
            set.insert("phone", phone);
        }
        if let Some(birthdate) = &changes.birthdate {
            set.insert("birthdate", birthdate);
        }
        if set.is_empty() {
            return self
                .get(user_id)
                .await?
                .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")));
        }

        self.users
            .find_one_and_update(
                doc! { "user_id": user_id },
                doc! { "$set": set },
                FindOneAndUpdateOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build(),
            )
            .await
            .map_err(|e| {
                if is_duplicate_key(&e) {
                    AppError::Conflict(anyhow::anyhow!("Email or phone number already exists"))
                } else {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to update user: {}", e))
                }
            })?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))
    }
}

// -----------------------------------------------------------------------------
// Announcements
// -----------------------------------------------------------------------------

#[derive(Clone)]
pub struct MongoAnnouncementStore {
    announcements: Collection<Announcement>,
}

impl MongoAnnouncementStore {
    pub fn new(db: &TicketingDb) -> Self {
        Self {
            announcements: db.announcements(),
        }
    }
}

#[async_trait]
impl AnnouncementStore for MongoAnnouncementStore {
    #[instrument(skip(self, announcement), fields(title = %announcement.title))]
    async fn create(&self, announcement: &Announcement) -> Result<(), AppError> {
        self.announcements
            .insert_one(announcement, None)
            .await
            .map_err(db_err("Failed to create announcement"))?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn active_for_user(
        &self,
        user_id: &str,
        kind: Option<&str>,
        priority: Option<AnnouncementPriority>,
    ) -> Result<Vec<Announcement>, AppError> {
        let mut filter = doc! {
            "status": AnnouncementStatus::Sent.as_str(),
            "is_active": true,
            "$or": [
                { "target_users": { "$size": 0 } },
                { "target_users": user_id },
            ],
        };
        if let Some(kind) = kind {
            filter.insert("kind", kind);
        }
        if let Some(priority) = priority {
            filter.insert("priority", priority.as_str());
        }

        let options = FindOptions::builder()
            .sort(doc! { "created_utc": -1 })
            .limit(50)
            .build();
        let cursor = self
            .announcements
            .find(filter, options)
            .await
            .map_err(db_err("Failed to query announcements"))?;
        let mut announcements: Vec<Announcement> = cursor
            .try_collect()
            .await
            .map_err(db_err("Failed to collect announcements"))?;

        // Expiry is computed, not stored; filter and rank here.
        let now = chrono::Utc::now();
        announcements.retain(|a| !a.is_expired(now));
        announcements.sort_by(|a, b| b.priority.cmp(&a.priority));
        Ok(announcements)
    }

    #[instrument(skip(self))]
    async fn mark_read(
        &self,
        announcement_id: &str,
        user_id: &str,
    ) -> Result<Announcement, AppError> {
        self.announcements
            .find_one_and_update(
                doc! { "announcement_id": announcement_id },
                doc! { "$addToSet": { "read_by": user_id } },
                FindOneAndUpdateOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build(),
            )
            .await
            .map_err(db_err("Failed to mark announcement read"))?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Announcement not found")))
    }

    #[instrument(skip(self))]
    async fn set_status(
        &self,
        announcement_id: &str,
        status: AnnouncementStatus,
        is_active: bool,
    ) -> Result<Announcement, AppError> {
        self.announcements
            .find_one_and_update(
                doc! { "announcement_id": announcement_id },
                doc! { "$set": { "status": status.as_str(), "is_active": is_active } },
                FindOneAndUpdateOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build(),
            )
            .await
            .map_err(db_err("Failed to update announcement status"))?
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Announcement not found")))
    }
}
