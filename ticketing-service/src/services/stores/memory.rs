//! In-memory store implementations.
//!
//! Used when no MongoDB URI is configured (local development) and by the
//! integration-test harness. Mutations on a store serialize through its
//! mutex, which gives the same single-writer-per-card guarantee the MongoDB
//! implementation gets from its compare-and-set.

use async_trait::async_trait;
use rust_decimal::Decimal;
use service_core::error::AppError;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::models::{
    money::round2, ActiveBooking, Announcement, AnnouncementPriority, AnnouncementStatus, Card,
    CardUpdate, Eticket, LedgerEntry, Notification, Schedule, User, UserStatus,
};
use crate::services::stores::{
    AnnouncementStore, BookingStore, CapacityStore, LedgerStore, NewUser, NotificationStore,
    UserStore, UserUpdate,
};

// -----------------------------------------------------------------------------
// Ledger
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryLedgerStore {
    inner: Mutex<LedgerInner>,
}

#[derive(Default)]
struct LedgerInner {
    cards: HashMap<String, Card>,
    history: Vec<LedgerEntry>,
}

#[async_trait]
impl LedgerStore for InMemoryLedgerStore {
    async fn create_card(&self, card: Card) -> Result<Card, AppError> {
        let mut inner = self.inner.lock().expect("ledger store lock poisoned");
        if inner.cards.contains_key(&card.user_id) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "User {} already has a card",
                card.user_id
            )));
        }
        if inner
            .cards
            .values()
            .any(|c| c.card_number == card.card_number)
        {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Card number already in use"
            )));
        }
        inner.cards.insert(card.user_id.clone(), card.clone());
        Ok(card)
    }

    async fn get_card(&self, user_id: &str) -> Result<Option<Card>, AppError> {
        let inner = self.inner.lock().expect("ledger store lock poisoned");
        Ok(inner.cards.get(user_id).cloned())
    }

    async fn update_card(&self, card_number: &str, update: CardUpdate) -> Result<Card, AppError> {
        let mut inner = self.inner.lock().expect("ledger store lock poisoned");
        let card = inner
            .cards
            .values_mut()
            .find(|c| c.card_number == card_number)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Card not found")))?;
        if let Some(card_type) = update.card_type {
            card.card_type = card_type;
        }
        if let Some(status) = update.status {
            card.status = status;
        }
        card.last_active = chrono::Utc::now();
        Ok(card.clone())
    }

    async fn credit(&self, user_id: &str, amount: Decimal) -> Result<Card, AppError> {
        let mut inner = self.inner.lock().expect("ledger store lock poisoned");
        let card = inner
            .cards
            .get_mut(user_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Card not found")))?;
        card.balance = round2(card.balance + round2(amount));
        card.last_active = chrono::Utc::now();
        Ok(card.clone())
    }

    async fn debit(&self, user_id: &str, amount: Decimal) -> Result<Card, AppError> {
        let amount = round2(amount);
        let mut inner = self.inner.lock().expect("ledger store lock poisoned");
        let card = inner
            .cards
            .get_mut(user_id)
            .filter(|c| c.is_active())
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Active card not found")))?;
        if card.balance < amount {
            return Err(AppError::InsufficientFunds(anyhow::anyhow!(
                "Card balance {} is below {}",
                card.balance,
                amount
            )));
        }
        card.balance = round2(card.balance - amount);
        card.last_active = chrono::Utc::now();
        Ok(card.clone())
    }

    async fn append_history(&self, entry: &LedgerEntry) -> Result<(), AppError> {
        let mut inner = self.inner.lock().expect("ledger store lock poisoned");
        inner.history.push(entry.clone());
        Ok(())
    }

    async fn history_for_user(&self, user_id: &str) -> Result<Vec<LedgerEntry>, AppError> {
        let inner = self.inner.lock().expect("ledger store lock poisoned");
        let mut entries: Vec<LedgerEntry> = inner
            .history
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        entries.sort_by(|a, b| b.date_transaction.cmp(&a.date_transaction));
        Ok(entries)
    }
}

// -----------------------------------------------------------------------------
// Capacity counters
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryCapacityStore {
    schedules: Mutex<HashMap<String, Schedule>>,
}

#[async_trait]
impl CapacityStore for InMemoryCapacityStore {
    async fn increment_booked(
        &self,
        schedcde: &str,
        passenger_delta: i32,
        vehicle_delta: i32,
    ) -> Result<(), AppError> {
        let mut schedules = self.schedules.lock().expect("capacity store lock poisoned");
        let schedule = schedules
            .get_mut(schedcde)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Schedule {} not found", schedcde)))?;
        schedule.passenger_booked += passenger_delta;
        schedule.vehicle_booked += vehicle_delta;
        Ok(())
    }

    async fn list_schedules(&self) -> Result<Vec<Schedule>, AppError> {
        let schedules = self.schedules.lock().expect("capacity store lock poisoned");
        let mut all: Vec<Schedule> = schedules.values().cloned().collect();
        all.sort_by(|a, b| a.schedcde.cmp(&b.schedcde));
        Ok(all)
    }

    async fn get_schedule(&self, schedcde: &str) -> Result<Option<Schedule>, AppError> {
        let schedules = self.schedules.lock().expect("capacity store lock poisoned");
        Ok(schedules.get(schedcde).cloned())
    }

    async fn upsert_schedule(&self, schedule: Schedule) -> Result<(), AppError> {
        let mut schedules = self.schedules.lock().expect("capacity store lock poisoned");
        schedules.insert(schedule.schedcde.clone(), schedule);
        Ok(())
    }
}

// -----------------------------------------------------------------------------
// Bookings
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryBookingStore {
    inner: Mutex<BookingInner>,
}

#[derive(Default)]
struct BookingInner {
    etickets: Vec<Eticket>,
    active_bookings: Vec<ActiveBooking>,
}

#[async_trait]
impl BookingStore for InMemoryBookingStore {
    async fn create_eticket(&self, ticket: &Eticket) -> Result<String, AppError> {
        let mut inner = self.inner.lock().expect("booking store lock poisoned");
        inner.etickets.push(ticket.clone());
        Ok(ticket.eticket_id.clone())
    }

    async fn create_active_booking(&self, booking: &ActiveBooking) -> Result<String, AppError> {
        let mut inner = self.inner.lock().expect("booking store lock poisoned");
        inner.active_bookings.push(booking.clone());
        Ok(booking.booking_id.clone())
    }

    async fn eticket_by_reference(&self, reference: &str) -> Result<Option<Eticket>, AppError> {
        let inner = self.inner.lock().expect("booking store lock poisoned");
        Ok(inner
            .etickets
            .iter()
            .find(|t| t.booking_reference == reference)
            .cloned())
    }

    async fn etickets_for_user(&self, user_id: &str) -> Result<Vec<Eticket>, AppError> {
        let inner = self.inner.lock().expect("booking store lock poisoned");
        let mut tickets: Vec<Eticket> = inner
            .etickets
            .iter()
            .filter(|t| t.user_id == user_id)
            .cloned()
            .collect();
        tickets.sort_by(|a, b| b.created_utc.cmp(&a.created_utc));
        Ok(tickets)
    }

    async fn active_bookings_for_user(
        &self,
        user_id: &str,
    ) -> Result<Vec<ActiveBooking>, AppError> {
        let inner = self.inner.lock().expect("booking store lock poisoned");
        let mut bookings: Vec<ActiveBooking> = inner
            .active_bookings
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        bookings.sort_by(|a, b| b.created_utc.cmp(&a.created_utc));
        Ok(bookings)
    }

    async fn bookings_for_schedule(
        &self,
        shipping_line: &str,
        depart_date: &str,
    ) -> Result<Vec<ActiveBooking>, AppError> {
        let inner = self.inner.lock().expect("booking store lock poisoned");
        Ok(inner
            .active_bookings
            .iter()
            .filter(|b| b.shipping_line == shipping_line && b.depart_date == depart_date)
            .cloned()
            .collect())
    }
}

// -----------------------------------------------------------------------------
// Notifications
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryNotificationStore {
    notifications: Mutex<Vec<Notification>>,
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn insert(&self, notification: &Notification) -> Result<(), AppError> {
        let mut notifications = self
            .notifications
            .lock()
            .expect("notification store lock poisoned");
        notifications.push(notification.clone());
        Ok(())
    }

    async fn list_for_user(
        &self,
        user_id: &str,
        archived: bool,
    ) -> Result<Vec<Notification>, AppError> {
        let notifications = self
            .notifications
            .lock()
            .expect("notification store lock poisoned");
        let mut matching: Vec<Notification> = notifications
            .iter()
            .filter(|n| n.user_id == user_id && n.is_archived == archived)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_utc.cmp(&a.created_utc));
        matching.truncate(100);
        Ok(matching)
    }

    async fn mark_read(
        &self,
        notification_id: &str,
        user_id: &str,
    ) -> Result<Notification, AppError> {
        let mut notifications = self
            .notifications
            .lock()
            .expect("notification store lock poisoned");
        let notification = notifications
            .iter_mut()
            .find(|n| n.notification_id == notification_id && n.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Notification not found")))?;
        notification.is_read = true;
        Ok(notification.clone())
    }

    async fn archive(
        &self,
        notification_id: &str,
        user_id: &str,
    ) -> Result<Notification, AppError> {
        let mut notifications = self
            .notifications
            .lock()
            .expect("notification store lock poisoned");
        let notification = notifications
            .iter_mut()
            .find(|n| n.notification_id == notification_id && n.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Notification not found")))?;
        notification.is_archived = true;
        Ok(notification.clone())
    }

    async fn delete(&self, notification_id: &str, user_id: &str) -> Result<(), AppError> {
        let mut notifications = self
            .notifications
            .lock()
            .expect("notification store lock poisoned");
        let before = notifications.len();
        notifications.retain(|n| !(n.notification_id == notification_id && n.user_id == user_id));
        if notifications.len() == before {
            return Err(AppError::NotFound(anyhow::anyhow!(
                "Notification not found"
            )));
        }
        Ok(())
    }

    async fn unread_count(&self, user_id: &str) -> Result<u64, AppError> {
        let notifications = self
            .notifications
            .lock()
            .expect("notification store lock poisoned");
        Ok(notifications
            .iter()
            .filter(|n| n.user_id == user_id && !n.is_read && !n.is_archived)
            .count() as u64)
    }
}

// -----------------------------------------------------------------------------
// Users
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.lock().expect("user store lock poisoned");
        if users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::Conflict(anyhow::anyhow!("Email already exists")));
        }
        if users.iter().any(|u| u.phone == new_user.phone) {
            return Err(AppError::Conflict(anyhow::anyhow!(
                "Phone number already exists"
            )));
        }
        let last = users.last().map(|u| u.user_id.clone());
        let user = User {
            user_id: User::next_user_id(last.as_deref()),
            name: new_user.name,
            email: new_user.email,
            phone: new_user.phone,
            birthdate: new_user.birthdate,
            status: UserStatus::Active,
            created_utc: chrono::Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let users = self.users.lock().expect("user store lock poisoned");
        Ok(users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn update(&self, user_id: &str, changes: UserUpdate) -> Result<User, AppError> {
        let mut users = self.users.lock().expect("user store lock poisoned");
        if let Some(email) = &changes.email {
            if users.iter().any(|u| u.user_id != user_id && &u.email == email) {
                return Err(AppError::Conflict(anyhow::anyhow!("Email already exists")));
            }
        }
        if let Some(phone) = &changes.phone {
            if users.iter().any(|u| u.user_id != user_id && &u.phone == phone) {
                return Err(AppError::Conflict(anyhow::anyhow!(
                    "Phone number already exists"
                )));
            }
        }
        let user = users
            .iter_mut()
            .find(|u| u.user_id == user_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;
        if let Some(name) = changes.name {
            user.name = name;
        }
        if let Some(email) = changes.email {
            user.email = email;
        }
        if let Some(phone) = changes.phone {
            user.phone = phone;
        }
        if let Some(birthdate) = changes.birthdate {
            user.birthdate = Some(birthdate);
        }
        Ok(user.clone())
    }
}

// -----------------------------------------------------------------------------
// Announcements
// -----------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryAnnouncementStore {
    announcements: Mutex<Vec<Announcement>>,
}

#[async_trait]
impl AnnouncementStore for InMemoryAnnouncementStore {
    async fn create(&self, announcement: &Announcement) -> Result<(), AppError> {
        let mut announcements = self
            .announcements
            .lock()
            .expect("announcement store lock poisoned");
        announcements.push(announcement.clone());
        Ok(())
    }

    async fn active_for_user(
        &self,
        user_id: &str,
        kind: Option<&str>,
        priority: Option<AnnouncementPriority>,
    ) -> Result<Vec<Announcement>, AppError> {
        let announcements = self
            .announcements
            .lock()
            .expect("announcement store lock poisoned");
        let now = chrono::Utc::now();
        let mut matching: Vec<Announcement> = announcements
            .iter()
            .filter(|a| a.is_visible_to(user_id, now))
            .filter(|a| kind.map(|k| a.kind == k).unwrap_or(true))
            .filter(|a| priority.map(|p| a.priority == p).unwrap_or(true))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(b.created_utc.cmp(&a.created_utc))
        });
        matching.truncate(50);
        Ok(matching)
    }

    async fn mark_read(
        &self,
        announcement_id: &str,
        user_id: &str,
    ) -> Result<Announcement, AppError> {
        let mut announcements = self
            .announcements
            .lock()
            .expect("announcement store lock poisoned");
        let announcement = announcements
            .iter_mut()
            .find(|a| a.announcement_id == announcement_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Announcement not found")))?;
        if !announcement.read_by.iter().any(|u| u == user_id) {
            announcement.read_by.push(user_id.to_string());
        }
        Ok(announcement.clone())
    }

    async fn set_status(
        &self,
        announcement_id: &str,
        status: AnnouncementStatus,
        is_active: bool,
    ) -> Result<Announcement, AppError> {
        let mut announcements = self
            .announcements
            .lock()
            .expect("announcement store lock poisoned");
        let announcement = announcements
            .iter_mut()
            .find(|a| a.announcement_id == announcement_id)
            .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Announcement not found")))?;
        announcement.status = status;
        announcement.is_active = is_active;
        Ok(announcement.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn card(user_id: &str, balance: &str) -> Card {
        let mut card = Card::new(
            user_id.to_string(),
            format!("4000-{}", user_id),
            "regular".to_string(),
        );
        card.balance = dec(balance);
        card
    }

    #[tokio::test]
    async fn debit_requires_an_active_card() {
        let store = InMemoryLedgerStore::default();
        let mut blocked = card("U0001", "100.00");
        blocked.status = crate::models::CardStatus::Blocked;
        store.create_card(blocked).await.unwrap();

        let err = store.debit("U0001", dec("10.00")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn debit_rejects_insufficient_funds_and_leaves_balance() {
        let store = InMemoryLedgerStore::default();
        store.create_card(card("U0001", "100.00")).await.unwrap();

        let err = store.debit("U0001", dec("150.00")).await.unwrap_err();
        assert!(matches!(err, AppError::InsufficientFunds(_)));

        let card = store.get_card("U0001").await.unwrap().unwrap();
        assert_eq!(card.balance.to_string(), "100.00");
    }

    #[tokio::test]
    async fn concurrent_debits_never_overspend() {
        let store = Arc::new(InMemoryLedgerStore::default());
        store.create_card(card("U0001", "500.00")).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.debit("U0001", dec("100.00")).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 5, "only five 100.00 debits fit in 500.00");
        let card = store.get_card("U0001").await.unwrap().unwrap();
        assert_eq!(card.balance.to_string(), "0.00");
    }

    #[tokio::test]
    async fn counter_increments_accumulate() {
        let store = Arc::new(InMemoryCapacityStore::default());
        store
            .upsert_schedule(Schedule {
                schedcde: "SCH-1".to_string(),
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
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment_booked("SCH-1", 3, 1).await.unwrap();
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let schedule = store.get_schedule("SCH-1").await.unwrap().unwrap();
        assert_eq!(schedule.passenger_booked, 24);
        assert_eq!(schedule.vehicle_booked, 8);
    }
}
