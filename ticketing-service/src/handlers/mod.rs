pub mod announcement;
pub mod booking;
pub mod card;
pub mod health;
pub mod notification;
pub mod schedule;
pub mod ticket;
pub mod user;

pub use announcement::{
    create_announcement, list_announcements, mark_announcement_read, update_announcement_status,
};
pub use booking::active_bookings;
pub use card::{buy_load, card_history, create_card, get_card, update_card};
pub use health::{health_check, metrics_endpoint, readiness_check};
pub use notification::{
    archive_notification, archived_notifications, create_notification, delete_notification,
    list_notifications, mark_notification_read, unread_count,
};
pub use schedule::{list_schedules, schedule_manifest};
pub use ticket::{get_eticket, purchase_eticket};
pub use user::{create_user, edit_user, get_user};
