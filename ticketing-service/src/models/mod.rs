pub mod announcement;
pub mod booking;
pub mod card;
pub mod ledger;
pub mod money;
pub mod notification;
pub mod schedule;
pub mod ticket;
pub mod user;

pub use announcement::{Announcement, AnnouncementPriority, AnnouncementStatus};
pub use booking::{ActiveBooking, BookingStatus, VehicleInfo};
pub use card::{Card, CardStatus, CardUpdate};
pub use ledger::{EntryKind, EntryStatus, LedgerEntry};
pub use money::round2;
pub use notification::{Notification, NotificationKind};
pub use schedule::Schedule;
pub use ticket::{Eticket, Passenger, TicketStatus, VehicleDetail};
pub use user::{User, UserStatus};
