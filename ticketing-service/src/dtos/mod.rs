//! Request/response schemas, validated at the boundary before anything
//! reaches the orchestrator or the stores.

pub mod announcement;
pub mod booking;
pub mod card;
pub mod notification;
pub mod ticket;
pub mod user;

pub use announcement::{
    AnnouncementQuery, AnnouncementResponse, CreateAnnouncementRequest,
    UpdateAnnouncementStatusRequest,
};
pub use booking::ActiveBookingResponse;
pub use card::{
    BuyLoadRequest, BuyLoadResponse, CardResponse, CreateCardRequest, LedgerEntryResponse,
    UpdateCardRequest,
};
pub use notification::{
    CreateNotificationRequest, NotificationResponse, UnreadCountResponse, UserIdBody,
};
pub use ticket::{EticketResponse, PurchaseTicketRequest, PurchaseTicketResponse};
pub use user::{CreateUserRequest, UpdateUserRequest, UserResponse};
