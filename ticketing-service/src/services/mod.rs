pub mod database;
pub mod delivery;
pub mod issuance;
pub mod metrics;
pub mod notifier;
pub mod providers;
pub mod renderer;
pub mod stores;

pub use database::TicketingDb;
pub use delivery::{EmailDelivery, RetryConfig};
pub use issuance::{PurchaseReceipt, TicketIssuer, TicketPurchase};
pub use metrics::{get_metrics, init_metrics};
pub use notifier::NotificationEmitter;
pub use providers::{EmailProvider, MockEmailProvider, SmtpProvider};
pub use renderer::{TicketRenderer, TicketSummaryRenderer};
pub use stores::Stores;
