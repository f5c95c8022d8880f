pub mod email;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use email::{MockEmailProvider, SmtpProvider};

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not enabled: {0}")]
    NotEnabled(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Send error: {0}")]
    SendFailed(String),

    #[error("Invalid recipient: {0}")]
    InvalidRecipient(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub provider_id: Option<String>,
    pub success: bool,
    pub message: Option<String>,
}

impl ProviderResponse {
    pub fn success(provider_id: Option<String>) -> Self {
        Self {
            provider_id,
            success: true,
            message: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EmailAttachment {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub body_text: String,
    pub attachment: Option<EmailAttachment>,
}

#[async_trait]
pub trait EmailProvider: Send + Sync {
    async fn send(&self, email: &EmailMessage) -> Result<ProviderResponse, ProviderError>;
    async fn health_check(&self) -> Result<(), ProviderError>;
    fn is_enabled(&self) -> bool;
}
