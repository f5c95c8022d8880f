use super::{EmailMessage, EmailProvider, ProviderError, ProviderResponse};
use crate::config::SmtpConfig;
use async_trait::async_trait;
use lettre::{
    message::{header::ContentType, Attachment, Mailbox, MultiPart, SinglePart},
    transport::smtp::authentication::Credentials,
    AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use secrecy::ExposeSecret;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

pub struct SmtpProvider {
    config: SmtpConfig,
    transport: Option<AsyncSmtpTransport<Tokio1Executor>>,
}

impl SmtpProvider {
    pub fn new(config: SmtpConfig) -> Result<Self, ProviderError> {
        if !config.enabled {
            return Ok(Self {
                config,
                transport: None,
            });
        }

        let creds = Credentials::new(
            config.user.clone(),
            config.password.expose_secret().clone(),
        );

        let transport = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(|e| {
                ProviderError::Configuration(format!("Failed to create SMTP relay: {}", e))
            })?
            .port(config.port)
            .credentials(creds)
            .build();

        Ok(Self {
            config,
            transport: Some(transport),
        })
    }
}

#[async_trait]
impl EmailProvider for SmtpProvider {
    async fn send(&self, email: &EmailMessage) -> Result<ProviderResponse, ProviderError> {
        if !self.config.enabled {
            return Err(ProviderError::NotEnabled(
                "SMTP email provider is not enabled".to_string(),
            ));
        }

        let transport = self.transport.as_ref().ok_or_else(|| {
            ProviderError::Configuration("SMTP transport not initialized".to_string())
        })?;

        let from_mailbox: Mailbox =
            format!("{} <{}>", self.config.from_name, self.config.from_email)
                .parse()
                .map_err(|e| {
                    ProviderError::Configuration(format!("Invalid from address: {}", e))
                })?;

        let to_mailbox: Mailbox = email
            .to
            .parse()
            .map_err(|e| ProviderError::InvalidRecipient(format!("Invalid recipient: {}", e)))?;

        let message_builder = Message::builder()
            .from(from_mailbox)
            .to(to_mailbox)
            .subject(&email.subject);

        let message = match &email.attachment {
            Some(attachment) => {
                let content_type = ContentType::parse(&attachment.content_type).map_err(|e| {
                    ProviderError::Configuration(format!(
                        "Invalid attachment content type: {}",
                        e
                    ))
                })?;
                let attachment_part = Attachment::new(attachment.filename.clone())
                    .body(attachment.data.clone(), content_type);
                message_builder
                    .multipart(
                        MultiPart::mixed()
                            .singlepart(
                                SinglePart::builder()
                                    .header(ContentType::TEXT_PLAIN)
                                    .body(email.body_text.clone()),
                            )
                            .singlepart(attachment_part),
                    )
                    .map_err(|e| {
                        ProviderError::SendFailed(format!("Failed to build message: {}", e))
                    })?
            }
            None => message_builder
                .header(ContentType::TEXT_PLAIN)
                .body(email.body_text.clone())
                .map_err(|e| {
                    ProviderError::SendFailed(format!("Failed to build message: {}", e))
                })?,
        };

        let response = transport
            .send(message)
            .await
            .map_err(|e| ProviderError::SendFailed(format!("Failed to send email: {}", e)))?;

        let provider_id = response.message().next().map(|s| s.to_string());

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "Email sent successfully"
        );

        Ok(ProviderResponse::success(provider_id))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if !self.config.enabled {
            return Ok(());
        }

        let transport = self.transport.as_ref().ok_or_else(|| {
            ProviderError::Configuration("SMTP transport not initialized".to_string())
        })?;

        transport.test_connection().await.map_err(|e| {
            ProviderError::Connection(format!("SMTP connection test failed: {}", e))
        })?;

        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.config.enabled
    }
}

/// Mock email provider for local development and tests. Records every
/// message it accepts.
pub struct MockEmailProvider {
    enabled: bool,
    send_count: AtomicU64,
    sent: Mutex<Vec<EmailMessage>>,
}

impl MockEmailProvider {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            send_count: AtomicU64::new(0),
            sent: Mutex::new(Vec::new()),
        }
    }

    pub fn send_count(&self) -> u64 {
        self.send_count.load(Ordering::SeqCst)
    }

    pub fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.lock().expect("mock email lock poisoned").clone()
    }
}

#[async_trait]
impl EmailProvider for MockEmailProvider {
    async fn send(&self, email: &EmailMessage) -> Result<ProviderResponse, ProviderError> {
        if !self.enabled {
            return Err(ProviderError::NotEnabled(
                "Mock email provider is not enabled".to_string(),
            ));
        }

        self.send_count.fetch_add(1, Ordering::SeqCst);
        self.sent
            .lock()
            .expect("mock email lock poisoned")
            .push(email.clone());

        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            "[MOCK] Email would be sent"
        );

        Ok(ProviderResponse::success(Some(format!(
            "mock-email-{}",
            self.send_count.load(Ordering::SeqCst)
        ))))
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        Ok(())
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }
}
