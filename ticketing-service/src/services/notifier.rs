//! Fire-and-forget notification emission.
//!
//! `emit` hands the record to a background writer over an unbounded channel
//! and returns immediately; a store failure is logged by the writer and never
//! reaches the emitting operation's success path.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::models::{Notification, NotificationKind};
use crate::services::metrics::NOTIFICATIONS_EMITTED_TOTAL;
use crate::services::stores::NotificationStore;

#[derive(Clone)]
pub struct NotificationEmitter {
    tx: mpsc::UnboundedSender<Notification>,
}

impl NotificationEmitter {
    /// Start the background writer and return the emitter handle.
    pub fn spawn(store: Arc<dyn NotificationStore>) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Notification>();

        tokio::spawn(async move {
            while let Some(notification) = rx.recv().await {
                match store.insert(&notification).await {
                    Ok(()) => {
                        NOTIFICATIONS_EMITTED_TOTAL
                            .with_label_values(&["written"])
                            .inc();
                        tracing::debug!(
                            user_id = %notification.user_id,
                            kind = %notification.kind,
                            "Notification written"
                        );
                    }
                    Err(e) => {
                        NOTIFICATIONS_EMITTED_TOTAL
                            .with_label_values(&["failed"])
                            .inc();
                        tracing::warn!(
                            user_id = %notification.user_id,
                            kind = %notification.kind,
                            "Failed to write notification: {}",
                            e
                        );
                    }
                }
            }
        });

        Self { tx }
    }

    pub fn emit(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
        user_id: impl Into<String>,
        additional_data: serde_json::Value,
    ) {
        let notification = Notification::new(kind, title, message, user_id, additional_data);
        if self.tx.send(notification).is_err() {
            tracing::warn!("Notification channel closed; dropping notification");
        }
    }
}
