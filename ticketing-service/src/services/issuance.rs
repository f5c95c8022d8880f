//! Ticket issuance orchestration.
//!
//! One logical "purchase a ticket" operation: debit the card, persist the
//! e-ticket, bump the schedule counters, write the dashboard projection, and
//! emit the side-channel effects. Once a purchase reports success the debit
//! and the e-ticket are durably persisted; the counters, projection,
//! notification and email are best-effort. No idempotency key is accepted, so
//! a client retry after a timeout debits and books again.

use rust_decimal::Decimal;
use serde_json::json;
use service_core::error::AppError;
use std::sync::Arc;
use tracing::instrument;

use crate::models::{
    money::round2, ActiveBooking, Eticket, LedgerEntry, NotificationKind, Passenger, TicketStatus,
    VehicleDetail,
};
use crate::services::delivery::EmailDelivery;
use crate::services::metrics::TICKETS_ISSUED_TOTAL;
use crate::services::notifier::NotificationEmitter;
use crate::services::providers::{EmailAttachment, EmailMessage};
use crate::services::renderer::TicketRenderer;
use crate::services::stores::{BookingStore, CapacityStore, LedgerStore};

/// Boundary-validated purchase input.
#[derive(Debug, Clone)]
pub struct TicketPurchase {
    pub user_id: String,
    pub email: String,
    pub passengers: Vec<Passenger>,
    pub vehicle_detail: Vec<VehicleDetail>,
    pub departure_location: String,
    pub arrival_location: String,
    pub depart_date: String,
    pub depart_time: String,
    pub arrive_date: String,
    pub arrive_time: String,
    pub shipping_line: String,
    pub has_vehicle: bool,
    pub card_type: String,
    pub booking_reference: String,
    pub total_fare: Decimal,
    pub schedcde: String,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct PurchaseReceipt {
    pub eticket_id: String,
    pub booking_reference: String,
}

#[derive(Clone)]
pub struct TicketIssuer {
    ledger: Arc<dyn LedgerStore>,
    capacity: Arc<dyn CapacityStore>,
    bookings: Arc<dyn BookingStore>,
    notifier: NotificationEmitter,
    email: EmailDelivery,
    renderer: Arc<dyn TicketRenderer>,
}

fn issue_status(err: &AppError) -> &'static str {
    match err {
        AppError::NotFound(_) => "card_not_found",
        AppError::InsufficientFunds(_) => "insufficient_funds",
        _ => "error",
    }
}

impl TicketIssuer {
    pub fn new(
        ledger: Arc<dyn LedgerStore>,
        capacity: Arc<dyn CapacityStore>,
        bookings: Arc<dyn BookingStore>,
        notifier: NotificationEmitter,
        email: EmailDelivery,
        renderer: Arc<dyn TicketRenderer>,
    ) -> Self {
        Self {
            ledger,
            capacity,
            bookings,
            notifier,
            email,
            renderer,
        }
    }

    #[instrument(
        skip(self, purchase),
        fields(
            user_id = %purchase.user_id,
            booking_reference = %purchase.booking_reference,
            schedcde = %purchase.schedcde,
        )
    )]
    pub async fn purchase(&self, purchase: TicketPurchase) -> Result<PurchaseReceipt, AppError> {
        let fare = round2(purchase.total_fare);

        // Step 1: debit. The store serializes concurrent mutations of the
        // same card and checks card existence before the balance.
        let card = match self.ledger.debit(&purchase.user_id, fare).await {
            Ok(card) => card,
            Err(e) => {
                TICKETS_ISSUED_TOTAL
                    .with_label_values(&[issue_status(&e)])
                    .inc();
                return Err(e);
            }
        };
        tracing::info!(
            amount = %fare,
            new_balance = %card.balance,
            stage = "debited",
            "Card debited for e-ticket purchase"
        );

        // Step 2: purchase history entry. The debit stands either way.
        let entry = LedgerEntry::purchase(
            purchase.user_id.clone(),
            fare,
            &purchase.booking_reference,
        );
        if let Err(e) = self.ledger.append_history(&entry).await {
            tracing::warn!(
                amount = %fare,
                stage = "history",
                "Failed to append purchase history entry: {}",
                e
            );
        }

        // Step 3: persist the e-ticket. This is the failure that must not
        // leave money taken with nothing issued, so it refunds on error.
        let ticket = Eticket {
            eticket_id: Eticket::new_id(),
            user_id: purchase.user_id.clone(),
            passengers: purchase.passengers.clone(),
            departure_location: purchase.departure_location.clone(),
            arrival_location: purchase.arrival_location.clone(),
            depart_date: purchase.depart_date.clone(),
            depart_time: purchase.depart_time.clone(),
            arrive_date: purchase.arrive_date.clone(),
            arrive_time: purchase.arrive_time.clone(),
            shipping_line: purchase.shipping_line.clone(),
            has_vehicle: purchase.has_vehicle,
            card_type: purchase.card_type.clone(),
            status: TicketStatus::Active,
            vehicle_detail: purchase.vehicle_detail.clone(),
            booking_reference: purchase.booking_reference.clone(),
            total_fare: fare,
            created_utc: chrono::Utc::now(),
        };

        if let Err(e) = self.bookings.create_eticket(&ticket).await {
            TICKETS_ISSUED_TOTAL.with_label_values(&["error"]).inc();
            return Err(
                self.refund_failed_issue(&purchase.user_id, fare, &purchase.booking_reference, e)
                    .await,
            );
        }

        // Step 4: schedule counters. Atomic at the store; not rolled back
        // and not fatal — the counters are eventually correct, not
        // transactionally tied to the debit.
        if let Err(e) = self
            .capacity
            .increment_booked(
                &purchase.schedcde,
                ticket.passenger_count(),
                ticket.vehicle_count(),
            )
            .await
        {
            tracing::warn!(
                stage = "capacity",
                "Failed to increment schedule counters: {}",
                e
            );
        }

        // Step 5: dashboard projection, reconcilable from the e-ticket.
        let booking = ActiveBooking::project(&ticket);
        if let Err(e) = self.bookings.create_active_booking(&booking).await {
            tracing::warn!(
                stage = "projection",
                "Failed to write active-booking projection: {}",
                e
            );
        }

        // Step 6: notification, fire-and-forget.
        self.notifier.emit(
            NotificationKind::BookingCreated,
            "Booking Confirmed",
            format!(
                "Your trip from {} to {} on {} at {} has been confirmed.",
                purchase.departure_location,
                purchase.arrival_location,
                purchase.depart_date,
                purchase.depart_time
            ),
            purchase.user_id.clone(),
            json!({
                "bookingId": purchase.booking_reference,
                "departureLocation": purchase.departure_location,
                "arrivalLocation": purchase.arrival_location,
                "departDate": purchase.depart_date,
                "departTime": purchase.depart_time,
                "actionRequired": false,
            }),
        );

        // Step 7: render and email the ticket in the background.
        self.send_ticket_email(&ticket, &purchase.email);

        TICKETS_ISSUED_TOTAL.with_label_values(&["ok"]).inc();
        tracing::info!(
            eticket_id = %ticket.eticket_id,
            stage = "issued",
            "E-ticket issued"
        );

        Ok(PurchaseReceipt {
            eticket_id: ticket.eticket_id,
            booking_reference: ticket.booking_reference,
        })
    }

    /// Compensate a debit whose e-ticket never persisted. Returns the
    /// original cause so the caller surfaces the ticket failure, not the
    /// refund outcome.
    async fn refund_failed_issue(
        &self,
        user_id: &str,
        fare: Decimal,
        booking_reference: &str,
        cause: AppError,
    ) -> AppError {
        match self.ledger.credit(user_id, fare).await {
            Ok(card) => {
                tracing::warn!(
                    amount = %fare,
                    new_balance = %card.balance,
                    stage = "refunded",
                    "E-ticket persistence failed; debit refunded"
                );
                let entry =
                    LedgerEntry::refund(user_id.to_string(), fare, booking_reference);
                if let Err(e) = self.ledger.append_history(&entry).await {
                    tracing::warn!(stage = "refund_history", "Failed to record refund: {}", e);
                }
            }
            Err(refund_err) => {
                tracing::error!(
                    amount = %fare,
                    stage = "refund_failed",
                    "Debit taken but e-ticket missing and refund failed; \
                     manual reconciliation required: {}",
                    refund_err
                );
            }
        }
        cause
    }

    /// Best-effort delivery; the purchase response never waits on it.
    fn send_ticket_email(&self, ticket: &Eticket, recipient: &str) {
        let attachment = match self.renderer.render(ticket) {
            Ok(doc) => EmailAttachment {
                filename: doc.filename,
                content_type: doc.content_type,
                data: doc.bytes,
            },
            Err(e) => {
                tracing::warn!(
                    booking_reference = %ticket.booking_reference,
                    stage = "render",
                    "Failed to render ticket document: {}",
                    e
                );
                return;
            }
        };

        let message = EmailMessage {
            to: recipient.to_string(),
            subject: format!("Your ferry e-ticket {}", ticket.booking_reference),
            body_text: format!(
                "Your booking {} from {} to {} on {} at {} is confirmed. \
                 Your e-ticket is attached.",
                ticket.booking_reference,
                ticket.departure_location,
                ticket.arrival_location,
                ticket.depart_date,
                ticket.depart_time
            ),
            attachment: Some(attachment),
        };

        let delivery = self.email.clone();
        let booking_reference = ticket.booking_reference.clone();
        tokio::spawn(async move {
            if let Err(e) = delivery.send(&message).await {
                tracing::warn!(
                    booking_reference = %booking_reference,
                    stage = "email",
                    "Ticket email not delivered: {}",
                    e
                );
            }
        });
    }
}
