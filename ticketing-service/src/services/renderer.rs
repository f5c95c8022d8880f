//! Ticket document rendering for email attachments.
//!
//! The renderer is the seam to the document pipeline: it turns an e-ticket
//! into a byte payload plus metadata. The in-tree implementation renders a
//! plain-text summary; richer formats plug in behind the same trait.

use service_core::error::AppError;

use crate::models::Eticket;

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub filename: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

pub trait TicketRenderer: Send + Sync {
    fn render(&self, ticket: &Eticket) -> Result<RenderedDocument, AppError>;
}

/// Plain-text e-ticket summary.
pub struct TicketSummaryRenderer;

impl TicketRenderer for TicketSummaryRenderer {
    fn render(&self, ticket: &Eticket) -> Result<RenderedDocument, AppError> {
        let mut lines = vec![
            "FERRY E-TICKET".to_string(),
            format!("Booking reference: {}", ticket.booking_reference),
            format!("Shipping line:     {}", ticket.shipping_line),
            format!(
                "Route:             {} -> {}",
                ticket.departure_location, ticket.arrival_location
            ),
            format!(
                "Departure:         {} {}",
                ticket.depart_date, ticket.depart_time
            ),
            format!(
                "Arrival:           {} {}",
                ticket.arrive_date, ticket.arrive_time
            ),
            format!("Total fare:        {}", ticket.total_fare),
            String::new(),
            format!("Passengers ({}):", ticket.passengers.len()),
        ];
        for passenger in &ticket.passengers {
            lines.push(format!("  - {} ({})", passenger.name, passenger.contact));
        }
        if ticket.has_vehicle {
            lines.push(String::new());
            lines.push(format!("Vehicles ({}):", ticket.vehicle_detail.len()));
            for vehicle in &ticket.vehicle_detail {
                lines.push(format!(
                    "  - {} {} owned by {}",
                    vehicle.car_type, vehicle.plate_number, vehicle.vehicle_owner
                ));
            }
        }

        Ok(RenderedDocument {
            filename: format!("eticket-{}.txt", ticket.booking_reference),
            content_type: "text/plain".to_string(),
            bytes: lines.join("\n").into_bytes(),
        })
    }
}
