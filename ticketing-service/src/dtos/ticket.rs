use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{Eticket, Passenger, TicketStatus, VehicleDetail};
use crate::services::TicketPurchase;

#[derive(Debug, Deserialize, Validate)]
pub struct PurchaseTicketRequest {
    #[validate(length(min = 1, message = "User id cannot be empty"))]
    pub user_id: String,
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "At least one passenger is required"))]
    pub passengers: Vec<Passenger>,
    #[serde(default)]
    pub vehicle_detail: Vec<VehicleDetail>,
    #[validate(length(min = 1, message = "Departure location cannot be empty"))]
    pub departure_location: String,
    #[validate(length(min = 1, message = "Arrival location cannot be empty"))]
    pub arrival_location: String,
    #[validate(length(min = 1, message = "Departure date cannot be empty"))]
    pub depart_date: String,
    #[validate(length(min = 1, message = "Departure time cannot be empty"))]
    pub depart_time: String,
    #[serde(default)]
    pub arrive_date: String,
    #[serde(default)]
    pub arrive_time: String,
    #[validate(length(min = 1, message = "Shipping line cannot be empty"))]
    pub shipping_line: String,
    #[serde(default)]
    pub has_vehicle: bool,
    #[serde(default)]
    pub card_type: String,
    #[validate(length(min = 1, message = "Booking reference cannot be empty"))]
    pub booking_reference: String,
    /// Must be positive; enforced at the endpoint.
    pub total_fare: Decimal,
    #[validate(length(min = 1, message = "Schedule code cannot be empty"))]
    pub schedcde: String,
}

impl From<PurchaseTicketRequest> for TicketPurchase {
    fn from(request: PurchaseTicketRequest) -> Self {
        TicketPurchase {
            user_id: request.user_id,
            email: request.email,
            passengers: request.passengers,
            vehicle_detail: request.vehicle_detail,
            departure_location: request.departure_location,
            arrival_location: request.arrival_location,
            depart_date: request.depart_date,
            depart_time: request.depart_time,
            arrive_date: request.arrive_date,
            arrive_time: request.arrive_time,
            shipping_line: request.shipping_line,
            has_vehicle: request.has_vehicle,
            card_type: request.card_type,
            booking_reference: request.booking_reference,
            total_fare: request.total_fare,
            schedcde: request.schedcde,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PurchaseTicketResponse {
    pub message: String,
    pub eticket_id: String,
    pub booking_reference: String,
}

#[derive(Debug, Serialize)]
pub struct EticketResponse {
    pub eticket_id: String,
    pub user_id: String,
    pub passengers: Vec<Passenger>,
    pub departure_location: String,
    pub arrival_location: String,
    pub depart_date: String,
    pub depart_time: String,
    pub arrive_date: String,
    pub arrive_time: String,
    pub shipping_line: String,
    pub has_vehicle: bool,
    pub card_type: String,
    pub status: TicketStatus,
    pub vehicle_detail: Vec<VehicleDetail>,
    pub booking_reference: String,
    pub total_fare: Decimal,
    pub created_utc: DateTime<Utc>,
}

impl From<Eticket> for EticketResponse {
    fn from(ticket: Eticket) -> Self {
        Self {
            eticket_id: ticket.eticket_id,
            user_id: ticket.user_id,
            passengers: ticket.passengers,
            departure_location: ticket.departure_location,
            arrival_location: ticket.arrival_location,
            depart_date: ticket.depart_date,
            depart_time: ticket.depart_time,
            arrive_date: ticket.arrive_date,
            arrive_time: ticket.arrive_time,
            shipping_line: ticket.shipping_line,
            has_vehicle: ticket.has_vehicle,
            card_type: ticket.card_type,
            status: ticket.status,
            vehicle_detail: ticket.vehicle_detail,
            booking_reference: ticket.booking_reference,
            total_fare: ticket.total_fare,
            created_utc: ticket.created_utc,
        }
    }
}
