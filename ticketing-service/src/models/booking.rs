//! Denormalized active-booking projection for dashboard queries.
//!
//! Written alongside the e-ticket but independently of it; the only shared
//! key is the booking reference.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::ticket::{Eticket, Passenger};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Active,
    Completed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleInfo {
    pub vehicle_type: String,
    pub plate_number: String,
    pub vehicle_owner: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActiveBooking {
    pub user_id: String,
    /// Equals the e-ticket's booking reference.
    pub booking_id: String,
    pub departure_location: String,
    pub arrival_location: String,
    pub depart_date: String,
    pub depart_time: String,
    pub arrive_date: String,
    pub arrive_time: String,
    pub passengers: i32,
    pub has_vehicle: bool,
    pub vehicle_type: String,
    pub status: BookingStatus,
    pub shipping_line: String,
    pub departure_port: String,
    pub arrival_port: String,
    /// Serialized as a decimal string with 2 dp.
    pub payment: Decimal,
    pub is_paid: bool,
    pub booking_date: String,
    pub is_round_trip: bool,
    pub passenger_details: Vec<Passenger>,
    pub vehicle_info: Option<VehicleInfo>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_utc: DateTime<Utc>,
}

impl ActiveBooking {
    /// Denormalize a freshly issued e-ticket into the dashboard projection.
    pub fn project(ticket: &Eticket) -> Self {
        let now = Utc::now();
        let vehicle_info = if ticket.has_vehicle {
            ticket.vehicle_detail.first().map(|v| VehicleInfo {
                vehicle_type: v.car_type.clone(),
                plate_number: v.plate_number.clone(),
                vehicle_owner: v.vehicle_owner.clone(),
            })
        } else {
            None
        };

        Self {
            user_id: ticket.user_id.clone(),
            booking_id: ticket.booking_reference.clone(),
            departure_location: ticket.departure_location.clone(),
            arrival_location: ticket.arrival_location.clone(),
            depart_date: ticket.depart_date.clone(),
            depart_time: ticket.depart_time.clone(),
            arrive_date: ticket.arrive_date.clone(),
            arrive_time: ticket.arrive_time.clone(),
            passengers: ticket.passenger_count(),
            has_vehicle: ticket.has_vehicle,
            vehicle_type: vehicle_info
                .as_ref()
                .map(|v| v.vehicle_type.clone())
                .unwrap_or_default(),
            status: BookingStatus::Active,
            shipping_line: ticket.shipping_line.clone(),
            // Locations stand in for ports until port data exists upstream.
            departure_port: ticket.departure_location.clone(),
            arrival_port: ticket.arrival_location.clone(),
            payment: ticket.total_fare,
            is_paid: true,
            booking_date: now.format("%B %e, %Y").to_string(),
            is_round_trip: false,
            passenger_details: ticket.passengers.clone(),
            vehicle_info,
            created_utc: now,
        }
    }
}
