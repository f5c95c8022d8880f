use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{ActiveBooking, BookingStatus, Passenger, VehicleInfo};

#[derive(Debug, Serialize)]
pub struct ActiveBookingResponse {
    pub user_id: String,
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
    pub payment: Decimal,
    pub is_paid: bool,
    pub booking_date: String,
    pub is_round_trip: bool,
    pub passenger_details: Vec<Passenger>,
    pub vehicle_info: Option<VehicleInfo>,
    pub created_utc: DateTime<Utc>,
}

impl From<ActiveBooking> for ActiveBookingResponse {
    fn from(booking: ActiveBooking) -> Self {
        Self {
            user_id: booking.user_id,
            booking_id: booking.booking_id,
            departure_location: booking.departure_location,
            arrival_location: booking.arrival_location,
            depart_date: booking.depart_date,
            depart_time: booking.depart_time,
            arrive_date: booking.arrive_date,
            arrive_time: booking.arrive_time,
            passengers: booking.passengers,
            has_vehicle: booking.has_vehicle,
            vehicle_type: booking.vehicle_type,
            status: booking.status,
            shipping_line: booking.shipping_line,
            departure_port: booking.departure_port,
            arrival_port: booking.arrival_port,
            payment: booking.payment,
            is_paid: booking.is_paid,
            booking_date: booking.booking_date,
            is_round_trip: booking.is_round_trip,
            passenger_details: booking.passenger_details,
            vehicle_info: booking.vehicle_info,
            created_utc: booking.created_utc,
        }
    }
}
