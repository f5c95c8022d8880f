//! E-ticket: the canonical record of a paid booking.

use chrono::{DateTime, Utc};
use mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub name: String,
    pub contact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleDetail {
    pub plate_number: String,
    pub car_type: String,
    pub vehicle_owner: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Active,
    Used,
    Cancelled,
}

impl TicketStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Used => "used",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Created once per purchase; immutable afterwards except for `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Eticket {
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
    /// Serialized as a decimal string with 2 dp.
    pub total_fare: Decimal,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_utc: DateTime<Utc>,
}

impl Eticket {
    pub fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    pub fn passenger_count(&self) -> i32 {
        self.passengers.len() as i32
    }

    /// Vehicles only count when the booking carries one.
    pub fn vehicle_count(&self) -> i32 {
        if self.has_vehicle {
            self.vehicle_detail.len() as i32
        } else {
            0
        }
    }
}
