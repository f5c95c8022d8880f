//! Sailing schedule with live booking counters.

use serde::{Deserialize, Serialize};

/// A scheduled sailing. The booked counters only ever increase, through the
/// capacity store's atomic increment; there is no decrement path and no
/// upper-bound enforcement (capacity fields are carried for display).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    pub schedcde: String,
    pub departure_location: String,
    pub arrival_location: String,
    pub depart_date: String,
    pub depart_time: String,
    pub arrive_date: String,
    pub arrive_time: String,
    pub shipping_line: String,
    pub passenger_capacity: i32,
    pub vehicle_capacity: i32,
    pub passenger_booked: i32,
    pub vehicle_booked: i32,
}
