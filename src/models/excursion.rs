use mongodb::bson::{oid::ObjectId, DateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Excursion {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub duration_days: u16,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_seat: Decimal,
    /// Seats the operator can take in total.
    pub total_capacity: i32,
    /// Seats currently held by pending/confirmed bookings.
    pub booked_seats: i32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}

impl Excursion {
    pub fn remaining_seats(&self) -> i32 {
        (self.total_capacity - self.booked_seats).max(0)
    }
}
