use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::pricing::{BookingExtra, PricingSnapshot};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RentalStatus {
    Pending,
    Confirmed,
    Active,
    Completed,
    Canceled,
}

impl RentalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Confirmed => "confirmed",
            RentalStatus::Active => "active",
            RentalStatus::Completed => "completed",
            RentalStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RentalStatus::Completed | RentalStatus::Canceled)
    }
}

/// How much of the booking's total has been settled.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentState {
    Unpaid,
    Partial,
    Paid,
    Refunded,
}

impl PaymentState {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentState::Unpaid => "unpaid",
            PaymentState::Partial => "partial",
            PaymentState::Paid => "paid",
            PaymentState::Refunded => "refunded",
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DriverDetails {
    pub full_name: String,
    pub license_number: String,
    pub license_country: String,
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RentalBooking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reference: String,
    pub renter_id: ObjectId,
    pub vehicle_id: ObjectId,
    pub pickup_location_id: Option<ObjectId>,
    pub dropoff_location_id: Option<ObjectId>,
    pub start_date: DateTime,
    pub end_date: DateTime,
    pub status: RentalStatus,
    pub payment_state: PaymentState,
    pub pricing: PricingSnapshot,
    pub extras: Vec<BookingExtra>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<DriverDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}
