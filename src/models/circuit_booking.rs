use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::booking::PaymentState;
use crate::models::pricing::PricingSnapshot;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CircuitStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl CircuitStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitStatus::Pending => "pending",
            CircuitStatus::Confirmed => "confirmed",
            CircuitStatus::Completed => "completed",
            CircuitStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, CircuitStatus::Completed | CircuitStatus::Cancelled)
    }
}

/// A booking on a fixed-route circuit departure. Guests without an account
/// are identified by `contact_email` only; `customer_id` stays empty and the
/// email is correlated at read time.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CircuitBooking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    pub circuit_id: ObjectId,
    pub departure_date: DateTime,
    pub number_of_people: u32,
    pub status: CircuitStatus,
    pub payment_state: PaymentState,
    pub pricing: PricingSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}
