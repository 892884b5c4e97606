use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

use crate::models::booking::PaymentState;
use crate::models::pricing::PricingSnapshot;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExcursionStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl ExcursionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExcursionStatus::Pending => "pending",
            ExcursionStatus::Confirmed => "confirmed",
            ExcursionStatus::Completed => "completed",
            ExcursionStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExcursionStatus::Completed | ExcursionStatus::Cancelled)
    }

    /// Pending and confirmed bookings hold seats on the excursion;
    /// cancelling from one of these states must give them back.
    pub fn holds_seats(&self) -> bool {
        matches!(self, ExcursionStatus::Pending | ExcursionStatus::Confirmed)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ExcursionBooking {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<ObjectId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_email: Option<String>,
    pub excursion_id: ObjectId,
    pub departure_date: DateTime,
    pub number_of_seats: i32,
    pub status: ExcursionStatus,
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
