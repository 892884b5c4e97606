use bson::{oid::ObjectId, DateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CircuitStop {
    pub name: String,
    pub day: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Circuit {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub description: String,
    pub stops: Vec<CircuitStop>,
    pub duration_days: u16,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_person: Decimal,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}
