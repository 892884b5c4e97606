use mongodb::bson::{oid::ObjectId, DateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Vehicle {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub category: String,
    pub seats: u8,
    pub transmission: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub daily_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub deposit: Decimal,
    pub pickup_location_ids: Vec<ObjectId>,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime>,
}
