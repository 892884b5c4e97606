use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bookable add-on priced per day (GPS unit, child seat, extra driver...).
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BookingExtra {
    pub name: String,
    #[serde(with = "rust_decimal::serde::str")]
    pub price_per_day: Decimal,
    pub quantity: u32,
}

/// The price breakdown frozen onto a booking at creation time.
/// Re-pricing never mutates history: this is written once and read forever.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct PricingSnapshot {
    #[serde(with = "rust_decimal::serde::str")]
    pub rate: Decimal,
    pub days: i64,
    #[serde(with = "rust_decimal::serde::str")]
    pub extras_total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub subtotal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub discount: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub tax_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub taxes: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub fees: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub deposit: Decimal,
    pub currency: String,
}
