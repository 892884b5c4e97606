use rand::{distributions::Alphanumeric, Rng};

pub mod availability_service;
pub mod capacity_service;
pub mod circuit_booking_service;
pub mod error;
pub mod email_service;
pub mod excursion_booking_service;
pub mod payment_sync_service;
pub mod pricing_service;
pub mod promotion_service;
pub mod rental_booking_service;
pub mod transitions;

/// Human-facing booking reference, e.g. "RNT-K7Q2M9DX". Not an identity —
/// the ObjectId is — just something a customer can read over the phone.
pub fn new_reference(prefix: &str) -> String {
    let tail: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(8)
        .map(char::from)
        .collect();
    format!("{}-{}", prefix, tail.to_uppercase())
}
