pub mod booking;
pub mod circuit;
pub mod circuit_booking;
pub mod excursion;
pub mod excursion_booking;
pub mod location;
pub mod payment;
pub mod pricing;
pub mod promotion;
pub mod vehicle;
