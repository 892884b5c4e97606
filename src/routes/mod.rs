use actix_web::HttpResponse;
use serde_json::json;

use crate::services::error::BookingError;

pub mod admin;
pub mod circuit;
pub mod circuit_booking;
pub mod excursion;
pub mod excursion_booking;
pub mod health;
pub mod location;
pub mod payment;
pub mod promotion;
pub mod rental_booking;
pub mod vehicle;

/// The single place business errors turn into HTTP statuses. The services
/// never see status codes; the handlers never invent error kinds.
pub fn error_response(err: BookingError) -> HttpResponse {
    let (code, builder) = match &err {
        BookingError::InvalidDateRange => ("invalid_date_range", HttpResponse::BadRequest()),
        BookingError::SeatsLimitExceeded(_) => {
            ("seats_limit_exceeded", HttpResponse::BadRequest())
        }
        BookingError::CapacityInvalid(_) => ("capacity_invalid", HttpResponse::BadRequest()),
        BookingError::PromoCodeInvalid(_) => ("promo_code_invalid", HttpResponse::BadRequest()),
        BookingError::AccessDenied => ("access_denied", HttpResponse::Forbidden()),
        BookingError::NotFound(_) => ("not_found", HttpResponse::NotFound()),
        BookingError::ItemNotAvailable => ("item_not_available", HttpResponse::Conflict()),
        BookingError::ItemNotBookable => ("item_not_bookable", HttpResponse::Conflict()),
        BookingError::CapacityExceeded { .. } => ("capacity_exceeded", HttpResponse::Conflict()),
        BookingError::StatusTransitionNotAllowed { .. } => {
            ("status_transition_not_allowed", HttpResponse::Conflict())
        }
        BookingError::Database(_) | BookingError::Provider(_) => {
            log::error!("Infrastructure failure: {}", err);
            ("internal_error", HttpResponse::InternalServerError())
        }
    };

    let mut builder = builder;
    builder.json(json!({
        "error": code,
        "message": err.to_string(),
    }))
}
