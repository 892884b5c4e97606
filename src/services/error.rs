use std::fmt;

/// Business errors of the booking core. Mapping to HTTP statuses happens at
/// the route boundary, never here.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingError {
    InvalidDateRange,
    ItemNotAvailable,
    ItemNotBookable,
    SeatsLimitExceeded(i32),
    CapacityExceeded { requested: i32, remaining: i32 },
    CapacityInvalid(String),
    StatusTransitionNotAllowed { from: String, to: String },
    PromoCodeInvalid(String),
    AccessDenied,
    NotFound(String),
    Database(String),
    Provider(String),
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BookingError::InvalidDateRange => {
                write!(f, "Start date must be strictly before end date")
            }
            BookingError::ItemNotAvailable => {
                write!(f, "Item is not available for the requested dates")
            }
            BookingError::ItemNotBookable => write!(f, "Item is not open for booking"),
            BookingError::SeatsLimitExceeded(max) => {
                write!(f, "A single booking may hold at most {} seats", max)
            }
            BookingError::CapacityExceeded {
                requested,
                remaining,
            } => write!(
                f,
                "Requested {} seats but only {} remain",
                requested, remaining
            ),
            BookingError::CapacityInvalid(msg) => write!(f, "Invalid capacity: {}", msg),
            BookingError::StatusTransitionNotAllowed { from, to } => {
                write!(f, "Cannot move booking from '{}' to '{}'", from, to)
            }
            BookingError::PromoCodeInvalid(msg) => write!(f, "Promo code rejected: {}", msg),
            BookingError::AccessDenied => write!(f, "You do not have access to this booking"),
            BookingError::NotFound(what) => write!(f, "{} not found", what),
            BookingError::Database(err) => write!(f, "Database error: {}", err),
            BookingError::Provider(err) => write!(f, "Payment provider error: {}", err),
        }
    }
}

impl std::error::Error for BookingError {}

impl From<mongodb::error::Error> for BookingError {
    fn from(err: mongodb::error::Error) -> Self {
        BookingError::Database(err.to_string())
    }
}
