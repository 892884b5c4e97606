use mongodb::bson::{doc, oid::ObjectId, DateTime};
use mongodb::{Client, Collection};

use crate::models::booking::RentalBooking;
use crate::services::error::BookingError;

/// Overlap gate against double-booking a vehicle. Only confirmed and active
/// bookings block; pending and canceled never do. The check is advisory:
/// there is no lock between this read and the booking insert.
pub struct AvailabilityService {
    bookings: Collection<RentalBooking>,
}

impl AvailabilityService {
    pub fn new(client: &Client) -> Self {
        Self {
            bookings: client.database("Bookings").collection("Rentals"),
        }
    }

    pub async fn is_vehicle_available(
        &self,
        vehicle_id: ObjectId,
        start: DateTime,
        end: DateTime,
    ) -> Result<bool, BookingError> {
        // Inclusive on both boundaries: a booking ending the day a new one
        // starts still blocks (no same-day turnover).
        let filter = doc! {
            "vehicle_id": vehicle_id,
            "status": { "$in": ["confirmed", "active"] },
            "start_date": { "$lte": end },
            "end_date": { "$gte": start },
        };

        let blocking = self.bookings.count_documents(filter).await?;
        Ok(blocking == 0)
    }
}
