use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::{Client, Collection};

use crate::models::excursion::Excursion;
use crate::services::error::BookingError;

/// No single booking may hold more than this many seats.
pub const MAX_SEATS_PER_BOOKING: i32 = 10;

/// Booked-vs-total seat ledger kept on the excursion document itself.
pub struct CapacityService {
    excursions: Collection<Excursion>,
}

impl CapacityService {
    pub fn new(client: &Client) -> Self {
        Self {
            excursions: client.database("Tours").collection("Excursions"),
        }
    }

    /// Debit `seats` from the excursion. The pre-read produces the precise
    /// business error; the debit itself is a guarded single-document update,
    /// so two racing bookings cannot jointly overbook — the loser comes back
    /// as `CapacityExceeded`.
    pub async fn reserve_seats(
        &self,
        excursion_id: ObjectId,
        seats: i32,
    ) -> Result<Excursion, BookingError> {
        check_seat_limit(seats)?;

        let excursion = self
            .excursions
            .find_one(doc! { "_id": excursion_id })
            .await?
            .ok_or_else(|| BookingError::NotFound("Excursion".to_string()))?;

        if !excursion.active {
            return Err(BookingError::ItemNotBookable);
        }
        let remaining = excursion.remaining_seats();
        check_remaining(seats, remaining)?;

        let filter = doc! {
            "_id": excursion_id,
            "$expr": {
                "$lte": [ { "$add": ["$booked_seats", seats] }, "$total_capacity" ]
            },
        };
        let updated = self
            .excursions
            .find_one_and_update(filter, doc! { "$inc": { "booked_seats": seats } })
            .return_document(mongodb::options::ReturnDocument::After)
            .await?;

        updated.ok_or(BookingError::CapacityExceeded {
            requested: seats,
            remaining,
        })
    }

    /// Credit seats back on cancellation. Floored at zero so a double
    /// release can never drive the ledger negative.
    pub async fn release_seats(
        &self,
        excursion_id: ObjectId,
        seats: i32,
    ) -> Result<(), BookingError> {
        let pipeline: Vec<Document> = vec![doc! {
            "$set": {
                "booked_seats": {
                    "$max": [0, { "$subtract": ["$booked_seats", seats] }]
                }
            }
        }];
        self.excursions
            .update_one(doc! { "_id": excursion_id }, pipeline)
            .await?;
        Ok(())
    }

    /// Admin resize. Shrinking below the seats already sold would invalidate
    /// existing bookings, so that is rejected outright.
    pub async fn update_capacity(
        &self,
        excursion_id: ObjectId,
        new_total: i32,
    ) -> Result<Excursion, BookingError> {
        if new_total < 0 {
            return Err(BookingError::CapacityInvalid(
                "total capacity cannot be negative".to_string(),
            ));
        }

        let excursion = self
            .excursions
            .find_one(doc! { "_id": excursion_id })
            .await?
            .ok_or_else(|| BookingError::NotFound("Excursion".to_string()))?;

        if new_total < excursion.booked_seats {
            return Err(BookingError::CapacityInvalid(format!(
                "total capacity {} is below the {} seats already booked",
                new_total, excursion.booked_seats
            )));
        }

        let updated = self
            .excursions
            .find_one_and_update(
                doc! { "_id": excursion_id },
                doc! { "$set": { "total_capacity": new_total } },
            )
            .return_document(mongodb::options::ReturnDocument::After)
            .await?
            .ok_or_else(|| BookingError::NotFound("Excursion".to_string()))?;

        Ok(updated)
    }
}

/// The arithmetic `release_seats` runs inside the database; keep the two in
/// lockstep.
pub fn seats_after_release(booked: i32, released: i32) -> i32 {
    (booked - released).max(0)
}

fn check_seat_limit(seats: i32) -> Result<(), BookingError> {
    if seats < 1 || seats > MAX_SEATS_PER_BOOKING {
        return Err(BookingError::SeatsLimitExceeded(MAX_SEATS_PER_BOOKING));
    }
    Ok(())
}

fn check_remaining(seats: i32, remaining: i32) -> Result<(), BookingError> {
    if remaining <= 0 || seats > remaining {
        return Err(BookingError::CapacityExceeded {
            requested: seats,
            remaining,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_booking_seat_limit() {
        assert!(check_seat_limit(1).is_ok());
        assert!(check_seat_limit(MAX_SEATS_PER_BOOKING).is_ok());
        assert!(matches!(
            check_seat_limit(MAX_SEATS_PER_BOOKING + 1),
            Err(BookingError::SeatsLimitExceeded(_))
        ));
        assert!(check_seat_limit(0).is_err());
        assert!(check_seat_limit(-3).is_err());
    }

    #[test]
    fn capacity_check_against_remaining_seats() {
        // 10 total, 8 booked: 3 seats must be refused, 2 accepted
        assert!(matches!(
            check_remaining(3, 2),
            Err(BookingError::CapacityExceeded {
                requested: 3,
                remaining: 2
            })
        ));
        assert!(check_remaining(2, 2).is_ok());
        // a sold-out excursion refuses everything
        assert!(check_remaining(1, 0).is_err());
    }

    #[test]
    fn cancellation_gives_back_exactly_the_reserved_seats() {
        // 8 booked, a 2-seat booking reserved then cancelled: back to 8
        let after_reserve = 8 + 2;
        assert_eq!(seats_after_release(after_reserve, 2), 8);
    }

    #[test]
    fn release_floors_the_ledger_at_zero() {
        assert_eq!(seats_after_release(5, 3), 2);
        assert_eq!(seats_after_release(3, 3), 0);
        // a replayed release cannot drive the ledger negative
        assert_eq!(seats_after_release(0, 3), 0);
        assert_eq!(seats_after_release(1, 4), 0);
    }
}
