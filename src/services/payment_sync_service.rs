use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::{Client, Collection};
use rust_decimal::Decimal;

use crate::models::booking::RentalBooking;
use crate::models::circuit_booking::CircuitBooking;
use crate::models::excursion_booking::ExcursionBooking;
use crate::models::payment::{BookingKind, Payment, PaymentStatus};
use crate::services::error::BookingError;

/// Bridge from payment-provider state changes to booking state. This is the
/// only path that moves a booking automatically based on money received:
/// Paid marks the booking paid and advances Pending -> Confirmed, Refunded
/// marks it refunded, anything else leaves the booking alone.
///
/// Webhook delivery is at-least-once, so every branch is a status-only $set
/// that can be replayed; a second Paid event re-stamps paid_at and nothing
/// else.
pub struct PaymentSyncService {
    payments: Collection<Payment>,
    rentals: Collection<RentalBooking>,
    circuits: Collection<CircuitBooking>,
    excursions: Collection<ExcursionBooking>,
}

impl PaymentSyncService {
    pub fn new(client: &Client) -> Self {
        Self {
            payments: client.database("Billing").collection("Payments"),
            rentals: client.database("Bookings").collection("Rentals"),
            circuits: client.database("Bookings").collection("Circuits"),
            excursions: client.database("Bookings").collection("Excursions"),
        }
    }

    /// Record a pending payment for a booking, correlated to the provider by
    /// `transaction_id`.
    pub async fn record_payment(
        &self,
        booking_id: ObjectId,
        booking_kind: BookingKind,
        amount: Decimal,
        currency: &str,
        method: &str,
        transaction_id: Option<String>,
    ) -> Result<Payment, BookingError> {
        let now = bson::DateTime::now();
        let mut payment = Payment {
            id: None,
            booking_id,
            booking_kind,
            amount,
            currency: currency.to_string(),
            status: PaymentStatus::Pending,
            method: method.to_string(),
            transaction_id,
            paid_at: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        let insert_result = self.payments.insert_one(&payment).await?;
        payment.id = insert_result.inserted_id.as_object_id();
        Ok(payment)
    }

    pub async fn sync(
        &self,
        payment_id: ObjectId,
        new_status: PaymentStatus,
    ) -> Result<Payment, BookingError> {
        let payment = self
            .payments
            .find_one(doc! { "_id": payment_id })
            .await?
            .ok_or_else(|| BookingError::NotFound("Payment".to_string()))?;

        let now = bson::DateTime::now();
        let mut update = doc! {
            "status": new_status.as_str(),
            "updated_at": now,
        };
        if new_status == PaymentStatus::Paid {
            update.insert("paid_at", now);
        }
        let payment = self
            .payments
            .find_one_and_update(doc! { "_id": payment_id }, doc! { "$set": update })
            .return_document(mongodb::options::ReturnDocument::After)
            .await?
            .ok_or_else(|| BookingError::NotFound("Payment".to_string()))?;

        if let Some(effect) = booking_effect(new_status) {
            self.set_booking_payment_state(&payment, effect.payment_state)
                .await?;
            if effect.advances_pending {
                self.advance_pending_booking(&payment).await?;
            }
        }

        Ok(payment)
    }

    /// Webhook entry point: the provider only knows its own transaction id.
    pub async fn sync_by_transaction(
        &self,
        transaction_id: &str,
        new_status: PaymentStatus,
    ) -> Result<Payment, BookingError> {
        let payment = self
            .payments
            .find_one(doc! { "transaction_id": transaction_id })
            .await?
            .ok_or_else(|| BookingError::NotFound("Payment".to_string()))?;
        let payment_id = payment
            .id
            .ok_or_else(|| BookingError::NotFound("Payment".to_string()))?;
        self.sync(payment_id, new_status).await
    }

    // Advance a pending booking to confirmed; any other status stays.
    async fn advance_pending_booking(&self, payment: &Payment) -> Result<(), BookingError> {
        let filter = doc! { "_id": payment.booking_id, "status": "pending" };
        let update = doc! { "$set": {
            "status": "confirmed",
            "updated_at": bson::DateTime::now(),
        }};
        match payment.booking_kind {
            BookingKind::Rental => {
                self.rentals.update_one(filter, update).await?;
            }
            BookingKind::Circuit => {
                self.circuits.update_one(filter, update).await?;
            }
            BookingKind::Excursion => {
                self.excursions.update_one(filter, update).await?;
            }
        }
        Ok(())
    }

    async fn set_booking_payment_state(
        &self,
        payment: &Payment,
        state: &str,
    ) -> Result<(), BookingError> {
        let filter = doc! { "_id": payment.booking_id };
        let update = doc! { "$set": {
            "payment_state": state,
            "updated_at": bson::DateTime::now(),
        }};
        let result = match payment.booking_kind {
            BookingKind::Rental => self.rentals.update_one(filter, update).await?,
            BookingKind::Circuit => self.circuits.update_one(filter, update).await?,
            BookingKind::Excursion => self.excursions.update_one(filter, update).await?,
        };
        if result.matched_count == 0 {
            return Err(BookingError::NotFound("Booking".to_string()));
        }
        Ok(())
    }
}

/// What a payment status change does to the owning booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct BookingEffect {
    payment_state: &'static str,
    advances_pending: bool,
}

fn booking_effect(status: PaymentStatus) -> Option<BookingEffect> {
    match status {
        PaymentStatus::Paid => Some(BookingEffect {
            payment_state: "paid",
            advances_pending: true,
        }),
        PaymentStatus::Refunded => Some(BookingEffect {
            payment_state: "refunded",
            advances_pending: false,
        }),
        // Pending and Failed never touch the booking.
        PaymentStatus::Pending | PaymentStatus::Failed => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paid_marks_paid_and_advances_pending_bookings() {
        let effect = booking_effect(PaymentStatus::Paid).unwrap();
        assert_eq!(effect.payment_state, "paid");
        assert!(effect.advances_pending);
    }

    #[test]
    fn refunded_marks_refunded_without_advancing() {
        let effect = booking_effect(PaymentStatus::Refunded).unwrap();
        assert_eq!(effect.payment_state, "refunded");
        assert!(!effect.advances_pending);
    }

    #[test]
    fn pending_and_failed_leave_the_booking_alone() {
        assert_eq!(booking_effect(PaymentStatus::Pending), None);
        assert_eq!(booking_effect(PaymentStatus::Failed), None);
    }

    #[test]
    fn replayed_paid_events_apply_the_same_effect() {
        // At-least-once webhook delivery: a second Paid event re-applies an
        // identical status-only effect, and the pending->confirmed advance
        // is filtered on the booking still being pending, so nothing moves
        // twice.
        assert_eq!(
            booking_effect(PaymentStatus::Paid),
            booking_effect(PaymentStatus::Paid)
        );
    }
}
