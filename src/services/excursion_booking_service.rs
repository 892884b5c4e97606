use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::{Client, Collection};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::booking::PaymentState;
use crate::models::excursion_booking::{ExcursionBooking, ExcursionStatus};
use crate::services::capacity_service::CapacityService;
use crate::services::circuit_booking_service::Actor;
use crate::services::email_service::EmailService;
use crate::services::error::BookingError;
use crate::services::new_reference;
use crate::services::pricing_service::{PricingConfig, PricingService};
use crate::services::promotion_service::PromotionService;
use crate::services::transitions::{excursion_transitions, TransitionTable};

#[derive(Debug, Deserialize)]
pub struct CreateExcursionBooking {
    pub excursion_id: String,
    pub departure_date: DateTime<Utc>,
    pub number_of_seats: i32,
    /// Required for guests; ignored when the caller is authenticated.
    pub contact_email: Option<String>,
    pub notes: Option<String>,
    pub promo_code: Option<String>,
}

pub struct ExcursionBookingService {
    bookings: Collection<ExcursionBooking>,
    capacity: CapacityService,
    promotions: PromotionService,
    pricing: PricingConfig,
    transitions: TransitionTable<ExcursionStatus>,
    mailer: Option<EmailService>,
}

impl ExcursionBookingService {
    pub fn new(client: &Client, pricing: PricingConfig, mailer: Option<EmailService>) -> Self {
        Self {
            bookings: client.database("Bookings").collection("Excursions"),
            capacity: CapacityService::new(client),
            promotions: PromotionService::new(client),
            pricing,
            transitions: excursion_transitions(),
            mailer,
        }
    }

    /// Create an excursion booking. Seats are debited from the excursion
    /// first, then the booking document is inserted — two writes, not a
    /// transaction; a crash in between leaves seats held with no booking.
    pub async fn create(
        &self,
        actor: Option<Actor>,
        input: CreateExcursionBooking,
    ) -> Result<ExcursionBooking, BookingError> {
        let excursion_id = ObjectId::parse_str(&input.excursion_id)
            .map_err(|_| BookingError::NotFound("Excursion".to_string()))?;

        let (customer_id, contact_email) = identify(&actor, input.contact_email.clone())?;

        let excursion = self
            .capacity
            .reserve_seats(excursion_id, input.number_of_seats)
            .await?;

        let seats = input.number_of_seats as u32;
        let base = PricingService::quote_seats(
            excursion.price_per_seat,
            seats,
            Decimal::ZERO,
            &self.pricing,
        );
        let discount = match input.promo_code.as_deref() {
            Some(code) if !code.trim().is_empty() => {
                match self.promotions.calculate_discount(code, base.subtotal).await {
                    Ok(discount) => discount,
                    Err(err) => {
                        // Seats were already debited; give them back before
                        // surfacing the rejected code.
                        self.capacity
                            .release_seats(excursion_id, input.number_of_seats)
                            .await?;
                        return Err(err);
                    }
                }
            }
            _ => Decimal::ZERO,
        };
        let pricing =
            PricingService::quote_seats(excursion.price_per_seat, seats, discount, &self.pricing);

        let now = bson::DateTime::now();
        let mut booking = ExcursionBooking {
            id: None,
            reference: new_reference("EXC"),
            customer_id,
            contact_email: contact_email.clone(),
            excursion_id,
            departure_date: bson::DateTime::from_chrono(input.departure_date),
            number_of_seats: input.number_of_seats,
            status: ExcursionStatus::Pending,
            payment_state: PaymentState::Unpaid,
            pricing,
            promo_code: input.promo_code.clone(),
            notes: input.notes,
            created_at: Some(now),
            updated_at: Some(now),
        };

        let insert_result = self.bookings.insert_one(&booking).await?;
        booking.id = insert_result.inserted_id.as_object_id();

        if discount > Decimal::ZERO {
            if let Some(code) = input.promo_code.as_deref() {
                self.promotions.redeem(code).await?;
            }
        }

        self.notify_confirmation(&booking, actor.as_ref()).await;
        Ok(booking)
    }

    /// Customer cancellation: allowed while pending or confirmed. Seats go
    /// back to the excursion before the status write so a crash cannot lose
    /// the release.
    pub async fn cancel(
        &self,
        booking_id: ObjectId,
        actor: &Actor,
    ) -> Result<ExcursionBooking, BookingError> {
        let booking = self.find(booking_id).await?;
        ensure_owner(&booking, actor)?;
        self.transitions
            .check(booking.status, ExcursionStatus::Cancelled, |s| s.as_str())?;

        self.release_if_held(&booking).await?;
        let cancelled = self
            .persist_status(booking_id, ExcursionStatus::Cancelled)
            .await?;
        self.notify_cancellation(&cancelled, actor).await;
        Ok(cancelled)
    }

    pub async fn update_status(
        &self,
        booking_id: ObjectId,
        new_status: ExcursionStatus,
    ) -> Result<ExcursionBooking, BookingError> {
        let booking = self.find(booking_id).await?;
        self.transitions
            .check(booking.status, new_status, |s| s.as_str())?;

        if new_status == ExcursionStatus::Cancelled {
            self.release_if_held(&booking).await?;
        }
        self.persist_status(booking_id, new_status).await
    }

    pub async fn get_for_actor(
        &self,
        booking_id: ObjectId,
        actor: &Actor,
    ) -> Result<ExcursionBooking, BookingError> {
        let booking = self.find(booking_id).await?;
        ensure_owner(&booking, actor)?;
        Ok(booking)
    }

    pub async fn list_for_actor(
        &self,
        actor: &Actor,
    ) -> Result<Vec<ExcursionBooking>, BookingError> {
        let filter = match ObjectId::parse_str(&actor.user_id) {
            Ok(id) => doc! { "$or": [
                { "customer_id": id },
                { "contact_email": actor.email.to_lowercase() },
            ]},
            Err(_) => doc! { "contact_email": actor.email.to_lowercase() },
        };
        let cursor = self.bookings.find(filter).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn list_all(&self) -> Result<Vec<ExcursionBooking>, BookingError> {
        let cursor = self.bookings.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn release_if_held(&self, booking: &ExcursionBooking) -> Result<(), BookingError> {
        if booking.status.holds_seats() {
            self.capacity
                .release_seats(booking.excursion_id, booking.number_of_seats)
                .await?;
        }
        Ok(())
    }

    async fn find(&self, booking_id: ObjectId) -> Result<ExcursionBooking, BookingError> {
        self.bookings
            .find_one(doc! { "_id": booking_id })
            .await?
            .ok_or_else(|| BookingError::NotFound("Booking".to_string()))
    }

    async fn persist_status(
        &self,
        booking_id: ObjectId,
        status: ExcursionStatus,
    ) -> Result<ExcursionBooking, BookingError> {
        self.bookings
            .find_one_and_update(
                doc! { "_id": booking_id },
                doc! { "$set": {
                    "status": status.as_str(),
                    "updated_at": bson::DateTime::now(),
                }},
            )
            .return_document(mongodb::options::ReturnDocument::After)
            .await?
            .ok_or_else(|| BookingError::NotFound("Booking".to_string()))
    }

    async fn notify_confirmation(&self, booking: &ExcursionBooking, actor: Option<&Actor>) {
        let Some(mailer) = &self.mailer else { return };
        let to = actor
            .map(|a| a.email.clone())
            .or_else(|| booking.contact_email.clone());
        if let Some(to) = to {
            if let Err(err) = mailer
                .send_booking_confirmation(
                    &to,
                    &booking.reference,
                    &booking.pricing.total.to_string(),
                    &booking.pricing.currency,
                )
                .await
            {
                log::error!("Failed to send excursion booking confirmation: {}", err);
            }
        }
    }

    async fn notify_cancellation(&self, booking: &ExcursionBooking, actor: &Actor) {
        let Some(mailer) = &self.mailer else { return };
        if let Err(err) = mailer
            .send_cancellation_notice(&actor.email, &booking.reference)
            .await
        {
            log::error!("Failed to send excursion cancellation notice: {}", err);
        }
    }
}

fn identify(
    actor: &Option<Actor>,
    contact_email: Option<String>,
) -> Result<(Option<ObjectId>, Option<String>), BookingError> {
    match actor {
        Some(actor) => {
            let id = ObjectId::parse_str(&actor.user_id)
                .map_err(|_| BookingError::NotFound("Customer".to_string()))?;
            Ok((Some(id), Some(actor.email.to_lowercase())))
        }
        None => {
            let email = contact_email
                .map(|e| e.trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .ok_or(BookingError::AccessDenied)?;
            Ok((None, Some(email)))
        }
    }
}

fn ensure_owner(booking: &ExcursionBooking, actor: &Actor) -> Result<(), BookingError> {
    let by_id = booking
        .customer_id
        .map(|id| id.to_hex() == actor.user_id)
        .unwrap_or(false);
    let by_email = booking
        .contact_email
        .as_deref()
        .map(|e| e.eq_ignore_ascii_case(&actor.email))
        .unwrap_or(false);
    if by_id || by_email {
        Ok(())
    } else {
        Err(BookingError::AccessDenied)
    }
}
