use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::{Client, Collection};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::booking::PaymentState;
use crate::models::circuit::Circuit;
use crate::models::circuit_booking::{CircuitBooking, CircuitStatus};
use crate::services::email_service::EmailService;
use crate::services::error::BookingError;
use crate::services::new_reference;
use crate::services::pricing_service::{PricingConfig, PricingService};
use crate::services::promotion_service::PromotionService;
use crate::services::transitions::{circuit_transitions, TransitionTable};

#[derive(Debug, Deserialize)]
pub struct CreateCircuitBooking {
    pub circuit_id: String,
    pub departure_date: DateTime<Utc>,
    pub number_of_people: u32,
    /// Required for guests; ignored when the caller is authenticated.
    pub contact_email: Option<String>,
    pub notes: Option<String>,
    pub promo_code: Option<String>,
}

/// The authenticated caller, if any. Guest bookings carry only an email,
/// correlated at read time — the deliberate weak-reference fallback for
/// customers without an account.
#[derive(Debug, Clone)]
pub struct Actor {
    pub user_id: String,
    pub email: String,
}

pub struct CircuitBookingService {
    circuits: Collection<Circuit>,
    bookings: Collection<CircuitBooking>,
    promotions: PromotionService,
    pricing: PricingConfig,
    transitions: TransitionTable<CircuitStatus>,
    mailer: Option<EmailService>,
}

impl CircuitBookingService {
    pub fn new(client: &Client, pricing: PricingConfig, mailer: Option<EmailService>) -> Self {
        Self {
            circuits: client.database("Tours").collection("Circuits"),
            bookings: client.database("Bookings").collection("Circuits"),
            promotions: PromotionService::new(client),
            pricing,
            transitions: circuit_transitions(),
            mailer,
        }
    }

    pub async fn create(
        &self,
        actor: Option<Actor>,
        input: CreateCircuitBooking,
    ) -> Result<CircuitBooking, BookingError> {
        let circuit_id = ObjectId::parse_str(&input.circuit_id)
            .map_err(|_| BookingError::NotFound("Circuit".to_string()))?;
        if input.number_of_people < 1 {
            return Err(BookingError::ItemNotBookable);
        }

        let circuit = self
            .circuits
            .find_one(doc! { "_id": circuit_id })
            .await?
            .ok_or_else(|| BookingError::NotFound("Circuit".to_string()))?;
        if !circuit.active {
            return Err(BookingError::ItemNotBookable);
        }

        let (customer_id, contact_email) = identify(&actor, input.contact_email.clone())?;

        let base = PricingService::quote_seats(
            circuit.price_per_person,
            input.number_of_people,
            Decimal::ZERO,
            &self.pricing,
        );
        let discount = match input.promo_code.as_deref() {
            Some(code) if !code.trim().is_empty() => {
                self.promotions.calculate_discount(code, base.subtotal).await?
            }
            _ => Decimal::ZERO,
        };
        let pricing = PricingService::quote_seats(
            circuit.price_per_person,
            input.number_of_people,
            discount,
            &self.pricing,
        );

        let now = bson::DateTime::now();
        let mut booking = CircuitBooking {
            id: None,
            reference: new_reference("CIR"),
            customer_id,
            contact_email: contact_email.clone(),
            circuit_id,
            departure_date: bson::DateTime::from_chrono(input.departure_date),
            number_of_people: input.number_of_people,
            status: CircuitStatus::Pending,
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

    /// Customer cancellation: circuits only allow it while still pending.
    pub async fn cancel(
        &self,
        booking_id: ObjectId,
        actor: &Actor,
    ) -> Result<CircuitBooking, BookingError> {
        let booking = self.find(booking_id).await?;
        ensure_owner(&booking, actor)?;
        self.transitions
            .check(booking.status, CircuitStatus::Cancelled, |s| s.as_str())?;

        let cancelled = self.persist_status(booking_id, CircuitStatus::Cancelled).await?;
        self.notify_cancellation(&cancelled, actor).await;
        Ok(cancelled)
    }

    pub async fn update_status(
        &self,
        booking_id: ObjectId,
        new_status: CircuitStatus,
    ) -> Result<CircuitBooking, BookingError> {
        let booking = self.find(booking_id).await?;
        self.transitions
            .check(booking.status, new_status, |s| s.as_str())?;

        self.persist_status(booking_id, new_status).await
    }

    pub async fn get_for_actor(
        &self,
        booking_id: ObjectId,
        actor: &Actor,
    ) -> Result<CircuitBooking, BookingError> {
        let booking = self.find(booking_id).await?;
        ensure_owner(&booking, actor)?;
        Ok(booking)
    }

    pub async fn list_for_actor(&self, actor: &Actor) -> Result<Vec<CircuitBooking>, BookingError> {
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

    pub async fn list_all(&self) -> Result<Vec<CircuitBooking>, BookingError> {
        let cursor = self.bookings.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find(&self, booking_id: ObjectId) -> Result<CircuitBooking, BookingError> {
        self.bookings
            .find_one(doc! { "_id": booking_id })
            .await?
            .ok_or_else(|| BookingError::NotFound("Booking".to_string()))
    }

    async fn persist_status(
        &self,
        booking_id: ObjectId,
        status: CircuitStatus,
    ) -> Result<CircuitBooking, BookingError> {
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

    async fn notify_confirmation(&self, booking: &CircuitBooking, actor: Option<&Actor>) {
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
                log::error!("Failed to send circuit booking confirmation: {}", err);
            }
        }
    }

    async fn notify_cancellation(&self, booking: &CircuitBooking, actor: &Actor) {
        let Some(mailer) = &self.mailer else { return };
        if let Err(err) = mailer
            .send_cancellation_notice(&actor.email, &booking.reference)
            .await
        {
            log::error!("Failed to send circuit cancellation notice: {}", err);
        }
    }
}

/// Resolve who owns the new booking: an account id when authenticated,
/// otherwise the guest's contact email.
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

fn ensure_owner(booking: &CircuitBooking, actor: &Actor) -> Result<(), BookingError> {
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
