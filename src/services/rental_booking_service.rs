use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::{Client, Collection};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::models::booking::{DriverDetails, PaymentState, RentalBooking, RentalStatus};
use crate::models::pricing::BookingExtra;
use crate::models::vehicle::Vehicle;
use crate::services::availability_service::AvailabilityService;
use crate::services::email_service::EmailService;
use crate::services::error::BookingError;
use crate::services::new_reference;
use crate::services::pricing_service::{PricingConfig, PricingService};
use crate::services::promotion_service::PromotionService;
use crate::services::transitions::{rental_transitions, TransitionTable};

#[derive(Debug, Deserialize)]
pub struct CreateRentalBooking {
    pub vehicle_id: String,
    pub pickup_location_id: Option<String>,
    pub dropoff_location_id: Option<String>,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[serde(default)]
    pub extras: Vec<BookingExtra>,
    pub driver: Option<DriverDetails>,
    pub notes: Option<String>,
    pub promo_code: Option<String>,
}

pub struct RentalBookingService {
    vehicles: Collection<Vehicle>,
    bookings: Collection<RentalBooking>,
    availability: AvailabilityService,
    promotions: PromotionService,
    pricing: PricingConfig,
    transitions: TransitionTable<RentalStatus>,
    mailer: Option<EmailService>,
}

impl RentalBookingService {
    pub fn new(client: &Client, pricing: PricingConfig, mailer: Option<EmailService>) -> Self {
        Self {
            vehicles: client.database("Fleet").collection("Vehicles"),
            bookings: client.database("Bookings").collection("Rentals"),
            availability: AvailabilityService::new(client),
            promotions: PromotionService::new(client),
            pricing,
            transitions: rental_transitions(),
            mailer,
        }
    }

    /// Create a rental booking: date validation, bookability, the overlap
    /// gate, promo discount, then the priced insert. The availability check
    /// and the insert are two separate operations against the store; two
    /// racing creates for the same range can both pass the gate.
    pub async fn create(
        &self,
        renter_id: &str,
        renter_email: &str,
        input: CreateRentalBooking,
    ) -> Result<RentalBooking, BookingError> {
        let renter_id = ObjectId::parse_str(renter_id)
            .map_err(|_| BookingError::NotFound("Renter".to_string()))?;
        let vehicle_id = ObjectId::parse_str(&input.vehicle_id)
            .map_err(|_| BookingError::NotFound("Vehicle".to_string()))?;

        // Reject bad ranges before touching the store.
        let _ = PricingService::rental_days(input.start_date, input.end_date)?;

        let vehicle = self
            .vehicles
            .find_one(doc! { "_id": vehicle_id })
            .await?
            .ok_or_else(|| BookingError::NotFound("Vehicle".to_string()))?;
        if !vehicle.active {
            return Err(BookingError::ItemNotBookable);
        }

        let start = bson::DateTime::from_chrono(input.start_date);
        let end = bson::DateTime::from_chrono(input.end_date);
        if !self
            .availability
            .is_vehicle_available(vehicle_id, start, end)
            .await?
        {
            return Err(BookingError::ItemNotAvailable);
        }

        // Discount needs the pre-discount subtotal for the minimum check.
        let base = PricingService::quote_rental(
            vehicle.daily_rate,
            input.start_date,
            input.end_date,
            &input.extras,
            Decimal::ZERO,
            vehicle.deposit,
            &self.pricing,
        )?;
        let discount = match input.promo_code.as_deref() {
            Some(code) if !code.trim().is_empty() => {
                self.promotions.calculate_discount(code, base.subtotal).await?
            }
            _ => Decimal::ZERO,
        };
        let pricing = PricingService::quote_rental(
            vehicle.daily_rate,
            input.start_date,
            input.end_date,
            &input.extras,
            discount,
            vehicle.deposit,
            &self.pricing,
        )?;

        let now = bson::DateTime::now();
        let mut booking = RentalBooking {
            id: None,
            reference: new_reference("RNT"),
            renter_id,
            vehicle_id,
            pickup_location_id: parse_optional_id(input.pickup_location_id.as_deref()),
            dropoff_location_id: parse_optional_id(input.dropoff_location_id.as_deref()),
            start_date: start,
            end_date: end,
            status: RentalStatus::Pending,
            payment_state: PaymentState::Unpaid,
            pricing,
            extras: input.extras,
            driver: input.driver,
            notes: input.notes,
            promo_code: input.promo_code.clone(),
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

        if let Some(mailer) = &self.mailer {
            if let Err(err) = mailer
                .send_booking_confirmation(
                    renter_email,
                    &booking.reference,
                    &booking.pricing.total.to_string(),
                    &booking.pricing.currency,
                )
                .await
            {
                log::error!("Failed to send booking confirmation email: {}", err);
            }
        }

        Ok(booking)
    }

    /// Customer cancellation: allowed from any non-terminal state, always
    /// lands in Canceled.
    pub async fn cancel(
        &self,
        booking_id: ObjectId,
        actor_id: &str,
        actor_email: &str,
    ) -> Result<RentalBooking, BookingError> {
        let booking = self.find(booking_id).await?;
        if booking.renter_id.to_hex() != actor_id {
            return Err(BookingError::AccessDenied);
        }
        self.transitions
            .check(booking.status, RentalStatus::Canceled, |s| s.as_str())?;

        let cancelled = self.persist_status(booking_id, RentalStatus::Canceled).await?;

        if let Some(mailer) = &self.mailer {
            if let Err(err) = mailer
                .send_cancellation_notice(actor_email, &cancelled.reference)
                .await
            {
                log::error!("Failed to send cancellation notice: {}", err);
            }
        }

        Ok(cancelled)
    }

    /// Admin status update, gated by the same transition table.
    pub async fn update_status(
        &self,
        booking_id: ObjectId,
        new_status: RentalStatus,
    ) -> Result<RentalBooking, BookingError> {
        let booking = self.find(booking_id).await?;
        self.transitions
            .check(booking.status, new_status, |s| s.as_str())?;

        self.persist_status(booking_id, new_status).await
    }

    pub async fn get_for_actor(
        &self,
        booking_id: ObjectId,
        actor_id: &str,
    ) -> Result<RentalBooking, BookingError> {
        let booking = self.find(booking_id).await?;
        if booking.renter_id.to_hex() != actor_id {
            return Err(BookingError::AccessDenied);
        }
        Ok(booking)
    }

    pub async fn list_for_renter(
        &self,
        renter_id: &str,
    ) -> Result<Vec<RentalBooking>, BookingError> {
        let renter_id = ObjectId::parse_str(renter_id)
            .map_err(|_| BookingError::NotFound("Renter".to_string()))?;
        let cursor = self.bookings.find(doc! { "renter_id": renter_id }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn list_all(&self) -> Result<Vec<RentalBooking>, BookingError> {
        let cursor = self.bookings.find(doc! {}).await?;
        Ok(cursor.try_collect().await?)
    }

    async fn find(&self, booking_id: ObjectId) -> Result<RentalBooking, BookingError> {
        self.bookings
            .find_one(doc! { "_id": booking_id })
            .await?
            .ok_or_else(|| BookingError::NotFound("Booking".to_string()))
    }

    async fn persist_status(
        &self,
        booking_id: ObjectId,
        status: RentalStatus,
    ) -> Result<RentalBooking, BookingError> {
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
}

fn parse_optional_id(id: Option<&str>) -> Option<ObjectId> {
    id.and_then(|s| ObjectId::parse_str(s).ok())
}
