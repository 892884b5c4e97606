use actix_web::{web, HttpRequest, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{str::FromStr, sync::Arc};
use stripe::{EventObject, EventType, Webhook};

use crate::middleware::auth::Claims;
use crate::models::payment::{BookingKind, PaymentStatus};
use crate::routes::error_response;
use crate::services::error::BookingError;
use crate::services::payment_sync_service::PaymentSyncService;

#[derive(Serialize, Deserialize)]
pub struct PaymentIntentInput {
    pub booking_id: String,
    pub booking_kind: BookingKind,
    /// Minor units (cents), the way Stripe wants it.
    pub amount: i64,
    pub customer_id: String,
    pub payment_method_id: String,
}

#[derive(Clone)]
pub struct StripeConfig {
    pub webhook_secret: String,
}

/// Create a Stripe payment intent for a booking and record the pending
/// Payment document correlated by the intent id.
pub async fn create_payment_intent(
    _claims: Claims,
    stripe_data: web::Data<Arc<stripe::Client>>,
    sync: web::Data<PaymentSyncService>,
    input: web::Json<PaymentIntentInput>,
) -> impl Responder {
    let input = input.into_inner();

    let booking_id = match ObjectId::parse_str(&input.booking_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID format"),
    };
    if input.amount <= 0 {
        return HttpResponse::BadRequest().body("Amount must be positive");
    }

    let customer_id = match stripe::CustomerId::from_str(&input.customer_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid customer ID"),
    };
    let payment_method_id = match stripe::PaymentMethodId::from_str(&input.payment_method_id) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid payment method ID"),
    };

    let mut create_intent = stripe::CreatePaymentIntent::new(input.amount, stripe::Currency::USD);
    create_intent.customer = Some(customer_id);
    create_intent.payment_method = Some(payment_method_id);

    let intent = match stripe::PaymentIntent::create(stripe_data.as_ref(), create_intent).await {
        Ok(intent) => intent,
        Err(e) => {
            log::error!("Error creating payment intent: {:?}", e);
            return error_response(BookingError::Provider(e.to_string()));
        }
    };

    let amount = Decimal::new(input.amount, 2);
    match sync
        .record_payment(
            booking_id,
            input.booking_kind,
            amount,
            "USD",
            "card",
            Some(intent.id.to_string()),
        )
        .await
    {
        Ok(payment) => HttpResponse::Ok().json(serde_json::json!({
            "payment": payment,
            "client_secret": intent.client_secret,
        })),
        Err(err) => error_response(err),
    }
}

/// Stripe webhook: at-least-once delivery, so everything downstream is
/// idempotent. Events are correlated to Payment documents by the payment
/// intent id.
pub async fn handle_stripe_webhook(
    req: HttpRequest,
    payload: web::Bytes,
    stripe_config: web::Data<StripeConfig>,
    sync: web::Data<PaymentSyncService>,
) -> impl Responder {
    // Get the Stripe-Signature header
    let signature = match req.headers().get("stripe-signature") {
        Some(sig) => sig.to_str().unwrap_or(""),
        None => {
            return HttpResponse::BadRequest().body("Missing stripe-signature header");
        }
    };

    // Verify the webhook signature and parse the event
    let payload_str = match String::from_utf8(payload.to_vec()) {
        Ok(s) => s,
        Err(_) => {
            return HttpResponse::BadRequest().body("Invalid payload encoding");
        }
    };

    let event =
        match Webhook::construct_event(&payload_str, signature, &stripe_config.webhook_secret) {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Webhook error: {:?}", e);
                return HttpResponse::BadRequest().body(format!("Webhook error: {}", e));
            }
        };

    match event.type_ {
        EventType::PaymentIntentSucceeded => {
            if let EventObject::PaymentIntent(intent) = event.data.object {
                apply(&sync, &intent.id, PaymentStatus::Paid).await
            } else {
                HttpResponse::BadRequest().body("Invalid payment intent object")
            }
        }

        EventType::PaymentIntentPaymentFailed => {
            if let EventObject::PaymentIntent(intent) = event.data.object {
                log::info!("Payment failed: {}", intent.id);
                apply(&sync, &intent.id, PaymentStatus::Failed).await
            } else {
                HttpResponse::BadRequest().body("Invalid payment intent object")
            }
        }

        EventType::ChargeRefunded => {
            if let EventObject::Charge(charge) = event.data.object {
                match charge.payment_intent {
                    Some(stripe::Expandable::Id(id)) => {
                        apply(&sync, id.as_str(), PaymentStatus::Refunded).await
                    }
                    Some(stripe::Expandable::Object(intent)) => {
                        apply(&sync, intent.id.as_str(), PaymentStatus::Refunded).await
                    }
                    None => HttpResponse::Ok().json(serde_json::json!({ "received": true })),
                }
            } else {
                HttpResponse::BadRequest().body("Invalid charge object")
            }
        }

        // Everything else is acknowledged and dropped
        _ => {
            log::debug!("Unhandled event type: {:?}", event.type_);
            HttpResponse::Ok().json(serde_json::json!({ "received": true }))
        }
    }
}

async fn apply(
    sync: &web::Data<PaymentSyncService>,
    transaction_id: &str,
    status: PaymentStatus,
) -> HttpResponse {
    match sync.sync_by_transaction(transaction_id, status).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({ "received": true })),
        Err(BookingError::NotFound(_)) => {
            // Not every intent belongs to us (other products share the
            // Stripe account); acknowledge so Stripe stops retrying.
            log::warn!("No payment record for transaction {}", transaction_id);
            HttpResponse::Ok().json(serde_json::json!({ "received": true }))
        }
        Err(err) => error_response(err),
    }
}
