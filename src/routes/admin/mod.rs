use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;
use serde::Deserialize;

use crate::middleware::auth::AuthMiddleware;
use crate::middleware::role_auth::{RequireRole, UserRole};
use crate::models::booking::RentalStatus;
use crate::models::circuit_booking::CircuitStatus;
use crate::models::excursion_booking::ExcursionStatus;
use crate::models::payment::PaymentStatus;
use crate::routes::error_response;
use crate::services::capacity_service::CapacityService;
use crate::services::circuit_booking_service::CircuitBookingService;
use crate::services::excursion_booking_service::ExcursionBookingService;
use crate::services::payment_sync_service::PaymentSyncService;
use crate::services::rental_booking_service::RentalBookingService;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .wrap(RequireRole::new(UserRole::Admin))
            .wrap(AuthMiddleware)
            .route("/bookings/rentals", web::get().to(list_rental_bookings))
            .route(
                "/bookings/rentals/{id}/status",
                web::put().to(update_rental_status),
            )
            .route("/bookings/circuits", web::get().to(list_circuit_bookings))
            .route(
                "/bookings/circuits/{id}/status",
                web::put().to(update_circuit_status),
            )
            .route(
                "/bookings/excursions",
                web::get().to(list_excursion_bookings),
            )
            .route(
                "/bookings/excursions/{id}/status",
                web::put().to(update_excursion_status),
            )
            .route(
                "/excursions/{id}/capacity",
                web::put().to(update_excursion_capacity),
            )
            .route("/payments/{id}/status", web::put().to(update_payment_status)),
    );
}

#[derive(Deserialize)]
struct RentalStatusInput {
    status: RentalStatus,
}

#[derive(Deserialize)]
struct CircuitStatusInput {
    status: CircuitStatus,
}

#[derive(Deserialize)]
struct ExcursionStatusInput {
    status: ExcursionStatus,
}

#[derive(Deserialize)]
struct CapacityInput {
    total_capacity: i32,
}

#[derive(Deserialize)]
struct PaymentStatusInput {
    status: PaymentStatus,
}

fn parse_id(raw: &str) -> Result<ObjectId, HttpResponse> {
    ObjectId::parse_str(raw)
        .map_err(|_| HttpResponse::BadRequest().body("Invalid ID format"))
}

async fn list_rental_bookings(service: web::Data<RentalBookingService>) -> impl Responder {
    match service.list_all().await {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(err) => error_response(err),
    }
}

async fn update_rental_status(
    service: web::Data<RentalBookingService>,
    path: web::Path<(String,)>,
    input: web::Json<RentalStatusInput>,
) -> impl Responder {
    let id = match parse_id(&path.into_inner().0) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match service.update_status(id, input.status).await {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err),
    }
}

async fn list_circuit_bookings(service: web::Data<CircuitBookingService>) -> impl Responder {
    match service.list_all().await {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(err) => error_response(err),
    }
}

async fn update_circuit_status(
    service: web::Data<CircuitBookingService>,
    path: web::Path<(String,)>,
    input: web::Json<CircuitStatusInput>,
) -> impl Responder {
    let id = match parse_id(&path.into_inner().0) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match service.update_status(id, input.status).await {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err),
    }
}

async fn list_excursion_bookings(service: web::Data<ExcursionBookingService>) -> impl Responder {
    match service.list_all().await {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(err) => error_response(err),
    }
}

async fn update_excursion_status(
    service: web::Data<ExcursionBookingService>,
    path: web::Path<(String,)>,
    input: web::Json<ExcursionStatusInput>,
) -> impl Responder {
    let id = match parse_id(&path.into_inner().0) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match service.update_status(id, input.status).await {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err),
    }
}

/// Resize an excursion. Shrinking below the seats already booked is
/// rejected by the capacity service.
async fn update_excursion_capacity(
    service: web::Data<CapacityService>,
    path: web::Path<(String,)>,
    input: web::Json<CapacityInput>,
) -> impl Responder {
    let id = match parse_id(&path.into_inner().0) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match service.update_capacity(id, input.total_capacity).await {
        Ok(excursion) => HttpResponse::Ok().json(excursion),
        Err(err) => error_response(err),
    }
}

/// Manual payment reconciliation, driving the same synchronizer as the
/// Stripe webhook.
async fn update_payment_status(
    service: web::Data<PaymentSyncService>,
    path: web::Path<(String,)>,
    input: web::Json<PaymentStatusInput>,
) -> impl Responder {
    let id = match parse_id(&path.into_inner().0) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match service.sync(id, input.status).await {
        Ok(payment) => HttpResponse::Ok().json(payment),
        Err(err) => error_response(err),
    }
}
