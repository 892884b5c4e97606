use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;

use crate::middleware::auth::Claims;
use crate::middleware::auth_context::MaybeActor;
use crate::routes::error_response;
use crate::services::circuit_booking_service::{
    Actor, CircuitBookingService, CreateCircuitBooking,
};

/// Open to guests: an unauthenticated request must carry a contact email.
pub async fn create_booking(
    service: web::Data<CircuitBookingService>,
    input: web::Json<CreateCircuitBooking>,
    actor: MaybeActor,
) -> impl Responder {
    match service.create(actor.0, input.into_inner()).await {
        Ok(booking) => HttpResponse::Created().json(booking),
        Err(err) => error_response(err),
    }
}

pub async fn get_my_bookings(
    service: web::Data<CircuitBookingService>,
    claims: Claims,
) -> impl Responder {
    match service.list_for_actor(&actor(&claims)).await {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(err) => error_response(err),
    }
}

pub async fn get_booking_by_id(
    service: web::Data<CircuitBookingService>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    let booking_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID format"),
    };

    match service.get_for_actor(booking_id, &actor(&claims)).await {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err),
    }
}

pub async fn cancel_booking(
    service: web::Data<CircuitBookingService>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    let booking_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID format"),
    };

    match service.cancel(booking_id, &actor(&claims)).await {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err),
    }
}

fn actor(claims: &Claims) -> Actor {
    Actor {
        user_id: claims.user_id.clone(),
        email: claims.sub.clone(),
    }
}
