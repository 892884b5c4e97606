use actix_web::{web, HttpResponse, Responder};
use mongodb::bson::oid::ObjectId;

use crate::middleware::auth::Claims;
use crate::routes::error_response;
use crate::services::rental_booking_service::{CreateRentalBooking, RentalBookingService};

pub async fn create_booking(
    service: web::Data<RentalBookingService>,
    input: web::Json<CreateRentalBooking>,
    claims: Claims,
) -> impl Responder {
    match service
        .create(&claims.user_id, &claims.sub, input.into_inner())
        .await
    {
        Ok(booking) => HttpResponse::Created().json(booking),
        Err(err) => error_response(err),
    }
}

pub async fn get_my_bookings(
    service: web::Data<RentalBookingService>,
    claims: Claims,
) -> impl Responder {
    match service.list_for_renter(&claims.user_id).await {
        Ok(bookings) => HttpResponse::Ok().json(bookings),
        Err(err) => error_response(err),
    }
}

pub async fn get_booking_by_id(
    service: web::Data<RentalBookingService>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    let booking_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID format"),
    };

    match service.get_for_actor(booking_id, &claims.user_id).await {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err),
    }
}

pub async fn cancel_booking(
    service: web::Data<RentalBookingService>,
    path: web::Path<(String,)>,
    claims: Claims,
) -> impl Responder {
    let booking_id = match ObjectId::parse_str(&path.into_inner().0) {
        Ok(id) => id,
        Err(_) => return HttpResponse::BadRequest().body("Invalid booking ID format"),
    };

    match service.cancel(booking_id, &claims.user_id, &claims.sub).await {
        Ok(booking) => HttpResponse::Ok().json(booking),
        Err(err) => error_response(err),
    }
}
