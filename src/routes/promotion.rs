use actix_web::{web, HttpResponse, Responder};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::routes::error_response;
use crate::services::promotion_service::PromotionService;

#[derive(Debug, Deserialize)]
pub struct ValidatePromotionInput {
    pub code: Option<String>,
    #[serde(default, with = "rust_decimal::serde::str_option")]
    pub amount: Option<Decimal>,
}

/// Storefront validation: always 200 with a {valid, discount_amount,
/// message} body, even for bad codes. Booking creation does its own hard
/// check.
pub async fn validate_promotion(
    service: web::Data<PromotionService>,
    input: web::Json<ValidatePromotionInput>,
) -> impl Responder {
    let input = input.into_inner();
    let code = input.code.unwrap_or_default();

    match service.validate(&code, input.amount).await {
        Ok(check) => HttpResponse::Ok().json(check),
        Err(err) => error_response(err),
    }
}
