use actix_web::{web, App};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use std::sync::Arc;

use voyara_api::db::mongo::create_mongo_client;
use voyara_api::middleware::auth::Claims;
use voyara_api::routes;
use voyara_api::routes::payment::StripeConfig;
use voyara_api::services::capacity_service::CapacityService;
use voyara_api::services::circuit_booking_service::CircuitBookingService;
use voyara_api::services::excursion_booking_service::ExcursionBookingService;
use voyara_api::services::payment_sync_service::PaymentSyncService;
use voyara_api::services::pricing_service::PricingConfig;
use voyara_api::services::promotion_service::PromotionService;
use voyara_api::services::rental_booking_service::RentalBookingService;

pub const TEST_JWT_SECRET: &str = "voyara_test_secret";

pub struct TestApp {
    pub client: Arc<mongodb::Client>,
}

impl TestApp {
    pub async fn new() -> Self {
        std::env::set_var("JWT_SECRET", TEST_JWT_SECRET);

        let mongo_uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let client = create_mongo_client(&mongo_uri).await;

        Self { client }
    }

    pub fn create_app(
        &self,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let pricing = PricingConfig {
            tax_rate: rust_decimal::Decimal::new(10, 2),
            service_fee: rust_decimal::Decimal::new(500, 2),
            currency: "USD".to_string(),
        };
        let stripe_client = Arc::new(stripe::Client::new("sk_test_dummy"));
        let stripe_config = StripeConfig {
            webhook_secret: "whsec_test_dummy".to_string(),
        };

        let rentals = web::Data::new(RentalBookingService::new(
            &self.client,
            pricing.clone(),
            None,
        ));
        let circuits = web::Data::new(CircuitBookingService::new(
            &self.client,
            pricing.clone(),
            None,
        ));
        let excursions = web::Data::new(ExcursionBookingService::new(
            &self.client,
            pricing.clone(),
            None,
        ));

        App::new()
            .app_data(web::Data::new(self.client.clone()))
            .app_data(web::Data::new(stripe_client))
            .app_data(web::Data::new(stripe_config))
            .app_data(rentals)
            .app_data(circuits)
            .app_data(excursions)
            .app_data(web::Data::new(PromotionService::new(&self.client)))
            .app_data(web::Data::new(CapacityService::new(&self.client)))
            .app_data(web::Data::new(PaymentSyncService::new(&self.client)))
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    .route("/vehicles", web::get().to(routes::vehicle::get_vehicles))
                    .route(
                        "/vehicles/{id}",
                        web::get().to(routes::vehicle::get_vehicle_by_id),
                    )
                    .route(
                        "/excursions",
                        web::get().to(routes::excursion::get_excursions),
                    )
                    .route(
                        "/promotions/validate",
                        web::post().to(routes::promotion::validate_promotion),
                    )
                    .service(
                        web::scope("/payments")
                            .route(
                                "/webhook",
                                web::post().to(routes::payment::handle_stripe_webhook),
                            )
                            .route(
                                "/intent",
                                web::post().to(routes::payment::create_payment_intent),
                            ),
                    )
                    .service(
                        web::scope("/bookings")
                            .route(
                                "/rentals",
                                web::post().to(routes::rental_booking::create_booking),
                            )
                            .route(
                                "/rentals",
                                web::get().to(routes::rental_booking::get_my_bookings),
                            )
                            .route(
                                "/rentals/{id}",
                                web::get().to(routes::rental_booking::get_booking_by_id),
                            )
                            .route(
                                "/rentals/{id}/cancel",
                                web::post().to(routes::rental_booking::cancel_booking),
                            )
                            .route(
                                "/circuits",
                                web::post().to(routes::circuit_booking::create_booking),
                            )
                            .route(
                                "/circuits",
                                web::get().to(routes::circuit_booking::get_my_bookings),
                            )
                            .route(
                                "/excursions",
                                web::post().to(routes::excursion_booking::create_booking),
                            )
                            .route(
                                "/excursions",
                                web::get().to(routes::excursion_booking::get_my_bookings),
                            )
                            .route(
                                "/excursions/{id}/cancel",
                                web::post().to(routes::excursion_booking::cancel_booking),
                            ),
                    )
                    .configure(routes::admin::config),
            )
    }
}

/// Mint a token the way the external identity provider would.
pub fn make_token(role: &str) -> String {
    let now = Utc::now().timestamp() as usize;
    let claims = Claims {
        sub: "customer@example.com".to_string(),
        exp: now + 3600,
        iat: now,
        user_id: mongodb::bson::oid::ObjectId::new().to_hex(),
        role: Some(role.to_string()),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("failed to sign test token")
}
