use std::{env, sync::Arc};

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use voyara_api::db;
use voyara_api::routes;
use voyara_api::routes::payment::StripeConfig;
use voyara_api::services::capacity_service::CapacityService;
use voyara_api::services::circuit_booking_service::CircuitBookingService;
use voyara_api::services::email_service::EmailService;
use voyara_api::services::excursion_booking_service::ExcursionBookingService;
use voyara_api::services::payment_sync_service::PaymentSyncService;
use voyara_api::services::pricing_service::PricingConfig;
use voyara_api::services::promotion_service::PromotionService;
use voyara_api::services::rental_booking_service::RentalBookingService;

const HOST: &str = "0.0.0.0";
const PORT: u16 = 8080;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    println!("Application starting...");

    env_logger::init_from_env(Env::default().default_filter_or("info"));

    if cfg!(debug_assertions) {
        dotenv::dotenv().ok();
    } else {
        println!("Release mode");
    }

    let host = env::var("HOST").unwrap_or_else(|_| HOST.to_string());
    let port: u16 = env::var("PORT")
        .unwrap_or_else(|_| PORT.to_string())
        .parse()
        .unwrap_or(PORT);
    println!("Attempting to bind to {}:{}", host, port);

    let mongo_uri = env::var("MONGODB_URI").expect("MONGODB_URI must be set");
    let client = db::mongo::create_mongo_client(&mongo_uri).await;
    println!("MongoDB connection established");

    let stripe_secret = env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set");
    let stripe_client = Arc::new(stripe::Client::new(stripe_secret));
    let stripe_config = StripeConfig {
        webhook_secret: env::var("STRIPE_WEBHOOK_SECRET").unwrap_or_default(),
    };

    let pricing = PricingConfig::from_env();
    let mailer = || match EmailService::new() {
        Ok(mailer) => Some(mailer),
        Err(err) => {
            log::warn!("Booking emails disabled: {}", err);
            None
        }
    };

    // Domain services are built once here and handed to the handlers by
    // reference; nothing does ambient lookups.
    let rentals = web::Data::new(RentalBookingService::new(
        &client,
        pricing.clone(),
        mailer(),
    ));
    let circuits = web::Data::new(CircuitBookingService::new(
        &client,
        pricing.clone(),
        mailer(),
    ));
    let excursions = web::Data::new(ExcursionBookingService::new(
        &client,
        pricing.clone(),
        mailer(),
    ));
    let promotions = web::Data::new(PromotionService::new(&client));
    let capacity = web::Data::new(CapacityService::new(&client));
    let payment_sync = web::Data::new(PaymentSyncService::new(&client));

    println!("Starting HTTP server...");

    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin_fn(|_, _| true)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials()
            .max_age(3600);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(web::Data::new(client.clone()))
            .app_data(web::Data::new(stripe_client.clone()))
            .app_data(web::Data::new(stripe_config.clone()))
            .app_data(rentals.clone())
            .app_data(circuits.clone())
            .app_data(excursions.clone())
            .app_data(promotions.clone())
            .app_data(capacity.clone())
            .app_data(payment_sync.clone())
            .route("/health", web::get().to(routes::health::health_check))
            .service(
                web::scope("/api")
                    // Public catalog
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
                        "/excursions/{id}",
                        web::get().to(routes::excursion::get_excursion_by_id),
                    )
                    .route("/circuits", web::get().to(routes::circuit::get_circuits))
                    .route(
                        "/circuits/{id}",
                        web::get().to(routes::circuit::get_circuit_by_id),
                    )
                    .route(
                        "/locations",
                        web::get().to(routes::location::get_locations),
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
                    // Booking routes rely on the Claims extractor for auth;
                    // circuit/excursion creation accepts guests.
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
                                "/circuits/{id}",
                                web::get().to(routes::circuit_booking::get_booking_by_id),
                            )
                            .route(
                                "/circuits/{id}/cancel",
                                web::post().to(routes::circuit_booking::cancel_booking),
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
                                "/excursions/{id}",
                                web::get().to(routes::excursion_booking::get_booking_by_id),
                            )
                            .route(
                                "/excursions/{id}/cancel",
                                web::post().to(routes::excursion_booking::cancel_booking),
                            ),
                    )
                    .configure(routes::admin::config),
            )
    })
    .bind((host, port))?
    .run()
    .await
}
