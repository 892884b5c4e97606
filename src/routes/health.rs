use actix_web::{web, HttpResponse, Responder};
use mongodb::{bson::doc, Client};
use serde::Serialize;
use std::collections::HashMap;
use std::env;
use std::sync::Arc;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
    services: HashMap<String, ServiceStatus>,
    environment: String,
    version: String,
}

#[derive(Serialize, Clone)]
struct ServiceStatus {
    status: String,
    details: Option<String>,
}

pub async fn health_check(client: web::Data<Arc<Client>>) -> impl Responder {
    let mut health = HealthStatus {
        status: "ok".to_string(),
        services: HashMap::new(),
        environment: env::var("RUST_ENV").unwrap_or("development".to_string()),
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    // Check MongoDB connection
    let mongo_result = check_mongodb(&client).await;
    health
        .services
        .insert("mongodb".to_string(), mongo_result.clone());

    // Check Stripe API (just validate key existence for now)
    let stripe_result = check_stripe_api().await;
    health
        .services
        .insert("stripe".to_string(), stripe_result.clone());

    // Check SendGrid config for booking confirmation emails
    let sendgrid_result = check_sendgrid().await;
    health
        .services
        .insert("sendgrid".to_string(), sendgrid_result.clone());

    // Determine overall status (if any service is not ok, the overall status is degraded)
    if mongo_result.status != "ok"
        || stripe_result.status != "ok"
        || sendgrid_result.status != "ok"
    {
        health.status = "degraded".to_string();
    }

    HttpResponse::Ok().json(health)
}

async fn check_mongodb(client: &web::Data<Arc<Client>>) -> ServiceStatus {
    match client
        .database("Bookings")
        .run_command(doc! {"ping": 1})
        .await
    {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("Connected successfully to MongoDB".to_string()),
        },
        Err(e) => {
            // Log error for internal visibility
            eprintln!("MongoDB health check failed: {}", e);

            ServiceStatus {
                status: "error".to_string(),
                details: Some(format!("Failed to connect: {}", e)),
            }
        }
    }
}

async fn check_stripe_api() -> ServiceStatus {
    // Just validate key existence for basic check
    // In a more comprehensive check, you could make a test API call
    match env::var("STRIPE_SECRET_KEY") {
        Ok(key) => {
            let masked_key = if key.len() > 8 {
                format!("{}***{}", &key[0..4], &key[key.len() - 4..])
            } else {
                "***".to_string()
            };

            ServiceStatus {
                status: "ok".to_string(),
                details: Some(format!("Stripe API key configured ({})", masked_key)),
            }
        }
        Err(_) => ServiceStatus {
            status: "error".to_string(),
            details: Some("STRIPE_SECRET_KEY not configured".to_string()),
        },
    }
}

async fn check_sendgrid() -> ServiceStatus {
    match env::var("SENDGRID_API_KEY") {
        Ok(_) => ServiceStatus {
            status: "ok".to_string(),
            details: Some("SendGrid API key configured".to_string()),
        },
        Err(_) => ServiceStatus {
            status: "error".to_string(),
            details: Some("SENDGRID_API_KEY not configured".to_string()),
        },
    }
}
