mod common;

use actix_web::{http::header, test};
use serde_json::json;
use serial_test::serial;

use common::{make_token, TestApp};

#[actix_rt::test]
#[serial]
async fn test_rental_booking_routes_require_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    for (method, uri) in [
        ("GET", "/api/bookings/rentals"),
        ("GET", "/api/bookings/rentals/64b000000000000000000000"),
        ("POST", "/api/bookings/rentals/64b000000000000000000000/cancel"),
    ] {
        let req = match method {
            "GET" => test::TestRequest::get(),
            _ => test::TestRequest::post(),
        }
        .uri(uri)
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 401, "{} {} should be 401", method, uri);
    }
}

#[actix_rt::test]
#[serial]
async fn test_create_rental_booking_requires_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/bookings/rentals")
        .set_json(&json!({
            "vehicle_id": mongodb::bson::oid::ObjectId::new().to_hex(),
            "start_date": "2026-05-01T10:00:00Z",
            "end_date": "2026-05-04T10:00:00Z"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_rental_booking_rejects_garbage_token() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/bookings/rentals")
        .insert_header((header::AUTHORIZATION, "Bearer not.a.jwt"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_rental_booking_invalid_id_format() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let token = format!("Bearer {}", make_token("user"));
    let req = test::TestRequest::get()
        .uri("/api/bookings/rentals/not-an-id")
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_create_rental_booking_rejects_reversed_dates() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let token = format!("Bearer {}", make_token("user"));
    let req = test::TestRequest::post()
        .uri("/api/bookings/rentals")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(&json!({
            "vehicle_id": mongodb::bson::oid::ObjectId::new().to_hex(),
            "start_date": "2026-05-04T10:00:00Z",
            "end_date": "2026-05-01T10:00:00Z"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let status = resp.status();
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(status, 400);
    assert_eq!(body["error"], "invalid_date_range");
}

#[actix_rt::test]
#[serial]
async fn test_payment_intent_requires_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::post()
        .uri("/api/payments/intent")
        .set_json(&json!({
            "booking_id": mongodb::bson::oid::ObjectId::new().to_hex(),
            "booking_kind": "rental",
            "amount": 18650,
            "customer_id": "cus_test",
            "payment_method_id": "pm_test"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}
