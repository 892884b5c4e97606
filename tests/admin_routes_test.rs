mod common;

use actix_web::{http::header, test};
use serde_json::json;
use serial_test::serial;

use common::{make_token, TestApp};

#[actix_rt::test]
#[serial]
async fn test_admin_routes_require_auth() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let req = test::TestRequest::get()
        .uri("/api/admin/bookings/rentals")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 401);
}

#[actix_rt::test]
#[serial]
async fn test_admin_routes_reject_plain_users() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let token = format!("Bearer {}", make_token("user"));
    let req = test::TestRequest::get()
        .uri("/api/admin/bookings/rentals")
        .insert_header((header::AUTHORIZATION, token))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 403);
}

#[actix_rt::test]
#[serial]
async fn test_admin_status_update_invalid_id() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let token = format!("Bearer {}", make_token("admin"));
    let req = test::TestRequest::put()
        .uri("/api/admin/bookings/rentals/not-an-id/status")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(&json!({ "status": "confirmed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_admin_capacity_update_invalid_id() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let token = format!("Bearer {}", make_token("admin"));
    let req = test::TestRequest::put()
        .uri("/api/admin/excursions/not-an-id/capacity")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(&json!({ "total_capacity": 20 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
}

#[actix_rt::test]
#[serial]
async fn test_admin_status_update_rejects_unknown_status() {
    let test_app = TestApp::new().await;
    let app = test::init_service(test_app.create_app()).await;

    let token = format!("Bearer {}", make_token("admin"));
    let req = test::TestRequest::put()
        .uri("/api/admin/bookings/rentals/64b000000000000000000000/status")
        .insert_header((header::AUTHORIZATION, token))
        .set_json(&json!({ "status": "teleported" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    // serde refuses the unknown enum variant before any lookup
    assert_eq!(resp.status(), 400);
}
