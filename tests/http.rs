mod common;

use std::net::SocketAddr;

use actix_web::{App, test, web::Data};
use chrono::Duration;
use serde_json::{Value, json};
use tempfile::tempdir;

use leavedesk::config::Config;
use leavedesk::routes;

use common::{file_engine, next_monday};

fn test_config() -> Config {
    Config {
        database_url: String::new(),
        server_addr: "127.0.0.1:0".to_string(),
        rate_api_per_min: 10_000,
        api_prefix: "/api/v1".to_string(),
    }
}

fn peer() -> SocketAddr {
    "127.0.0.1:41234".parse().unwrap()
}

#[actix_web::test]
async fn full_lifecycle_over_http() {
    let dir = tempdir().expect("tempdir");
    let engine = file_engine(&dir).await;
    let config = test_config();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(engine.clone()))
            .configure(|cfg| routes::configure(cfg, config.clone())),
    )
    .await;

    // admin provisions a manager and a teacher reporting to them
    let req = test::TestRequest::post()
        .uri("/api/v1/employees")
        .peer_addr(peer())
        .set_json(json!({
            "name": "Mona Falk",
            "email": "mona@school.example",
            "role": "manager",
            "manager_id": null,
            "total_leave_days": 25
        }))
        .to_request();
    let manager: Value = test::call_and_read_body_json(&app, req).await;
    let manager_id = manager["id"].as_i64().unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/employees")
        .peer_addr(peer())
        .set_json(json!({
            "name": "Tariq Aziz",
            "email": "tariq@school.example",
            "role": "teacher",
            "manager_id": manager_id,
            "total_leave_days": 20
        }))
        .to_request();
    let owner: Value = test::call_and_read_body_json(&app, req).await;
    let owner_id = owner["id"].as_i64().unwrap();

    // a full working week
    let start = next_monday();
    let end = start + Duration::days(4);
    let req = test::TestRequest::post()
        .uri("/api/v1/leave")
        .peer_addr(peer())
        .set_json(json!({
            "employee_id": owner_id,
            "category": "vacation",
            "start_date": start.format("%Y-%m-%d").to_string(),
            "end_date": end.format("%Y-%m-%d").to_string(),
            "reason": "family trip"
        }))
        .to_request();
    let request: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(request["days_requested"], 5);
    assert_eq!(request["status"], "pending");
    let leave_id = request["id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/employees/{owner_id}/balance"))
        .peer_addr(peer())
        .to_request();
    let balance: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(balance["remaining"], 15);

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/leave/{leave_id}/approve"))
        .peer_addr(peer())
        .set_json(json!({ "reviewer_id": manager_id, "notes": "enjoy" }))
        .to_request();
    let approved: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(approved["status"], "approved");
    assert_eq!(approved["reviewed_by"], manager_id);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/leave/{leave_id}/history"))
        .peer_addr(peer())
        .to_request();
    let history: Value = test::call_and_read_body_json(&app, req).await;
    let entries = history.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["action"], "submitted");
    assert_eq!(entries[1]["action"], "approved");

    let req = test::TestRequest::put()
        .uri(&format!("/api/v1/leave/{leave_id}/cancel"))
        .peer_addr(peer())
        .set_json(json!({ "actor_id": manager_id, "notes": "coverage gap" }))
        .to_request();
    let cancelled: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(cancelled["status"], "cancelled");

    // cancelling released the approved days
    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/employees/{owner_id}/balance"))
        .peer_addr(peer())
        .to_request();
    let balance: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(balance["remaining"], 20);
}

#[actix_web::test]
async fn business_errors_carry_a_field_for_the_form() {
    let dir = tempdir().expect("tempdir");
    let engine = file_engine(&dir).await;
    let config = test_config();

    let app = test::init_service(
        App::new()
            .app_data(Data::new(engine.clone()))
            .configure(|cfg| routes::configure(cfg, config.clone())),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/v1/employees")
        .peer_addr(peer())
        .set_json(json!({
            "name": "Nina Brief",
            "email": "nina@school.example",
            "role": "teacher",
            "manager_id": null,
            "total_leave_days": 2
        }))
        .to_request();
    let owner: Value = test::call_and_read_body_json(&app, req).await;
    let owner_id = owner["id"].as_i64().unwrap();

    let start = next_monday();
    let end = start + Duration::days(4);
    let req = test::TestRequest::post()
        .uri("/api/v1/leave")
        .peer_addr(peer())
        .set_json(json!({
            "employee_id": owner_id,
            "category": "vacation",
            "start_date": start.format("%Y-%m-%d").to_string(),
            "end_date": end.format("%Y-%m-%d").to_string(),
            "reason": "too long"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "insufficient_balance");
    assert_eq!(body["field"], "days");

    // unknown request id
    let req = test::TestRequest::get()
        .uri("/api/v1/leave/999")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "not_found");
}
