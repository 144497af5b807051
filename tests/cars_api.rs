//! Car inventory API tests over the in-memory stores

mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::*;

fn car(registration_no: &str) -> Value {
    json!({
        "category": "sedan",
        "color": "silver",
        "model": "Corolla",
        "make": "Toyota",
        "registrationNo": registration_no
    })
}

#[tokio::test]
async fn test_crud_round_trip() {
    let app = test_app();
    let token = password_token(&app, "dealer@example.com").await;
    let token = Some(token.as_str());

    let (status, created) = send(&app, Method::POST, "/api/cars", token, Some(car("KA-01-1234"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["registrationNo"], "KA-01-1234");
    let id = created["id"].as_str().unwrap().to_string();
    let path = format!("/api/cars/{}", id);

    let (status, fetched) = send(&app, Method::GET, &path, token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let mut replacement = car("KA-01-1234");
    replacement["color"] = json!("red");
    replacement["category"] = json!("convertible");
    let (status, updated) = send(&app, Method::PUT, &path, token, Some(replacement)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["color"], "red");
    assert_eq!(updated["category"], "convertible");

    let (status, list) = send(&app, Method::GET, "/api/cars", token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, body) = send(&app, Method::DELETE, &path, token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Car deleted successfully");

    let (status, _) = send(&app, Method::GET, &path, token, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_routes_require_token() {
    let app = test_app();
    let path = format!("/api/cars/{}", uuid::Uuid::new_v4());

    for (method, uri, body) in [
        (Method::GET, "/api/cars", None),
        (Method::POST, "/api/cars", Some(car("X-1"))),
        (Method::GET, path.as_str(), None),
        (Method::PUT, path.as_str(), Some(car("X-1"))),
        (Method::DELETE, path.as_str(), None),
    ] {
        let (status, response) = send(&app, method, uri, None, body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(response["error"]["code"], "MISSING_TOKEN");
    }

    let (status, response) = send(&app, Method::GET, "/api/cars", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(response["error"]["code"], "INVALID_TOKEN");
}

#[tokio::test]
async fn test_validation_errors() {
    let app = test_app();
    let token = password_token(&app, "dealer@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/cars",
        Some(&token),
        Some(json!({ "category": "spaceship", "color": "red" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    let details = &body["error"]["details"];
    assert!(details["category"].is_array());
    assert!(details["model"].is_array());
    assert!(details["color"].is_null());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let app = test_app();
    let token = password_token(&app, "dealer@example.com").await;

    let (first, _) = send(&app, Method::POST, "/api/cars", Some(&token), Some(car("DUP-1"))).await;
    let (second, body) = send(&app, Method::POST, "/api/cars", Some(&token), Some(car("DUP-1"))).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_unknown_and_malformed_ids() {
    let app = test_app();
    let token = password_token(&app, "dealer@example.com").await;

    let unknown = format!("/api/cars/{}", uuid::Uuid::new_v4());
    let (status, _) = send(&app, Method::DELETE, &unknown, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/cars/not-a-uuid", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_wallet_token_grants_access() {
    let app = test_app();
    let (_, body) = send(
        &app,
        Method::POST,
        "/api/metamask/challenge",
        None,
        Some(json!({ "address": ADDRESS })),
    )
    .await;
    let message = body["message"].as_str().unwrap();

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/metamask/verify",
        None,
        Some(json!({ "address": ADDRESS, "signature": personal_sign(message) })),
    )
    .await;
    let token = body["token"].as_str().unwrap();

    let (status, list) = send(&app, Method::GET, "/api/cars", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(list.as_array().unwrap().is_empty());
}
