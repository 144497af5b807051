//! End-to-end authentication tests over the in-memory stores

mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use serde_json::json;

use car_inventory_server::auth::{AuthMethod, TokenIssuer};
use common::*;

async fn request_challenge(app: &axum::Router, address: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/api/metamask/challenge",
        None,
        Some(json!({ "address": address })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    body["message"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_wallet_signin_issues_token_for_address() {
    let app = test_app();
    let message = request_challenge(&app, CHECKSUM_ADDRESS).await;
    assert!(message.contains(ADDRESS));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/metamask/verify",
        None,
        Some(json!({ "address": CHECKSUM_ADDRESS, "signature": personal_sign(&message) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = body["token"].as_str().unwrap();
    let claims = TokenIssuer::new(JWT_SECRET, 3600).verify(token).unwrap();
    assert_eq!(claims.sub, ADDRESS);
    assert_eq!(claims.method, AuthMethod::Wallet);

    let remaining = claims.exp - Utc::now().timestamp();
    assert!((3590..=3600).contains(&remaining), "unexpected expiry: {}", remaining);
}

#[tokio::test]
async fn test_legacy_routes_and_field_names() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/metamask/getmessage",
        None,
        Some(json!({ "address": ADDRESS })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let message = body["message"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/metamask/signin",
        None,
        Some(json!({ "address": ADDRESS, "signedMessage": raw_sign(&message) })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
}

#[tokio::test]
async fn test_unknown_address_is_unauthorized() {
    let app = test_app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/metamask/verify",
        None,
        Some(json!({ "address": ADDRESS, "signature": personal_sign("Hello there!") })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_tampered_signature_is_unauthorized() {
    let app = test_app();
    let message = request_challenge(&app, ADDRESS).await;

    let signature = personal_sign(&message);
    let mut bytes = hex::decode(&signature[2..]).unwrap();
    bytes[10] ^= 0xff;
    let tampered = format!("0x{}", hex::encode(bytes));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/metamask/verify",
        None,
        Some(json!({ "address": ADDRESS, "signature": tampered })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A failed attempt leaves the challenge in place
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/metamask/verify",
        None,
        Some(json!({ "address": ADDRESS, "signature": signature })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_signature_cannot_be_replayed() {
    let app = test_app();
    let message = request_challenge(&app, ADDRESS).await;
    let body = json!({ "address": ADDRESS, "signature": personal_sign(&message) });

    let (first, _) = send(&app, Method::POST, "/api/metamask/verify", None, Some(body.clone())).await;
    let (second, _) = send(&app, Method::POST, "/api/metamask/verify", None, Some(body)).await;

    assert_eq!(first, StatusCode::OK);
    assert_eq!(second, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_new_challenge_replaces_previous() {
    let app = test_app();
    let first = request_challenge(&app, ADDRESS).await;
    let second = request_challenge(&app, ADDRESS).await;
    assert_ne!(first, second);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/metamask/verify",
        None,
        Some(json!({ "address": ADDRESS, "signature": personal_sign(&first) })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_malformed_inputs() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/metamask/challenge",
        None,
        Some(json!({ "address": "not-an-address" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

    let message = request_challenge(&app, ADDRESS).await;
    assert!(!message.is_empty());
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/metamask/verify",
        None,
        Some(json!({ "address": ADDRESS, "signature": "0xnothex" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_signin_and_me() {
    let app = test_app();
    let token = password_token(&app, "Driver@Example.com").await;

    let (status, body) = send(&app, Method::GET, "/api/users/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["subject"], "driver@example.com");
    assert_eq!(body["method"], "password");
    assert!(body["expiresAt"].is_string());
}

#[tokio::test]
async fn test_duplicate_signup_conflicts() {
    let app = test_app();
    let credentials = json!({ "email": "driver@example.com", "password": "correct-horse" });

    let (first, _) = send(&app, Method::POST, "/api/users/signup", None, Some(credentials.clone())).await;
    let (second, body) = send(&app, Method::POST, "/api/users/signup", None, Some(credentials)).await;

    assert_eq!(first, StatusCode::CREATED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_signup_validation() {
    let app = test_app();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users/signup",
        None,
        Some(json!({ "email": "driver@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = test_app();
    password_token(&app, "driver@example.com").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/users/signin",
        None,
        Some(json!({ "email": "driver@example.com", "password": "wrong-horse" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = test_app();
    let (status, body) = send(&app, Method::GET, "/api/users/me", None, None).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "MISSING_TOKEN");
}

#[tokio::test]
async fn test_health_and_banner() {
    let app = test_app();

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["storage"], "memory");

    let (status, _) = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
