#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use secp256k1::{Message, Secp256k1, SecretKey};
use serde_json::Value;
use tower::ServiceExt;

use car_inventory_server::auth::{keccak256, personal_message_digest};
use car_inventory_server::{app_router, AppState, Config};

pub const JWT_SECRET: &str = "integration-test-secret";

/// Key from the web3.js documentation
pub const SECRET_KEY: &str = "4c0883a69102937d6231471b5dbb6204fe5129617082792ae468d01a3f362318";
pub const ADDRESS: &str = "0x2c7536e3605d9c16a7a3d7b1898e529396a65c23";
pub const CHECKSUM_ADDRESS: &str = "0x2c7536E3605D9C16a7a3D7b1898e529396a65c23";

pub fn config() -> Config {
    Config::in_memory(JWT_SECRET)
}

pub fn test_app() -> Router {
    let config = config();
    app_router(AppState::in_memory(&config), &config)
}

/// Send a request and return the status with the JSON body (`Null` if none)
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

fn sign_digest(digest: [u8; 32]) -> String {
    let secp = Secp256k1::new();
    let secret_key = SecretKey::from_slice(&hex::decode(SECRET_KEY).unwrap()).unwrap();
    let (recovery_id, compact) = secp
        .sign_ecdsa_recoverable(&Message::from_digest(digest), &secret_key)
        .serialize_compact();

    let mut bytes = compact.to_vec();
    bytes.push(27 + i32::from(recovery_id) as u8);
    format!("0x{}", hex::encode(bytes))
}

/// What a wallet returns for `personal_sign`
pub fn personal_sign(message: &str) -> String {
    sign_digest(personal_message_digest(message))
}

/// Signature over the bare Keccak-256 digest of the message
pub fn raw_sign(message: &str) -> String {
    sign_digest(keccak256(message.as_bytes()))
}

/// Run signup and signin, returning the password token
pub async fn password_token(app: &Router, email: &str) -> String {
    let credentials = serde_json::json!({ "email": email, "password": "correct-horse" });

    let (status, _) = send(app, Method::POST, "/api/users/signup", None, Some(credentials.clone())).await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(app, Method::POST, "/api/users/signin", None, Some(credentials)).await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}
