//! Car inventory backend
//!
//! REST API for a vehicle inventory with wallet-signature and password
//! authentication.

pub mod accounts;
pub mod auth;
pub mod cars;
pub mod challenge;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::app_router;
pub use state::AppState;
