//! HTTP handlers

pub mod cars;
pub mod health;
pub mod metamask;
pub mod users;
