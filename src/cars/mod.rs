//! Vehicle inventory

pub mod model;
mod service;
mod store;

pub use model::{Car, CarCategory, CarPayload, NewCar};
pub use service::CarService;
pub use store::{CarStore, CarStoreError, InMemoryCarStore, PgCarStore};
