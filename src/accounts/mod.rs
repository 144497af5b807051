//! Password-based accounts

mod model;
mod store;

pub use model::{normalize_email, Account, NewAccount};
pub use store::{AccountStore, AccountStoreError, InMemoryAccountStore, PgAccountStore};
