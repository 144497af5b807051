//! Challenge storage for wallet authentication
//!
//! Each wallet address has at most one outstanding challenge message. Issuing
//! a new challenge replaces the previous one; a successful verification
//! consumes it.

mod memory;
mod message;
mod postgres;
mod store;

pub use memory::InMemoryChallengeStore;
pub use message::{generate_challenge_message, generate_nonce};
pub use postgres::PgChallengeStore;
pub use store::{ChallengeRecord, ChallengeStore, ChallengeStoreError};
