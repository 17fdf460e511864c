//! Models module
//!
//! Defines the user records moved through the ingestion pipeline and the rows
//! read back from storage.

pub mod user;

pub use user::{FieldMap, StoredUser, UserRecord};
