//! # chiffre-store
//!
//! Local persistence for Chiffre key material, backed by SQLite.
//!
//! Keys are generated on-device, exported to hex, and stored in a
//! key-value table keyed by day identifier (rotating policy) or a single
//! fixed slot. Nothing in this crate ever leaves the device. The crate
//! exposes a synchronous [`Database`] handle plus the [`KeyStore`] policy
//! layer that decides which key applies to an encryption operation.

pub mod database;
pub mod keys;
pub mod keystore;
pub mod migrations;
pub mod models;

mod error;

pub use database::Database;
pub use error::StoreError;
pub use keystore::{KeyPolicy, KeyStore, KeyStoreInfo};
pub use models::StoredKey;
