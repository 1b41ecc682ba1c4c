//! # chiffre-net
//!
//! Typed client for the remote messaging service's REST contract, plus the
//! [`RemoteService`] trait seam the sync/send pipelines are written
//! against. Tests substitute an in-memory implementation; production uses
//! [`ApiClient`] (reqwest).

pub mod api;
pub mod dto;
pub mod remote;

mod error;

pub use api::ApiClient;
pub use error::{NetError, Result};
pub use remote::RemoteService;
