//! devmap HTTP service
//!
//! Accepts a devfile plus caller metadata on `POST /api/devfile` and answers
//! with the generated resource bundle, or a Kubernetes `Status` on failure.

#![deny(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod server;

pub use config::Config;
pub use error::ApiError;
pub use server::{router, serve, AppState};
