//! Session API
//!
//! Request/response side of the session service: where it lives and the
//! REST calls that sit next to the realtime session socket.

pub mod config;
pub mod rest;
pub mod types;

pub use config::{ApiConfig, BASE_PATH_ENV};
pub use rest::{ApiError, SessionApiClient};
pub use types::*;
