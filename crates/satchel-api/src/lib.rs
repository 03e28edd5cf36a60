//! Satchel API Library
//!
//! HTTP surface of the upload resource: handlers, multipart decoding, authentication,
//! error rendering and application setup.

pub mod api_doc;
pub mod auth;
pub mod constants;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod multipart;
pub mod setup;
pub mod state;
pub mod telemetry;
pub mod views;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
