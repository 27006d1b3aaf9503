//! Dropsend API Library
//!
//! HTTP handlers, error rendering, and application setup over the transfer services.

mod api_doc;
mod handlers;
mod telemetry;

pub mod error;
pub mod setup;
pub mod state;

pub use error::{ErrorResponse, HttpAppError};
pub use state::AppState;
pub use telemetry::init_telemetry;
