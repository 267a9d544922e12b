//! HTTP API.
//!
//! JSON routes for accounts, patient data, predictions and the chatbot,
//! plus the single-page UI. Every clinical route sits behind session
//! authentication; see `router` for the layout.

pub mod endpoints;
pub mod error;
pub mod middleware;
pub mod router;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use router::build_router;
pub use server::{serve_until_ctrl_c, start_server, RunningServer, ServerError};
pub use types::ApiContext;
