//! API endpoint handlers.
//!
//! Each module corresponds to one screen of the UI. Handlers stay thin:
//! blocking work is moved to `run_blocking` and the logic lives in the
//! library modules.

pub mod auth;
pub mod chat;
pub mod health;
pub mod patients;
pub mod predictions;
pub mod records;
pub mod ui;
