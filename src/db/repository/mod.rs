//! Repository layer: entity-scoped database operations.
//!
//! Inserts take the raw form, coerce it and stamp `created_at`; lookups
//! return `Ok(None)` when no row matches.

mod diabetes;
mod heart_disease;
mod parkinsons;
mod patient;
mod user;

pub use diabetes::*;
pub use heart_disease::*;
pub use parkinsons::*;
pub use patient::*;
pub use user::*;
