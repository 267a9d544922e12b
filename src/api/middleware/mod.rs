//! API middleware.
//!
//! Only session authentication: protected routes require a bearer token
//! issued by `POST /api/auth/login`.

pub mod auth;
