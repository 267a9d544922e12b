pub mod api; // HTTP router, middleware and server lifecycle
pub mod auth;
pub mod chat; // Health chatbot
pub mod config;
pub mod db;
pub mod generation; // Narrative text via a local language model
pub mod models;
pub mod prediction; // Classifiers, risk bands, training
pub mod report; // PDF medical report

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Honors `RUST_LOG`; falls back to [`config::default_log_filter`].
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}
