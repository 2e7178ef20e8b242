//! service-core: configuration, errors, logging and HTTP middleware shared by
//! the asset service binaries.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use mongodb;
pub use tracing;
