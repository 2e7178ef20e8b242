pub mod assets;
pub mod health;

pub use assets::{create_assets, delete_asset};
pub use health::{health_check, metrics_endpoint, readiness_check};
