//! Domain models for the asset service.

pub mod asset;

pub use asset::{Asset, DeleteOutcome, Orientation, IMAGE_EXTENSION};
