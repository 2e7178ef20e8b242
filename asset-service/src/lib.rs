//! asset-service: generates images from prompts, stores them in blob storage
//! and records their metadata in MongoDB.

pub mod config;
pub mod dtos;
pub mod error;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
