//! # Baserepo Config
//!
//! Configuration management for Baserepo.
//! Supports layered configuration from files and environment variables,
//! with runtime reload.

mod app_config;
mod loader;

pub use app_config::*;
pub use loader::*;
