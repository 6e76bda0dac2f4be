//! # HDI Common Library
//!
//! Shared code for the housing data import workspace:
//! - Error and result types
//! - Configuration loading and path resolution
//! - Database initialization and the persisted housing model

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
