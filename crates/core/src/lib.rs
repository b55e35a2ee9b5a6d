//! Core types for wildlog
//!
//! This crate contains domain types shared across all other crates.

pub mod constants;
mod env_config;
mod error;
mod location;
mod observation;
mod settings;

pub use env_config::*;
pub use error::*;
pub use location::*;
pub use observation::*;
pub use settings::*;
