//! Configuration types for Teller.
//!
//! This crate provides the configuration types loaded from
//! `.teller/config.yaml` files and the environment.

pub mod env;
pub mod loader;
pub mod types;

pub use env::*;
pub use loader::*;
pub use types::*;
