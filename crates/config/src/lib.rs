//! Configuration types for the chainview client, loaded from TOML.

mod config;

pub use config::*;
