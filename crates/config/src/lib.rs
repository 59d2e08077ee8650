//! Configuration management for the tf resolution pipeline
//!
//! This crate parses the configuration document (`defaults`, `inputs`,
//! `merge`), validates every input definition, and loads the runtime
//! settings from the environment.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::ConfigLoader;
pub use schema::*;
pub use validation::*;
