//! Shared types for the tf resolution pipeline
//!
//! This crate contains the generic value tree every source is normalized into,
//! the root namespace, and the error taxonomy used across the workspace.

pub mod error;
pub mod namespace;
pub mod utils;
pub mod value;

// Re-export commonly used types
pub use error::{CodecError, ExpandError, FetchError, ResolveError, Result, ValidationError};
pub use namespace::{environment, Namespace, ARG_KEY, CFG_KEY, ENV_KEY, FILE_KEY, WELL_KNOWN_KEYS};
pub use utils::Secret;
pub use value::{Mapping, Value};
