//! Namespace resolution for tf
//!
//! Drives the fetchers over every declared input, binds the results into the
//! root [`types::Namespace`] and applies the merge directives.

pub mod builder;
pub mod merge;
pub mod pipeline;

pub use builder::NamespaceBuilder;
pub use merge::merge;
pub use pipeline::Pipeline;
