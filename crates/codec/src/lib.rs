//! Format codec for the tf resolution pipeline
//!
//! Turns YAML, JSON and TOML documents into the generic [`types::Value`] tree
//! and expands `${path.to.value}` references in text before it is decoded.

pub mod decode;
pub mod expand;
pub mod file;
pub mod format;

pub use decode::{decode, decode_str, encode};
pub use expand::{expand, references};
pub use file::{load_file, read_text};
pub use format::DataFormat;
