//! Error types for the tf resolution pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for a resolution run
#[derive(Error, Debug)]
pub enum ResolveError {
    /// Serialization format errors outside of a fetch (config document, CLI input)
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Source fetch errors
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A single input definition failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Every validation error found in a configuration document
    #[error("Invalid configuration ({} error(s)): {}", .0.len(), join_errors(.0))]
    InvalidConfig(Vec<ValidationError>),

    /// A network fetch did not complete in time
    #[error("Timed out after {seconds}s fetching input {input} from {backend}")]
    Timeout {
        input: String,
        backend: String,
        seconds: u64,
    },

    /// Name already bound in the namespace
    #[error("Input name already exists: {name}")]
    DuplicateName { name: String },

    /// Merge source (or destination) is not a mapping
    #[error("Merge {merge}: {input} is a {found}, expected a mapping")]
    TypeMismatch {
        merge: String,
        input: String,
        found: String,
    },

    /// Merge source is not bound in the namespace
    #[error("Merge {merge}: unknown input {input}")]
    UnknownMergeSource { merge: String, input: String },

    /// File inputs that reference each other
    #[error("Circular reference between inputs: {}", .chain.join(" -> "))]
    CircularReference { chain: Vec<String> },
}

/// Result type alias for resolution operations
pub type Result<T> = std::result::Result<T, ResolveError>;

/// Format codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Unknown format name or file extension
    #[error("Unsupported data format \"{format}\", needs to be YAML, JSON or TOML")]
    UnsupportedFormat { format: String },

    /// Malformed document
    #[error("Failed to decode {format} data: {message}")]
    Decode { format: String, message: String },

    /// Value not representable in the target format
    #[error("Failed to encode {format} data: {message}")]
    Encode { format: String, message: String },
}

/// `${...}` expansion errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("unclosed reference (missing '}}')")]
    Unclosed,

    #[error("invalid reference path: {0}")]
    InvalidPath(String),

    #[error("referenced path not found: {0}")]
    NotFound(String),

    #[error("cannot reference non-scalar value: {0}")]
    NonScalar(String),
}

/// Source fetcher errors
#[derive(Error, Debug)]
pub enum FetchError {
    /// Input file is absent
    #[error("File doesn't exist: {}", .path.display())]
    NotFound { path: PathBuf },

    /// Input file exists but could not be read
    #[error("Failed to read file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Input file content failed `${...}` expansion
    #[error("Failed to expand file {}: {source}", .path.display())]
    Expand {
        path: PathBuf,
        #[source]
        source: ExpandError,
    },

    /// Payload of an input failed to decode
    #[error("Failed to decode input {input}: {source}")]
    Decode {
        input: String,
        #[source]
        source: CodecError,
    },

    /// Non-2xx HTTP response
    #[error("HTTP request for input {input} returned status {status}")]
    Http { input: String, status: u16 },

    /// HTTP transport failure
    #[error("HTTP request for input {input} failed: {message}")]
    Transport { input: String, message: String },

    /// Etcd read failure
    #[error("Etcd request for input {input} failed: {message}")]
    Kv { input: String, message: String },

    /// MySQL connection or query failure. `dsn` is always redacted.
    #[error("MySQL query for input {input} on {dsn} failed: {message}")]
    Sql {
        input: String,
        dsn: String,
        message: String,
    },

    /// Shared HTTP client could not be constructed
    #[error("Failed to build HTTP client: {message}")]
    Client { message: String },
}

/// Input definition validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Key not recognised in a section
    #[error("Invalid configuration key \"{field}\" in [{section}]")]
    UnknownField { section: String, field: String },

    /// Required field absent after defaults were applied
    #[error("For input [inputs.{input}] you need to specify \"{field}\"")]
    MissingField { input: String, field: String },

    /// `type` is not one of file, etcd, http, mysql
    #[error("Unknown type \"{kind}\" for input [inputs.{input}]")]
    UnknownType { input: String, kind: String },

    /// Field present with the wrong shape
    #[error("Invalid value for \"{field}\" in [{section}]: {message}")]
    InvalidValue {
        section: String,
        field: String,
        message: String,
    },

    /// Required top-level section absent or malformed
    #[error("No valid [{section}] specified in configuration file")]
    MissingSection { section: String },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("; ")
}
