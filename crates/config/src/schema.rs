//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use types::{utils::redact_dsn, Secret, Value};

/// Etcd client port when neither the input nor `[defaults]` set one
pub const DEFAULT_ETCD_PORT: u16 = 2379;
/// Etcd directory read when `etcd_dir` is absent
pub const DEFAULT_ETCD_DIR: &str = "/";
pub const DEFAULT_HTTP_HEADER: &str = "Accept: application/json";
pub const DEFAULT_HTTP_FORMAT: &str = "JSON";
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Fallback values from the `[defaults]` section
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DefaultsRecord {
    pub etcd_node: Option<String>,
    pub etcd_port: Option<u16>,
    pub http_header: Option<String>,
    pub http_format: Option<String>,
    pub mysql_user: Option<String>,
    pub mysql_pass: Option<Secret>,
    pub mysql_host: Option<String>,
    pub mysql_port: Option<u16>,
    pub mysql_db: Option<String>,
}

/// Source kind named by an input's `type`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    File,
    Etcd,
    Http,
    Mysql,
}

impl InputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            InputKind::File => "file",
            InputKind::Etcd => "etcd",
            InputKind::Http => "http",
            InputKind::Mysql => "mysql",
        }
    }
}

impl fmt::Display for InputKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A validated input definition
#[derive(Debug, Clone, PartialEq)]
pub struct InputSpec {
    /// Name the result is bound under
    pub name: String,
    /// Backend-specific fields
    pub source: SourceSpec,
}

impl InputSpec {
    pub fn kind(&self) -> InputKind {
        match self.source {
            SourceSpec::File { .. } => InputKind::File,
            SourceSpec::Etcd { .. } => InputKind::Etcd,
            SourceSpec::Http { .. } => InputKind::Http,
            SourceSpec::Mysql(_) => InputKind::Mysql,
        }
    }
}

/// Backend-specific part of an input definition
#[derive(Debug, Clone, PartialEq)]
pub enum SourceSpec {
    File {
        path: PathBuf,
    },
    Etcd {
        host: String,
        port: u16,
        dir: String,
    },
    Http {
        url: String,
        /// `Name: value`, split on the first colon when sent
        header: String,
        /// Format name, parsed by the codec at fetch time
        format: String,
    },
    Mysql(MysqlSource),
}

/// Connection and query for a MySQL input
#[derive(Debug, Clone, PartialEq)]
pub struct MysqlSource {
    pub user: String,
    pub password: Secret,
    pub host: String,
    pub port: u16,
    pub database: String,
    pub query: String,
}

impl MysqlSource {
    /// DSN with the password masked, for logs and errors
    pub fn redacted_dsn(&self) -> String {
        redact_dsn(&self.user, &self.host, self.port, &self.database)
    }
}

/// Split an HTTP header line on its first colon
pub fn split_header(header: &str) -> Option<(&str, &str)> {
    header
        .split_once(':')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
}

/// A merge directive from the `[merge]` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSpec {
    /// Directive key in the document
    pub key: String,
    /// Destination name, the key unless `name` is given
    pub name: String,
    /// Sources, unioned in this order
    pub inputs: Vec<String>,
}

/// Everything the pipeline needs from the configuration document
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub defaults: DefaultsRecord,
    /// Inputs in declaration order
    pub inputs: Vec<InputSpec>,
    /// Merge directives in declaration order
    pub merges: Vec<MergeSpec>,
    /// The decoded document, bound as `Cfg`
    pub document: Value,
}

/// Runtime settings, read from `TF_`-prefixed environment variables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Upper bound on each network fetch
    #[serde(default = "default_fetch_timeout_seconds")]
    pub fetch_timeout_seconds: u64,
    /// User agent sent by the HTTP and etcd fetchers
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fetch_timeout_seconds: default_fetch_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

// Default value functions
fn default_fetch_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("tf/{}", env!("CARGO_PKG_VERSION"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_header_on_first_colon() {
        assert_eq!(split_header("Accept: application/json"), Some(("Accept", "application/json")));
        assert_eq!(
            split_header("X-Url: http://example.com:8080"),
            Some(("X-Url", "http://example.com:8080"))
        );
        assert_eq!(split_header("no colon"), None);
        assert_eq!(split_header(": value"), None);
    }

    #[test]
    fn test_mysql_dsn_is_redacted() {
        let source = MysqlSource {
            user: "app".into(),
            password: Secret::new("s3cret"),
            host: "db".into(),
            port: 3306,
            database: "inv".into(),
            query: "SELECT 1".into(),
        };
        let dsn = source.redacted_dsn();
        assert!(!dsn.contains("s3cret"));
        assert!(!format!("{:?}", source).contains("s3cret"));
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.fetch_timeout_seconds, 30);
        assert!(settings.user_agent.starts_with("tf/"));
    }
}
