//! Data serialization formats

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use types::CodecError;

/// Data serialization format of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataFormat {
    Yaml,
    Json,
    Toml,
}

impl DataFormat {
    /// Parse an explicit format name such as `YAML` or `json`
    pub fn from_name(name: &str) -> Result<Self, CodecError> {
        match name.trim().to_ascii_uppercase().as_str() {
            "YAML" | "YML" => Ok(DataFormat::Yaml),
            "JSON" => Ok(DataFormat::Json),
            "TOML" => Ok(DataFormat::Toml),
            _ => Err(CodecError::UnsupportedFormat { format: name.to_string() }),
        }
    }

    /// Infer the format from a file extension
    pub fn from_path(path: &Path) -> Result<Self, CodecError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "yaml" | "yml" => Ok(DataFormat::Yaml),
            "json" => Ok(DataFormat::Json),
            "toml" => Ok(DataFormat::Toml),
            _ => Err(CodecError::UnsupportedFormat {
                format: format!(".{} ({})", ext, path.display()),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DataFormat::Yaml => "YAML",
            DataFormat::Json => "JSON",
            DataFormat::Toml => "TOML",
        }
    }
}

impl FromStr for DataFormat {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s)
    }
}

impl fmt::Display for DataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
