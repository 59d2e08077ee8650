//! Local file fetcher

use codec::{load_file, read_text, references};
use std::path::Path;
use types::{FetchError, Namespace, Value};

/// Reads, expands and decodes documents from disk
#[derive(Debug, Clone, Default)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }

    pub fn fetch(&self, input: &str, path: &Path, namespace: &Namespace) -> Result<Value, FetchError> {
        tracing::info!(input = %input, backend = "file", path = %path.display(), "Fetching input");
        load_file(path, namespace.as_mapping(), input)
    }

    /// Head names of every `${...}` reference in the file
    pub fn references(&self, path: &Path) -> Result<Vec<String>, FetchError> {
        let text = read_text(path)?;
        references(&text).map_err(|source| FetchError::Expand { path: path.to_path_buf(), source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use types::{environment, ENV_KEY};

    #[test]
    fn test_fetch_expands_against_namespace() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.json");
        fs::write(&path, r#"{"owner": "${Env.USER}", "region": "${region.name}"}"#).unwrap();

        let mut namespace = Namespace::new();
        namespace.bind(ENV_KEY, environment([("USER", "ops")])).unwrap();
        namespace
            .bind("region", [("name", "eu-west")].into_iter().collect())
            .unwrap();

        let value = FileFetcher::new().fetch("site", &path, &namespace).unwrap();
        assert_eq!(value.get("owner"), Some(&Value::from("ops")));
        assert_eq!(value.get("region"), Some(&Value::from("eu-west")));
    }

    #[test]
    fn test_references_lists_heads() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("site.yaml");
        fs::write(&path, "a: ${region.name}\nb: ${Env.HOME}\nc: $${literal}\n").unwrap();

        let refs = FileFetcher::new().references(&path).unwrap();
        assert_eq!(refs, ["region", "Env"]);
    }

    #[test]
    fn test_missing_file() {
        let tmp = TempDir::new().unwrap();
        let err = FileFetcher::new()
            .references(&tmp.path().join("missing.yaml"))
            .unwrap_err();
        assert!(matches!(err, FetchError::NotFound { .. }));
    }
}
