//! Root namespace handed to the renderer

use crate::error::{ResolveError, Result};
use crate::value::{Mapping, Value};
use serde::Serialize;

/// Process environment
pub const ENV_KEY: &str = "Env";
/// Command-line `--input`
pub const ARG_KEY: &str = "Arg";
/// Command-line `--input-file`
pub const FILE_KEY: &str = "File";
/// The configuration document itself
pub const CFG_KEY: &str = "Cfg";

/// Keys seeded before any input is resolved
pub const WELL_KNOWN_KEYS: [&str; 4] = [ENV_KEY, ARG_KEY, FILE_KEY, CFG_KEY];

/// Named mapping of resolved data.
///
/// Inputs are added with [`Namespace::bind`], which refuses to shadow an
/// existing name; the merge engine uses [`Namespace::entry_mut`] to union into
/// destinations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Namespace {
    entries: Mapping,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under `name`, failing if the name is taken
    pub fn bind(&mut self, name: impl Into<String>, value: Value) -> Result<()> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(ResolveError::DuplicateName { name });
        }
        self.entries.insert(name, value);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Mutable entry for `name`, inserted with `default` when absent
    pub fn entry_mut(&mut self, name: &str, default: impl FnOnce() -> Value) -> &mut Value {
        self.entries.entry(name.to_string()).or_insert_with(default)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Borrow the namespace as a mapping, e.g. as an expansion scope
    pub fn as_mapping(&self) -> &Mapping {
        &self.entries
    }

    pub fn into_value(self) -> Value {
        Value::Mapping(self.entries)
    }
}

/// Build the `Env` value from environment variables
pub fn environment<I, K, V>(vars: I) -> Value
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    Value::Mapping(
        vars.into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_rejects_existing_name() {
        let mut ns = Namespace::new();
        ns.bind(ENV_KEY, environment([("HOME", "/root")])).unwrap();

        let err = ns.bind("Env", Value::mapping()).unwrap_err();
        assert!(matches!(err, ResolveError::DuplicateName { ref name } if name == "Env"));
        assert_eq!(ns.get("Env").and_then(|v| v.get("HOME")), Some(&Value::from("/root")));
    }

    #[test]
    fn test_entry_mut_inserts_default_once() {
        let mut ns = Namespace::new();
        ns.entry_mut("combined", Value::mapping)
            .as_mapping_mut()
            .unwrap()
            .insert("tz".into(), Value::from("UTC"));
        ns.entry_mut("combined", Value::mapping);

        assert_eq!(ns.len(), 1);
        assert_eq!(ns.get("combined").and_then(|v| v.get("tz")), Some(&Value::from("UTC")));
    }

    #[test]
    fn test_into_value_is_mapping() {
        let mut ns = Namespace::new();
        ns.bind("site", Value::mapping()).unwrap();
        assert!(ns.into_value().get("site").is_some());
    }
}
