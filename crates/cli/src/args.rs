//! Command-line arguments and namespace seeding

use anyhow::{Context, Result};
use clap::Parser;
use codec::{decode_str, load_file, DataFormat};
use std::path::PathBuf;
use types::{environment, Namespace, ARG_KEY, ENV_KEY, FILE_KEY};

/// Resolve configuration inputs into a single namespace
#[derive(Parser, Debug)]
#[command(name = "tf")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file (YAML, JSON or TOML, by extension)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Inline input data, bound as `Arg`
    #[arg(short, long)]
    pub input: Option<String>,

    /// Data serialization format of --input: YAML, JSON or TOML
    #[arg(short = 'F', long, default_value = "YAML", value_parser = DataFormat::from_name)]
    pub input_format: DataFormat,

    /// Input file bound as `File`, format based on the file extension
    #[arg(short = 'f', long)]
    pub input_file: Option<PathBuf>,

    /// Format the resolved namespace is printed in
    #[arg(short, long, default_value = "YAML", value_parser = DataFormat::from_name)]
    pub output_format: DataFormat,

    /// Verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Namespace holding `Env` plus `Arg` and `File` when given
    pub fn seed<I>(&self, vars: I) -> Result<Namespace>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut namespace = Namespace::new();
        namespace.bind(ENV_KEY, environment(vars))?;

        if let Some(input) = &self.input {
            let value = decode_str(input, self.input_format)
                .with_context(|| format!("Failed to decode --input as {}", self.input_format))?;
            namespace.bind(ARG_KEY, value)?;
        }

        if let Some(path) = &self.input_file {
            let value = load_file(path, namespace.as_mapping(), FILE_KEY)
                .with_context(|| format!("Failed to load input file {}", path.display()))?;
            namespace.bind(FILE_KEY, value)?;
        }

        Ok(namespace)
    }
}

/// Process environment, skipping variables that are not valid UTF-8
pub fn process_env() -> impl Iterator<Item = (String, String)> {
    std::env::vars_os().filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use types::Value;

    fn vars() -> Vec<(String, String)> {
        vec![("HOME".to_string(), "/home/ops".to_string())]
    }

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["tf", "--config", "tf.yaml"]);
        assert_eq!(args.input_format, DataFormat::Yaml);
        assert_eq!(args.output_format, DataFormat::Yaml);
        assert!(args.input.is_none());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Args::try_parse_from(["tf", "-c", "tf.yaml", "-F", "INI"]).is_err());
    }

    #[test]
    fn test_seed_binds_env_and_arg() {
        let args = Args::parse_from(["tf", "-c", "tf.yaml", "-i", r#"{"tier": "web"}"#, "-F", "json"]);
        let namespace = args.seed(vars()).unwrap();

        assert_eq!(namespace.names().collect::<Vec<_>>(), ["Env", "Arg"]);
        assert_eq!(
            namespace.get(ARG_KEY).and_then(|v| v.get("tier")),
            Some(&Value::from("web"))
        );
    }

    #[test]
    fn test_seed_loads_input_file_with_expansion() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("extra.yaml");
        fs::write(&path, "home: ${Env.HOME}\n").unwrap();

        let args = Args::parse_from(["tf", "-c", "tf.yaml", "--input-file", path.to_str().unwrap()]);
        let namespace = args.seed(vars()).unwrap();

        assert_eq!(
            namespace.get(FILE_KEY).and_then(|v| v.get("home")),
            Some(&Value::from("/home/ops"))
        );
        assert!(namespace.get(ARG_KEY).is_none());
    }

    #[test]
    fn test_seed_reports_bad_input() {
        let args = Args::parse_from(["tf", "-c", "tf.yaml", "-i", "[unclosed"]);
        assert!(args.seed(vars()).is_err());
    }
}
