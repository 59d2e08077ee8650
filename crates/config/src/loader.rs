//! Configuration loader implementation

use crate::schema::{PipelineConfig, Settings};
use crate::validation::{ConfigValidator, ValidationReport};
use codec::{decode_str, load_file, DataFormat};
use figment::{
    providers::{Env, Serialized},
    Figment,
};
use std::path::Path;
use types::{Namespace, Value};

/// Loads the configuration document and the runtime settings
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load the configuration document at `path`.
    ///
    /// The text is expanded against `seed` (normally `Env`, `Arg` and `File`)
    /// before it is decoded, so `${Env.HOME}` works anywhere in the document.
    pub fn load<P: AsRef<Path>>(path: P, seed: &Namespace) -> types::Result<PipelineConfig> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "Loading configuration");

        let document = load_file(path, seed.as_mapping(), "config")?;
        Self::from_document(document)
    }

    /// Load configuration from a string (for testing)
    pub fn load_from_str(content: &str, format: DataFormat) -> types::Result<PipelineConfig> {
        let document = decode_str(content, format)?;
        Self::from_document(document)
    }

    /// Validate an already decoded document
    pub fn from_document(document: Value) -> types::Result<PipelineConfig> {
        let mut report = ValidationReport::new();
        let config = ConfigValidator::validate(&document, &mut report);

        if report.has_warnings() {
            for warning in &report.warnings {
                tracing::warn!(field = %warning.field, "{}", warning.message);
            }
        }
        tracing::debug!("{}", report.summary());

        report.into_result()?;
        Ok(config)
    }
}

impl Settings {
    /// Built-in settings overridden by `TF_`-prefixed environment variables
    pub fn load() -> Result<Self, figment::Error> {
        Self::from_figment(
            Figment::from(Serialized::defaults(Settings::default())).merge(Env::prefixed("TF_")),
        )
    }

    pub fn from_figment(figment: Figment) -> Result<Self, figment::Error> {
        let settings: Settings = figment.extract()?;
        tracing::debug!(
            fetch_timeout_seconds = settings.fetch_timeout_seconds,
            user_agent = %settings.user_agent,
            "Loaded settings"
        );
        Ok(settings)
    }
}
