//! Resolution pipeline entry point

use crate::{merge, NamespaceBuilder};
use config::{PipelineConfig, Settings};
use fetchers::{Fetcher, FetcherSet};
use types::{Namespace, Result, CFG_KEY};

/// Builds the final namespace from a validated configuration
pub struct Pipeline<F: Fetcher = FetcherSet> {
    fetcher: F,
}

impl Pipeline<FetcherSet> {
    /// Pipeline over the real backends
    pub fn new(settings: &Settings) -> Result<Self> {
        Ok(Self::with_fetcher(FetcherSet::new(settings)?))
    }
}

impl<F: Fetcher> Pipeline<F> {
    pub fn with_fetcher(fetcher: F) -> Self {
        Self { fetcher }
    }

    /// Bind `Cfg`, resolve every input, then apply the merge directives.
    ///
    /// `seed` carries the keys known before the configuration is read
    /// (`Env`, and `Arg`/`File` when given).
    pub async fn resolve(&self, config: &PipelineConfig, seed: Namespace) -> Result<Namespace> {
        let mut namespace = seed;
        namespace.bind(CFG_KEY, config.document.clone())?;

        NamespaceBuilder::new(&self.fetcher)
            .build(&config.inputs, &mut namespace)
            .await?;
        merge(&mut namespace, &config.merges)?;

        tracing::info!(
            inputs = config.inputs.len(),
            merges = config.merges.len(),
            names = namespace.len(),
            "Namespace resolved"
        );
        Ok(namespace)
    }
}
