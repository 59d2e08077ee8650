//! Fetcher trait and shared fetch helpers

use async_trait::async_trait;
use config::InputSpec;
use std::future::Future;
use std::time::Duration;
use types::{Namespace, ResolveError, Result, Value};

/// Turns an input definition into data
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the data for `spec`.
    ///
    /// `namespace` holds everything resolved so far; file inputs expand
    /// `${...}` references against it.
    async fn fetch(&self, spec: &InputSpec, namespace: &Namespace) -> Result<Value>;

    /// Namespace names `spec` refers to and that must be resolved before it
    fn dependencies(&self, _spec: &InputSpec) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}

/// Run a network fetch, failing with [`ResolveError::Timeout`] once `limit` elapses
pub(crate) async fn bounded<F, T>(input: &str, backend: &str, limit: Duration, fetch: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, fetch)
        .await
        .map_err(|_| timed_out(input, backend, limit))?
}

pub(crate) fn timed_out(input: &str, backend: &str, limit: Duration) -> ResolveError {
    tracing::error!(input = %input, backend = %backend, seconds = limit.as_secs(), "Fetch timed out");
    ResolveError::Timeout {
        input: input.to_string(),
        backend: backend.to_string(),
        seconds: limit.as_secs(),
    }
}
