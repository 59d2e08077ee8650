//! Fetcher set dispatching on input type

use crate::{EtcdFetcher, FileFetcher, Fetcher, HttpFetcher, MysqlFetcher};
use async_trait::async_trait;
use config::{InputSpec, Settings, SourceSpec};
use reqwest::Client;
use std::time::Duration;
use types::{FetchError, Namespace, Result, Value};

/// One fetcher per backend, sharing a single HTTP client
#[derive(Debug, Clone)]
pub struct FetcherSet {
    file: FileFetcher,
    etcd: EtcdFetcher,
    http: HttpFetcher,
    mysql: MysqlFetcher,
}

impl FetcherSet {
    /// Create the fetchers from runtime settings
    pub fn new(settings: &Settings) -> Result<Self> {
        let timeout = Duration::from_secs(settings.fetch_timeout_seconds);
        let http_client = Client::builder()
            .connect_timeout(timeout)
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| FetchError::Client { message: e.to_string() })?;

        Ok(Self {
            file: FileFetcher::new(),
            etcd: EtcdFetcher::new(http_client.clone(), timeout),
            http: HttpFetcher::new(http_client, timeout),
            mysql: MysqlFetcher::new(timeout),
        })
    }
}

#[async_trait]
impl Fetcher for FetcherSet {
    async fn fetch(&self, spec: &InputSpec, namespace: &Namespace) -> Result<Value> {
        match &spec.source {
            SourceSpec::File { path } => Ok(self.file.fetch(&spec.name, path, namespace)?),
            SourceSpec::Etcd { host, port, dir } => self.etcd.fetch(&spec.name, host, *port, dir).await,
            SourceSpec::Http { url, header, format } => {
                self.http.fetch(&spec.name, url, header, format).await
            }
            SourceSpec::Mysql(source) => self.mysql.fetch(&spec.name, source).await,
        }
    }

    fn dependencies(&self, spec: &InputSpec) -> Result<Vec<String>> {
        match &spec.source {
            SourceSpec::File { path } => Ok(self.file.references(path)?),
            _ => Ok(Vec::new()),
        }
    }
}
