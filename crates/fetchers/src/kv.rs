//! Etcd key/value store fetcher (v2 keys API)

use crate::traits::{bounded, timed_out};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use types::{utils::last_segment, FetchError, Mapping, ResolveError, Result, Value};

const BACKEND: &str = "etcd";

/// Response envelope of `GET /v2/keys/...`
#[derive(Debug, Deserialize)]
struct KeysResponse {
    node: KvNode,
}

/// A node in the etcd key tree
#[derive(Debug, Clone, Deserialize)]
pub struct KvNode {
    /// Absent on the root node
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub dir: bool,
    pub value: Option<String>,
    #[serde(default)]
    pub nodes: Vec<KvNode>,
}

/// Reads a directory tree from etcd
#[derive(Debug, Clone)]
pub struct EtcdFetcher {
    http_client: Client,
    timeout: Duration,
}

impl EtcdFetcher {
    pub fn new(http_client: Client, timeout: Duration) -> Self {
        Self { http_client, timeout }
    }

    /// Recursively read `dir` from the etcd member at `host:port`
    pub async fn fetch(&self, input: &str, host: &str, port: u16, dir: &str) -> Result<Value> {
        let url = keys_url(host, port, dir).map_err(|e| FetchError::Kv {
            input: input.to_string(),
            message: format!("invalid etcd address {}:{}: {}", host, port, e),
        })?;
        tracing::info!(input = %input, backend = BACKEND, url = %url, "Fetching input");

        bounded(input, BACKEND, self.timeout, async {
            let response = self
                .http_client
                .get(url.clone())
                .query(&[("recursive", "true")])
                .send()
                .await
                .map_err(|e| self.kv_error(input, e))?;

            if !response.status().is_success() {
                return Err(FetchError::Kv {
                    input: input.to_string(),
                    message: format!("{} returned status {}", url, response.status().as_u16()),
                }
                .into());
            }

            let keys: KeysResponse = response.json().await.map_err(|e| self.kv_error(input, e))?;
            let value = kv_tree_to_value(&keys.node);
            tracing::debug!(
                input = %input,
                keys = value.as_mapping().map_or(0, Mapping::len),
                "Read etcd directory"
            );
            Ok(value)
        })
        .await
    }

    fn kv_error(&self, input: &str, error: reqwest::Error) -> ResolveError {
        if error.is_timeout() {
            return timed_out(input, BACKEND, self.timeout);
        }
        FetchError::Kv {
            input: input.to_string(),
            message: error.to_string(),
        }
        .into()
    }
}

/// `/v2/keys` URL for `dir`, each key segment percent-encoded
fn keys_url(host: &str, port: u16, dir: &str) -> std::result::Result<Url, String> {
    let mut url = Url::parse(&format!("http://{}:{}/v2/keys", host, port)).map_err(|e| e.to_string())?;
    if let Ok(mut path) = url.path_segments_mut() {
        let mut segments = dir.split('/').filter(|s| !s.is_empty()).peekable();
        if segments.peek().is_none() {
            path.push("");
        }
        path.extend(segments);
    }
    Ok(url)
}

/// Convert an etcd node into a mapping keyed by final path segment.
///
/// A directory yields the mapping of its children; a single key yields a
/// one-entry mapping.
pub fn kv_tree_to_value(node: &KvNode) -> Value {
    if node.dir {
        Value::Mapping(children(node))
    } else {
        let mut map = Mapping::new();
        map.insert(last_segment(&node.key).to_string(), leaf(node));
        Value::Mapping(map)
    }
}

fn children(node: &KvNode) -> Mapping {
    node.nodes
        .iter()
        .map(|child| {
            let value = if child.dir {
                Value::Mapping(children(child))
            } else {
                leaf(child)
            };
            (last_segment(&child.key).to_string(), value)
        })
        .collect()
}

fn leaf(node: &KvNode) -> Value {
    Value::String(node.value.clone().unwrap_or_default())
}
