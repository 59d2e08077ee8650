//! HTTP endpoint fetcher

use crate::traits::{bounded, timed_out};
use codec::{decode, DataFormat};
use config::split_header;
use reqwest::Client;
use std::time::Duration;
use types::{FetchError, ResolveError, Result, Value};

const BACKEND: &str = "http";

/// Fetches a document over HTTP and decodes it with the input's format
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    http_client: Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Create a new HTTP fetcher
    pub fn new(http_client: Client, timeout: Duration) -> Self {
        Self { http_client, timeout }
    }

    /// GET `url` with a single `Name: value` header.
    ///
    /// A non-2xx status fails without looking at the body.
    pub async fn fetch(&self, input: &str, url: &str, header: &str, format: &str) -> Result<Value> {
        let format = DataFormat::from_name(format)
            .map_err(|source| FetchError::Decode { input: input.to_string(), source })?;
        let (header_name, header_value) = split_header(header).ok_or_else(|| FetchError::Transport {
            input: input.to_string(),
            message: format!("malformed header \"{}\"", header),
        })?;

        tracing::info!(input = %input, backend = BACKEND, url = %url, "Fetching input");

        bounded(input, BACKEND, self.timeout, async {
            let response = self
                .http_client
                .get(url)
                .header(header_name, header_value)
                .send()
                .await
                .map_err(|e| self.transport_error(input, e))?;

            if !response.status().is_success() {
                tracing::error!(input = %input, status = response.status().as_u16(), "HTTP request failed");
                return Err(FetchError::Http {
                    input: input.to_string(),
                    status: response.status().as_u16(),
                }
                .into());
            }

            let body = response.bytes().await.map_err(|e| self.transport_error(input, e))?;
            tracing::debug!(input = %input, bytes = body.len(), format = %format, "Received response body");

            decode(&body, format)
                .map_err(|source| FetchError::Decode { input: input.to_string(), source }.into())
        })
        .await
    }

    fn transport_error(&self, input: &str, error: reqwest::Error) -> ResolveError {
        if error.is_timeout() {
            return timed_out(input, BACKEND, self.timeout);
        }
        FetchError::Transport {
            input: input.to_string(),
            message: error.to_string(),
        }
        .into()
    }
}
