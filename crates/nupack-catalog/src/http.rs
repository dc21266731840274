//! HTTP transport with timeouts and retry/backoff.

use crate::error::{CatalogError, Result};
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode, header};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use url::Url;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Maximum retries for retryable failures.
    pub max_retries: usize,
    /// Initial retry delay.
    pub retry_delay: Duration,
    /// Maximum retry delay.
    pub max_retry_delay: Duration,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 3,
            retry_delay: Duration::from_millis(100),
            max_retry_delay: Duration::from_secs(10),
            user_agent: format!("nupack/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Shared HTTP client for all feed endpoints.
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
    config: HttpConfig,
}

impl HttpClient {
    /// Create a client with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(HttpConfig::default())
    }

    /// Create a client with custom configuration.
    pub fn with_config(config: HttpConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            "application/json"
                .parse()
                .map_err(|_| CatalogError::InvalidConfig {
                    message: "invalid accept header".into(),
                })?,
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| CatalogError::InvalidConfig {
                message: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    fn retry_policy(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.config.retry_delay)
            .with_max_delay(self.config.max_retry_delay)
            .with_max_times(self.config.max_retries)
    }

    /// GET a JSON document. Returns `Ok(None)` on 404; retries transient
    /// failures with exponential backoff.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        source: &str,
        url: &Url,
    ) -> Result<Option<T>> {
        let fetch = || async {
            debug!(%url, "GET");
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| CatalogError::from_reqwest(source, &e))?;

            match response.status() {
                StatusCode::NOT_FOUND => Ok(None),
                status if status.is_success() => {
                    let body = response
                        .json::<T>()
                        .await
                        .map_err(|e| CatalogError::MalformedResponse {
                            name: source.to_string(),
                            message: e.to_string(),
                        })?;
                    Ok(Some(body))
                }
                status => Err(CatalogError::Status {
                    name: source.to_string(),
                    status: status.as_u16(),
                }),
            }
        };

        fetch
            .retry(self.retry_policy())
            .when(CatalogError::is_retryable)
            .notify(|err: &CatalogError, dur: Duration| {
                warn!(%err, delay_ms = dur.as_millis() as u64, "retrying request");
            })
            .await
    }

    /// GET a binary payload, streaming it to `dest`. Returns the number
    /// of bytes written.
    pub async fn get_to_file(&self, source: &str, url: &Url, dest: &Path) -> Result<u64> {
        use futures_util::StreamExt;

        let fetch = || async {
            debug!(%url, dest = %dest.display(), "GET (download)");
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .map_err(|e| CatalogError::from_reqwest(source, &e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(CatalogError::Status {
                    name: source.to_string(),
                    status: status.as_u16(),
                });
            }

            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| CatalogError::Io {
                    path: dest.to_path_buf(),
                    message: e.to_string(),
                })?;

            let mut written = 0u64;
            let mut stream = response.bytes_stream();
            while let Some(chunk) = stream.next().await {
                let chunk = chunk.map_err(|e| CatalogError::from_reqwest(source, &e))?;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| CatalogError::Io {
                        path: dest.to_path_buf(),
                        message: e.to_string(),
                    })?;
                written += chunk.len() as u64;
            }
            file.flush().await.map_err(|e| CatalogError::Io {
                path: dest.to_path_buf(),
                message: e.to_string(),
            })?;

            Ok(written)
        };

        fetch
            .retry(self.retry_policy())
            .when(CatalogError::is_retryable)
            .notify(|err: &CatalogError, dur: Duration| {
                warn!(%err, delay_ms = dur.as_millis() as u64, "retrying download");
            })
            .await
    }
}
