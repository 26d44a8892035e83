//! Interop server client
//!
//! This module provides the [`FederationSource`] trait the download
//! coordinator pulls batches from, and [`InteropClient`], its HTTP
//! implementation against the federation interop server.

use super::models::{DiagnosisKeysDownloadResponse, FetchedBatch};
use crate::adapters::secrets::SecretProvider;
use crate::config::{DownloadConfig, SecretString};
use crate::domain::{BatchTag, InteropError, KeyFedError, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header, Client, ClientBuilder, StatusCode};
use secrecy::ExposeSecret;
use std::time::Duration;
use url::Url;

/// A paginated source of federated diagnosis key batches
///
/// A `None` cursor means "start of day `date`". The source signals that
/// nothing more is available by returning a batch without a next cursor.
#[async_trait]
pub trait FederationSource: Send + Sync {
    /// Fetch one batch
    ///
    /// # Errors
    ///
    /// Transport failures and non-2xx statuses surface as retryable
    /// [`InteropError`]s; unparseable bodies as
    /// [`InteropError::MalformedResponse`].
    async fn fetch_batch(&self, cursor: Option<&BatchTag>, date: NaiveDate)
        -> Result<FetchedBatch>;
}

/// HTTP client for the interop server
///
/// The bearer token is resolved once, when the client is created, and used
/// for every request of the invocation.
///
/// # Example
///
/// ```no_run
/// use keyfed::adapters::interop::{FederationSource, InteropClient};
/// use keyfed::adapters::secrets::EnvSecretProvider;
/// use keyfed::config::load_config;
///
/// # async fn example() -> keyfed::domain::Result<()> {
/// let config = load_config()?;
/// let client = InteropClient::connect(&config, &EnvSecretProvider::new()).await?;
///
/// let today = chrono::Utc::now().date_naive();
/// let batch = client.fetch_batch(None, today).await?;
/// println!("{} exposures", batch.exposures.len());
/// # Ok(())
/// # }
/// ```
pub struct InteropClient {
    base_url: Url,
    client: Client,
    auth_token: SecretString,
}

impl std::fmt::Debug for InteropClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InteropClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl InteropClient {
    /// Resolve the bearer token and build the HTTP client
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be resolved, the base URL is
    /// invalid, or the HTTP client cannot be built.
    pub async fn connect(config: &DownloadConfig, secrets: &dyn SecretProvider) -> Result<Self> {
        let auth_token = secrets
            .resolve(&config.interop_auth_token_secret_name)
            .await?;

        tracing::info!(
            secret_name = %config.interop_auth_token_secret_name,
            "Resolved interop authorization token"
        );

        Self::new(
            &config.interop_base_url,
            auth_token,
            Duration::from_secs(config.request_timeout_seconds),
        )
    }

    /// Build a client with an already resolved token
    pub fn new(base_url: &str, auth_token: SecretString, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| {
            KeyFedError::Configuration(format!("Invalid interop base URL '{base_url}': {e}"))
        })?;

        let client = ClientBuilder::new()
            .timeout(timeout)
            .connect_timeout(timeout.min(Duration::from_secs(10)))
            .build()
            .map_err(|e| {
                KeyFedError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            base_url,
            client,
            auth_token,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    /// `{base}/diagnosiskeys/download/{date}[?batchTag=...]`
    fn download_url(&self, cursor: Option<&BatchTag>, date: NaiveDate) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| {
                KeyFedError::Configuration(format!(
                    "Interop base URL '{}' cannot carry a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["diagnosiskeys", "download", &date.format("%Y-%m-%d").to_string()]);

        if let Some(tag) = cursor {
            url.query_pairs_mut().append_pair("batchTag", tag.as_str());
        }

        Ok(url)
    }

    fn classify_transport_error(err: reqwest::Error) -> InteropError {
        if err.is_timeout() {
            InteropError::Timeout(err.to_string())
        } else {
            InteropError::ConnectionFailed(err.to_string())
        }
    }
}

#[async_trait]
impl FederationSource for InteropClient {
    async fn fetch_batch(
        &self,
        cursor: Option<&BatchTag>,
        date: NaiveDate,
    ) -> Result<FetchedBatch> {
        let url = self.download_url(cursor, date)?;

        tracing::debug!(
            url = %url,
            batch_tag = cursor.map(|t| t.as_str()),
            batch_date = %date,
            "Downloading federated keys"
        );

        let response = self
            .client
            .get(url)
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", self.auth_token.expose_secret().as_ref()),
            )
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(Self::classify_transport_error)?;

        let status = response.status();
        match status {
            StatusCode::NO_CONTENT => {
                tracing::debug!(batch_date = %date, "No more batches available");
                return Ok(FetchedBatch::exhausted());
            }
            s if s.is_success() => {}
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(InteropError::AuthenticationFailed {
                    status: status.as_u16(),
                }
                .into());
            }
            StatusCode::TOO_MANY_REQUESTS => {
                let body = response.text().await.unwrap_or_default();
                return Err(InteropError::RateLimited(body).into());
            }
            s if s.is_server_error() => {
                let body = response.text().await.unwrap_or_default();
                return Err(InteropError::ServerError {
                    status: s.as_u16(),
                    message: body,
                }
                .into());
            }
            s => {
                let body = response.text().await.unwrap_or_default();
                return Err(InteropError::ClientError {
                    status: s.as_u16(),
                    message: body,
                }
                .into());
            }
        }

        // Read the body first so a broken connection stays retryable while a
        // bad body does not.
        let body = response
            .bytes()
            .await
            .map_err(Self::classify_transport_error)?;

        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(FetchedBatch::exhausted());
        }

        let parsed: DiagnosisKeysDownloadResponse = serde_json::from_slice(&body)
            .map_err(|e| InteropError::MalformedResponse(e.to_string()))?;

        let batch = FetchedBatch::from(parsed);

        tracing::debug!(
            batch_date = %date,
            next_batch_tag = batch.next_cursor.as_ref().map(|t| t.as_str()),
            exposures = batch.exposures.len(),
            "Downloaded batch"
        );

        Ok(batch)
    }
}
