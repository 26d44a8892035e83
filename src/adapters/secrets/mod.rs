//! Secret providers
//!
//! The interop bearer token is looked up by name once per invocation.
//! Two providers are available: environment variables (the default) and a
//! directory of mounted secret files.

use crate::config::{secret_string, DownloadConfig, SecretString};
use crate::domain::{KeyFedError, Result, SecretName};
use async_trait::async_trait;
use secrecy::ExposeSecret;
use std::path::PathBuf;
use std::sync::Arc;

/// Source of named secrets
#[async_trait]
pub trait SecretProvider: Send + Sync {
    /// Resolve a secret by name
    ///
    /// # Errors
    ///
    /// Returns `KeyFedError::Secret` if the secret is missing or blank.
    async fn resolve(&self, name: &SecretName) -> Result<SecretString>;
}

/// Reads secrets from environment variables
///
/// The secret name is normalised into a variable name: ASCII letters are
/// upper-cased, every other non-alphanumeric character becomes `_`, and
/// leading underscores are dropped. `/app/interop/AuthorizationToken` is
/// read from `APP_INTEROP_AUTHORIZATIONTOKEN`.
#[derive(Debug, Default, Clone)]
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }

    /// Environment variable holding the named secret
    pub fn variable_name(name: &SecretName) -> String {
        let normalised: String = name
            .as_str()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        normalised.trim_start_matches('_').to_string()
    }
}

#[async_trait]
impl SecretProvider for EnvSecretProvider {
    async fn resolve(&self, name: &SecretName) -> Result<SecretString> {
        let variable = Self::variable_name(name);
        let value = std::env::var(&variable).map_err(|_| {
            KeyFedError::Secret(format!(
                "Secret '{name}' not found (expected environment variable {variable})"
            ))
        })?;

        non_blank(name, secret_string(value))
    }
}

/// Reads secrets from files in a directory, one file per secret
///
/// Path separators in the secret name are flattened to `_` so a name can
/// never escape the directory.
#[derive(Debug, Clone)]
pub struct DirectorySecretProvider {
    dir: PathBuf,
}

impl DirectorySecretProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, name: &SecretName) -> PathBuf {
        let file_name = name
            .as_str()
            .trim_start_matches('/')
            .replace(['/', '\\'], "_")
            .replace("..", "_");
        self.dir.join(file_name)
    }
}

#[async_trait]
impl SecretProvider for DirectorySecretProvider {
    async fn resolve(&self, name: &SecretName) -> Result<SecretString> {
        let path = self.path_for(name);
        let contents = tokio::fs::read_to_string(&path).await.map_err(|e| {
            KeyFedError::Secret(format!(
                "Failed to read secret '{name}' from {}: {e}",
                path.display()
            ))
        })?;

        non_blank(name, secret_string(contents.trim_end().to_string()))
    }
}

fn non_blank(name: &SecretName, secret: SecretString) -> Result<SecretString> {
    if secret.expose_secret().is_empty() {
        return Err(KeyFedError::Secret(format!("Secret '{name}' is empty")));
    }
    Ok(secret)
}

/// Create the secret provider selected by the configuration
pub fn create_secret_provider(config: &DownloadConfig) -> Arc<dyn SecretProvider> {
    match &config.secrets_dir {
        Some(dir) => {
            tracing::debug!(dir = %dir.display(), "Reading secrets from directory");
            Arc::new(DirectorySecretProvider::new(dir.clone()))
        }
        None => {
            tracing::debug!("Reading secrets from environment");
            Arc::new(EnvSecretProvider::new())
        }
    }
}
