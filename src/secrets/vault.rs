//! HashiCorp Vault KV v2 backend for connection key pairs.
//!
//! Each node's pair is one KV v2 secret at `{base_path}/{node_id}`
//! with two fields, `private` and `public`. Token auth only; the
//! token and address can come from configuration or the standard
//! `VAULT_ADDR`/`VAULT_TOKEN` environment variables.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::error::{SecretError, SecretResult};
use super::{KeyPairFactory, KeyStore};
use crate::domain::ConnectionSshKeyPair;
use crate::error::{Error, Result};

/// Secret field holding the PEM private key.
const FIELD_PRIVATE: &str = "private";

/// Secret field holding the `authorized_keys` line.
const FIELD_PUBLIC: &str = "public";

/// Vault connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault server address
    pub address: String,
    /// Auth token
    pub token: String,
    /// KV v2 mount point
    pub mount: String,
    /// Path prefix under the mount for node key pairs
    pub base_path: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Whether to verify TLS certificates
    pub tls_verify: bool,
    /// Maximum retries for failed requests
    pub max_retries: u32,
    /// Base delay between retries in milliseconds
    pub retry_delay_ms: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8200".to_string(),
            token: String::new(),
            mount: "secret".to_string(),
            base_path: "nodes".to_string(),
            timeout_secs: 30,
            tls_verify: true,
            max_retries: 3,
            retry_delay_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
struct VaultResponse<T> {
    data: Option<T>,
    errors: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct KvV2Data {
    data: HashMap<String, serde_json::Value>,
}

/// Vault-backed [`KeyStore`].
pub struct VaultKeyStore {
    config: VaultConfig,
    client: Client,
}

impl VaultKeyStore {
    /// Build a store from configuration, validating it up front.
    pub fn new(config: VaultConfig) -> SecretResult<Self> {
        if config.address.is_empty() {
            return Err(SecretError::Configuration(
                "Vault address is not set".to_string(),
            ));
        }
        if config.token.is_empty() {
            return Err(SecretError::Configuration(
                "Vault token is not set".to_string(),
            ));
        }

        let mut builder = Client::builder().timeout(Duration::from_secs(config.timeout_secs));
        if !config.tls_verify {
            warn!("TLS certificate verification is disabled for Vault");
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder
            .build()
            .map_err(|e| SecretError::Configuration(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Full request URL for the KV v2 data endpoint of `owner_id`.
    fn secret_url(&self, owner_id: i64) -> String {
        format!(
            "{}/v1/{}/data/{}/{}",
            self.config.address.trim_end_matches('/'),
            self.config.mount,
            self.config.base_path.trim_matches('/'),
            owner_id
        )
    }

    /// Logical path used in error messages.
    fn secret_path(&self, owner_id: i64) -> String {
        format!("{}/{}", self.config.base_path.trim_matches('/'), owner_id)
    }

    /// Execute a request, retrying transport failures with exponential
    /// backoff.
    async fn execute_with_retry(
        &self,
        request_builder: reqwest::RequestBuilder,
    ) -> SecretResult<reqwest::Response> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            if attempt > 0 {
                tokio::time::sleep(Duration::from_millis(
                    self.config.retry_delay_ms * 2u64.pow(attempt - 1),
                ))
                .await;
            }

            match request_builder
                .try_clone()
                .ok_or_else(|| SecretError::Connection("Failed to clone request".to_string()))?
                .send()
                .await
            {
                Ok(response) => return Ok(response),
                Err(e) => {
                    debug!(attempt = attempt, error = %e, "Vault request failed, retrying");
                    last_error = Some(e);
                }
            }
        }

        Err(SecretError::Connection(format!(
            "Request failed after {} retries: {}",
            self.config.max_retries,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
        path: &str,
    ) -> SecretResult<T> {
        let status = response.status();

        if status == StatusCode::NOT_FOUND {
            return Err(SecretError::NotFound(path.to_string()));
        }
        if status == StatusCode::FORBIDDEN {
            return Err(SecretError::Authorization(format!(
                "Access denied to path: {}",
                path
            )));
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(SecretError::Authentication(
                "Token expired or invalid".to_string(),
            ));
        }
        if status == StatusCode::SERVICE_UNAVAILABLE || status == StatusCode::BAD_GATEWAY {
            return Err(SecretError::Sealed(
                "Vault is sealed or unavailable".to_string(),
            ));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SecretError::Backend {
                message: body,
                status_code: Some(status.as_u16()),
            });
        }

        let vault_resp: VaultResponse<T> = response.json().await?;

        if let Some(errors) = vault_resp.errors {
            if !errors.is_empty() {
                return Err(SecretError::Backend {
                    message: errors.join(", "),
                    status_code: Some(status.as_u16()),
                });
            }
        }

        vault_resp
            .data
            .ok_or_else(|| SecretError::InvalidFormat(format!("empty response for {}", path)))
    }

    async fn write_pair(&self, owner_id: i64, pair: &ConnectionSshKeyPair) -> SecretResult<()> {
        let private = std::str::from_utf8(pair.private_pem()).map_err(|_| {
            SecretError::InvalidFormat("private key PEM is not valid UTF-8".to_string())
        })?;

        let body = serde_json::json!({
            "data": {
                FIELD_PRIVATE: private,
                FIELD_PUBLIC: pair.public_key(),
            }
        });

        let request = self
            .client
            .post(self.secret_url(owner_id))
            .header("X-Vault-Token", &self.config.token)
            .json(&body);
        let response = self.execute_with_retry(request).await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SecretError::Backend {
                message: format!("Failed to write secret: {}", body),
                status_code: Some(status.as_u16()),
            });
        }

        debug!(owner_id = owner_id, "Stored key pair in Vault");
        Ok(())
    }

    async fn read_pair(&self, owner_id: i64) -> SecretResult<ConnectionSshKeyPair> {
        let path = self.secret_path(owner_id);
        let request = self
            .client
            .get(self.secret_url(owner_id))
            .header("X-Vault-Token", &self.config.token);
        let response = self.execute_with_retry(request).await?;
        let data = self.handle_response::<KvV2Data>(response, &path).await?;

        let private = field_str(&data, FIELD_PRIVATE, &path)?;
        let public = field_str(&data, FIELD_PUBLIC, &path)?;
        Ok(ConnectionSshKeyPair::new(
            private.into_bytes(),
            public,
        ))
    }
}

fn field_str(data: &KvV2Data, field: &str, path: &str) -> SecretResult<String> {
    let value = data
        .data
        .get(field)
        .ok_or_else(|| SecretError::KeyNotFound(format!("{} in {}", field, path)))?;
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| SecretError::InvalidFormat(format!("field {} in {} is not a string", field, path)))
}

#[async_trait]
impl KeyStore for VaultKeyStore {
    async fn save(&self, owner_id: i64, create: KeyPairFactory) -> Result<ConnectionSshKeyPair> {
        let pair = create()?;
        self.write_pair(owner_id, &pair)
            .await
            .map_err(|e| Error::secret(format!("storing key pair for node {}", owner_id), e))?;
        Ok(pair)
    }

    async fn get(&self, owner_id: i64) -> Result<ConnectionSshKeyPair> {
        self.read_pair(owner_id)
            .await
            .map_err(|e| Error::secret(format!("reading key pair for node {}", owner_id), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_requires_address_and_token() {
        let missing_token = VaultConfig {
            token: String::new(),
            ..VaultConfig::default()
        };
        assert!(VaultKeyStore::new(missing_token).is_err());

        let missing_address = VaultConfig {
            address: String::new(),
            token: "s.token".to_string(),
            ..VaultConfig::default()
        };
        assert!(VaultKeyStore::new(missing_address).is_err());
    }

    #[test]
    fn test_secret_url_shape() {
        let config = VaultConfig {
            address: "http://vault:8200/".to_string(),
            token: "s.token".to_string(),
            base_path: "/nodes/".to_string(),
            ..VaultConfig::default()
        };
        let store = VaultKeyStore::new(config).unwrap();
        assert_eq!(
            store.secret_url(42),
            "http://vault:8200/v1/secret/data/nodes/42"
        );
        assert_eq!(store.secret_path(42), "nodes/42");
    }
}
