//! src/secret_store/mod.rs
use async_trait::async_trait;
use secrecy::Secret;

mod rest;
pub use rest::RestSecretStore;

pub const RESEND_API_KEY: &str = "resend_api_key";

#[derive(thiserror::Error, Debug)]
pub enum SecretStoreError {
    #[error("Failed to query the secret store")]
    Request(#[from] reqwest::Error),
    #[error("Expected exactly one `{key_name}` row, found {found}")]
    RowCount { key_name: String, found: usize },
}

/// Read-only access to the `service_keys` table.
#[async_trait]
pub trait SecretStore: Send + Sync {
    async fn lookup(&self, key_name: &str) -> Result<Secret<String>, SecretStoreError>;
}
