//! src/secret_store/rest.rs
use super::{SecretStore, SecretStoreError};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

const TABLE: &str = "service_keys";

#[derive(Deserialize)]
struct SecretRecord {
    key_value: Secret<String>,
}

/// Empty settings are accepted here and fail in `lookup`.
#[derive(Debug)]
pub struct RestSecretStore {
    http_client: Client,
    project_url: String,
    service_role_key: Secret<String>,
}

impl RestSecretStore {
    pub fn new(project_url: String, service_role_key: Secret<String>) -> Self {
        Self {
            http_client: Client::new(),
            project_url,
            service_role_key,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.project_url.trim_end_matches('/'), TABLE)
    }
}

#[async_trait]
impl SecretStore for RestSecretStore {
    #[tracing::instrument(name = "Looking up a service key", skip(self))]
    async fn lookup(&self, key_name: &str) -> Result<Secret<String>, SecretStoreError> {
        let filter = format!("eq.{}", key_name);

        // Two rows are enough to tell "one" apart from "many".
        let rows: Vec<SecretRecord> = self
            .http_client
            .get(self.table_url())
            .query(&[
                ("select", "key_value"),
                ("key_name", filter.as_str()),
                ("limit", "2"),
            ])
            .header("apikey", self.service_role_key.expose_secret())
            .bearer_auth(self.service_role_key.expose_secret())
            .header("accept", "application/json")
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        match <[SecretRecord; 1]>::try_from(rows) {
            Ok([record]) => Ok(record.key_value),
            Err(rows) => Err(SecretStoreError::RowCount {
                key_name: key_name.to_string(),
                found: rows.len(),
            }),
        }
    }
}
