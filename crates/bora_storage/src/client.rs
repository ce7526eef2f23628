// --- File: crates/bora_storage/src/client.rs ---
//! Thin client for the Supabase Storage REST API.
//!
//! Uploaded documents live in a single bucket; object keys are
//! `{cliente_id}/{uuid}_{filename}` so a client's files group together and
//! names never collide. The service key comes from the
//! `SUPABASE_SERVICE_KEY` env var, never from the config file.

use crate::error::StorageError;
use bora_common::HTTP_CLIENT;
use bora_config::StorageConfig;
use serde::{Deserialize, Serialize};
use std::env;
use tracing::{debug, error, info};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StorageClient {
    base_url: String,
    bucket: String,
    signed_url_ttl_secs: u64,
}

#[derive(Serialize, Debug)]
struct SignRequest {
    #[serde(rename = "expiresIn")]
    expires_in: u64,
}

#[derive(Deserialize, Debug)]
struct SignResponse {
    #[serde(rename = "signedURL")]
    signed_url: String,
}

impl StorageClient {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            signed_url_ttl_secs: config.signed_url_ttl_secs,
        }
    }

    fn service_key() -> Result<String, StorageError> {
        env::var("SUPABASE_SERVICE_KEY").map_err(|_| StorageError::ConfigError)
    }

    /// Builds the object key for a fresh upload.
    pub fn object_key(cliente_id: Uuid, filename: &str) -> String {
        // Strip any path components a client may sneak into the filename
        let safe_name = filename
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(filename)
            .replace(' ', "_");
        format!("{}/{}_{}", cliente_id, Uuid::new_v4(), safe_name)
    }

    fn validate_key(key: &str) -> Result<(), StorageError> {
        if key.is_empty() || key.contains("..") {
            return Err(StorageError::InvalidPath(format!(
                "unacceptable object key: '{key}'"
            )));
        }
        Ok(())
    }

    /// Uploads raw bytes to the bucket under `key`.
    pub async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        Self::validate_key(key)?;
        let service_key = Self::service_key()?;

        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key);
        debug!("Uploading {} bytes to storage: {}", bytes.len(), key);

        let response = HTTP_CLIENT
            .post(&url)
            .bearer_auth(&service_key)
            .header("Content-Type", content_type)
            .header("x-upsert", "false")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!("Stored object '{}' in bucket '{}'", key, self.bucket);
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            error!("Storage upload failed for '{}': {} - {}", key, status, message);
            Err(StorageError::ApiError {
                status_code: status.as_u16(),
                message,
            })
        }
    }

    /// Creates a time-limited signed download URL for `key`.
    pub async fn signed_url(&self, key: &str) -> Result<String, StorageError> {
        Self::validate_key(key)?;
        let service_key = Self::service_key()?;

        let url = format!(
            "{}/storage/v1/object/sign/{}/{}",
            self.base_url, self.bucket, key
        );

        let response = HTTP_CLIENT
            .post(&url)
            .bearer_auth(&service_key)
            .json(&SignRequest {
                expires_in: self.signed_url_ttl_secs,
            })
            .send()
            .await?;

        let status = response.status();
        let body_text = response.text().await?;

        if status.is_success() {
            let signed: SignResponse = serde_json::from_str(&body_text)?;
            // The API returns a path relative to /storage/v1
            Ok(format!(
                "{}/storage/v1{}",
                self.base_url,
                signed.signed_url.trim_start_matches("/storage/v1")
            ))
        } else {
            error!("Signing URL failed for '{}': {} - {}", key, status, body_text);
            Err(StorageError::ApiError {
                status_code: status.as_u16(),
                message: body_text,
            })
        }
    }

    /// Removes an object from the bucket.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        Self::validate_key(key)?;
        let service_key = Self::service_key()?;

        let url = format!("{}/storage/v1/object/{}/{}", self.base_url, self.bucket, key);

        let response = HTTP_CLIENT
            .delete(&url)
            .bearer_auth(&service_key)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            info!("Deleted object '{}' from bucket '{}'", key, self.bucket);
            Ok(())
        } else {
            let message = response.text().await.unwrap_or_default();
            Err(StorageError::ApiError {
                status_code: status.as_u16(),
                message,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_groups_by_cliente_and_is_unique() {
        let cliente = Uuid::new_v4();
        let a = StorageClient::object_key(cliente, "passaporte.pdf");
        let b = StorageClient::object_key(cliente, "passaporte.pdf");
        assert!(a.starts_with(&format!("{cliente}/")));
        assert!(a.ends_with("_passaporte.pdf"));
        assert_ne!(a, b);
    }

    #[test]
    fn object_key_strips_path_components() {
        let cliente = Uuid::new_v4();
        let key = StorageClient::object_key(cliente, "../../etc/passwd");
        assert!(!key.contains(".."));
        assert!(key.ends_with("_passwd"));
    }

    #[test]
    fn traversal_keys_rejected() {
        assert!(StorageClient::validate_key("a/../b").is_err());
        assert!(StorageClient::validate_key("").is_err());
        assert!(StorageClient::validate_key("cliente/file.pdf").is_ok());
    }
}
