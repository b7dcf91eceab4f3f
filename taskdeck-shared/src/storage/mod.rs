//! Signed URLs for task attachments.
//!
//! Attachments live in an external blob store and are referenced by opaque
//! storage ids on the task row. Uploads are two-phase: the API hands out a
//! grant (a fresh storage id plus a time-limited signed PUT target), the
//! client ships bytes directly to storage, and only then references the id
//! from a task. A task-creation failure after a successful upload strands
//! the blob; that leak is accepted and not cleaned up here.
//!
//! At read time storage ids resolve to time-limited signed GET URLs.
//! Signatures are HMAC-SHA256 over the method, id, and expiry, so an
//! expired or tampered URL verifies false.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Error type for attachment URL operations
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Storage id is empty or carries unexpected characters
    #[error("Invalid storage id: {0:?}")]
    InvalidStorageId(String),
}

/// A two-phase upload grant: fresh storage id plus signed PUT target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadGrant {
    /// Newly allocated storage id to reference from a task
    pub storage_id: String,

    /// Signed, time-limited PUT URL for the bytes
    pub upload_url: String,

    /// When the grant stops being accepted
    pub expires_at: DateTime<Utc>,
}

/// Signs and verifies time-limited attachment URLs
#[derive(Debug, Clone)]
pub struct UrlSigner {
    base_url: String,
    key: Vec<u8>,
    ttl_seconds: i64,
}

impl UrlSigner {
    /// Creates a signer
    ///
    /// `base_url` is the public root of the blob store (no trailing
    /// slash); `ttl_seconds` bounds the lifetime of every URL issued.
    pub fn new(base_url: impl Into<String>, secret: &str, ttl_seconds: i64) -> Self {
        Self {
            base_url: base_url.into(),
            key: secret.as_bytes().to_vec(),
            ttl_seconds,
        }
    }

    /// Allocates a storage id and signs an upload target for it
    pub fn create_upload_grant(&self) -> UploadGrant {
        let mut id_bytes = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut id_bytes);
        let storage_id = hex::encode(id_bytes);

        let expires_at = Utc::now() + Duration::seconds(self.ttl_seconds);
        let signature = self.sign("PUT", &storage_id, expires_at.timestamp());

        UploadGrant {
            upload_url: format!(
                "{}/files/{}?expires={}&sig={}",
                self.base_url,
                storage_id,
                expires_at.timestamp(),
                signature
            ),
            storage_id,
            expires_at,
        }
    }

    /// Resolves a storage id to a signed, time-limited download URL
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidStorageId`] for empty or
    /// non-alphanumeric ids; callers treat that as "drop this attachment".
    pub fn download_url(&self, storage_id: &str) -> Result<String, StorageError> {
        if storage_id.is_empty() || !storage_id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(StorageError::InvalidStorageId(storage_id.to_string()));
        }

        let expires = (Utc::now() + Duration::seconds(self.ttl_seconds)).timestamp();
        let signature = self.sign("GET", storage_id, expires);

        Ok(format!(
            "{}/files/{}?expires={}&sig={}",
            self.base_url, storage_id, expires, signature
        ))
    }

    /// Verifies a signature for a method/id/expiry triple
    ///
    /// False when the URL has expired or the signature does not match.
    pub fn verify(&self, method: &str, storage_id: &str, expires: i64, signature: &str) -> bool {
        if expires < Utc::now().timestamp() {
            return false;
        }

        self.sign(method, storage_id, expires) == signature
    }

    fn sign(&self, method: &str, storage_id: &str, expires: i64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.key).expect("HMAC can take key of any size");
        mac.update(format!("{}\n{}\n{}", method, storage_id, expires).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}
