//! # Object storage integration
//!
//! This module defines the [`ObjectStore`] abstraction the upload pass runs
//! against, plus [`GcsClient`], the real Google Cloud Storage implementation
//! used by the CLI binary.
//!
//! - The trait is designed for async usage and easy mocking; test code gets
//!   `MockObjectStore` via the `test-export-mocks` feature.
//! - `GcsClient` speaks the JSON API media-upload endpoint directly and
//!   overwrites existing objects silently (last-write-wins).
//!
//! ## Client usage
//!
//! Construct [`GcsClient`] with [`GcsClient::new_from_env`]. Credentials are
//! the ambient environment's concern: an access token is picked up from
//! `GOOGLE_OAUTH_ACCESS_TOKEN` when present, and `STORAGE_EMULATOR_HOST`
//! overrides the endpoint for emulator-backed runs.

use async_trait::async_trait;
use serde::Deserialize;
use std::env;

/// Default JSON API endpoint for Google Cloud Storage.
pub const DEFAULT_ENDPOINT: &str = "https://storage.googleapis.com";

/// The bare minimum data needed to upload one object.
pub struct NewObject<'a> {
    /// Destination bucket name.
    pub bucket: &'a str,
    /// Full object key, e.g. `dags/sub/b.py`.
    pub object_key: &'a str,
    /// Raw object body.
    pub content: &'a [u8],
}

/// The backend's echo of a completed upload.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedObject {
    #[serde(rename = "name")]
    pub object_key: String,
    #[serde(default)]
    pub bucket: String,
    /// Object size in bytes, as the JSON API reports it (a decimal string).
    #[serde(default)]
    pub size: Option<String>,
}

/// Trait for uploading objects to a storage bucket.
/// The implementor is responsible for transport, serialization and
/// authentication; the trait itself is agnostic of all three.
///
/// Implemented by [`GcsClient`] and by test mocks.
#[cfg_attr(any(test, feature = "test-export-mocks"), mockall::automock)]
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Upload the object body at the given key, silently overwriting any
    /// existing object with the same key.
    async fn upload_object<'a>(
        &self,
        req: NewObject<'a>,
    ) -> Result<UploadedObject, Box<dyn std::error::Error + Send + Sync>>;
}

/// Google Cloud Storage client over the JSON API.
pub struct GcsClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
}

impl GcsClient {
    /// Builds a client from the environment.
    ///
    /// Reads `STORAGE_EMULATOR_HOST` (endpoint override, e.g. a local
    /// fake-gcs-server) and `GOOGLE_OAUTH_ACCESS_TOKEN` (bearer token;
    /// optional, emulators accept unauthenticated requests).
    pub fn new_from_env() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        dotenvy::dotenv().ok(); // loads environment variables from .env if present
        let endpoint =
            env::var("STORAGE_EMULATOR_HOST").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
        let token = env::var("GOOGLE_OAUTH_ACCESS_TOKEN").ok();
        let http = reqwest::Client::builder().build()?;
        tracing::info!(
            endpoint = %endpoint,
            token_set = token.is_some(),
            "Initialized GCS client from environment"
        );
        Ok(GcsClient {
            http,
            endpoint,
            token,
        })
    }

    fn upload_url(&self, bucket: &str) -> String {
        format!(
            "{}/upload/storage/v1/b/{}/o",
            self.endpoint.trim_end_matches('/'),
            bucket
        )
    }
}

#[async_trait]
impl ObjectStore for GcsClient {
    async fn upload_object<'a>(
        &self,
        req: NewObject<'a>,
    ) -> Result<UploadedObject, Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(
            bucket = req.bucket,
            object_key = req.object_key,
            size = req.content.len(),
            "Uploading object"
        );

        let mut request = self
            .http
            .post(self.upload_url(req.bucket))
            .query(&[("uploadType", "media"), ("name", req.object_key)])
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(req.content.to_vec());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(
                %status,
                bucket = req.bucket,
                object_key = req.object_key,
                "Storage backend rejected upload"
            );
            return Err(format!(
                "storage backend returned {status} for '{}': {body}",
                req.object_key
            )
            .into());
        }

        match response.json::<UploadedObject>().await {
            Ok(object) => {
                tracing::info!(
                    object_key = %object.object_key,
                    size = ?object.size,
                    "Successfully uploaded object"
                );
                Ok(object)
            }
            Err(e) => {
                tracing::error!(error = ?e, object_key = req.object_key, "Malformed upload response");
                Err(Box::new(e))
            }
        }
    }
}
