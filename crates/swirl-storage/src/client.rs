//! S3-compatible blob storage client.

use std::time::Duration;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::Credentials;
use aws_sdk_s3::config::Builder;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use aws_types::region::Region;
use tracing::{debug, info};
use url::Url;

use crate::error::{StorageError, StorageResult};
use crate::store::{BlobStore, ContentType, UploadedBlob};

/// Configuration for the blob storage client.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// S3 API endpoint URL
    pub endpoint_url: String,
    /// Access key ID
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Bucket name
    pub bucket_name: String,
    /// Region ("auto" for most S3-compatible providers)
    pub region: String,
    /// Public base URL objects are served from, if the bucket is public
    pub public_base_url: Option<Url>,
    /// Lifetime of presigned download URLs when there is no public base URL
    pub presign_ttl: Option<Duration>,
}

impl StorageConfig {
    /// Create config from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let public_base_url = match std::env::var("STORAGE_PUBLIC_BASE_URL") {
            Ok(raw) if !raw.trim().is_empty() => Some(parse_base_url(raw.trim())?),
            _ => None,
        };

        let presign_ttl = std::env::var("STORAGE_PRESIGN_TTL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            endpoint_url: std::env::var("STORAGE_ENDPOINT_URL")
                .map_err(|_| StorageError::config_error("STORAGE_ENDPOINT_URL not set"))?,
            access_key_id: std::env::var("STORAGE_ACCESS_KEY_ID")
                .map_err(|_| StorageError::config_error("STORAGE_ACCESS_KEY_ID not set"))?,
            secret_access_key: std::env::var("STORAGE_SECRET_ACCESS_KEY")
                .map_err(|_| StorageError::config_error("STORAGE_SECRET_ACCESS_KEY not set"))?,
            bucket_name: std::env::var("STORAGE_BUCKET_NAME")
                .map_err(|_| StorageError::config_error("STORAGE_BUCKET_NAME not set"))?,
            region: std::env::var("STORAGE_REGION").unwrap_or_else(|_| "auto".to_string()),
            public_base_url,
            presign_ttl,
        })
    }
}

/// Parse a base URL so that joining a key appends to its path.
fn parse_base_url(raw: &str) -> StorageResult<Url> {
    let with_slash = if raw.ends_with('/') {
        raw.to_string()
    } else {
        format!("{}/", raw)
    };
    let url = Url::parse(&with_slash).map_err(|e| {
        StorageError::config_error(format!("invalid public base URL {:?}: {}", raw, e))
    })?;
    if url.cannot_be_a_base() {
        return Err(StorageError::config_error(format!(
            "public base URL {:?} cannot be a base",
            raw
        )));
    }
    Ok(url)
}

/// Public URL of `key` under `base`.
fn public_url(base: &Url, key: &str) -> StorageResult<String> {
    base.join(key.trim_start_matches('/'))
        .map(String::from)
        .map_err(|e| StorageError::invalid_key(format!("{}: {}", key, e)))
}

/// S3-compatible storage client.
#[derive(Clone)]
pub struct BlobStorageClient {
    client: Client,
    bucket: String,
    public_base_url: Option<Url>,
    presign_ttl: Option<Duration>,
}

impl BlobStorageClient {
    /// Create a new client from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let credentials = Credentials::new(
            &config.access_key_id,
            &config.secret_access_key,
            None,
            None,
            "swirl-storage",
        );

        let sdk_config = Builder::new()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&config.endpoint_url)
            .region(Region::new(config.region))
            .credentials_provider(credentials)
            .force_path_style(true)
            .build();

        Ok(Self {
            client: Client::from_conf(sdk_config),
            bucket: config.bucket_name,
            public_base_url: config.public_base_url,
            presign_ttl: config.presign_ttl,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> StorageResult<Self> {
        let config = StorageConfig::from_env()?;
        Self::new(config)
    }

    /// Generate a presigned URL for GET.
    pub async fn presign_get(&self, key: &str, expires_in: Duration) -> StorageResult<String> {
        let presign_config = PresigningConfig::expires_in(expires_in)
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presign_config)
            .await
            .map_err(|e| StorageError::PresignFailed(e.to_string()))?;

        Ok(presigned.uri().to_string())
    }

    /// Resolve a retrievable URL for an uploaded object.
    ///
    /// Public base URL first, then a presigned GET, otherwise `None`.
    pub async fn download_url(&self, key: &str) -> StorageResult<Option<String>> {
        if let Some(base) = &self.public_base_url {
            return public_url(base, key).map(Some);
        }
        match self.presign_ttl {
            Some(ttl) => self.presign_get(key, ttl).await.map(Some),
            None => Ok(None),
        }
    }

    /// Check if an object exists.
    pub async fn exists(&self, key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => {
                if e.to_string().contains("NotFound") || e.to_string().contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(StorageError::AwsSdk(e.to_string()))
                }
            }
        }
    }

    /// Delete an object.
    pub async fn delete_object(&self, key: &str) -> StorageResult<()> {
        debug!("Deleting {}", key);

        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StorageError::delete_failed(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl BlobStore for BlobStorageClient {
    async fn put_bytes(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: ContentType,
    ) -> StorageResult<UploadedBlob> {
        if key.is_empty() {
            return Err(StorageError::invalid_key("empty key"));
        }

        let size = bytes.len() as u64;
        debug!("Uploading {} bytes to {}", size, key);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type(content_type.as_str())
            .send()
            .await
            .map_err(|e| StorageError::upload_failed(e.to_string()))?;

        let download_url = self.download_url(key).await?;
        info!("Uploaded {} ({} bytes)", key, size);

        Ok(UploadedBlob {
            key: key.to_string(),
            size,
            content_type,
            download_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: [&str; 7] = [
        "STORAGE_ENDPOINT_URL",
        "STORAGE_ACCESS_KEY_ID",
        "STORAGE_SECRET_ACCESS_KEY",
        "STORAGE_BUCKET_NAME",
        "STORAGE_REGION",
        "STORAGE_PUBLIC_BASE_URL",
        "STORAGE_PRESIGN_TTL_SECS",
    ];

    fn clear_env() {
        for var in VARS {
            std::env::remove_var(var);
        }
    }

    fn set_required_env() {
        std::env::set_var("STORAGE_ENDPOINT_URL", "http://localhost:9000");
        std::env::set_var("STORAGE_ACCESS_KEY_ID", "key");
        std::env::set_var("STORAGE_SECRET_ACCESS_KEY", "secret");
        std::env::set_var("STORAGE_BUCKET_NAME", "swirl");
    }

    fn test_config() -> StorageConfig {
        StorageConfig {
            endpoint_url: "http://localhost:9000".into(),
            access_key_id: "key".into(),
            secret_access_key: "secret".into(),
            bucket_name: "swirl".into(),
            region: "auto".into(),
            public_base_url: None,
            presign_ttl: None,
        }
    }

    #[test]
    #[serial]
    fn test_config_requires_bucket() {
        clear_env();
        set_required_env();
        std::env::remove_var("STORAGE_BUCKET_NAME");
        assert!(matches!(StorageConfig::from_env(), Err(StorageError::ConfigError(_))));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_defaults() {
        clear_env();
        set_required_env();
        std::env::set_var("STORAGE_PRESIGN_TTL_SECS", "soon");

        let config = StorageConfig::from_env().unwrap();
        assert_eq!(config.region, "auto");
        assert!(config.public_base_url.is_none());
        assert!(config.presign_ttl.is_none());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_config_public_url_and_ttl() {
        clear_env();
        set_required_env();
        std::env::set_var("STORAGE_PUBLIC_BASE_URL", "https://cdn.example.com/media");
        std::env::set_var("STORAGE_PRESIGN_TTL_SECS", "900");

        let config = StorageConfig::from_env().unwrap();
        assert_eq!(
            config.public_base_url.map(String::from).as_deref(),
            Some("https://cdn.example.com/media/")
        );
        assert_eq!(config.presign_ttl, Some(Duration::from_secs(900)));
        clear_env();
    }

    #[test]
    fn test_public_url_joins_key() {
        let base = parse_base_url("https://cdn.example.com/media").unwrap();
        assert_eq!(
            public_url(&base, "allPosts/ABC").unwrap(),
            "https://cdn.example.com/media/allPosts/ABC"
        );
        assert_eq!(
            public_url(&base, "/allPosts/ABC").unwrap(),
            "https://cdn.example.com/media/allPosts/ABC"
        );
    }

    #[test]
    fn test_invalid_public_base_url() {
        assert!(parse_base_url("not a url").is_err());
        assert!(parse_base_url("mailto:someone@example.com").is_err());
    }

    #[tokio::test]
    async fn test_download_url_prefers_public_base() {
        let mut config = test_config();
        config.public_base_url = Some(parse_base_url("https://cdn.example.com").unwrap());
        config.presign_ttl = Some(Duration::from_secs(60));
        let client = BlobStorageClient::new(config).unwrap();

        assert_eq!(
            client.download_url("allPosts/P1").await.unwrap().as_deref(),
            Some("https://cdn.example.com/allPosts/P1")
        );
    }

    #[tokio::test]
    async fn test_download_url_presigns_when_configured() {
        let mut config = test_config();
        config.presign_ttl = Some(Duration::from_secs(60));
        let client = BlobStorageClient::new(config).unwrap();

        let url = client.download_url("allPosts/P1").await.unwrap().unwrap();
        assert!(url.starts_with("http://localhost:9000/swirl/allPosts/P1?"));
        assert!(url.contains("X-Amz-Signature"));
    }

    #[tokio::test]
    async fn test_download_url_absent_without_configuration() {
        let client = BlobStorageClient::new(test_config()).unwrap();
        assert_eq!(client.download_url("allPosts/P1").await.unwrap(), None);
    }
}
