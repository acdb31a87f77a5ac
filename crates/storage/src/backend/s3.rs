//! S3-compatible object store.
//!
//! This module provides an object store implementation for S3-compatible
//! services including AWS S3, Backblaze B2, Tigris (Fly.io), Cloudflare R2,
//! Google Cloud Storage (interoperability mode), and others.
//!
//! # Credentials
//!
//! Credentials are provided explicitly via the configuration file. Each store
//! specifies its own `key_id` and `key_secret`.
//!
//! # Download URLs
//!
//! Buckets that are publicly readable (or fronted by a CDN) should configure a
//! `public_base_url`; objects then resolve to permanent URLs with no request
//! to the service. Private buckets get presigned `GetObject` URLs that expire
//! after [`S3Options::presign_expiry`].

use crate::{
    ObjectStore,
    error::{ErrorKind, Result},
    models::{DEFAULT_CONTENT_TYPE, ObjectMeta, ObjectPage, ObjectRef, public_url},
    validate_namespace,
};
use async_trait::async_trait;
use aws_sdk_s3::{
    Client,
    config::{BehaviorVersion, Credentials, Region, http::HttpResponse, retry::RetryConfig},
    error::SdkError,
    presigning::PresigningConfig,
    primitives::DateTime,
};
use exn::{OptionExt, ResultExt};
use std::sync::Arc;
use std::time::Duration;
use time::OffsetDateTime;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// Generous default for concurrent S3 requests.
const DEFAULT_CONCURRENT_REQUESTS: usize = 100;
/// Presigned URLs stay valid for an hour unless configured otherwise.
pub const DEFAULT_PRESIGN_EXPIRY: Duration = Duration::from_secs(60 * 60);

/// How objects in the bucket are exposed to browsers.
#[derive(Debug, Clone)]
pub struct S3Options {
    /// Optional key prefix the namespaces live under (acts as virtual directory)
    pub prefix: Option<String>,
    /// Permanent public URL that keys are appended to. When unset, URLs are
    /// presigned.
    pub public_base_url: Option<Url>,
    /// Validity of presigned URLs. S3 caps this at seven days.
    pub presign_expiry: Duration,
}
impl Default for S3Options {
    fn default() -> Self {
        Self {
            prefix: None,
            public_base_url: None,
            presign_expiry: DEFAULT_PRESIGN_EXPIRY,
        }
    }
}

/// S3-compatible object store.
///
/// # Examples
///
/// ```no_run
/// use vitrine_storage::backend::{S3Options, S3Store};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = S3Store::new(
///     "portfolio",
///     "my-bucket",
///     "us-west-004",
///     Some("https://s3.us-west-004.backblazeb2.com".to_string()),
///     "access_key_id",
///     "secret_access_key",
///     S3Options::default(),
/// ).unwrap();
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct S3Store {
    name: String,
    client: Client,
    bucket: String,
    options: S3Options,
    /// Rate limiter for concurrent S3 requests.
    rate_limiter: Arc<Semaphore>,
}

impl S3Store {
    /// Create a new S3 object store.
    ///
    /// # Arguments
    /// * `name` - A name for this store (used in logging)
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region or provider-specific region (e.g., "us-west-004" for Backblaze)
    /// * `endpoint` - Custom endpoint URL for S3-compatible services
    /// * `key_id` - AWS/provider access key ID
    /// * `key_secret` - AWS/provider secret access key
    /// * `options` - Key prefix and URL policy
    pub fn new(
        name: impl Into<String>,
        bucket: impl Into<String>,
        region: impl Into<String>,
        endpoint: Option<impl Into<String>>,
        key_id: impl Into<String>,
        key_secret: impl Into<String>,
        options: S3Options,
    ) -> Result<Self> {
        let region = Region::new(region.into());
        let credentials = Credentials::new(key_id, key_secret, None, None, "vitrine-config");
        let mut config_builder = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(region)
            // Configure retry policy with exponential backoff (1 initial + 3 retries)
            .retry_config(RetryConfig::standard().with_max_attempts(4))
            // Use path-style addressing for better compatibility with
            // S3-compatible services (Backblaze, MinIO, etc.)
            .force_path_style(true);
        // Set custom endpoint for non-AWS services
        if let Some(endpoint_url) = endpoint {
            config_builder = config_builder.endpoint_url(endpoint_url);
        }
        Self::from_client(name, Client::from_conf(config_builder.build()), bucket, options)
    }

    /// Wrap an already configured client.
    pub fn from_client(
        name: impl Into<String>,
        client: Client,
        bucket: impl Into<String>,
        mut options: S3Options,
    ) -> Result<Self> {
        options.prefix = options.prefix.map(validate_namespace).transpose()?;
        Ok(Self {
            name: name.into(),
            client,
            bucket: bucket.into(),
            options,
            rate_limiter: Arc::new(Semaphore::new(DEFAULT_CONCURRENT_REQUESTS)),
        })
    }

    /// Key prefix (with trailing slash) for listing a namespace.
    fn list_prefix(&self, namespace: &str) -> String {
        match &self.options.prefix {
            Some(prefix) => format!("{prefix}/{namespace}/"),
            None => format!("{namespace}/"),
        }
    }

    /// Full S3 key of an object, including the configured prefix.
    fn full_key(&self, object: &ObjectRef) -> String {
        match &self.options.prefix {
            Some(prefix) => format!("{prefix}/{}", object.key()),
            None => object.key(),
        }
    }

    /// Acquire a rate limiter permit before making an S3 API call.
    async fn acquire_permit(&self) -> OwnedSemaphorePermit {
        // unwrap is safe: semaphore is never closed
        self.rate_limiter.clone().acquire_owned().await.unwrap()
    }

    /// Convert AWS DateTime to OffsetDateTime.
    fn parse_datetime(dt: &DateTime) -> Result<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(dt.as_nanos())
            .or_raise(|| ErrorKind::BackendError("S3 datetime out of range".to_string()))
    }

    /// Classify an SDK failure: anything the service answered is a backend
    /// error, anything it never answered is a network error.
    fn classify<E>(err: &SdkError<E, HttpResponse>, key: &str) -> ErrorKind {
        match err {
            SdkError::ServiceError(_) | SdkError::ResponseError(_) => {
                match err.raw_response().map(|response| response.status().as_u16()) {
                    Some(404) => ErrorKind::NotFound(key.to_string()),
                    Some(401 | 403) => ErrorKind::PermissionDenied(key.to_string()),
                    _ => ErrorKind::BackendError(format!("S3 request for `{key}` failed")),
                }
            },
            SdkError::ConstructionFailure(_) => ErrorKind::BackendError(format!("invalid S3 request for `{key}`")),
            _ => ErrorKind::Network(format!("S3 request for `{key}` did not complete")),
        }
    }
}

#[async_trait]
impl ObjectStore for S3Store {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_page(&self, namespace: &str, continuation: Option<&str>) -> Result<ObjectPage> {
        let namespace = validate_namespace(namespace)?;
        let prefix = self.list_prefix(&namespace);
        let output = {
            let _permit = self.acquire_permit().await;
            self.client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(&prefix)
                // Non-recursive: deeper keys are rolled up into common prefixes.
                .delimiter("/")
                .set_continuation_token(continuation.map(str::to_string))
                .send()
                .await
        };
        let output = output.map_err(|e| {
            let kind = Self::classify(&e, &prefix);
            exn::Exn::from(e).raise(kind)
        })?;

        let mut objects = Vec::with_capacity(output.contents().len());
        for entry in output.contents() {
            let key = entry.key().ok_or_raise(|| ErrorKind::BackendError("S3 object without key".to_string()))?;
            match key.strip_prefix(&prefix) {
                // Folder placeholder objects created by web consoles.
                Some("") => continue,
                Some(name) => objects.push(ObjectRef::new(&namespace, name)?),
                None => {
                    tracing::warn!(store = %self.name, key, "S3 returned key outside requested prefix");
                },
            }
        }
        let next = match output.is_truncated() {
            Some(true) => output.next_continuation_token().map(str::to_string),
            _ => None,
        };
        Ok(ObjectPage { objects, next })
    }

    async fn download_url(&self, object: &ObjectRef) -> Result<Url> {
        let key = self.full_key(object);
        if let Some(base) = &self.options.public_base_url {
            return public_url(base, &key);
        }
        let presigning = PresigningConfig::expires_in(self.options.presign_expiry)
            .or_raise(|| ErrorKind::BackendError("invalid presigned URL expiry".to_string()))?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .presigned(presigning)
            .await
            .map_err(|e| {
                let kind = Self::classify(&e, &key);
                exn::Exn::from(e).raise(kind)
            })?;
        Url::parse(request.uri()).or_raise(|| ErrorKind::BackendError(format!("S3 presigned invalid URL for `{key}`")))
    }

    async fn metadata(&self, object: &ObjectRef) -> Result<ObjectMeta> {
        let key = self.full_key(object);
        let output = {
            let _permit = self.acquire_permit().await;
            self.client.head_object().bucket(&self.bucket).key(&key).send().await
        };
        let output = output.map_err(|e| {
            let kind = match e.as_service_error() {
                Some(service) if service.is_not_found() => ErrorKind::NotFound(key.clone()),
                _ => Self::classify(&e, &key),
            };
            exn::Exn::from(e).raise(kind)
        })?;
        let size = output
            .content_length()
            .map(u64::try_from)
            .transpose()
            .or_raise(|| ErrorKind::BackendError(format!("S3 negative content length for `{key}`")))?
            .unwrap_or(0);
        let updated = output
            .last_modified()
            .ok_or_raise(|| ErrorKind::BackendError(format!("S3 missing last-modified for `{key}`")))
            .and_then(Self::parse_datetime)?;
        let content_type = output.content_type().unwrap_or(DEFAULT_CONTENT_TYPE);
        Ok(ObjectMeta::new(size, content_type, updated))
    }
}
