use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::sync::Arc;
use vitrine_config::{LocalConfig, StorageConfig};
use vitrine_storage::StoreHandle;
use vitrine_storage::backend::LocalStore;

/// Build the object store described by `config`.
pub fn connect(config: &StorageConfig) -> Result<StoreHandle> {
    match config {
        StorageConfig::S3(s3) => s3::connect(s3),
        StorageConfig::Local(local) => local_store(local),
    }
}

fn local_store(config: &LocalConfig) -> Result<StoreHandle> {
    let root = std::path::absolute(&config.root).or_raise(|| ErrorKind::Storage)?;
    let store = LocalStore::new("local", root, config.base_url.clone()).or_raise(|| ErrorKind::Storage)?;
    Ok(Arc::new(store))
}

#[cfg(feature = "s3")]
mod s3 {
    use crate::error::{ErrorKind, Result};
    use exn::ResultExt;
    use std::sync::Arc;
    use std::time::Duration;
    use vitrine_config::S3Config;
    use vitrine_storage::StoreHandle;
    use vitrine_storage::backend::{S3Options, S3Store};

    pub(super) fn connect(config: &S3Config) -> Result<StoreHandle> {
        let options = S3Options {
            prefix: config.prefix.clone(),
            public_base_url: config.public_base_url.clone(),
            presign_expiry: Duration::from_secs(config.presign_expiry_secs),
        };
        let endpoint = config.endpoint.as_ref().map(|url| url.as_str().trim_end_matches('/'));
        let store = S3Store::new(
            "s3",
            config.bucket.as_str(),
            config.region.as_str(),
            endpoint,
            config.key_id.as_str(),
            config.key_secret.expose(),
            options,
        )
        .or_raise(|| ErrorKind::Storage)?;
        tracing::debug!(bucket = %config.bucket, region = %config.region, "Connected S3 store");
        Ok(Arc::new(store))
    }
}

#[cfg(not(feature = "s3"))]
mod s3 {
    use crate::error::{ErrorKind, Result};
    use vitrine_config::S3Config;
    use vitrine_storage::StoreHandle;

    pub(super) fn connect(_config: &S3Config) -> Result<StoreHandle> {
        exn::bail!(ErrorKind::Unsupported("s3".into()))
    }
}
