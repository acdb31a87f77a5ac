//! Where the portfolio's media lives.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use url::Url;
use vitrine_storage::validate_namespace;

/// S3 refuses presigned URLs valid for longer than seven days.
const MAX_PRESIGN_EXPIRY_SECS: u64 = 7 * 24 * 60 * 60;

fn default_presign_expiry() -> u64 {
    60 * 60
}

/// Object store selection, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    S3(S3Config),
    Local(LocalConfig),
}
impl StorageConfig {
    pub(crate) fn validate(&self) -> Result<()> {
        match self {
            Self::S3(s3) => s3.validate(),
            Self::Local(local) => {
                if local.root.as_os_str().is_empty() {
                    exn::bail!(ErrorKind::Invalid("storage.root must not be empty".into()));
                }
                Ok(())
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct S3Config {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible services (Backblaze, MinIO, R2, ...).
    #[serde(default)]
    pub endpoint: Option<Url>,
    pub key_id: String,
    pub key_secret: Secret,
    /// Key prefix the namespace lives under.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Serve permanent URLs from here instead of presigning.
    #[serde(default)]
    pub public_base_url: Option<Url>,
    #[serde(default = "default_presign_expiry")]
    pub presign_expiry_secs: u64,
}
impl S3Config {
    fn validate(&self) -> Result<()> {
        if self.bucket.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("storage.bucket must not be empty".into()));
        }
        if self.region.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid("storage.region must not be empty".into()));
        }
        if !(1..=MAX_PRESIGN_EXPIRY_SECS).contains(&self.presign_expiry_secs) {
            exn::bail!(ErrorKind::Invalid(format!(
                "storage.presign_expiry_secs must be between 1 and {MAX_PRESIGN_EXPIRY_SECS}"
            )));
        }
        if let Some(prefix) = &self.prefix {
            validate_namespace(prefix).or_raise(|| ErrorKind::Invalid(format!("storage.prefix {prefix:?}")))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocalConfig {
    /// Directory containing namespace directories.
    pub root: PathBuf,
    /// Where `root` is served over HTTP; `file://` URLs otherwise.
    #[serde(default)]
    pub base_url: Option<Url>,
}

/// A credential that stays out of `Debug` output (and therefore logs).
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Secret(String);
impl Secret {
    pub fn expose(&self) -> &str {
        &self.0
    }
}
impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}
impl From<&str> for Secret {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn s3() -> S3Config {
        S3Config {
            bucket: "portfolio".into(),
            region: "us-east-1".into(),
            endpoint: None,
            key_id: "key".into(),
            key_secret: "hunter2".into(),
            prefix: None,
            public_base_url: None,
            presign_expiry_secs: default_presign_expiry(),
        }
    }

    #[test]
    fn test_secret_is_redacted() {
        let debug = format!("{:?}", s3());
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("Secret(..)"));
        assert_eq!(s3().key_secret.expose(), "hunter2");
    }

    #[test]
    fn test_valid_s3() {
        assert!(StorageConfig::S3(s3()).validate().is_ok());
    }

    #[rstest]
    #[case::empty_bucket(S3Config { bucket: " ".into(), ..s3() })]
    #[case::empty_region(S3Config { region: String::new(), ..s3() })]
    #[case::zero_expiry(S3Config { presign_expiry_secs: 0, ..s3() })]
    #[case::long_expiry(S3Config { presign_expiry_secs: MAX_PRESIGN_EXPIRY_SECS + 1, ..s3() })]
    #[case::traversal_prefix(S3Config { prefix: Some("../up".into()), ..s3() })]
    fn test_invalid_s3(#[case] config: S3Config) {
        let err = StorageConfig::S3(config).validate().unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid(_)));
    }

    #[test]
    fn test_empty_local_root() {
        let config = StorageConfig::Local(LocalConfig { root: PathBuf::new(), base_url: None });
        assert!(config.validate().is_err());
    }
}
