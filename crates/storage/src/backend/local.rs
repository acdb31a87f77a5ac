//! Local filesystem object store.
//!
//! Serves objects from a directory on the local filesystem, where each
//! namespace is a sub-directory. Useful for previewing a page against media
//! that hasn't been uploaded yet.

use crate::error::{ErrorKind, Result};
use crate::models::{ObjectMeta, ObjectPage, ObjectRef, content_type_for, public_url};
use crate::{ObjectStore, validate_namespace};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use tokio::fs;
use url::Url;

/// Local filesystem object store.
///
/// All namespaces are relative to the configured root directory. Objects are
/// listed in name order since directory iteration order is not stable.
///
/// # URLs
/// With a `base_url` configured (for example, a static file server rooted at
/// the same directory) objects resolve to `base_url/namespace/name`.
/// Otherwise they resolve to `file://` URLs.
///
/// # Examples
///
/// ```no_run
/// use vitrine_storage::backend::LocalStore;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = LocalStore::new("local", "/srv/portfolio", None).unwrap();
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct LocalStore {
    name: String,
    /// Root directory containing namespace directories
    root: PathBuf,
    base_url: Option<Url>,
}
impl LocalStore {
    /// Create a new local filesystem store.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKey`](ErrorKind::InvalidKey) if `root` is not an
    /// absolute path to an existing directory.
    pub fn new(name: impl Into<String>, root: impl AsRef<Path>, base_url: Option<Url>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        // Use non-async here; it'll only happen once on startup and it's not
        // worth the hassle of making the constructor async.
        if !root.is_absolute() || !root.is_dir() {
            exn::bail!(ErrorKind::InvalidKey(root.display().to_string()));
        }
        Ok(Self {
            name: name.into(),
            root,
            base_url,
        })
    }

    fn object_path(&self, object: &ObjectRef) -> PathBuf {
        object.namespace().split('/').fold(self.root.clone(), |path, segment| path.join(segment)).join(object.name())
    }

    fn map_io_error(e: std::io::Error, key: impl Into<String>) -> ErrorKind {
        match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound(key.into()),
            std::io::ErrorKind::PermissionDenied => ErrorKind::PermissionDenied(key.into()),
            _ => ErrorKind::Io(e),
        }
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    fn name(&self) -> &str {
        &self.name
    }

    /// Reads the whole directory as one page.
    async fn list_page(&self, namespace: &str, _continuation: Option<&str>) -> Result<ObjectPage> {
        let namespace = validate_namespace(namespace)?;
        let directory = namespace.split('/').fold(self.root.clone(), |path, segment| path.join(segment));
        let mut entries = fs::read_dir(&directory).await.map_err(|e| Self::map_io_error(e, &namespace))?;
        let mut objects = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(|e| Self::map_io_error(e, &namespace))? {
            let file_type = entry.file_type().await.map_err(|e| Self::map_io_error(e, &namespace))?;
            if !file_type.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(path = %entry.path().display(), "Skipping object with non-UTF-8 name");
                continue;
            };
            objects.push(ObjectRef::new(&namespace, name)?);
        }
        objects.sort_by(|a, b| a.name().cmp(b.name()));
        Ok(ObjectPage::last(objects))
    }

    async fn download_url(&self, object: &ObjectRef) -> Result<Url> {
        match &self.base_url {
            Some(base) => public_url(base, &object.key()),
            None => {
                let path = self.object_path(object);
                Url::from_file_path(&path)
                    .map_err(|()| exn::Exn::from(ErrorKind::InvalidKey(path.display().to_string())))
            },
        }
    }

    async fn metadata(&self, object: &ObjectRef) -> Result<ObjectMeta> {
        let metadata =
            fs::metadata(self.object_path(object)).await.map_err(|e| Self::map_io_error(e, object.key()))?;
        if !metadata.is_file() {
            exn::bail!(ErrorKind::NotFound(object.key()));
        }
        let updated = OffsetDateTime::from(metadata.modified().map_err(ErrorKind::Io)?);
        Ok(ObjectMeta::new(metadata.len(), content_type_for(object.name()), updated))
    }
}
