//! Storage models.
//!
//! These types are what storage backends hand back from listing and metadata
//! calls. They carry no object content.

use crate::error::{ErrorKind, Result};
use crate::key::{validate_name, validate_namespace};
use exn::ResultExt;
use time::OffsetDateTime;
use url::Url;

/// Fallback MIME type for objects the backend cannot classify.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Opaque handle to a stored object.
///
/// Returned by listing operations and used to request the object's URL and
/// metadata without enumerating the namespace again.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    namespace: String,
    name: String,
}
impl ObjectRef {
    /// Create a reference to `name` directly under `namespace`.
    ///
    /// The namespace is normalized via [`validate_namespace`]; the name must
    /// be a single key segment.
    pub fn new(namespace: impl AsRef<str>, name: impl AsRef<str>) -> Result<Self> {
        Ok(Self {
            namespace: validate_namespace(namespace)?,
            name: validate_name(name)?,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Object name within its namespace (the filename).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full object key, `namespace/name`.
    pub fn key(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }
}

/// Descriptive object metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Object size in bytes
    pub size: u64,
    /// MIME type reported by (or inferred for) the backend
    pub content_type: String,
    /// Last modified timestamp
    pub updated: OffsetDateTime,
}
impl ObjectMeta {
    pub fn new(size: u64, content_type: impl Into<String>, updated: OffsetDateTime) -> Self {
        Self {
            size,
            content_type: content_type.into(),
            updated,
        }
    }
}

/// One page of a namespace listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectPage {
    pub objects: Vec<ObjectRef>,
    /// Continuation token for the next page, `None` when the listing is
    /// exhausted.
    pub next: Option<String>,
}
impl ObjectPage {
    pub fn last(objects: Vec<ObjectRef>) -> Self {
        Self { objects, next: None }
    }

    pub fn with_next(objects: Vec<ObjectRef>, next: impl Into<String>) -> Self {
        Self {
            objects,
            next: Some(next.into()),
        }
    }
}

/// Infer a MIME type from an object name's extension.
///
/// Only covers the media a portfolio page is expected to host; anything else
/// falls back to [`DEFAULT_CONTENT_TYPE`].
pub fn content_type_for(name: &str) -> &'static str {
    let Some((_, extension)) = name.rsplit_once('.') else {
        return DEFAULT_CONTENT_TYPE;
    };
    match extension.to_ascii_lowercase().as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "ogv" => "video/ogg",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "json" => "application/json",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

/// Join an object key onto a public base URL.
///
/// The base is treated as a directory even without a trailing slash, so
/// `https://cdn.example.com/media` + `files/a.mp4` becomes
/// `https://cdn.example.com/media/files/a.mp4`.
pub fn public_url(base: &Url, key: &str) -> Result<Url> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(key).or_raise(|| ErrorKind::InvalidKey(key.to_string()))
}
