use time::OffsetDateTime;
use url::Url;
use vitrine_storage::{ObjectMeta, ObjectRef};

/// A resolved media asset: an object's name, metadata, and retrieval URL.
///
/// Records are immutable once constructed. `name` is the object's filename
/// within its namespace and is the join key for [slot binding](crate::bind).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRecord {
    name: String,
    size: u64,
    content_type: String,
    last_modified: OffsetDateTime,
    url: Url,
}
impl AssetRecord {
    pub fn new(object: &ObjectRef, meta: ObjectMeta, url: Url) -> Self {
        Self {
            name: object.name().to_string(),
            size: meta.size,
            content_type: meta.content_type,
            last_modified: meta.updated,
            url,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn last_modified(&self) -> OffsetDateTime {
        self.last_modified
    }

    /// Retrieval URL; may be time-limited depending on the store.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether the asset can be played in a `<video>` element.
    pub fn is_video(&self) -> bool {
        self.content_type.starts_with("video/")
    }
}
