use crate::AssetRecord;
use crate::error::{ErrorKind, LoadError};
use exn::ResultExt;
use futures::future::try_join_all;
use futures::try_join;
use tracing::instrument;
use vitrine_storage::{ObjectRef, ObjectStore};

/// Enumerate `namespace` and resolve every object in it to an [`AssetRecord`].
///
/// After a single listing (following continuation tokens), the URL and the
/// metadata of every object are requested concurrently and the whole batch is
/// awaited. The result is all-or-nothing: if the listing or any single
/// resolution fails, no records are returned. Nothing is retried or cached, so
/// calling this again re-enumerates and re-resolves everything.
///
/// Records come back in the order the store enumerated the objects.
///
/// # Examples
///
/// ```
/// use vitrine_assets::load_assets;
/// use vitrine_storage::backend::MockStore;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store = MockStore::with_files([("files/Rabasorsogon.mp4", vec![0u8; 1024])]);
/// let records = load_assets(&store, "files").await.unwrap();
/// assert_eq!(records[0].name(), "Rabasorsogon.mp4");
/// assert_eq!(records[0].size(), 1024);
/// # }
/// ```
#[instrument(skip(store), fields(store = store.name()))]
pub async fn load_assets(store: &dyn ObjectStore, namespace: &str) -> Result<Vec<AssetRecord>, LoadError> {
    let objects = store.list_all(namespace).await.or_raise(|| ErrorKind::Enumeration(namespace.to_string()))?;
    tracing::debug!(objects = objects.len(), "enumerated namespace");
    let records = try_join_all(objects.iter().map(|object| resolve(store, object))).await?;
    tracing::debug!(records = records.len(), "resolved all objects");
    Ok(records)
}

/// Resolve one object's URL and metadata concurrently; both must succeed.
async fn resolve(store: &dyn ObjectStore, object: &ObjectRef) -> Result<AssetRecord, LoadError> {
    let (url, meta) = try_join!(store.download_url(object), store.metadata(object))
        .or_raise(|| ErrorKind::Resolution(object.name().to_string()))?;
    Ok(AssetRecord::new(object, meta, url))
}
