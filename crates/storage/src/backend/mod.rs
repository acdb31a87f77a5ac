//! Object store trait and implementations.
//!
//! This module defines the `ObjectStore` trait, the read-only capability set
//! the asset loader needs from a storage service: enumerate a namespace,
//! resolve an object's retrieval URL, and resolve its metadata.

mod local;
#[cfg(feature = "mock")]
mod mock;
#[cfg(feature = "s3")]
mod s3;

pub use self::local::LocalStore;
#[cfg(feature = "mock")]
pub use self::mock::MockStore;
#[cfg(feature = "s3")]
pub use self::s3::{S3Options, S3Store};
use crate::error::{ErrorKind, Result};
use crate::models::{ObjectMeta, ObjectPage, ObjectRef};
use async_stream::stream;
use async_trait::async_trait;
use futures::{Stream, TryStreamExt};
use std::pin::Pin;
use url::Url;

pub(crate) type ObjectRefStream<'a> = Pin<Box<dyn Stream<Item = Result<ObjectRef>> + Send + 'a>>;

/// Unified interface for object storage services.
///
/// All operations are asynchronous and read-only. Implementations are
/// constructed once (usually from configuration) and shared behind a
/// [`StoreHandle`](crate::StoreHandle).
///
/// # Namespaces
/// A namespace is a `/`-separated key prefix. Listing is non-recursive: only
/// objects directly under the namespace are returned, "sub-folders" are not.
///
/// # Examples
///
/// ```
/// use vitrine_storage::{ObjectStore, error::Result};
///
/// async fn total_size(store: &dyn ObjectStore) -> Result<u64> {
///     let mut total = 0;
///     for object in store.list_all("files").await? {
///         total += store.metadata(&object).await?.size;
///     }
///     Ok(total)
/// }
/// ```
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Name of the configured store (used for logging only).
    fn name(&self) -> &str;

    /// Fetch a single page of the namespace listing.
    ///
    /// `continuation` is the [`next`](ObjectPage::next) token of the previous
    /// page, or `None` for the first page. Ordering within and across pages is
    /// defined by the store.
    async fn list_page(&self, namespace: &str, continuation: Option<&str>) -> Result<ObjectPage>;

    /// Stream every object in the namespace, following continuation tokens
    /// until the listing is exhausted.
    ///
    /// The stream ends after the first error.
    fn list_stream<'a>(&'a self, namespace: &'a str) -> ObjectRefStream<'a> {
        Box::pin(stream! {
            let mut continuation: Option<String> = None;
            loop {
                let page = match self.list_page(namespace, continuation.as_deref()).await {
                    Ok(page) => page,
                    Err(e) => {
                        yield Err(e);
                        return;
                    },
                };
                tracing::debug!(store = self.name(), namespace, objects = page.objects.len(), "listed page");
                for object in page.objects {
                    yield Ok(object);
                }
                match page.next {
                    // A store handing back the token it was given would loop forever.
                    Some(next) if continuation.as_deref() == Some(next.as_str()) => {
                        yield Err(exn::Exn::from(ErrorKind::BackendError(format!(
                            "continuation token `{next}` did not advance"
                        ))));
                        return;
                    },
                    Some(next) => continuation = Some(next),
                    None => break,
                }
            }
        })
    }

    /// List every object in the namespace.
    ///
    /// Default implementation collects [`list_stream()`](Self::list_stream)
    /// into a [`Vec`], preserving enumeration order.
    async fn list_all(&self, namespace: &str) -> Result<Vec<ObjectRef>> {
        self.list_stream(namespace).try_collect().await
    }

    /// Resolve a URL the object can be retrieved from.
    ///
    /// Depending on the store's policy this is either a permanent public URL
    /// or a time-limited signed URL.
    async fn download_url(&self, object: &ObjectRef) -> Result<Url>;

    /// Resolve descriptive metadata without reading the object's content.
    ///
    /// Returns [`NotFound`](crate::error::ErrorKind::NotFound) if the object
    /// no longer exists.
    async fn metadata(&self, object: &ObjectRef) -> Result<ObjectMeta>;
}
