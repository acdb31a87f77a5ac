//! Three-way load state and the view that owns one load cycle.

use crate::error::{LoadError, USER_FACING_LOAD_ERROR};
use crate::{AssetRecord, load_assets};
use std::sync::Arc;
use tokio::sync::watch;
use vitrine_storage::StoreHandle;

/// Where a view's asset load currently stands.
///
/// Exactly one variant is active. A view starts in [`Loading`](Self::Loading)
/// and moves once to [`Error`](Self::Error) or [`Ready`](Self::Ready); neither
/// of those is ever left without activating a new view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    /// User-visible failure message. The underlying cause is logged, not
    /// carried.
    Error(String),
    /// Every enumerated object, fully resolved, in enumeration order.
    Ready(Arc<[AssetRecord]>),
}
impl LoadState {
    /// Collapse a load result into a state, logging the cause of a failure.
    pub fn settle(result: Result<Vec<AssetRecord>, LoadError>) -> Self {
        match result {
            Ok(records) => Self::Ready(records.into()),
            Err(err) => {
                tracing::error!(error = ?err, "Asset load failed: {}", *err);
                Self::Error(USER_FACING_LOAD_ERROR.to_string())
            },
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Records, if the load succeeded.
    pub fn records(&self) -> Option<&[AssetRecord]> {
        match self {
            Self::Ready(records) => Some(records.as_ref()),
            _ => None,
        }
    }
}

/// One activation of the asset loader.
///
/// [`activate()`](Self::activate) starts a single background load and returns
/// immediately; [`state()`](Self::state) can then be read as often as needed
/// (for example, on every render). There is no cancellation: dropping the view
/// before the load settles simply discards the result once it arrives.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use vitrine_assets::{AssetView, LoadState};
/// use vitrine_storage::{StoreHandle, backend::MockStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let store: StoreHandle = Arc::new(MockStore::with_files([("files/a.mp4", b"a".to_vec())]));
/// let mut view = AssetView::activate(store, "files");
/// let state = view.settled().await;
/// assert_eq!(state.records().map(<[_]>::len), Some(1));
/// # }
/// ```
pub struct AssetView {
    state: watch::Receiver<LoadState>,
}
impl AssetView {
    /// Start loading `namespace` from `store` on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn activate(store: StoreHandle, namespace: impl Into<String>) -> Self {
        let (sender, receiver) = watch::channel(LoadState::Loading);
        let namespace = namespace.into();
        tokio::spawn(async move {
            let state = LoadState::settle(load_assets(&*store, &namespace).await);
            // The only way to fail is for every receiver to be gone, meaning
            // the view was torn down. Nobody is left to tell.
            if sender.send(state).is_err() {
                tracing::debug!(namespace = %namespace, "Asset view dropped before load settled, discarding result");
            }
        });
        Self { state: receiver }
    }

    /// The current state. Cheap: records are shared, not copied.
    pub fn state(&self) -> LoadState {
        self.state.borrow().clone()
    }

    /// Wait until the load has settled and return the final state.
    pub async fn settled(&mut self) -> LoadState {
        match self.state.wait_for(|state| !state.is_loading()).await {
            Ok(state) => state.clone(),
            // The loader task ended without sending; only a panic does that.
            Err(_) => {
                tracing::error!("Asset loader task ended without settling");
                LoadState::Error(USER_FACING_LOAD_ERROR.to_string())
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::time::Duration;
    use tokio::sync::Notify;
    use url::Url;
    use vitrine_storage::backend::MockStore;
    use vitrine_storage::error::Result;
    use vitrine_storage::{ObjectMeta, ObjectPage, ObjectRef, ObjectStore};

    /// Holds every listing until the test opens the gate.
    struct GatedStore {
        inner: MockStore,
        gate: Arc<Notify>,
    }

    #[async_trait]
    impl ObjectStore for GatedStore {
        fn name(&self) -> &str {
            "gated"
        }

        async fn list_page(&self, namespace: &str, continuation: Option<&str>) -> Result<ObjectPage> {
            self.gate.notified().await;
            self.inner.list_page(namespace, continuation).await
        }

        async fn download_url(&self, object: &ObjectRef) -> Result<Url> {
            self.inner.download_url(object).await
        }

        async fn metadata(&self, object: &ObjectRef) -> Result<ObjectMeta> {
            self.inner.metadata(object).await
        }
    }

    fn gated() -> (Arc<GatedStore>, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let store = GatedStore {
            inner: MockStore::with_files([("files/a.mp4", b"a".to_vec())]),
            gate: gate.clone(),
        };
        (Arc::new(store), gate)
    }

    fn store(files: &[&str]) -> StoreHandle {
        Arc::new(MockStore::with_files(files.iter().map(|key| (*key, b"data".to_vec()))))
    }

    #[tokio::test]
    async fn test_settles_ready() {
        let mut view = AssetView::activate(store(&["files/a.mp4", "files/b.mp4"]), "files");
        let state = view.settled().await;
        let names: Vec<_> = state.records().unwrap().iter().map(AssetRecord::name).collect();
        assert_eq!(names, ["a.mp4", "b.mp4"]);
        assert_eq!(view.state(), state);
    }

    #[tokio::test]
    async fn test_settles_ready_when_empty() {
        let mut view = AssetView::activate(store(&[]), "files");
        assert_eq!(view.settled().await, LoadState::Ready(Arc::from([])));
    }

    #[tokio::test]
    async fn test_settles_error_with_user_message() {
        let store: StoreHandle = Arc::new(MockStore::with_files([("files/a.mp4", b"a".to_vec())]).fail_listing());
        let mut view = AssetView::activate(store, "files");
        assert_eq!(view.settled().await, LoadState::Error(USER_FACING_LOAD_ERROR.to_string()));
    }

    #[tokio::test]
    async fn test_starts_loading() {
        let (store, gate) = gated();
        let mut view = AssetView::activate(store, "files");
        assert!(view.state().is_loading());
        assert_eq!(view.state().records(), None);
        gate.notify_one();
        assert!(view.settled().await.records().is_some());
    }

    #[tokio::test]
    async fn test_dropped_view_lets_loader_finish() {
        let (store, gate) = gated();
        let view = AssetView::activate(store.clone(), "files");
        drop(view);
        gate.notify_one();
        // The loader task releases its store handle once it has finished.
        tokio::time::timeout(Duration::from_secs(5), async {
            while Arc::strong_count(&store) > 1 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap();
    }
}
