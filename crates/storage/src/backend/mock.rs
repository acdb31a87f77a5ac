//! In-memory object store for testing.

use crate::ObjectStore;
use crate::error::{ErrorKind, Result};
use crate::models::{ObjectMeta, ObjectPage, ObjectRef, content_type_for, public_url};
use async_trait::async_trait;
use exn::ResultExt;
use std::collections::HashSet;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use url::Url;

const DEFAULT_PAGE_SIZE: usize = 1000;
const DEFAULT_BASE_URL: &str = "https://mock.invalid/";

struct MockObject {
    object: ObjectRef,
    meta: ObjectMeta,
}

/// Calls that should fail, keyed by object name.
#[derive(Default)]
struct Failures {
    listing: bool,
    urls: HashSet<String>,
    metadata: HashSet<String>,
}

/// In-memory object store for testing.
///
/// Objects are listed in insertion order, split into pages of
/// [`with_page_size()`](Self::with_page_size) objects. Individual calls can be
/// made to fail so that callers' error paths can be exercised without a
/// network.
///
/// # Examples
///
/// ```
/// use vitrine_storage::{ObjectStore, backend::MockStore};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let store = MockStore::with_files([
///     ("files/a.mp4", b"...".to_vec()),
///     ("files/b.mp4", b"......".to_vec()),
/// ]);
/// let objects = store.list_all("files").await.unwrap();
/// assert_eq!(objects.len(), 2);
/// let meta = store.metadata(&objects[1]).await.unwrap();
/// assert_eq!(meta.size, 6);
/// assert_eq!(meta.content_type, "video/mp4");
/// # Ok(())
/// # }
/// ```
pub struct MockStore {
    name: String,
    base_url: Url,
    page_size: usize,
    objects: RwLock<Vec<MockObject>>,
    failures: RwLock<Failures>,
}

impl MockStore {
    /// Create a mock store pre-populated with objects.
    ///
    /// Keys are `namespace/name`; content type is inferred from the name and
    /// every object shares the same modification time.
    ///
    /// Panics if any key fails validation. If test setup is wrong, then test
    /// should not pass.
    pub fn with_files(files: impl IntoIterator<Item = (impl AsRef<str>, impl Into<Vec<u8>>)>) -> Self {
        let now = OffsetDateTime::now_utc();
        let mut store = Self::empty();
        for (key, data) in files {
            let key = key.as_ref();
            let name = key.rsplit_once('/').map_or(key, |(_, name)| name);
            let size = data.into().len() as u64;
            store = store.with_object(key, ObjectMeta::new(size, content_type_for(name), now));
        }
        store
    }

    /// Add one object with explicit metadata.
    ///
    /// Panics if the key fails validation.
    pub fn with_object(mut self, key: impl AsRef<str>, meta: ObjectMeta) -> Self {
        let key = key.as_ref();
        let Some((namespace, name)) = key.rsplit_once('/') else {
            // The panic here is DELIBERATE. MockStore is intended to be used
            // in tests; panics are expected. There is no error result.
            panic!("MockStore::with_object: key {key} has no namespace");
        };
        let Ok(object) = ObjectRef::new(namespace, name) else {
            panic!("MockStore::with_object: invalid key {key}");
        };
        self.objects.get_mut().push(MockObject { object, meta });
        self
    }

    /// Number of objects returned per listing page. Clamped to at least one.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Base that object keys are joined onto to produce download URLs.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// Make every listing call fail.
    pub fn fail_listing(mut self) -> Self {
        self.failures.get_mut().listing = true;
        self
    }

    /// Make URL resolution fail for objects called `name`.
    pub fn fail_url(mut self, name: impl Into<String>) -> Self {
        self.failures.get_mut().urls.insert(name.into());
        self
    }

    /// Make metadata resolution fail for objects called `name`.
    pub fn fail_metadata(mut self, name: impl Into<String>) -> Self {
        self.failures.get_mut().metadata.insert(name.into());
        self
    }

    /// Remove every object called `name`, in any namespace.
    pub async fn remove(&self, name: &str) {
        self.objects.write().await.retain(|o| o.object.name() != name);
    }

    fn empty() -> Self {
        Self {
            name: "mock".to_string(),
            // Infallible: constant is a valid absolute URL.
            base_url: Url::parse(DEFAULT_BASE_URL).expect("valid default base URL"),
            page_size: DEFAULT_PAGE_SIZE,
            objects: RwLock::new(Vec::new()),
            failures: RwLock::new(Failures::default()),
        }
    }

    fn injected(call: &str, subject: &str) -> exn::Exn<ErrorKind> {
        exn::Exn::from(ErrorKind::Network(format!("injected {call} failure for {subject}")))
    }
}
impl Default for MockStore {
    fn default() -> Self {
        Self::empty()
    }
}

#[async_trait]
impl ObjectStore for MockStore {
    fn name(&self) -> &str {
        &self.name
    }

    async fn list_page(&self, namespace: &str, continuation: Option<&str>) -> Result<ObjectPage> {
        if self.failures.read().await.listing {
            return Err(Self::injected("listing", namespace));
        }
        let namespace = crate::validate_namespace(namespace)?;
        let offset = continuation
            .map(|token| token.parse::<usize>())
            .transpose()
            .or_raise(|| ErrorKind::BackendError("malformed continuation token".to_string()))?
            .unwrap_or(0);
        let guard = self.objects.read().await;
        let matching: Vec<&ObjectRef> =
            guard.iter().map(|o| &o.object).filter(|o| o.namespace() == namespace).collect();
        let objects: Vec<ObjectRef> = matching.iter().skip(offset).take(self.page_size).map(|&o| o.clone()).collect();
        let end = offset + objects.len();
        Ok(match end < matching.len() {
            true => ObjectPage::with_next(objects, end.to_string()),
            false => ObjectPage::last(objects),
        })
    }

    async fn download_url(&self, object: &ObjectRef) -> Result<Url> {
        if self.failures.read().await.urls.contains(object.name()) {
            return Err(Self::injected("URL", object.name()));
        }
        public_url(&self.base_url, &object.key())
    }

    async fn metadata(&self, object: &ObjectRef) -> Result<ObjectMeta> {
        if self.failures.read().await.metadata.contains(object.name()) {
            return Err(Self::injected("metadata", object.name()));
        }
        self.objects
            .read()
            .await
            .iter()
            .find(|o| &o.object == object)
            .map(|o| o.meta.clone())
            .ok_or_else(|| exn::Exn::from(ErrorKind::NotFound(object.key())))
    }
}
