pub mod backend;
pub mod error;
mod key;
mod models;

pub use crate::backend::ObjectStore;
pub use crate::key::{validate_name, validate_namespace};
pub use crate::models::{DEFAULT_CONTENT_TYPE, ObjectMeta, ObjectPage, ObjectRef, content_type_for, public_url};
use std::sync::Arc;

pub type StoreHandle = Arc<dyn ObjectStore + Send + Sync>;
