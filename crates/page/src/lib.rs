//! Server-side rendering of the portfolio page.
//!
//! A [`Page`] combines static [`Profile`] content with the current
//! [`LoadState`](vitrine_assets::LoadState) of the asset view: a loading
//! indicator, the user-facing error, or one panel per configured demo slot.

mod builtins;
pub mod error;
mod profile;
mod render;

pub use crate::builtins::{Builtins, DEFAULT_TEMPLATE};
pub use crate::profile::{Demo, Profile, Project, Skill};
pub use crate::render::Page;
