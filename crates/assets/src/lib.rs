//! Portfolio media assets.
//!
//! The page's media lives in an object store namespace. [`load_assets`] lists
//! it and resolves every object to an [`AssetRecord`] in one all-or-nothing
//! fan-out; [`AssetView`] runs that once per activation and exposes the
//! resulting [`LoadState`]; [`bind`] then picks records for display slots by
//! exact filename.

mod bind;
pub mod error;
mod load;
mod record;
mod state;

pub use crate::bind::{Bindings, Slot, SlotMap, bind};
pub use crate::load::load_assets;
pub use crate::record::AssetRecord;
pub use crate::state::{AssetView, LoadState};
