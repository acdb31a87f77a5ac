//! Binding loaded records to named display slots.
//!
//! A slot selects the single record whose name *exactly* equals its target
//! filename: case-sensitive, no wildcards, no normalization. This couples
//! object naming to page layout: renaming an upload silently empties its
//! slot.

use crate::AssetRecord;
use crate::error::{ErrorKind, Result};

/// A slot and the filename it displays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub id: String,
    pub target: String,
}

/// Ordered mapping of target filenames to slot ids.
///
/// Each filename and each slot id may appear at most once.
///
/// # Examples
///
/// ```
/// use vitrine_assets::SlotMap;
///
/// let slots = SlotMap::new([("Rabasorsogon.mp4", "rabasorsogon"), ("Barangay.mp4", "barangay")]).unwrap();
/// assert_eq!(slots.len(), 2);
/// assert!(SlotMap::new([("a.mp4", "demo"), ("b.mp4", "demo")]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotMap {
    slots: Vec<Slot>,
}
impl SlotMap {
    pub fn new(mapping: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Result<Self> {
        let mut slots: Vec<Slot> = Vec::new();
        for (target, id) in mapping {
            let slot = Slot {
                id: id.into(),
                target: target.into(),
            };
            if slots.iter().any(|s| s.target == slot.target) {
                exn::bail!(ErrorKind::DuplicateSlot(slot.target));
            }
            if slots.iter().any(|s| s.id == slot.id) {
                exn::bail!(ErrorKind::DuplicateSlot(slot.id));
            }
            slots.push(slot);
        }
        Ok(Self { slots })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Slot> {
        self.slots.iter()
    }

    /// The filename bound to `slot_id`, if that slot exists.
    pub fn target_of(&self, slot_id: &str) -> Option<&str> {
        self.slots.iter().find(|s| s.id == slot_id).map(|s| s.target.as_str())
    }
}

/// Result of [`bind`]: every slot with its record (if any), plus the records
/// no slot selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bindings<'a> {
    bound: Vec<(&'a Slot, Option<&'a AssetRecord>)>,
    unbound: Vec<&'a AssetRecord>,
}
impl<'a> Bindings<'a> {
    /// The record shown in `slot_id`. `None` both for an empty slot and for
    /// an unknown slot id.
    pub fn get(&self, slot_id: &str) -> Option<&'a AssetRecord> {
        self.bound.iter().find(|(slot, _)| slot.id == slot_id).and_then(|(_, record)| *record)
    }

    /// Slots in slot map order, each with its record or `None` when empty.
    pub fn iter(&self) -> impl Iterator<Item = (&'a Slot, Option<&'a AssetRecord>)> + '_ {
        self.bound.iter().copied()
    }

    /// Records that were loaded but selected by no slot, in load order.
    pub fn unbound(&self) -> &[&'a AssetRecord] {
        &self.unbound
    }
}

/// Bind `records` to `slots` by exact filename match.
///
/// A slot whose target matches no record is left empty; that is not an error.
/// A target matched by more than one record is a data-integrity violation
/// ([`ErrorKind::Integrity`]); no tie-break is attempted.
///
/// # Examples
///
/// ```
/// # use vitrine_assets::{SlotMap, bind};
/// let slots = SlotMap::new([("b.mp4", "slotB")]).unwrap();
/// let bindings = bind(&slots, &[]).unwrap();
/// assert!(bindings.get("slotB").is_none());
/// ```
pub fn bind<'a>(slots: &'a SlotMap, records: &'a [AssetRecord]) -> Result<Bindings<'a>> {
    let mut bound = Vec::with_capacity(slots.len());
    for slot in slots.iter() {
        let mut matches = records.iter().filter(|record| record.name() == slot.target);
        let record = matches.next();
        let extra = matches.count();
        if extra > 0 {
            exn::bail!(ErrorKind::Integrity(slot.target.clone(), extra + 1));
        }
        if record.is_none() {
            tracing::debug!(slot = %slot.id, target = %slot.target, "No asset for slot");
        }
        bound.push((slot, record));
    }
    let unbound = records.iter().filter(|record| slots.iter().all(|slot| slot.target != record.name())).collect();
    Ok(Bindings { bound, unbound })
}
