//! Identifiers and the session allocator shared by a document's containers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionId(pub u64);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DatablockId(pub u64);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(pub u64);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StripId(pub u64);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChannelbagId(pub u64);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FCurveId(pub u64);

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u64);

/// Per-Action slot handle. Zero means "no slot".
///
/// Handles are handed out in creation order and never reused while their
/// Action lives, so comparing two handles compares creation order.
#[derive(
    Copy, Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct SlotHandle(pub u32);

impl SlotHandle {
    pub const UNASSIGNED: SlotHandle = SlotHandle(0);

    #[inline]
    pub fn is_assigned(self) -> bool {
        self != Self::UNASSIGNED
    }
}

/// A slot addressed from outside its Action.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SlotRef {
    pub action: ActionId,
    pub handle: SlotHandle,
}

impl SlotRef {
    pub fn new(action: ActionId, handle: SlotHandle) -> Self {
        Self { action, handle }
    }
}

/// Monotonic allocator for every runtime id kind.
///
/// One counter backs all kinds, so an id of one kind never collides with an
/// id of another kind minted in the same session. Atomics keep `Document`
/// `Send`; nothing here is meant for concurrent mutation.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

/// Handle to the allocator of the document that owns a container.
pub type IdSource = Arc<IdAllocator>;

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    fn bump(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    #[inline]
    pub fn alloc_action(&self) -> ActionId {
        ActionId(self.bump())
    }

    #[inline]
    pub fn alloc_datablock(&self) -> DatablockId {
        DatablockId(self.bump())
    }

    #[inline]
    pub fn alloc_layer(&self) -> LayerId {
        LayerId(self.bump())
    }

    #[inline]
    pub fn alloc_strip(&self) -> StripId {
        StripId(self.bump())
    }

    #[inline]
    pub fn alloc_channelbag(&self) -> ChannelbagId {
        ChannelbagId(self.bump())
    }

    #[inline]
    pub fn alloc_fcurve(&self) -> FCurveId {
        FCurveId(self.bump())
    }

    #[inline]
    pub fn alloc_group(&self) -> GroupId {
        GroupId(self.bump())
    }

    /// Make sure `raw` (an id read back from a saved document) is never handed out again.
    #[inline]
    pub fn observe(&self, raw: u64) {
        self.next.fetch_max(raw.saturating_add(1), Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic_across_kinds() {
        let alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_action(), ActionId(0));
        assert_eq!(alloc.alloc_layer(), LayerId(1));
        assert_eq!(alloc.alloc_fcurve(), FCurveId(2));
        assert_eq!(alloc.alloc_group(), GroupId(3));
    }

    #[test]
    fn observe_skips_persisted_ids() {
        let alloc = IdAllocator::new();
        alloc.observe(41);
        alloc.observe(7);
        assert_eq!(alloc.alloc_strip(), StripId(42));
    }

    #[test]
    fn unassigned_handle_is_zero() {
        assert!(!SlotHandle::default().is_assigned());
        assert!(SlotHandle(3).is_assigned());
    }
}
