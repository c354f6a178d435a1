//! Slot sink port: receives each batch slot's outcome as soon as it settles.

use crate::batch::GenerationResult;

/// Presentation boundary notified once per slot, in arrival order.
///
/// Implementations must not block for long: the batch drives every slot on
/// the caller's task, so a slow sink delays delivery of sibling results.
pub trait SlotSink: Send + Sync {
    /// Called exactly once for each slot index when its request settles.
    fn on_slot_resolved(&self, result: &GenerationResult);
}
