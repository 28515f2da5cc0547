//! Display-frame coalescing.
//!
//! High-frequency input (pointer moves while resizing, scroll events) must
//! not trigger one state update per event. A [`FrameSlot`] keeps only the
//! latest pending value and at most one scheduled frame: offering a value
//! while a frame is in flight just overwrites the pending value.
//!
//! Frames are delivered as [`FrameMsg`]s through the bubbletea runtime. Each
//! slot has a unique id and bumps a tag whenever it schedules, so frames that
//! belong to another slot, or to a cancelled schedule, are ignored.

use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

/// Target refresh rate.
pub const FPS: u64 = 60;

/// Delay between a schedule and its frame.
pub const FRAME_INTERVAL: Duration = Duration::from_nanos(1_000_000_000 / FPS);

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Delivered when a scheduled frame fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameMsg {
    /// Slot the frame belongs to.
    pub id: i64,
    tag: i64,
}

/// Single-slot "latest value" cell drained once per frame.
#[derive(Debug, Clone)]
pub struct FrameSlot<V> {
    id: i64,
    tag: i64,
    pending: Option<V>,
    in_flight: bool,
}

impl<V> Default for FrameSlot<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> FrameSlot<V> {
    /// Creates an empty slot with a fresh id.
    pub fn new() -> Self {
        Self {
            id: next_id(),
            tag: 0,
            pending: None,
            in_flight: false,
        }
    }

    /// The slot id carried by its frames.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Whether a frame is currently scheduled.
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// The value the next frame will apply.
    pub fn pending(&self) -> Option<&V> {
        self.pending.as_ref()
    }

    /// Stores `value` as the pending value. Returns a frame command only if
    /// no frame is in flight yet.
    pub fn offer(&mut self, value: V) -> Option<Cmd> {
        self.pending = Some(value);
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        self.tag += 1;
        let id = self.id;
        let tag = self.tag;
        Some(bubbletea_tick(FRAME_INTERVAL, move |_| {
            Box::new(FrameMsg { id, tag }) as Msg
        }))
    }

    /// The message the in-flight frame will deliver. Hosts that run their own
    /// refresh loop can feed this straight back into `update`.
    pub fn pending_frame(&self) -> Option<FrameMsg> {
        self.in_flight.then_some(FrameMsg {
            id: self.id,
            tag: self.tag,
        })
    }

    /// Takes the pending value if `msg` is this slot's current frame.
    pub fn drain(&mut self, msg: &FrameMsg) -> Option<V> {
        if msg.id != self.id || msg.tag != self.tag || !self.in_flight {
            return None;
        }
        self.in_flight = false;
        self.pending.take()
    }

    /// Drops any pending value and invalidates the in-flight frame.
    pub fn cancel(&mut self) {
        self.pending = None;
        if self.in_flight {
            self.in_flight = false;
            self.tag += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_first_offer_schedules() {
        let mut slot = FrameSlot::new();
        assert!(slot.offer(1).is_some());
        assert!(slot.offer(2).is_none());
        assert!(slot.offer(3).is_none());
        assert!(slot.in_flight());
        assert_eq!(slot.pending(), Some(&3));
    }

    #[test]
    fn test_drain_takes_latest_value_once() {
        let mut slot = FrameSlot::new();
        let _ = slot.offer(10);
        let _ = slot.offer(20);
        let frame = slot.pending_frame().unwrap();
        assert_eq!(slot.drain(&frame), Some(20));
        assert_eq!(slot.drain(&frame), None);
        assert!(!slot.in_flight());
        // A new offer schedules again.
        assert!(slot.offer(30).is_some());
    }

    #[test]
    fn test_foreign_frames_are_ignored() {
        let mut a = FrameSlot::new();
        let mut b = FrameSlot::<i32>::new();
        let _ = a.offer(1);
        let _ = b.offer(2);
        let frame_a = a.pending_frame().unwrap();
        assert_eq!(b.drain(&frame_a), None);
        assert_eq!(a.drain(&frame_a), Some(1));
    }

    #[test]
    fn test_cancel_invalidates_frame() {
        let mut slot = FrameSlot::new();
        let _ = slot.offer(1);
        let stale = slot.pending_frame().unwrap();
        slot.cancel();
        assert!(slot.pending_frame().is_none());
        let _ = slot.offer(2);
        assert_eq!(slot.drain(&stale), None);
        let fresh = slot.pending_frame().unwrap();
        assert_eq!(slot.drain(&fresh), Some(2));
    }
}
