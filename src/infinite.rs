//! Infinite-scroll trigger.
//!
//! Watches a sentinel placed after the last row. When the sentinel becomes
//! visible while the trigger is armed, `load_more` runs once. The host then
//! disarms the trigger for the duration of the load and re-arms it when the
//! rows have arrived:
//!
//! ```text
//! Idle --(sentinel visible)--> Loading (enabled = false)
//!      <--(rows arrive, enabled = true)--
//! ```
//!
//! A sentinel that stays visible fires only on the transition to visible, so
//! one re-arm produces at most one request.

use log::debug;
use std::fmt;
use std::sync::Arc;

/// Load-more callback.
pub type LoadMoreFn = Arc<dyn Fn() + Send + Sync>;

/// Loading state as seen through the trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// Armed and waiting for the sentinel.
    Idle,
    /// Disarmed, a load is assumed to be in flight.
    Loading,
}

/// Sentinel-visibility trigger for loading more rows.
#[derive(Clone)]
pub struct InfiniteScroll {
    enabled: bool,
    attached: bool,
    intersecting: bool,
    load_more: Option<LoadMoreFn>,
    disarm_on_fire: bool,
}

impl fmt::Debug for InfiniteScroll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfiniteScroll")
            .field("enabled", &self.enabled)
            .field("attached", &self.attached)
            .field("intersecting", &self.intersecting)
            .field("load_more", &self.load_more.is_some())
            .finish()
    }
}

impl Default for InfiniteScroll {
    fn default() -> Self {
        Self::new()
    }
}

impl InfiniteScroll {
    /// An armed trigger with no sentinel attached.
    pub fn new() -> Self {
        Self {
            enabled: true,
            attached: false,
            intersecting: false,
            load_more: None,
            disarm_on_fire: false,
        }
    }

    /// Sets the load-more callback.
    pub fn with_load_more(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.load_more = Some(Arc::new(f));
        self
    }

    /// Disarms automatically when firing, so hosts only need to re-arm.
    pub fn disarm_on_fire(mut self, disarm: bool) -> Self {
        self.disarm_on_fire = disarm;
        self
    }

    /// Replaces the callback.
    pub fn set_load_more(&mut self, f: Option<LoadMoreFn>) {
        self.load_more = f;
    }

    /// Starts observing the sentinel.
    pub fn attach(&mut self) {
        if !self.attached {
            debug!("infinite scroll: sentinel attached");
        }
        self.attached = true;
    }

    /// Stops observing. Visibility state is dropped.
    pub fn detach(&mut self) {
        if self.attached {
            debug!("infinite scroll: sentinel detached");
        }
        self.attached = false;
        self.intersecting = false;
    }

    /// Whether a sentinel is being observed.
    pub fn attached(&self) -> bool {
        self.attached
    }

    /// Whether the trigger is armed.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Arms or disarms the trigger. Disarming tears down the observation:
    /// a sentinel that is still visible when re-armed has to be reported
    /// again and counts as a fresh transition.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            debug!("infinite scroll: enabled={enabled}");
        }
        self.enabled = enabled;
        if !enabled {
            self.intersecting = false;
        }
    }

    /// Current state.
    pub fn state(&self) -> LoadState {
        if self.enabled {
            LoadState::Idle
        } else {
            LoadState::Loading
        }
    }

    /// Reports the sentinel's visibility. Returns `true` when this report
    /// fired `load_more`.
    pub fn observe(&mut self, intersecting: bool) -> bool {
        if !self.enabled || !self.attached {
            return false;
        }
        let became_visible = intersecting && !self.intersecting;
        self.intersecting = intersecting;
        if !became_visible {
            return false;
        }
        debug!("infinite scroll: sentinel visible, loading more");
        if let Some(f) = &self.load_more {
            f();
        }
        if self.disarm_on_fire {
            self.set_enabled(false);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counting() -> (InfiniteScroll, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let mut trigger = InfiniteScroll::new().with_load_more(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });
        trigger.attach();
        (trigger, count)
    }

    #[test]
    fn test_continuously_visible_sentinel_fires_once() {
        let (mut trigger, count) = counting();
        assert!(trigger.observe(true));
        for _ in 0..10 {
            assert!(!trigger.observe(true));
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_rearm_allows_next_fire() {
        let (mut trigger, count) = counting();
        trigger.observe(true);
        trigger.set_enabled(false);
        assert_eq!(trigger.state(), LoadState::Loading);
        assert!(!trigger.observe(true));
        trigger.set_enabled(true);
        assert!(trigger.observe(true));
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_leaving_and_reentering_fires_again() {
        let (mut trigger, count) = counting();
        trigger.observe(true);
        trigger.observe(false);
        trigger.observe(true);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_detached_trigger_is_silent() {
        let (mut trigger, count) = counting();
        trigger.detach();
        assert!(!trigger.observe(true));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_callback_is_noop() {
        let mut trigger = InfiniteScroll::new();
        trigger.attach();
        assert!(trigger.observe(true));
    }

    #[test]
    fn test_disarm_on_fire() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let mut trigger = InfiniteScroll::new()
            .disarm_on_fire(true)
            .with_load_more(move || {
                c.fetch_add(1, Ordering::SeqCst);
            });
        trigger.attach();
        trigger.observe(true);
        assert!(!trigger.enabled());
        trigger.observe(false);
        trigger.observe(true);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
