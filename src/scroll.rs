//! Scroll-position synchronization.
//!
//! Only the table body scrolls. The header and summary block sit outside the
//! scroll container and are shifted by the body's horizontal offset so their
//! columns stay aligned with the body's.
//!
//! Scroll and size notifications are read immediately but published at most
//! once per display frame: notifications arriving before the frame fires
//! replace the pending snapshot instead of queueing.

use crate::frame::{FrameMsg, FrameSlot};
use bubbletea_rs::{Cmd, Msg, WindowSizeMsg};
use log::trace;

/// Scroll offsets and viewport size of the body element.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    /// Horizontal scroll offset.
    pub scroll_left: f64,
    /// Vertical scroll offset.
    pub scroll_top: f64,
    /// Visible width.
    pub client_width: f64,
    /// Visible height.
    pub client_height: f64,
    /// Full content height.
    pub scroll_height: f64,
}

impl ScrollMetrics {
    /// Metrics for a viewport of the given size at offset zero.
    pub fn viewport(client_width: f64, client_height: f64) -> Self {
        Self {
            client_width,
            client_height,
            ..Self::default()
        }
    }

    /// Sets the scroll offsets.
    pub fn at(mut self, scroll_left: f64, scroll_top: f64) -> Self {
        self.scroll_left = scroll_left;
        self.scroll_top = scroll_top;
        self
    }

    /// Sets the content height.
    pub fn with_scroll_height(mut self, scroll_height: f64) -> Self {
        self.scroll_height = scroll_height;
        self
    }

    fn sanitized(self) -> Self {
        let clean = |v: f64| if v.is_finite() { v.max(0.0) } else { 0.0 };
        Self {
            scroll_left: clean(self.scroll_left),
            scroll_top: clean(self.scroll_top),
            client_width: clean(self.client_width),
            client_height: clean(self.client_height),
            scroll_height: clean(self.scroll_height),
        }
    }
}

/// Where size changes come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeSource {
    /// The host reports the body's own size through
    /// [`ScrollSync::observe_resize`].
    Element,
    /// No element-level observation; the terminal window size is used.
    #[default]
    Window,
}

/// Tracks the body's scroll state and republishes it once per frame.
#[derive(Debug, Clone, Default)]
pub struct ScrollSync {
    current: ScrollMetrics,
    frame: FrameSlot<ScrollMetrics>,
    source: SizeSource,
    window_chrome: f64,
    content_height: Option<f64>,
}

impl ScrollSync {
    /// Creates a synchronizer at offset zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows of the window occupied by things other than the body (header,
    /// summary, footer). Used only for the window-size fallback.
    pub fn with_window_chrome(mut self, rows: f64) -> Self {
        self.window_chrome = rows.max(0.0);
        self
    }

    /// Sets the window chrome height.
    pub fn set_window_chrome(&mut self, rows: f64) {
        self.window_chrome = rows.max(0.0);
    }

    /// Current size source.
    pub fn size_source(&self) -> SizeSource {
        self.source
    }

    /// The latest snapshot: pending if one is waiting, else the published one.
    pub fn latest(&self) -> ScrollMetrics {
        self.frame.pending().copied().unwrap_or(self.current)
    }

    /// Records a scroll notification.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<Cmd> {
        self.frame.offer(metrics.sanitized())
    }

    /// Records an element size change. Switches the synchronizer to
    /// element-level sizing; window size messages are ignored afterwards.
    pub fn observe_resize(&mut self, client_width: f64, client_height: f64) -> Option<Cmd> {
        self.source = SizeSource::Element;
        let mut next = self.latest();
        next.client_width = client_width;
        next.client_height = client_height;
        self.frame.offer(next.sanitized())
    }

    /// Overrides the content height reported by scroll notifications. Hosts
    /// that lay the rows out themselves know it better than the element does.
    pub fn set_scroll_height(&mut self, scroll_height: f64) {
        self.content_height = scroll_height.is_finite().then_some(scroll_height.max(0.0));
    }

    /// Content height in effect.
    pub fn scroll_height(&self) -> f64 {
        self.content_height.unwrap_or(self.current.scroll_height)
    }

    /// Publishes a snapshot immediately, dropping anything pending.
    pub fn set_metrics(&mut self, metrics: ScrollMetrics) {
        self.frame.cancel();
        self.current = metrics.sanitized();
    }

    /// The frame the pending snapshot is waiting on, if any.
    pub fn pending_frame(&self) -> Option<FrameMsg> {
        self.frame.pending_frame()
    }

    /// Publishes the pending snapshot if `frame` is ours.
    pub fn apply_frame(&mut self, frame: &FrameMsg) -> bool {
        match self.frame.drain(frame) {
            Some(metrics) => {
                trace!(
                    "scroll frame: left={} top={} h={}",
                    metrics.scroll_left,
                    metrics.scroll_top,
                    metrics.client_height
                );
                self.current = metrics;
                true
            }
            None => false,
        }
    }

    /// Handles frame messages and, without element sizing, window resizes.
    pub fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        if let Some(frame) = msg.downcast_ref::<FrameMsg>() {
            self.apply_frame(frame);
            return None;
        }
        if let Some(size) = msg.downcast_ref::<WindowSizeMsg>() {
            if self.source == SizeSource::Window {
                let mut next = self.latest();
                next.client_width = f64::from(size.width);
                next.client_height = (f64::from(size.height) - self.window_chrome).max(0.0);
                return self.frame.offer(next);
            }
        }
        None
    }

    /// The published snapshot.
    pub fn metrics(&self) -> ScrollMetrics {
        self.current
    }

    /// Horizontal offset to apply to the header and summary.
    pub fn translate_x(&self) -> f64 {
        -self.current.scroll_left
    }

    /// The offset as a transform string.
    pub fn transform(&self) -> String {
        let x = self.translate_x();
        if x == 0.0 {
            "translate3d(0px, 0, 0)".to_string()
        } else {
            format!("translate3d({x}px, 0, 0)")
        }
    }

    /// Published vertical offset.
    pub fn scroll_top(&self) -> f64 {
        self.current.scroll_top
    }

    /// Published horizontal offset.
    pub fn scroll_left(&self) -> f64 {
        self.current.scroll_left
    }

    /// Published viewport height.
    pub fn viewport_height(&self) -> f64 {
        self.current.client_height
    }

    /// Published viewport width.
    pub fn viewport_width(&self) -> f64 {
        self.current.client_width
    }

    /// Whether the bottom of the viewport is within `threshold` of the end of
    /// the content.
    pub fn near_bottom(&self, threshold: f64) -> bool {
        let m = self.current;
        m.scroll_top + m.client_height >= self.scroll_height() - threshold.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flush(sync: &mut ScrollSync) -> bool {
        match sync.pending_frame() {
            Some(frame) => sync.apply_frame(&frame),
            None => false,
        }
    }

    #[test]
    fn test_scroll_published_on_frame() {
        let mut sync = ScrollSync::new();
        assert!(sync.on_scroll(ScrollMetrics::viewport(80.0, 20.0).at(12.0, 3.0)).is_some());
        assert_eq!(sync.translate_x(), 0.0);
        assert!(flush(&mut sync));
        assert_eq!(sync.translate_x(), -12.0);
        assert_eq!(sync.scroll_top(), 3.0);
        assert_eq!(sync.transform(), "translate3d(-12px, 0, 0)");
    }

    #[test]
    fn test_events_between_frames_collapse() {
        let mut sync = ScrollSync::new();
        assert!(sync.on_scroll(ScrollMetrics::viewport(80.0, 20.0).at(1.0, 0.0)).is_some());
        assert!(sync.on_scroll(ScrollMetrics::viewport(80.0, 20.0).at(2.0, 0.0)).is_none());
        assert!(sync.on_scroll(ScrollMetrics::viewport(80.0, 20.0).at(9.0, 4.0)).is_none());
        assert!(flush(&mut sync));
        assert_eq!(sync.scroll_left(), 9.0);
        assert_eq!(sync.scroll_top(), 4.0);
        assert!(!flush(&mut sync));
    }

    #[test]
    fn test_negative_offsets_are_clamped() {
        let mut sync = ScrollSync::new();
        let _ = sync.on_scroll(ScrollMetrics::viewport(10.0, 10.0).at(-5.0, -3.0));
        flush(&mut sync);
        assert_eq!(sync.scroll_left(), 0.0);
        assert_eq!(sync.scroll_top(), 0.0);
        assert_eq!(sync.transform(), "translate3d(0px, 0, 0)");
    }

    #[test]
    fn test_window_fallback_until_element_observed() {
        let mut sync = ScrollSync::new().with_window_chrome(4.0);
        let msg: Msg = Box::new(WindowSizeMsg {
            width: 100,
            height: 30,
        });
        assert!(sync.update(&msg).is_some());
        flush(&mut sync);
        assert_eq!(sync.viewport_height(), 26.0);
        assert_eq!(sync.viewport_width(), 100.0);

        let _ = sync.observe_resize(50.0, 10.0);
        flush(&mut sync);
        assert_eq!(sync.size_source(), SizeSource::Element);
        assert!(sync.update(&msg).is_none());
        assert_eq!(sync.viewport_height(), 10.0);
    }

    #[test]
    fn test_resize_keeps_pending_scroll() {
        let mut sync = ScrollSync::new();
        let _ = sync.on_scroll(ScrollMetrics::viewport(80.0, 20.0).at(7.0, 5.0));
        assert!(sync.observe_resize(60.0, 15.0).is_none());
        flush(&mut sync);
        assert_eq!(sync.scroll_left(), 7.0);
        assert_eq!(sync.viewport_height(), 15.0);
    }

    #[test]
    fn test_near_bottom() {
        let mut sync = ScrollSync::new();
        sync.set_metrics(
            ScrollMetrics::viewport(80.0, 10.0)
                .at(0.0, 85.0)
                .with_scroll_height(100.0),
        );
        assert!(sync.near_bottom(5.0));
        assert!(!sync.near_bottom(0.0));
    }
}
