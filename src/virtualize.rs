//! Row virtualization window.
//!
//! With fixed-height rows the rows worth instantiating can be computed from
//! the scroll offset alone. Rows outside `[start, end)` are replaced by two
//! spacers (`pad_top`, `pad_bottom`) so the scrollable content keeps its full
//! height and the native scroll position stays meaningful.

/// Rows rendered above and below the viewport when none is configured.
pub const DEFAULT_OVERSCAN: usize = 6;

/// Virtualization settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VirtualOptions {
    /// Whether windowing is active.
    pub enabled: bool,
    /// Fixed height of every row.
    pub row_height: f64,
    /// Extra rows rendered on each side of the viewport.
    pub overscan: usize,
}

impl Default for VirtualOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            row_height: 1.0,
            overscan: DEFAULT_OVERSCAN,
        }
    }
}

impl VirtualOptions {
    /// Enabled windowing with the given row height and default overscan.
    pub fn enabled(row_height: f64) -> Self {
        Self {
            enabled: true,
            row_height,
            overscan: DEFAULT_OVERSCAN,
        }
    }

    /// Sets the overscan.
    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    fn usable(&self) -> bool {
        self.enabled && self.row_height.is_finite() && self.row_height > 0.0
    }
}

/// The slice of rows to render plus spacer sizes.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct VirtualRange {
    /// First rendered row (inclusive).
    pub start: usize,
    /// Last rendered row (exclusive).
    pub end: usize,
    /// Height of the spacer above the rendered rows.
    pub pad_top: f64,
    /// Height of the spacer below the rendered rows.
    pub pad_bottom: f64,
}

impl VirtualRange {
    /// Every row, no spacers.
    pub fn all(total: usize) -> Self {
        Self {
            start: 0,
            end: total,
            pad_top: 0.0,
            pad_bottom: 0.0,
        }
    }

    /// Number of rendered rows.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether nothing is rendered.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The range as indices.
    pub fn indices(&self) -> std::ops::Range<usize> {
        self.start..self.end
    }
}

/// Computes the render window for `total` rows.
///
/// When `opts` is disabled (or its row height is unusable) every row is
/// rendered and both paddings are zero.
///
/// ```rust
/// use bubbletea_datatable::virtualize::{virtual_range, VirtualOptions};
///
/// let opts = VirtualOptions::enabled(20.0).with_overscan(2);
/// let range = virtual_range(1_000, 400.0, 200.0, &opts);
/// assert_eq!((range.start, range.end), (18, 32));
/// assert_eq!(range.pad_top, 360.0);
/// ```
pub fn virtual_range(
    total: usize,
    scroll_top: f64,
    viewport_height: f64,
    opts: &VirtualOptions,
) -> VirtualRange {
    if !opts.usable() {
        return VirtualRange::all(total);
    }
    let rh = opts.row_height;
    let scroll_top = if scroll_top.is_finite() { scroll_top } else { 0.0 };
    let viewport_height = if viewport_height.is_finite() {
        viewport_height.max(0.0)
    } else {
        0.0
    };

    let first = (scroll_top / rh).floor() as i64 - opts.overscan as i64;
    let start = first.clamp(0, total as i64) as usize;
    let visible_count = (viewport_height / rh).ceil() as usize + 2 * opts.overscan;
    let end = start.saturating_add(visible_count).min(total);

    VirtualRange {
        start,
        end,
        pad_top: start as f64 * rh,
        pad_bottom: ((total - end) as f64 * rh).max(0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_disabled_renders_everything() {
        let range = virtual_range(50, 300.0, 100.0, &VirtualOptions::default());
        assert_eq!(range, VirtualRange::all(50));
    }

    #[test]
    fn test_zero_row_height_behaves_as_disabled() {
        let opts = VirtualOptions {
            enabled: true,
            row_height: 0.0,
            overscan: 2,
        };
        assert_eq!(virtual_range(10, 0.0, 100.0, &opts), VirtualRange::all(10));
    }

    #[test]
    fn test_top_of_list() {
        let opts = VirtualOptions::enabled(10.0);
        let range = virtual_range(1000, 0.0, 100.0, &opts);
        assert_eq!(range.start, 0);
        assert_eq!(range.end, 10 + 12);
        assert_eq!(range.pad_top, 0.0);
        assert_eq!(range.pad_bottom, (1000 - 22) as f64 * 10.0);
    }

    #[test]
    fn test_bottom_of_list_clamps_end() {
        let opts = VirtualOptions::enabled(10.0).with_overscan(0);
        let range = virtual_range(100, 950.0, 100.0, &opts);
        assert_eq!(range.start, 95);
        assert_eq!(range.end, 100);
        assert_eq!(range.pad_bottom, 0.0);
    }

    #[test]
    fn test_scroll_past_content_yields_empty_window() {
        let opts = VirtualOptions::enabled(10.0).with_overscan(0);
        let range = virtual_range(5, 10_000.0, 100.0, &opts);
        assert_eq!(range.start, 5);
        assert!(range.is_empty());
        assert_eq!(range.pad_top, 50.0);
    }

    #[test]
    fn test_empty_table() {
        let range = virtual_range(0, 0.0, 100.0, &VirtualOptions::enabled(10.0));
        assert!(range.is_empty());
        assert_eq!(range.pad_top + range.pad_bottom, 0.0);
    }

    proptest! {
        #[test]
        fn prop_window_is_consistent(
            total in 0usize..5_000,
            scroll_top in 0.0f64..200_000.0,
            viewport in 0.0f64..2_000.0,
            row_height in 1.0f64..80.0,
            overscan in 0usize..10,
        ) {
            let opts = VirtualOptions { enabled: true, row_height, overscan };
            let r = virtual_range(total, scroll_top, viewport, &opts);
            prop_assert!(r.start <= r.end);
            prop_assert!(r.end <= total);
            let covered = r.pad_top + r.len() as f64 * row_height + r.pad_bottom;
            prop_assert!((covered - total as f64 * row_height).abs() < 1e-6 * (1.0 + total as f64 * row_height));
            let needed = (viewport / row_height).ceil() as usize;
            if r.start + needed + 2 * overscan <= total {
                prop_assert!(r.len() >= needed);
            }
        }
    }
}
