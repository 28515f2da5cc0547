//! Column widths and drag-to-resize.
//!
//! Widths are stored per stable column key, in column order. Replacing the
//! column list keeps the width of every column whose key survives, so a host
//! that rebuilds an identical column list on every render does not lose
//! user-resized widths.
//!
//! A drag records the column, pointer origin and starting width on pointer
//! down. Pointer moves only update a pending width held in a [`FrameSlot`];
//! the stored width changes once per display frame.

use crate::column::ColumnDef;
use crate::frame::{FrameMsg, FrameSlot};
use bubbletea_rs::{Cmd, Msg};
use log::{debug, trace};

/// Narrowest width a drag can produce.
pub const MIN_COLUMN_WIDTH: f64 = 60.0;
/// Widest width a drag can produce.
pub const MAX_COLUMN_WIDTH: f64 = 2000.0;
/// Width of each row-action column.
pub const ROW_ACTION_WIDTH: f64 = 80.0;

#[derive(Debug, Clone, PartialEq)]
struct Drag {
    key: String,
    start_x: f64,
    start_w: f64,
}

/// Per-column width state plus the resize interaction.
#[derive(Debug, Clone, Default)]
pub struct ColumnWidths {
    keys: Vec<String>,
    widths: Vec<f64>,
    drag: Option<Drag>,
    frame: FrameSlot<(String, f64)>,
}

impl ColumnWidths {
    /// Seeds widths from the declared column widths.
    pub fn new<T>(columns: &[ColumnDef<T>]) -> Self {
        let mut widths = Self::default();
        widths.sync_columns(columns);
        widths
    }

    /// Reconciles with a new column list. Columns whose key was already
    /// tracked keep their current width; new columns start at their declared
    /// width. Returns `true` if anything changed.
    pub fn sync_columns<T>(&mut self, columns: &[ColumnDef<T>]) -> bool {
        let same = columns.len() == self.keys.len()
            && columns.iter().zip(&self.keys).all(|(c, k)| c.id() == k);
        if same {
            return false;
        }
        let widths = columns
            .iter()
            .map(|c| self.width_of(c.id()).unwrap_or_else(|| c.initial_width()))
            .collect();
        self.keys = columns.iter().map(|c| c.id().to_string()).collect();
        self.widths = widths;
        if let Some(drag) = &self.drag {
            if !self.keys.contains(&drag.key) {
                debug!("column {} removed during resize; ending drag", drag.key);
                self.drag = None;
                self.frame.cancel();
            }
        }
        trace!("column widths reseeded for {} columns", self.keys.len());
        true
    }

    /// Current widths in column order.
    pub fn widths(&self) -> &[f64] {
        &self.widths
    }

    /// Width of the column with `key`.
    pub fn width_of(&self, key: &str) -> Option<f64> {
        self.keys
            .iter()
            .position(|k| k == key)
            .map(|i| self.widths[i])
    }

    /// Width at `index`, or the default when out of range.
    pub fn width_at(&self, index: usize) -> f64 {
        self.widths
            .get(index)
            .copied()
            .unwrap_or(crate::column::DEFAULT_COLUMN_WIDTH)
    }

    /// Sets a width directly, clamped to the drag bounds.
    pub fn set_width(&mut self, key: &str, width: f64) {
        if let Some(i) = self.keys.iter().position(|k| k == key) {
            self.widths[i] = clamp_width(width);
        }
    }

    /// Sum of all column widths plus `row_actions` action columns.
    pub fn total_width(&self, row_actions: usize) -> f64 {
        self.widths.iter().sum::<f64>() + row_actions as f64 * ROW_ACTION_WIDTH
    }

    /// Whether a drag is in progress.
    pub fn dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Begins a drag on the column at `col_index` with the pointer at `x`.
    pub fn pointer_down(&mut self, col_index: usize, x: f64) {
        let Some(key) = self.keys.get(col_index) else {
            return;
        };
        debug!("resize start on column {key} at x={x}");
        self.drag = Some(Drag {
            key: key.clone(),
            start_x: x,
            start_w: self.widths[col_index],
        });
    }

    /// Records a pointer move. Returns a frame command when a new frame had
    /// to be scheduled; otherwise the pending width was just overwritten.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_datatable::{ColumnDef, ColumnWidths, JsonRow};
    ///
    /// let columns = vec![ColumnDef::<JsonRow>::field("name", "Name")];
    /// let mut widths = ColumnWidths::new(&columns);
    /// widths.pointer_down(0, 0.0);
    /// assert!(widths.pointer_move(30.0).is_some());
    /// // same frame: only the latest width is kept
    /// assert!(widths.pointer_move(50.0).is_none());
    ///
    /// let frame = widths.pending_frame().unwrap();
    /// assert!(widths.apply_frame(&frame));
    /// assert_eq!(widths.width_of("name"), Some(210.0));
    /// ```
    pub fn pointer_move(&mut self, x: f64) -> Option<Cmd> {
        let drag = self.drag.as_ref()?;
        if !x.is_finite() {
            return None;
        }
        let width = clamp_width(drag.start_w + (x - drag.start_x));
        self.frame.offer((drag.key.clone(), width))
    }

    /// Ends the drag. A width already pending still lands on the next frame.
    pub fn pointer_up(&mut self) {
        if let Some(drag) = self.drag.take() {
            debug!("resize end on column {}", drag.key);
        }
    }

    /// The frame the pending width is waiting on, if any.
    pub fn pending_frame(&self) -> Option<FrameMsg> {
        self.frame.pending_frame()
    }

    /// Applies the pending width if `frame` belongs to this engine.
    /// Returns `true` when a width changed.
    pub fn apply_frame(&mut self, frame: &FrameMsg) -> bool {
        match self.frame.drain(frame) {
            Some((key, width)) => {
                trace!("frame: column {key} -> {width}");
                self.set_width(&key, width);
                true
            }
            None => false,
        }
    }

    /// Handles frame messages.
    pub fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        if let Some(frame) = msg.downcast_ref::<FrameMsg>() {
            self.apply_frame(frame);
        }
        None
    }

    /// Column template: each width as `"{w}px"`, then one fixed action column
    /// per row action, space-separated.
    pub fn grid_template(&self, row_actions: usize) -> String {
        grid_template(self.widths.iter().copied(), row_actions)
    }

    /// Column template restricted to the given keys, in the given order.
    pub fn grid_template_for<'a>(
        &self,
        keys: impl IntoIterator<Item = &'a str>,
        row_actions: usize,
    ) -> String {
        let widths = keys
            .into_iter()
            .filter_map(|k| self.width_of(k))
            .collect::<Vec<_>>();
        grid_template(widths, row_actions)
    }
}

fn grid_template(widths: impl IntoIterator<Item = f64>, row_actions: usize) -> String {
    widths
        .into_iter()
        .map(format_px)
        .chain(std::iter::repeat(format_px(ROW_ACTION_WIDTH)).take(row_actions))
        .collect::<Vec<_>>()
        .join(" ")
}

fn format_px(w: f64) -> String {
    if w.fract() == 0.0 {
        format!("{}px", w as i64)
    } else {
        format!("{w}px")
    }
}

/// Clamps a width into `[MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH]`.
pub fn clamp_width(width: f64) -> f64 {
    if width.is_nan() {
        return MIN_COLUMN_WIDTH;
    }
    width.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::JsonRow;
    use proptest::prelude::*;

    fn columns() -> Vec<ColumnDef<JsonRow>> {
        vec![
            ColumnDef::field("name", "Name").with_width("200px"),
            ColumnDef::field("amount", "Amount").with_width("100"),
            ColumnDef::field("note", "Note").with_width("wide"),
        ]
    }

    fn flush(widths: &mut ColumnWidths) {
        if let Some(frame) = widths.pending_frame() {
            widths.apply_frame(&frame);
        }
    }

    #[test]
    fn test_seeded_from_declared_widths() {
        let widths = ColumnWidths::new(&columns());
        assert_eq!(widths.widths(), &[200.0, 100.0, 160.0]);
    }

    #[test]
    fn test_grid_template_with_row_actions() {
        let widths = ColumnWidths::new(&columns());
        assert_eq!(widths.grid_template(0), "200px 100px 160px");
        assert_eq!(widths.grid_template(2), "200px 100px 160px 80px 80px");
        assert_eq!(
            widths.grid_template_for(["amount", "name"], 1),
            "100px 200px 80px"
        );
    }

    #[test]
    fn test_drag_coalesces_to_one_frame() {
        let mut widths = ColumnWidths::new(&columns());
        widths.pointer_down(1, 500.0);
        assert!(widths.pointer_move(510.0).is_some());
        assert!(widths.pointer_move(530.0).is_none());
        assert!(widths.pointer_move(550.0).is_none());
        // Nothing applied until the frame fires.
        assert_eq!(widths.widths()[1], 100.0);
        flush(&mut widths);
        assert_eq!(widths.widths()[1], 150.0);
    }

    #[test]
    fn test_drag_is_clamped() {
        let mut widths = ColumnWidths::new(&columns());
        widths.pointer_down(0, 0.0);
        let _ = widths.pointer_move(-10_000.0);
        flush(&mut widths);
        assert_eq!(widths.widths()[0], MIN_COLUMN_WIDTH);
        let _ = widths.pointer_move(10_000.0);
        flush(&mut widths);
        assert_eq!(widths.widths()[0], MAX_COLUMN_WIDTH);
    }

    #[test]
    fn test_moves_after_pointer_up_are_ignored() {
        let mut widths = ColumnWidths::new(&columns());
        widths.pointer_down(0, 0.0);
        let _ = widths.pointer_move(20.0);
        widths.pointer_up();
        assert!(widths.pointer_move(400.0).is_none());
        flush(&mut widths);
        assert_eq!(widths.widths()[0], 220.0);
        assert!(!widths.dragging());
    }

    #[test]
    fn test_identical_columns_keep_resized_widths() {
        let mut widths = ColumnWidths::new(&columns());
        widths.set_width("name", 333.0);
        assert!(!widths.sync_columns(&columns()));
        assert_eq!(widths.width_of("name"), Some(333.0));
    }

    #[test]
    fn test_reseed_preserves_by_key() {
        let mut widths = ColumnWidths::new(&columns());
        widths.set_width("note", 90.0);
        let mut cols = columns();
        cols.remove(0);
        cols.push(ColumnDef::field("extra", "Extra").with_width("70px"));
        assert!(widths.sync_columns(&cols));
        assert_eq!(widths.widths(), &[100.0, 90.0, 70.0]);
    }

    #[test]
    fn test_removing_dragged_column_ends_drag() {
        let mut widths = ColumnWidths::new(&columns());
        widths.pointer_down(0, 0.0);
        let _ = widths.pointer_move(10.0);
        let cols = columns().into_iter().skip(1).collect::<Vec<_>>();
        widths.sync_columns(&cols);
        assert!(!widths.dragging());
        assert!(widths.pending_frame().is_none());
    }

    proptest! {
        #[test]
        fn prop_drag_never_leaves_bounds(start in 0.0f64..3000.0, moves in proptest::collection::vec(-5000.0f64..5000.0, 1..20)) {
            let mut widths = ColumnWidths::new(&columns());
            widths.pointer_down(2, start);
            for x in moves {
                let _ = widths.pointer_move(x);
                flush(&mut widths);
                let w = widths.widths()[2];
                prop_assert!((MIN_COLUMN_WIDTH..=MAX_COLUMN_WIDTH).contains(&w));
            }
        }
    }
}
