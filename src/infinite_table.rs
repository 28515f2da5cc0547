//! Table that loads more rows as the body is scrolled to the end.
//!
//! There is no pagination: rows accumulate through
//! [`InfiniteTable::append_rows`]. A sentinel sits after the last row and
//! counts as visible once the viewport bottom is within `threshold` of the
//! end of the content. Seeing it fires `load_more` once and shows the loading
//! line; the next `append_rows` re-arms the trigger.
//!
//! Columns resize and sort the same way as in [`Table`](crate::table::Table).
//! Sorting reorders the rows loaded so far and keeps later batches in order;
//! hosts that sort on the server reload from the column's `on_sort_change`.

use crate::cell::DEFAULT_EMPTY_TEXT;
use crate::column::{validate_columns, ColumnDef};
use crate::controller::compare_rows;
use crate::error::{Error, Result};
use crate::frame::FrameMsg;
use crate::infinite::{InfiniteScroll, LoadState};
use crate::query::{SortDirection, SortSpec};
use crate::resize::ColumnWidths;
use crate::row::TableRow;
use crate::scroll::{ScrollMetrics, ScrollSync};
use crate::summary::{SummaryBlock, SummaryConfig};
use crate::table::render::{window, Layout, DEFAULT_UNIT_WIDTH};
use crate::table::{
    column_index, mark_sorted, step_focus, RowAction, RowClickFn, TableKeyMap, TableStyles,
    HORIZONTAL_STEP,
};
use crate::virtualize::{virtual_range, VirtualOptions, VirtualRange};
use bubbletea_rs::{Cmd, KeyMsg, Msg, WindowSizeMsg};
use log::debug;
use std::fmt;
use std::sync::Arc;

/// Distance from the end of the content at which the sentinel counts as
/// visible, in rows.
pub const DEFAULT_THRESHOLD: f64 = 1.0;

/// A table fed by an infinite-scroll trigger.
pub struct InfiniteTable<T> {
    columns: Vec<ColumnDef<T>>,
    rows: Vec<T>,
    widths: ColumnWidths,
    scroll: ScrollSync,
    virtual_opts: VirtualOptions,
    summary: Option<SummaryConfig>,
    trigger: InfiniteScroll,
    has_more: bool,
    threshold: f64,
    row_actions: Vec<RowAction<T>>,
    empty_text: String,
    loading_text: String,
    unit_width: f64,
    width: usize,
    focused: Option<String>,
    sort: Option<SortSpec>,
    on_row_click: Option<RowClickFn<T>>,
    /// Key bindings. Page and search bindings do not apply.
    pub keymap: TableKeyMap,
    /// Styles.
    pub styles: TableStyles,
}

impl<T> fmt::Debug for InfiniteTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InfiniteTable")
            .field("columns", &self.columns)
            .field("rows", &self.rows.len())
            .field("scroll", &self.scroll)
            .field("trigger", &self.trigger)
            .field("has_more", &self.has_more)
            .field("focused", &self.focused)
            .field("sort", &self.sort)
            .finish()
    }
}

impl<T: TableRow> InfiniteTable<T> {
    /// Creates an empty table with the trigger armed. A sortable column
    /// declared with a sort direction becomes the initial sort.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateColumnKey`](crate::error::Error::DuplicateColumnKey)
    /// if two columns share a key.
    pub fn try_new(columns: Vec<ColumnDef<T>>) -> Result<Self> {
        validate_columns(&columns)?;
        let sort = columns
            .iter()
            .find(|c| c.sort && c.sort_direction.is_some())
            .and_then(|c| c.sort_direction.map(|d| SortSpec::new(c.id(), d)));
        let mut trigger = InfiniteScroll::new().disarm_on_fire(true);
        trigger.attach();
        Ok(Self {
            widths: ColumnWidths::new(&columns),
            columns,
            rows: Vec::new(),
            scroll: ScrollSync::new().with_window_chrome(1.0),
            virtual_opts: VirtualOptions::default(),
            summary: None,
            trigger,
            has_more: true,
            threshold: DEFAULT_THRESHOLD,
            row_actions: Vec::new(),
            empty_text: DEFAULT_EMPTY_TEXT.to_string(),
            loading_text: "Loading…".to_string(),
            unit_width: DEFAULT_UNIT_WIDTH,
            width: 0,
            focused: None,
            sort,
            on_row_click: None,
            keymap: TableKeyMap::default(),
            styles: TableStyles::default(),
        })
    }

    /// Sets the load-more callback.
    pub fn on_load_more(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.trigger.set_load_more(Some(Arc::new(f)));
        self
    }

    /// Sets the row click callback.
    pub fn on_row_click(mut self, f: impl Fn(&T, usize) + Send + Sync + 'static) -> Self {
        self.on_row_click = Some(Arc::new(f));
        self
    }

    /// Sets the initial rows without checking the sentinel.
    pub fn with_rows(mut self, rows: Vec<T>) -> Self {
        self.rows = rows;
        self.apply_sort();
        self.sync();
        self
    }

    /// Enables row virtualization.
    pub fn with_virtualization(mut self, opts: VirtualOptions) -> Self {
        self.virtual_opts = opts;
        self.sync();
        self
    }

    /// Adds a summary block.
    pub fn with_summary(mut self, summary: SummaryConfig) -> Self {
        self.summary = Some(summary);
        self.sync();
        self
    }

    /// Sets the row actions.
    pub fn with_row_actions(mut self, actions: Vec<RowAction<T>>) -> Self {
        self.row_actions = actions;
        self
    }

    /// Sets how close to the end, in rows, the sentinel counts as visible.
    pub fn with_threshold(mut self, rows: f64) -> Self {
        self.threshold = rows.max(0.0);
        self
    }

    /// Sets the empty-state text.
    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }

    /// Sets the loading line text.
    pub fn with_loading_text(mut self, text: impl Into<String>) -> Self {
        self.loading_text = text.into();
        self
    }

    /// Sets the styles.
    pub fn with_styles(mut self, styles: TableStyles) -> Self {
        self.styles = styles;
        self
    }

    /// Sets how many width units make one terminal column.
    pub fn with_unit_width(mut self, unit_width: f64) -> Self {
        self.unit_width = unit_width;
        self
    }

    /// Checks the sentinel once, which loads the first batch when the table
    /// starts out short.
    pub fn init(&mut self) {
        self.check_sentinel();
    }

    /// Replaces every row and re-arms the trigger.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.apply_sort();
        self.scroll.set_metrics(self.scroll.latest().at(self.scroll.scroll_left(), 0.0));
        self.rearm();
    }

    /// Appends a loaded batch and re-arms the trigger.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_datatable::{ColumnDef, InfiniteTable, JsonRow};
    /// use serde_json::json;
    ///
    /// let mut table = InfiniteTable::try_new(vec![ColumnDef::field("name", "Name")])
    ///     .unwrap()
    ///     .on_load_more(|| {});
    /// table.init();
    /// assert!(table.loading());
    ///
    /// let batch = JsonRow::try_from_values(vec![
    ///     json!({"id": 1, "name": "Ada"}),
    ///     json!({"id": 2, "name": "Grace"}),
    /// ])
    /// .unwrap();
    /// table.append_rows(batch);
    /// assert!(!table.loading());
    /// assert_eq!(table.rows().len(), 2);
    /// ```
    pub fn append_rows(&mut self, rows: impl IntoIterator<Item = T>) {
        let before = self.rows.len();
        self.rows.extend(rows);
        debug!("appended {} rows", self.rows.len() - before);
        self.apply_sort();
        self.rearm();
    }

    /// Marks whether the source has more rows. Without more rows the
    /// sentinel is detached and never fires.
    pub fn set_has_more(&mut self, has_more: bool) {
        self.has_more = has_more;
        if has_more {
            self.trigger.attach();
            self.check_sentinel();
        } else {
            self.trigger.detach();
        }
        self.sync();
    }

    /// Replaces the column definitions. Widths of columns whose key is
    /// unchanged are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateColumnKey`] if two columns share a key; the
    /// current columns stay in place.
    pub fn set_columns(&mut self, columns: Vec<ColumnDef<T>>) -> Result<()> {
        validate_columns(&columns)?;
        self.columns = columns;
        if let Some(key) = &self.focused {
            if !self.visible_keys().iter().any(|k| k == key) {
                self.focused = None;
            }
        }
        if let Some(sort) = &self.sort {
            if column_index(&self.columns, &sort.key).is_err() {
                self.sort = None;
            }
        }
        self.sync();
        Ok(())
    }

    /// The column definitions.
    pub fn columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    /// Keys of the visible columns, in order.
    pub fn visible_keys(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| !c.hidden)
            .map(|c| c.id().to_string())
            .collect()
    }

    /// The column widths.
    pub fn column_widths(&self) -> &ColumnWidths {
        &self.widths
    }

    /// Column template of the visible columns plus row actions.
    pub fn grid_template(&self) -> String {
        let keys = self.visible_keys();
        self.widths
            .grid_template_for(keys.iter().map(String::as_str), self.row_actions.len())
    }

    /// Starts resizing the column with `key` with the pointer at `x`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if no column has `key`.
    pub fn resize_start(&mut self, key: &str, x: f64) -> Result<()> {
        let idx = column_index(&self.columns, key)?;
        self.widths.pointer_down(idx, x);
        Ok(())
    }

    /// Moves the resize pointer.
    pub fn resize_move(&mut self, x: f64) -> Option<Cmd> {
        self.widths.pointer_move(x)
    }

    /// Ends the resize.
    pub fn resize_end(&mut self) {
        self.widths.pointer_up();
    }

    /// The column with header focus.
    pub fn focused_column(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Gives header focus to the column with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if no visible column has `key`.
    pub fn focus_column(&mut self, key: &str) -> Result<()> {
        if !self.visible_keys().iter().any(|k| k == key) {
            return Err(Error::UnknownColumn(key.to_string()));
        }
        self.focused = Some(key.to_string());
        Ok(())
    }

    /// Toggles sorting on the column with `key`: ascending first, then
    /// flipping. Returns the new direction, or `None` when the column is not
    /// sortable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if no column has `key`.
    pub fn sort_by(&mut self, key: &str) -> Result<Option<SortDirection>> {
        let idx = column_index(&self.columns, key)?;
        if !self.columns[idx].sort {
            return Ok(None);
        }
        let direction = match &self.sort {
            Some(s) if s.key == key => s.direction.toggle(),
            _ => SortDirection::Asc,
        };
        self.sort = Some(SortSpec::new(key, direction));
        mark_sorted(&mut self.columns, idx, direction);
        self.apply_sort();
        Ok(Some(direction))
    }

    /// The active sort.
    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// All loaded rows.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    /// Whether a load is in flight.
    pub fn loading(&self) -> bool {
        self.has_more && self.trigger.state() == LoadState::Loading
    }

    /// The trigger.
    pub fn trigger(&self) -> &InfiniteScroll {
        &self.trigger
    }

    /// Whether the sentinel is currently within reach of the viewport.
    pub fn near_bottom(&self) -> bool {
        self.scroll.near_bottom(self.threshold * self.row_height())
    }

    /// Records a scroll notification from the host.
    pub fn on_scroll(&mut self, metrics: ScrollMetrics) -> Option<Cmd> {
        self.scroll.on_scroll(metrics)
    }

    /// Records a body size change from the host.
    pub fn observe_resize(&mut self, width: f64, height: f64) -> Option<Cmd> {
        self.scroll.observe_resize(width, height)
    }

    /// The scroll synchronizer.
    pub fn scroll(&self) -> &ScrollSync {
        &self.scroll
    }

    /// Rendered slice of the rows.
    pub fn virtual_range(&self) -> VirtualRange {
        if self.scroll.viewport_height() <= 0.0 {
            return VirtualRange::all(self.rows.len());
        }
        virtual_range(
            self.rows.len(),
            self.scroll.scroll_top(),
            self.scroll.viewport_height(),
            &self.virtual_opts,
        )
    }

    /// Frames currently scheduled by the scroll synchronizer.
    pub fn pending_frames(&self) -> Vec<FrameMsg> {
        self.widths
            .pending_frame()
            .into_iter()
            .chain(self.scroll.pending_frame())
            .collect()
    }

    /// Reports a click on the row at `index`. Returns `false` when there is
    /// no such row.
    pub fn click_row(&self, index: usize) -> bool {
        let Some(row) = self.rows.get(index) else {
            return false;
        };
        if let Some(f) = &self.on_row_click {
            f(row, index);
        }
        true
    }

    /// The summary block over every loaded row, if shown.
    pub fn summary_block(&self) -> Option<SummaryBlock> {
        let config = self.summary.as_ref()?;
        let keys: Vec<&str> = self
            .columns
            .iter()
            .filter(|c| !c.hidden)
            .map(|c| c.id())
            .collect();
        let rows: Vec<&T> = self.rows.iter().collect();
        SummaryBlock::build(config, &keys, &rows)
    }

    /// Handles column and scroll keys, frames and window resizes. Every published
    /// scroll position is checked against the sentinel.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            return self.handle_key(key);
        }
        if msg.downcast_ref::<FrameMsg>().is_some() {
            self.widths.update(&msg);
            self.scroll.update(&msg);
            self.check_sentinel();
            return None;
        }
        if let Some(size) = msg.downcast_ref::<WindowSizeMsg>() {
            self.width = size.width as usize;
            return self.scroll.update(&msg);
        }
        None
    }

    /// Renders header, body, loading line and summary.
    pub fn view(&self) -> String {
        let offset = (self.scroll.scroll_left() / self.unit_width.max(f64::EPSILON)).round() as usize;
        let layout = Layout::new(
            &self.columns,
            &self.widths,
            &self.row_actions,
            self.unit_width,
            offset,
            self.width,
        );
        let mut lines = vec![layout.header(self.focused.as_deref(), &self.styles)];
        if self.rows.is_empty() && !self.loading() {
            lines.push(layout.empty_row(&self.empty_text, &self.styles));
        } else {
            let range = self.virtual_range();
            let rendered: Vec<String> = self.rows[range.indices()]
                .iter()
                .map(|row| layout.row(row, &self.styles))
                .collect();
            let rh = self.row_height();
            let top = (self.scroll.scroll_top() / rh).floor() as usize;
            let height = (self.scroll.viewport_height() / rh).ceil() as usize;
            lines.extend(window(
                &rendered,
                range.start,
                self.rows.len() - range.end,
                top,
                height,
            ));
        }
        if self.loading() {
            lines.push(self.styles.loading.clone().render(&self.loading_text));
        }
        if let Some(block) = self.summary_block() {
            lines.extend(layout.summary(&block, &self.styles));
        }
        lines.join("\n")
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        let rh = self.row_height();
        let km = &self.keymap;
        let (dx, dy) = if km.scroll_up.matches(key) {
            (0.0, -rh)
        } else if km.scroll_down.matches(key) {
            (0.0, rh)
        } else if km.scroll_left.matches(key) {
            (-HORIZONTAL_STEP, 0.0)
        } else if km.scroll_right.matches(key) {
            (HORIZONTAL_STEP, 0.0)
        } else if km.focus_next.matches(key) || km.focus_prev.matches(key) {
            let step = if km.focus_next.matches(key) { 1 } else { -1 };
            if let Some(next) = step_focus(&self.visible_keys(), self.focused.as_deref(), step) {
                self.focused = Some(next);
            }
            return None;
        } else if km.toggle_sort.matches(key) {
            if let Some(focused) = self.focused.clone() {
                // The focused key always names an existing column.
                let _ = self.sort_by(&focused);
            }
            return None;
        } else if km.widen.matches(key) || km.narrow.matches(key) {
            let delta = if km.widen.matches(key) {
                self.unit_width
            } else {
                -self.unit_width
            };
            if let Some(focused) = self.focused.clone() {
                if let Some(w) = self.widths.width_of(&focused) {
                    self.widths.set_width(&focused, w + delta);
                }
            }
            return None;
        } else {
            return None;
        };
        self.scroll_by(dx, dy)
    }

    fn apply_sort(&mut self) {
        if let Some(sort) = &self.sort {
            self.rows.sort_by(|a, b| compare_rows(a, b, sort));
        }
    }

    fn rearm(&mut self) {
        if self.has_more {
            self.trigger.set_enabled(true);
        }
        self.sync();
        self.check_sentinel();
    }

    fn check_sentinel(&mut self) {
        let visible = self.near_bottom();
        if self.trigger.observe(visible) {
            debug!("sentinel reached with {} rows loaded", self.rows.len());
            self.sync();
        }
    }

    fn scroll_by(&mut self, dx: f64, dy: f64) -> Option<Cmd> {
        let m = self.scroll.latest();
        let max_top = (self.scroll.scroll_height() - m.client_height).max(0.0);
        let next = m.at(
            (m.scroll_left + dx).max(0.0),
            (m.scroll_top + dy).clamp(0.0, max_top),
        );
        if next == m {
            return None;
        }
        self.scroll.on_scroll(next)
    }

    fn row_height(&self) -> f64 {
        let rh = self.virtual_opts.row_height;
        if rh.is_finite() && rh > 0.0 {
            rh
        } else {
            1.0
        }
    }

    fn sync(&mut self) {
        self.widths.sync_columns(&self.columns);
        self.scroll
            .set_scroll_height(self.rows.len() as f64 * self.row_height());
        let summary = self
            .summary
            .as_ref()
            .filter(|s| s.enabled)
            .map_or(0, |s| s.lines.len());
        let loading = usize::from(self.loading());
        self.scroll
            .set_window_chrome((1 + summary + loading) as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::{cell_to_string, JsonRow};
    use crossterm::event::{KeyCode, KeyModifiers};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn batch(from: usize, n: usize) -> Vec<JsonRow> {
        (from..from + n)
            .map(|i| JsonRow::try_from_value(json!({"id": i, "name": format!("row {i}")})).unwrap())
            .collect()
    }

    fn counted() -> (InfiniteTable<JsonRow>, Arc<AtomicUsize>) {
        let loads = Arc::new(AtomicUsize::new(0));
        let l = loads.clone();
        let t = InfiniteTable::try_new(vec![ColumnDef::field("name", "Name")])
            .unwrap()
            .with_styles(TableStyles::plain())
            .on_load_more(move || {
                l.fetch_add(1, Ordering::SeqCst);
            });
        (t, loads)
    }

    fn flush(t: &mut InfiniteTable<JsonRow>) {
        for frame in t.pending_frames() {
            t.update(Box::new(frame) as Msg);
        }
    }

    fn scroll_to(t: &mut InfiniteTable<JsonRow>, top: f64) {
        let m = t.scroll().latest().at(0.0, top);
        t.on_scroll(m);
        flush(t);
    }

    #[test]
    fn test_sentinel_fires_once_until_rows_arrive() {
        let (mut t, loads) = counted();
        t = t.with_rows(batch(0, 20));
        t.observe_resize(80.0, 5.0);
        flush(&mut t);
        assert_eq!(loads.load(Ordering::SeqCst), 0);

        scroll_to(&mut t, 15.0);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(t.loading());
        // still at the bottom, still loading: no second request
        scroll_to(&mut t, 15.0);
        scroll_to(&mut t, 14.5);
        assert_eq!(loads.load(Ordering::SeqCst), 1);

        t.append_rows(batch(20, 20));
        assert!(!t.loading());
        assert_eq!(t.rows().len(), 40);
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        scroll_to(&mut t, 35.0);
        assert_eq!(loads.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_short_content_loads_on_init() {
        let (mut t, loads) = counted();
        t.init();
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        let view = lipgloss_extras::lipgloss::strip_ansi(&t.view());
        assert!(view.contains("Loading…"));
        assert!(!view.contains(DEFAULT_EMPTY_TEXT));
    }

    #[test]
    fn test_no_more_rows_detaches() {
        let (mut t, loads) = counted();
        t.set_has_more(false);
        t.init();
        assert_eq!(loads.load(Ordering::SeqCst), 0);
        assert!(!t.trigger().attached());
        let view = lipgloss_extras::lipgloss::strip_ansi(&t.view());
        assert!(view.contains(DEFAULT_EMPTY_TEXT));
    }

    #[test]
    fn test_click_row_passes_index() {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        let s = seen.clone();
        let t = InfiniteTable::try_new(vec![ColumnDef::field("name", "Name")])
            .unwrap()
            .with_rows(batch(0, 3))
            .on_row_click(move |row: &JsonRow, i| {
                s.lock().unwrap().push((cell_to_string(&row.cell("name")), i));
            });
        assert!(t.click_row(2));
        assert!(!t.click_row(3));
        assert_eq!(*seen.lock().unwrap(), vec![("row 2".to_string(), 2)]);
    }

    #[test]
    fn test_virtualized_rows_follow_scroll() {
        let (t, _) = counted();
        let mut t = t
            .with_virtualization(VirtualOptions::enabled(1.0).with_overscan(1))
            .with_rows(batch(0, 50));
        t.observe_resize(80.0, 4.0);
        flush(&mut t);
        scroll_to(&mut t, 10.0);
        let range = t.virtual_range();
        assert_eq!((range.start, range.end), (9, 15));
        let view = lipgloss_extras::lipgloss::strip_ansi(&t.view());
        let lines: Vec<&str> = view.lines().collect();
        assert!(lines[1].contains("row 10"));
        assert_eq!(lines.len(), 5);
    }

    fn key(code: KeyCode) -> Msg {
        Box::new(KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }) as Msg
    }

    fn names(t: &InfiniteTable<JsonRow>) -> Vec<String> {
        t.rows().iter().map(|r| cell_to_string(&r.cell("name"))).collect()
    }

    fn sortable() -> InfiniteTable<JsonRow> {
        InfiniteTable::try_new(vec![
            ColumnDef::field("id", "Id").sortable(),
            ColumnDef::field("name", "Name"),
        ])
        .unwrap()
        .with_styles(TableStyles::plain())
    }

    #[test]
    fn test_resize_lands_on_frame() {
        let (mut t, _) = counted();
        t.resize_start("name", 100.0).unwrap();
        assert!(t.resize_move(140.0).is_some());
        assert!(t.resize_move(1000.0).is_none());
        assert_eq!(t.column_widths().width_of("name"), Some(160.0));
        flush(&mut t);
        assert_eq!(t.column_widths().width_of("name"), Some(1060.0));
        t.resize_end();
        assert!(t.resize_move(0.0).is_none());
        assert!(t.resize_start("zzz", 0.0).is_err());
    }

    #[test]
    fn test_set_columns_keeps_widths_and_drops_stale_focus() {
        let mut t = sortable();
        t.resize_start("name", 0.0).unwrap();
        t.resize_move(40.0);
        flush(&mut t);
        t.focus_column("id").unwrap();
        t.set_columns(vec![ColumnDef::field("name", "Name")]).unwrap();
        assert_eq!(t.column_widths().width_of("name"), Some(200.0));
        assert_eq!(t.focused_column(), None);
        assert_eq!(t.sort(), None);
        assert_eq!(t.visible_keys(), vec!["name".to_string()]);
    }

    #[test]
    fn test_keyboard_sort_reorders_loaded_rows() {
        let mut t = sortable().with_rows(batch(0, 3));
        t.update(key(KeyCode::Tab));
        assert_eq!(t.focused_column(), Some("id"));
        t.update(key(KeyCode::Enter));
        assert_eq!(t.sort(), Some(&SortSpec::new("id", SortDirection::Asc)));
        t.update(key(KeyCode::Enter));
        assert_eq!(names(&t), vec!["row 2", "row 1", "row 0"]);
        assert_eq!(t.columns()[0].sort_direction, Some(SortDirection::Desc));

        // later batches merge into the active order
        t.append_rows(batch(3, 2));
        assert_eq!(names(&t), vec!["row 4", "row 3", "row 2", "row 1", "row 0"]);
    }

    #[test]
    fn test_unsortable_column_ignores_toggle() {
        let mut t = sortable().with_rows(batch(0, 2));
        assert_eq!(t.sort_by("name"), Ok(None));
        assert!(t.sort_by("zzz").is_err());
        assert_eq!(t.sort(), None);
        assert_eq!(names(&t), vec!["row 0", "row 1"]);
    }

    #[test]
    fn test_widen_and_narrow_focused_column() {
        let mut t = sortable();
        t.update(key(KeyCode::Char('+')));
        assert_eq!(t.column_widths().width_of("id"), Some(160.0));
        t.update(key(KeyCode::BackTab));
        assert_eq!(t.focused_column(), Some("name"));
        t.update(key(KeyCode::Char('+')));
        assert_eq!(t.column_widths().width_of("name"), Some(168.0));
        t.update(key(KeyCode::Char('-')));
        t.update(key(KeyCode::Char('-')));
        assert_eq!(t.column_widths().width_of("name"), Some(152.0));
    }

    #[test]
    fn test_declared_sort_direction_orders_initial_rows() {
        let t = InfiniteTable::try_new(vec![ColumnDef::field("id", "Id")
            .sortable()
            .with_sort_direction(SortDirection::Desc)])
        .unwrap()
        .with_rows(batch(0, 3));
        assert_eq!(t.sort(), Some(&SortSpec::new("id", SortDirection::Desc)));
        let ids: Vec<String> = t.rows().iter().map(|r| cell_to_string(&r.cell("id"))).collect();
        assert_eq!(ids, vec!["2", "1", "0"]);
    }
}
