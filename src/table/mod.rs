//! Paginated data table.
//!
//! [`Table`] ties the pieces of the crate together: a
//! [`Controller`](crate::controller::Controller) derives the current page,
//! [`ColumnWidths`] holds the per-column widths, a [`ScrollSync`] tracks the
//! body's scroll offset and the [`virtualize`](crate::virtualize) window
//! trims the rows that are rendered. The header and summary are cut with the
//! same horizontal offset as the body so they stay aligned with it.
//!
//! # Example
//!
//! ```rust
//! use bubbletea_datatable::prelude::*;
//! use serde_json::json;
//!
//! let rows = JsonRow::try_from_values(vec![
//!     json!({"id": 1, "name": "Ada", "amount": 120}),
//!     json!({"id": 2, "name": "Linus", "amount": 80}),
//! ])
//! .unwrap();
//!
//! let mut table = Table::try_new(vec![
//!     ColumnDef::field("name", "Name").sortable(),
//!     ColumnDef::field("amount", "Amount").with_align(TextAlign::Right),
//! ])
//! .unwrap()
//! .with_rows(rows);
//!
//! table.sort_by("name").unwrap();
//! assert_eq!(table.page_rows().len(), 2);
//! println!("{}", table.view());
//! ```

pub(crate) mod render;
mod style;

pub use render::{cut_string, to_cols, window, DEFAULT_UNIT_WIDTH};
pub use style::TableStyles;

use crate::cell::DEFAULT_EMPTY_TEXT;
use crate::column::{validate_columns, ColumnDef, DisabledFn};
use crate::controller::{Callbacks, Controller, DebounceMsg, Mode, TableConfig};
use crate::error::{Error, Result};
use crate::export::{ExportFn, ExportRequest, ExportScope, ExportType};
use crate::frame::FrameMsg;
use crate::key::{Binding, KeyMap, KeyPress};
use crate::paginator::{next_rows_per_page, Paginator, PaginatorKeyMap};
use crate::query::{Filter, Query, SortDirection, SortSpec};
use crate::resize::ColumnWidths;
use crate::row::TableRow;
use crate::scroll::{ScrollMetrics, ScrollSync};
use crate::summary::{SummaryBlock, SummaryConfig};
use crate::toolbar::{SearchField, ToolbarConfig};
use crate::virtualize::{virtual_range, VirtualOptions, VirtualRange};
use bubbletea_rs::{Cmd, KeyMsg, Msg, WindowSizeMsg};
use crossterm::event::{KeyCode, KeyModifiers};
use log::debug;
use render::Layout;
use std::fmt;
use std::sync::Arc;

/// Horizontal distance scrolled per key press, in width units.
pub const HORIZONTAL_STEP: f64 = 40.0;

/// Row click callback, given the row and its index in the full result.
pub type RowClickFn<T> = Arc<dyn Fn(&T, usize) + Send + Sync>;

/// Row action callback.
pub type RowActionFn<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A per-row action rendered in its own fixed-width column.
pub struct RowAction<T> {
    /// Button text.
    pub label: String,
    /// Invoked with the row.
    pub on_action: RowActionFn<T>,
    /// Rows for which the action is unavailable.
    pub disabled: Option<DisabledFn<T>>,
}

impl<T> Clone for RowAction<T> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            on_action: self.on_action.clone(),
            disabled: self.disabled.clone(),
        }
    }
}

impl<T> fmt::Debug for RowAction<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RowAction")
            .field("label", &self.label)
            .field("disabled", &self.disabled.is_some())
            .finish()
    }
}

impl<T> RowAction<T> {
    /// Creates an action.
    pub fn new(label: impl Into<String>, f: impl Fn(&T) + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            on_action: Arc::new(f),
            disabled: None,
        }
    }

    /// Makes the action unavailable for rows matching `f`.
    pub fn with_disabled(mut self, f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.disabled = Some(Arc::new(f));
        self
    }

    /// Whether the action is unavailable for `row`.
    pub fn is_disabled(&self, row: &T) -> bool {
        self.disabled.as_ref().is_some_and(|f| f(row))
    }
}

/// Key bindings of a table.
#[derive(Debug, Clone)]
pub struct TableKeyMap {
    /// Page navigation.
    pub paginator: PaginatorKeyMap,
    /// Moves header focus right.
    pub focus_next: Binding,
    /// Moves header focus left.
    pub focus_prev: Binding,
    /// Toggles sorting on the focused column.
    pub toggle_sort: Binding,
    /// Scrolls the body up one row.
    pub scroll_up: Binding,
    /// Scrolls the body down one row.
    pub scroll_down: Binding,
    /// Scrolls the body left.
    pub scroll_left: Binding,
    /// Scrolls the body right.
    pub scroll_right: Binding,
    /// Widens the focused column.
    pub widen: Binding,
    /// Narrows the focused column.
    pub narrow: Binding,
    /// Focuses the search field.
    pub search: Binding,
}

impl Default for TableKeyMap {
    fn default() -> Self {
        Self {
            paginator: PaginatorKeyMap::default(),
            focus_next: Binding::new(vec![KeyCode::Right, KeyCode::Char('l'), KeyCode::Tab])
                .with_help("→/l", "next column"),
            focus_prev: Binding::new::<KeyPress>(vec![
                KeyCode::Left.into(),
                KeyCode::Char('h').into(),
                (KeyCode::BackTab, KeyModifiers::SHIFT).into(),
                KeyCode::BackTab.into(),
            ])
            .with_help("←/h", "prev column"),
            toggle_sort: Binding::new(vec![KeyCode::Enter, KeyCode::Char(' ')])
                .with_help("enter/space", "sort"),
            scroll_up: Binding::new(vec![KeyCode::Up, KeyCode::Char('k')]).with_help("↑/k", "up"),
            scroll_down: Binding::new(vec![KeyCode::Down, KeyCode::Char('j')])
                .with_help("↓/j", "down"),
            scroll_left: Binding::new(vec![KeyCode::Char('<')]).with_help("<", "scroll left"),
            scroll_right: Binding::new(vec![KeyCode::Char('>')]).with_help(">", "scroll right"),
            widen: Binding::new(vec![KeyCode::Char('+')]).with_help("+", "widen column"),
            narrow: Binding::new(vec![KeyCode::Char('-')]).with_help("-", "narrow column"),
            search: Binding::new(vec![KeyCode::Char('/')]).with_help("/", "search"),
        }
    }
}

impl KeyMap for TableKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![
            &self.paginator.prev_page,
            &self.paginator.next_page,
            &self.toggle_sort,
            &self.search,
        ]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        let mut groups = self.paginator.full_help();
        groups.push(vec![&self.focus_prev, &self.focus_next, &self.toggle_sort]);
        groups.push(vec![
            &self.scroll_up,
            &self.scroll_down,
            &self.scroll_left,
            &self.scroll_right,
        ]);
        groups.push(vec![&self.widen, &self.narrow, &self.search]);
        groups
    }
}

enum Action {
    PrevPage,
    NextPage,
    FirstPage,
    LastPage,
    CycleRowsPerPage,
    FocusNext,
    FocusPrev,
    ToggleSort,
    Scroll(f64, f64),
    Resize(f64),
    Search,
}

/// A paginated table over rows of type `T`.
pub struct Table<T> {
    columns: Vec<ColumnDef<T>>,
    controller: Controller<T>,
    widths: ColumnWidths,
    scroll: ScrollSync,
    virtual_opts: VirtualOptions,
    summary: Option<SummaryConfig>,
    toolbar: ToolbarConfig,
    search: SearchField,
    row_actions: Vec<RowAction<T>>,
    paginator: Paginator,
    empty_text: String,
    unit_width: f64,
    width: usize,
    focused: Option<String>,
    on_row_click: Option<RowClickFn<T>>,
    on_export: Option<ExportFn>,
    /// Key bindings.
    pub keymap: TableKeyMap,
    /// Styles.
    pub styles: TableStyles,
}

impl<T> fmt::Debug for Table<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("columns", &self.columns)
            .field("controller", &self.controller)
            .field("widths", &self.widths)
            .field("scroll", &self.scroll)
            .field("virtual_opts", &self.virtual_opts)
            .field("toolbar", &self.toolbar)
            .field("row_actions", &self.row_actions)
            .field("focused", &self.focused)
            .finish()
    }
}

impl<T: TableRow> Table<T> {
    /// Creates a client-mode table.
    ///
    /// Every field column is searched by the keyword, and a sortable column
    /// declared with a sort direction becomes the initial sort.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateColumnKey`] if two columns share a key.
    pub fn try_new(columns: Vec<ColumnDef<T>>) -> Result<Self> {
        validate_columns(&columns)?;
        let search_keys: Vec<String> = columns
            .iter()
            .filter_map(|c| c.key.field().map(str::to_string))
            .collect();
        let mut controller =
            Controller::new(Mode::Client, TableConfig::default()).with_search_keys(search_keys);
        if let Some(col) = columns.iter().find(|c| c.sort && c.sort_direction.is_some()) {
            if let Some(direction) = col.sort_direction {
                controller = controller.with_sort(SortSpec::new(col.id(), direction));
            }
        }
        let mut table = Self {
            widths: ColumnWidths::new(&columns),
            columns,
            controller,
            scroll: ScrollSync::new(),
            virtual_opts: VirtualOptions::default(),
            summary: None,
            toolbar: ToolbarConfig::default(),
            search: SearchField::default(),
            row_actions: Vec::new(),
            paginator: Paginator::default(),
            empty_text: DEFAULT_EMPTY_TEXT.to_string(),
            unit_width: DEFAULT_UNIT_WIDTH,
            width: 0,
            focused: None,
            on_row_click: None,
            on_export: None,
            keymap: TableKeyMap::default(),
            styles: TableStyles::default(),
        };
        table.sync();
        Ok(table)
    }

    /// Sets the mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.controller.set_mode(mode);
        self.sync();
        self
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: TableConfig) -> Self {
        // A builder cannot return the debounce command, so a controlled
        // keyword given here settles at once.
        if self.set_config(config).is_some() {
            if let Some(msg) = self.controller.pending_debounce() {
                self.controller.apply_debounce(&msg);
            }
        }
        self
    }

    /// Sets the controller callbacks.
    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.controller.set_callbacks(callbacks);
        self
    }

    /// Sets the rows.
    pub fn with_rows(mut self, rows: Vec<T>) -> Self {
        self.set_rows(rows);
        self
    }

    /// Replaces the keys searched by the keyword.
    pub fn with_search_keys<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.controller
            .set_search_keys(keys.into_iter().map(Into::into).collect());
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

    /// Configures the toolbar.
    pub fn with_toolbar(mut self, toolbar: ToolbarConfig) -> Self {
        self.toolbar = toolbar;
        self.sync();
        self
    }

    /// Sets the row actions.
    pub fn with_row_actions(mut self, actions: Vec<RowAction<T>>) -> Self {
        self.row_actions = actions;
        self
    }

    /// Sets the text of the empty-state row.
    pub fn with_empty_text(mut self, text: impl Into<String>) -> Self {
        self.empty_text = text.into();
        self
    }

    /// Sets how many width units make one terminal column.
    pub fn with_unit_width(mut self, unit_width: f64) -> Self {
        self.unit_width = unit_width;
        self
    }

    /// Sets the footer renderer.
    pub fn with_paginator(mut self, paginator: Paginator) -> Self {
        self.paginator = paginator;
        self
    }

    /// Sets the styles.
    pub fn with_styles(mut self, styles: TableStyles) -> Self {
        self.styles = styles;
        self
    }

    /// Sets the row click callback.
    pub fn on_row_click(mut self, f: impl Fn(&T, usize) + Send + Sync + 'static) -> Self {
        self.on_row_click = Some(Arc::new(f));
        self
    }

    /// Sets the export callback.
    pub fn on_export(mut self, f: impl Fn(&ExportRequest) + Send + Sync + 'static) -> Self {
        self.on_export = Some(Arc::new(f));
        self
    }

    /// Emits the initial server query.
    pub fn init(&mut self) {
        self.controller.init();
    }

    // ---------------------------------------------------------------------
    // Host inputs
    // ---------------------------------------------------------------------

    /// Replaces the column definitions. Widths of columns whose key is
    /// unchanged are kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateColumnKey`] if two columns share a key; the
    /// current columns stay in place.
    pub fn set_columns(&mut self, columns: Vec<ColumnDef<T>>) -> Result<()> {
        validate_columns(&columns)?;
        self.widths.sync_columns(&columns);
        self.columns = columns;
        if let Some(key) = &self.focused {
            if !self.visible_keys().iter().any(|k| k == key) {
                self.focused = None;
            }
        }
        self.sync();
        Ok(())
    }

    /// The column definitions.
    pub fn columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    /// Replaces the rows.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.controller.set_rows(rows);
        self.sync();
    }

    /// Replaces the configuration. Returns the debounce command when a
    /// controlled keyword changed.
    pub fn set_config(&mut self, config: TableConfig) -> Option<Cmd> {
        if let Some(keyword) = &config.controlled_keyword {
            self.search.set_value(keyword.clone());
        }
        let cmd = self.controller.set_config(config);
        self.sync();
        cmd
    }

    /// Switches mode.
    pub fn set_mode(&mut self, mode: Mode) {
        self.controller.set_mode(mode);
        self.sync();
    }

    /// The controller.
    pub fn controller(&self) -> &Controller<T> {
        &self.controller
    }

    // ---------------------------------------------------------------------
    // Query
    // ---------------------------------------------------------------------

    /// Rows of the current page.
    pub fn page_rows(&self) -> Vec<&T> {
        self.controller.page_rows()
    }

    /// The current query.
    pub fn query(&self) -> Query {
        self.controller.query()
    }

    /// Moves to `page`.
    pub fn set_page(&mut self, page: usize) {
        self.navigate(|c| c.set_page(page));
    }

    /// Moves to the next page.
    pub fn next_page(&mut self) {
        self.navigate(Controller::next_page);
    }

    /// Moves to the previous page.
    pub fn prev_page(&mut self) {
        self.navigate(Controller::prev_page);
    }

    /// Changes the page size and returns to the first page.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        self.navigate(|c| c.set_rows_per_page(rows_per_page));
    }

    /// Changes the keyword.
    pub fn set_keyword(&mut self, keyword: impl Into<String>) -> Option<Cmd> {
        let keyword = keyword.into();
        self.search.set_value(keyword.clone());
        let cmd = self.controller.set_keyword(keyword);
        self.sync();
        cmd
    }

    /// Replaces the column filters.
    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        self.navigate(|c| c.set_filters(filters));
    }

    /// Adds or replaces the filter on one column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if no column has the filter's key.
    pub fn add_filter(&mut self, filter: Filter) -> Result<()> {
        self.column_index(&filter.key)?;
        self.navigate(|c| c.add_filter(filter));
        Ok(())
    }

    /// Removes every filter.
    pub fn clear_filters(&mut self) {
        self.navigate(Controller::clear_filters);
    }

    /// Toggles sorting on the column with `key`: ascending first, then
    /// flipping. Returns the new direction, or `None` when the column is not
    /// sortable or the table is disabled.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if no column has `key`.
    pub fn sort_by(&mut self, key: &str) -> Result<Option<SortDirection>> {
        let idx = self.column_index(key)?;
        if !self.columns[idx].sort {
            return Ok(None);
        }
        let Some(direction) = self.controller.toggle_sort(key) else {
            return Ok(None);
        };
        mark_sorted(&mut self.columns, idx, direction);
        self.sync();
        Ok(Some(direction))
    }

    // ---------------------------------------------------------------------
    // Columns
    // ---------------------------------------------------------------------

    /// Shows or hides the column with `key`. Returns whether it is now
    /// visible.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownColumn`] if no column has `key`.
    pub fn toggle_column_visibility(&mut self, key: &str) -> Result<bool> {
        let idx = self.column_index(key)?;
        let col = &mut self.columns[idx];
        col.hidden = !col.hidden;
        let visible = !col.hidden;
        if !visible && self.focused.as_deref() == Some(key) {
            self.focused = None;
        }
        debug!("column {key} visible={visible}");
        self.sync();
        Ok(visible)
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
        let idx = self.column_index(key)?;
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

    // ---------------------------------------------------------------------
    // Scrolling
    // ---------------------------------------------------------------------

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

    /// Transform applied to the header and summary.
    pub fn header_transform(&self) -> String {
        self.scroll.transform()
    }

    /// Rows of the current page that are rendered. Everything is rendered
    /// when virtualization is off or the viewport height is still unknown.
    pub fn virtual_range(&self) -> VirtualRange {
        self.range_for(self.controller.page_rows().len())
    }

    /// Frames currently scheduled by the resize engine and the scroll
    /// synchronizer.
    pub fn pending_frames(&self) -> Vec<FrameMsg> {
        self.widths
            .pending_frame()
            .into_iter()
            .chain(self.scroll.pending_frame())
            .collect()
    }

    // ---------------------------------------------------------------------
    // Summary, rows, export
    // ---------------------------------------------------------------------

    /// The summary block over the full filtered row set, if shown.
    pub fn summary_block(&self) -> Option<SummaryBlock> {
        let config = self.summary.as_ref()?;
        let keys = self.visible_keys();
        let keys: Vec<&str> = keys.iter().map(String::as_str).collect();
        SummaryBlock::build(config, &keys, &self.controller.filtered_rows())
    }

    /// Reports a click on the row at `position` of the current page.
    /// Returns `false` when there is no such row.
    pub fn click_row(&self, position: usize) -> bool {
        let rows = self.controller.page_rows();
        let Some(&row) = rows.get(position) else {
            return false;
        };
        let index = (self.controller.page() - 1) * self.controller.rows_per_page() + position;
        if let Some(f) = &self.on_row_click {
            f(row, index);
        }
        true
    }

    /// Runs row action `action` on the row at `position` of the current page.
    /// Returns `false` when the row or action does not exist or the action is
    /// disabled for the row.
    pub fn trigger_row_action(&self, position: usize, action: usize) -> bool {
        let rows = self.controller.page_rows();
        let (Some(&row), Some(action)) = (rows.get(position), self.row_actions.get(action)) else {
            return false;
        };
        if action.is_disabled(row) {
            return false;
        }
        (action.on_action)(row);
        true
    }

    /// Builds an export request for the current view and hands it to the
    /// export callback.
    pub fn export(&self, kind: ExportType, scope: ExportScope) -> ExportRequest {
        let query = self.controller.query();
        let request = ExportRequest {
            kind,
            scope,
            keyword: self.controller.keyword().to_string(),
            sort: query.sort,
            filters: query.filters,
            page: query.page,
            rows_per_page: query.rows_per_page,
        };
        match &self.on_export {
            Some(f) => f(&request),
            None => debug!("export {} requested without a handler", request.kind),
        }
        request
    }

    // ---------------------------------------------------------------------
    // Update / view
    // ---------------------------------------------------------------------

    /// Handles key presses, frames, debounce timers and window resizes.
    pub fn update(&mut self, msg: Msg) -> Option<Cmd> {
        if let Some(key) = msg.downcast_ref::<KeyMsg>() {
            return self.handle_key(key);
        }
        if msg.downcast_ref::<FrameMsg>().is_some() {
            self.widths.update(&msg);
            self.scroll.update(&msg);
            self.sync();
            return None;
        }
        if msg.downcast_ref::<DebounceMsg>().is_some() {
            return self.controller.update(&msg);
        }
        if let Some(size) = msg.downcast_ref::<WindowSizeMsg>() {
            self.width = size.width as usize;
            return self.scroll.update(&msg);
        }
        None
    }

    /// Renders toolbar, header, body, summary and pagination footer.
    pub fn view(&self) -> String {
        let layout = self.layout();
        let mut lines = Vec::new();
        if self.toolbar.is_visible() {
            lines.push(self.toolbar_line());
        }
        lines.push(layout.header(self.focused.as_deref(), &self.styles));
        let rows = self.controller.page_rows();
        if rows.is_empty() {
            lines.push(layout.empty_row(&self.empty_text, &self.styles));
        } else {
            let range = self.range_for(rows.len());
            let rendered: Vec<String> = rows[range.indices()]
                .iter()
                .map(|row| layout.row(*row, &self.styles))
                .collect();
            let (top, height) = self.body_window();
            lines.extend(window(
                &rendered,
                range.start,
                rows.len() - range.end,
                top,
                height,
            ));
        }
        if let Some(block) = self.summary_block() {
            lines.extend(layout.summary(&block, &self.styles));
        }
        let footer = self.paginator.view(
            self.controller.page(),
            self.controller.page_count(),
            self.controller.rows_per_page(),
            &self.controller.rows_per_page_options(),
            self.controller.from_to(),
        );
        lines.push(self.styles.footer.clone().render(&footer));
        lines.join("\n")
    }

    fn handle_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        if self.search.focused() {
            return self.handle_search_key(key);
        }
        let action = {
            let km = &self.keymap;
            let rh = self.row_height();
            if km.paginator.prev_page.matches(key) {
                Action::PrevPage
            } else if km.paginator.next_page.matches(key) {
                Action::NextPage
            } else if km.paginator.first_page.matches(key) {
                Action::FirstPage
            } else if km.paginator.last_page.matches(key) {
                Action::LastPage
            } else if km.paginator.rows_per_page.matches(key) {
                Action::CycleRowsPerPage
            } else if km.focus_next.matches(key) {
                Action::FocusNext
            } else if km.focus_prev.matches(key) {
                Action::FocusPrev
            } else if km.toggle_sort.matches(key) {
                Action::ToggleSort
            } else if km.scroll_up.matches(key) {
                Action::Scroll(0.0, -rh)
            } else if km.scroll_down.matches(key) {
                Action::Scroll(0.0, rh)
            } else if km.scroll_left.matches(key) {
                Action::Scroll(-HORIZONTAL_STEP, 0.0)
            } else if km.scroll_right.matches(key) {
                Action::Scroll(HORIZONTAL_STEP, 0.0)
            } else if km.widen.matches(key) {
                Action::Resize(self.unit_width)
            } else if km.narrow.matches(key) {
                Action::Resize(-self.unit_width)
            } else if km.search.matches(key) && self.toolbar.search {
                Action::Search
            } else {
                return None;
            }
        };
        match action {
            Action::PrevPage => self.prev_page(),
            Action::NextPage => self.next_page(),
            Action::FirstPage => self.navigate(Controller::first_page),
            Action::LastPage => self.navigate(Controller::last_page),
            Action::CycleRowsPerPage => {
                let options = self.controller.rows_per_page_options();
                if let Some(next) = next_rows_per_page(self.controller.rows_per_page(), &options) {
                    self.set_rows_per_page(next);
                }
            }
            Action::FocusNext => self.move_focus(1),
            Action::FocusPrev => self.move_focus(-1),
            Action::ToggleSort => {
                if let Some(key) = self.focused.clone() {
                    // The focused key always names an existing column.
                    let _ = self.sort_by(&key);
                }
            }
            Action::Scroll(dx, dy) => return self.scroll_by(dx, dy),
            Action::Resize(delta) => {
                if let Some(key) = self.focused.clone() {
                    if let Some(w) = self.widths.width_of(&key) {
                        self.widths.set_width(&key, w + delta);
                    }
                }
            }
            Action::Search => self.search.focus(),
        }
        None
    }

    fn handle_search_key(&mut self, key: &KeyMsg) -> Option<Cmd> {
        match key.key {
            KeyCode::Esc | KeyCode::Enter => {
                self.search.blur();
                None
            }
            KeyCode::Backspace => {
                if self.search.backspace() {
                    self.commit_search()
                } else {
                    None
                }
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.search.push(c);
                self.commit_search()
            }
            _ => None,
        }
    }

    fn commit_search(&mut self) -> Option<Cmd> {
        let keyword = self.search.value().to_string();
        let cmd = self.controller.set_keyword(keyword);
        self.sync();
        cmd
    }

    fn move_focus(&mut self, step: isize) {
        if let Some(key) = step_focus(&self.visible_keys(), self.focused.as_deref(), step) {
            self.focused = Some(key);
        }
    }

    fn scroll_by(&mut self, dx: f64, dy: f64) -> Option<Cmd> {
        let m = self.scroll.latest();
        let max_top = (self.scroll.scroll_height() - m.client_height).max(0.0);
        let content = self.layout().total_width() as f64 * self.unit_width;
        let max_left = (content - self.width as f64 * self.unit_width).max(0.0);
        let next = m.at(
            (m.scroll_left + dx).clamp(0.0, max_left),
            (m.scroll_top + dy).clamp(0.0, max_top),
        );
        if next == m {
            return None;
        }
        self.scroll.on_scroll(next)
    }

    fn navigate(&mut self, f: impl FnOnce(&mut Controller<T>)) {
        let before = self.controller.page();
        f(&mut self.controller);
        if self.controller.page() != before {
            let m = self.scroll.latest();
            self.scroll.set_metrics(m.at(m.scroll_left, 0.0));
        }
        self.sync();
    }

    fn column_index(&self, key: &str) -> Result<usize> {
        column_index(&self.columns, key)
    }

    fn row_height(&self) -> f64 {
        let rh = self.virtual_opts.row_height;
        if rh.is_finite() && rh > 0.0 {
            rh
        } else {
            1.0
        }
    }

    fn range_for(&self, total: usize) -> VirtualRange {
        if self.scroll.viewport_height() <= 0.0 {
            return VirtualRange::all(total);
        }
        virtual_range(
            total,
            self.scroll.scroll_top(),
            self.scroll.viewport_height(),
            &self.virtual_opts,
        )
    }

    /// First body line and number of body lines shown, zero meaning all.
    fn body_window(&self) -> (usize, usize) {
        let rh = self.row_height();
        let top = (self.scroll.scroll_top() / rh).floor() as usize;
        let height = (self.scroll.viewport_height() / rh).ceil() as usize;
        (top, height)
    }

    fn layout(&self) -> Layout<'_, T> {
        let offset = (self.scroll.scroll_left() / self.unit_width.max(f64::EPSILON)).round() as usize;
        Layout::new(
            &self.columns,
            &self.widths,
            &self.row_actions,
            self.unit_width,
            offset,
            self.width,
        )
    }

    fn toolbar_line(&self) -> String {
        let mut parts = Vec::new();
        if self.toolbar.search {
            let text = self.search.display(&self.toolbar.search_placeholder);
            let cursor = if self.search.focused() { "▏" } else { "" };
            parts.push(format!("/ {text}{cursor}"));
        }
        if !self.toolbar.exports.is_empty() {
            let kinds: Vec<String> = self.toolbar.exports.iter().map(ToString::to_string).collect();
            parts.push(format!("Export: {}", kinds.join(" ")));
        }
        if self.toolbar.column_visibility {
            let shown = self.columns.iter().filter(|c| !c.hidden).count();
            parts.push(format!("Columns: {shown}/{}", self.columns.len()));
        }
        self.styles.toolbar.clone().render(&parts.join("  "))
    }

    fn chrome_lines(&self) -> usize {
        let toolbar = usize::from(self.toolbar.is_visible());
        let summary = self
            .summary
            .as_ref()
            .filter(|s| s.enabled)
            .map_or(0, |s| s.lines.len());
        toolbar + 1 + summary + 1
    }

    fn sync(&mut self) {
        let rows = self.controller.page_rows().len();
        self.scroll.set_scroll_height(rows as f64 * self.row_height());
        self.scroll.set_window_chrome(self.chrome_lines() as f64);
    }
}

/// Position of the column with `key`.
pub(crate) fn column_index<T>(columns: &[ColumnDef<T>], key: &str) -> Result<usize> {
    columns
        .iter()
        .position(|c| c.id() == key)
        .ok_or_else(|| Error::UnknownColumn(key.to_string()))
}

/// The key `step` places away from `current` among `keys`, wrapping. With no
/// current key, forward steps land on the first key and backward steps on
/// the last.
pub(crate) fn step_focus(keys: &[String], current: Option<&str>, step: isize) -> Option<String> {
    if keys.is_empty() {
        return None;
    }
    let next = match current.and_then(|f| keys.iter().position(|k| k == f)) {
        Some(i) => (i as isize + step).rem_euclid(keys.len() as isize) as usize,
        None if step < 0 => keys.len() - 1,
        None => 0,
    };
    Some(keys[next].clone())
}

/// Shows `direction` on column `idx` only and tells the column.
pub(crate) fn mark_sorted<T>(columns: &mut [ColumnDef<T>], idx: usize, direction: SortDirection) {
    for (i, col) in columns.iter_mut().enumerate() {
        col.sort_direction = (i == idx).then_some(direction);
    }
    if let Some(f) = &columns[idx].on_sort_change {
        f(direction);
    }
    debug!("sorted by {} {direction}", columns[idx].id());
}
