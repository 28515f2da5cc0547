//! The table controller.
//!
//! The controller turns a [`Mode`], the current rows and a [`TableConfig`]
//! into the visible page: page number, page size, page count, keyword,
//! filtered rows and the rows of the current page.
//!
//! # Client and server mode
//!
//! In [`Mode::Client`] the controller holds every row and derives the
//! filtered, sorted and paginated view itself. In [`Mode::Server`] the rows
//! are already the current page; the controller only normalizes the query
//! and hands it to `on_query_change`, which the host uses to fetch.
//!
//! # Controlled fields
//!
//! Setting `page`, `rows_per_page` or `controlled_keyword` in the config hands
//! ownership of that field to the host. The controller then never changes
//! its own copy; it proposes new values through the callbacks and waits for
//! the host to pass them back with [`Controller::set_config`].
//!
//! # Keyword debounce
//!
//! Client filtering uses the keyword as typed. Server queries use a
//! debounced copy: every keyword change schedules a [`DebounceMsg`] and only
//! the most recent one commits.

mod derive;

pub use derive::{compare_rows, derive_indices, matches_filters, matches_keyword};

use crate::query::{
    clamp_page, page_count, Filter, Query, SortDirection, SortSpec,
    DEFAULT_ROWS_PER_PAGE_OPTIONS,
};
use crate::row::TableRow;
use bubbletea_rs::{tick as bubbletea_tick, Cmd, Msg};
use log::debug;
use std::fmt;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Quiet period before a keyword change reaches the server query.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

static LAST_ID: AtomicI64 = AtomicI64::new(0);

fn next_id() -> i64 {
    LAST_ID.fetch_add(1, Ordering::SeqCst) + 1
}

/// Where the rows come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// All rows are local; search, filters, sorting and paging are applied
    /// by the controller.
    #[default]
    Client,
    /// Rows are one server page; `total_count` is the size of the full
    /// result set.
    Server {
        /// Total number of rows on the server.
        total_count: usize,
    },
}

impl Mode {
    /// Whether this is server mode.
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Server { .. })
    }
}

/// Paging and search configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct TableConfig {
    /// Host-controlled page. `None` means the controller owns the page.
    pub page: Option<usize>,
    /// Host-controlled page size. `None` means the controller owns it.
    pub rows_per_page: Option<usize>,
    /// Starting page when the controller owns the page.
    pub default_page: usize,
    /// Starting page size when the controller owns it. Falls back to the
    /// first entry of `rows_per_page_options`.
    pub default_rows_per_page: Option<usize>,
    /// Page sizes offered to the user.
    pub rows_per_page_options: Vec<usize>,
    /// Host-controlled keyword. `None` means the controller owns it.
    pub controlled_keyword: Option<String>,
    /// Keyword debounce for server queries.
    pub debounce: Duration,
    /// When set, every setter is a no-op.
    pub disabled: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            page: None,
            rows_per_page: None,
            default_page: 1,
            default_rows_per_page: None,
            rows_per_page_options: DEFAULT_ROWS_PER_PAGE_OPTIONS.to_vec(),
            controlled_keyword: None,
            debounce: DEFAULT_DEBOUNCE,
            disabled: false,
        }
    }
}

impl TableConfig {
    /// Hands the page to the host.
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = Some(page);
        self
    }

    /// Hands the page size to the host.
    pub fn with_rows_per_page(mut self, rows_per_page: usize) -> Self {
        self.rows_per_page = Some(rows_per_page);
        self
    }

    /// Sets the initial page size for an uncontrolled table.
    pub fn with_default_rows_per_page(mut self, rows_per_page: usize) -> Self {
        self.default_rows_per_page = Some(rows_per_page);
        self
    }

    /// Sets the page-size choices.
    pub fn with_rows_per_page_options(mut self, options: Vec<usize>) -> Self {
        self.rows_per_page_options = options;
        self
    }

    /// Hands the keyword to the host.
    pub fn with_controlled_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.controlled_keyword = Some(keyword.into());
        self
    }

    /// Sets the debounce.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Disables all interaction.
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// The page-size options, never empty and never containing zero.
    pub fn page_size_options(&self) -> Vec<usize> {
        let options: Vec<usize> = self
            .rows_per_page_options
            .iter()
            .copied()
            .filter(|n| *n > 0)
            .collect();
        if options.is_empty() {
            DEFAULT_ROWS_PER_PAGE_OPTIONS.to_vec()
        } else {
            options
        }
    }

    /// Page size an uncontrolled controller starts with.
    fn initial_rows_per_page(&self) -> usize {
        self.sanitize_rows_per_page(
            self.default_rows_per_page
                .unwrap_or_else(|| self.page_size_options()[0]),
        )
    }

    /// Replaces an unusable page size with the first option.
    fn sanitize_rows_per_page(&self, n: usize) -> usize {
        if n == 0 {
            self.page_size_options()[0]
        } else {
            n
        }
    }
}

/// Query callback.
pub type QueryFn = Arc<dyn Fn(&Query) + Send + Sync>;
/// Page or page-size callback.
pub type PageFn = Arc<dyn Fn(usize) + Send + Sync>;
/// Keyword callback.
pub type KeywordFn = Arc<dyn Fn(&str) + Send + Sync>;
/// Sort callback.
pub type SortFn = Arc<dyn Fn(Option<&SortSpec>) + Send + Sync>;
/// Filters callback.
pub type FiltersFn = Arc<dyn Fn(&[Filter]) + Send + Sync>;

/// Host callbacks. Every callback is optional; a missing one is a no-op.
#[derive(Clone, Default)]
pub struct Callbacks {
    /// Normalized server query.
    pub on_query_change: Option<QueryFn>,
    /// Proposed page.
    pub on_page_change: Option<PageFn>,
    /// Proposed page size.
    pub on_rows_per_page_change: Option<PageFn>,
    /// Proposed keyword.
    pub on_keyword_change: Option<KeywordFn>,
    /// Sort changed.
    pub on_sort_change: Option<SortFn>,
    /// Filters changed.
    pub on_filters_change: Option<FiltersFn>,
}

impl fmt::Debug for Callbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callbacks")
            .field("on_query_change", &self.on_query_change.is_some())
            .field("on_page_change", &self.on_page_change.is_some())
            .field("on_rows_per_page_change", &self.on_rows_per_page_change.is_some())
            .field("on_keyword_change", &self.on_keyword_change.is_some())
            .field("on_sort_change", &self.on_sort_change.is_some())
            .field("on_filters_change", &self.on_filters_change.is_some())
            .finish()
    }
}

impl Callbacks {
    /// Sets `on_query_change`.
    pub fn on_query_change(mut self, f: impl Fn(&Query) + Send + Sync + 'static) -> Self {
        self.on_query_change = Some(Arc::new(f));
        self
    }

    /// Sets `on_page_change`.
    pub fn on_page_change(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_page_change = Some(Arc::new(f));
        self
    }

    /// Sets `on_rows_per_page_change`.
    pub fn on_rows_per_page_change(mut self, f: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.on_rows_per_page_change = Some(Arc::new(f));
        self
    }

    /// Sets `on_keyword_change`.
    pub fn on_keyword_change(mut self, f: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_keyword_change = Some(Arc::new(f));
        self
    }

    /// Sets `on_sort_change`.
    pub fn on_sort_change(
        mut self,
        f: impl Fn(Option<&SortSpec>) + Send + Sync + 'static,
    ) -> Self {
        self.on_sort_change = Some(Arc::new(f));
        self
    }

    /// Sets `on_filters_change`.
    pub fn on_filters_change(mut self, f: impl Fn(&[Filter]) + Send + Sync + 'static) -> Self {
        self.on_filters_change = Some(Arc::new(f));
        self
    }
}

/// Delivered when a keyword debounce period ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceMsg {
    /// Controller the debounce belongs to.
    pub id: i64,
    tag: i64,
}

/// The "from-to of total" range of the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FromTo {
    /// 1-based index of the first row on the page, 0 when empty.
    pub from: usize,
    /// 1-based index of the last row on the page, 0 when empty.
    pub to: usize,
    /// Total rows.
    pub total: usize,
}

impl fmt::Display for FromTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{} of {}", self.from, self.to, self.total)
    }
}

/// Derives the visible page from rows, mode and query state.
pub struct Controller<T> {
    mode: Mode,
    config: TableConfig,
    callbacks: Callbacks,
    rows: Vec<T>,
    search_keys: Vec<String>,

    page: usize,
    rows_per_page: usize,
    keyword: String,
    debounced_keyword: String,
    sort: Option<SortSpec>,
    filters: Vec<Filter>,

    filtered: Vec<usize>,
    last_page_count: usize,
    last_signature: Option<String>,

    id: i64,
    debounce_tag: i64,
    debounce_pending: bool,
}

impl<T> fmt::Debug for Controller<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("mode", &self.mode)
            .field("config", &self.config)
            .field("rows", &self.rows.len())
            .field("page", &self.page)
            .field("rows_per_page", &self.rows_per_page)
            .field("keyword", &self.keyword)
            .field("debounced_keyword", &self.debounced_keyword)
            .field("sort", &self.sort)
            .field("filters", &self.filters)
            .finish()
    }
}

impl<T: TableRow> Controller<T> {
    /// Creates a controller. Nothing is emitted until [`Controller::init`].
    pub fn new(mode: Mode, config: TableConfig) -> Self {
        let rows_per_page = config.initial_rows_per_page();
        let keyword = config.controlled_keyword.clone().unwrap_or_default();
        let mut controller = Self {
            mode,
            page: config.default_page.max(1),
            rows_per_page,
            debounced_keyword: keyword.clone(),
            keyword,
            config,
            callbacks: Callbacks::default(),
            rows: Vec::new(),
            search_keys: Vec::new(),
            sort: None,
            filters: Vec::new(),
            filtered: Vec::new(),
            last_page_count: 1,
            last_signature: None,
            id: next_id(),
            debounce_tag: 0,
            debounce_pending: false,
        };
        controller.last_page_count = controller.page_count();
        controller
    }

    /// Sets the callbacks.
    pub fn with_callbacks(mut self, callbacks: Callbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    /// Sets the keys searched by the keyword.
    pub fn with_search_keys<S: Into<String>>(mut self, keys: impl IntoIterator<Item = S>) -> Self {
        self.search_keys = keys.into_iter().map(Into::into).collect();
        self.recompute();
        self
    }

    /// Sets the initial rows.
    pub fn with_rows(mut self, rows: Vec<T>) -> Self {
        self.rows = rows;
        self.recompute();
        self.last_page_count = self.page_count();
        self
    }

    /// Sets the initial sort.
    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort = Some(sort);
        self.recompute();
        self
    }

    /// Emits the initial server query.
    pub fn init(&mut self) {
        self.emit_query();
    }

    /// Replaces the callbacks.
    pub fn set_callbacks(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
    }

    /// Replaces the searched keys.
    pub fn set_search_keys(&mut self, keys: Vec<String>) {
        self.search_keys = keys;
        self.recompute();
        self.reconcile_page();
    }

    /// The searched keys.
    pub fn search_keys(&self) -> &[String] {
        &self.search_keys
    }

    // ---------------------------------------------------------------------
    // Inputs the host re-supplies
    // ---------------------------------------------------------------------

    /// Replaces the configuration. Changed defaults reseed the uncontrolled
    /// page and page size. A changed controlled keyword restarts the
    /// debounce, whose command is returned.
    pub fn set_config(&mut self, config: TableConfig) -> Option<Cmd> {
        let keyword_changed = config.controlled_keyword.is_some()
            && config.controlled_keyword != self.config.controlled_keyword;
        let reseed_rows_per_page =
            config.initial_rows_per_page() != self.config.initial_rows_per_page();
        let reseed_page = config.default_page != self.config.default_page;
        self.config = config;
        if reseed_rows_per_page {
            self.rows_per_page = self.config.initial_rows_per_page();
        }
        if reseed_page {
            self.page = self.config.default_page.max(1);
        }
        let cmd = if keyword_changed {
            self.recompute();
            self.schedule_debounce()
        } else {
            None
        };
        self.reconcile_page();
        self.emit_query();
        cmd
    }

    /// The configuration.
    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Switches mode.
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.recompute();
        self.reconcile_page();
        self.emit_query();
    }

    /// The mode.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Replaces the rows.
    pub fn set_rows(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.recompute();
        self.reconcile_page();
    }

    /// Appends rows at the end.
    pub fn append_rows(&mut self, rows: impl IntoIterator<Item = T>) {
        self.rows.extend(rows);
        self.recompute();
        self.reconcile_page();
    }

    /// All rows, unfiltered.
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    // ---------------------------------------------------------------------
    // Derived state
    // ---------------------------------------------------------------------

    fn page_controlled(&self) -> bool {
        self.config.page.is_some()
    }

    fn rows_per_page_controlled(&self) -> bool {
        self.config.rows_per_page.is_some()
    }

    fn raw_page(&self) -> usize {
        self.config.page.unwrap_or(self.page)
    }

    /// Page size in effect.
    pub fn rows_per_page(&self) -> usize {
        match self.config.rows_per_page {
            Some(n) => self.config.sanitize_rows_per_page(n),
            None => self.rows_per_page,
        }
    }

    /// Page-size choices.
    pub fn rows_per_page_options(&self) -> Vec<usize> {
        self.config.page_size_options()
    }

    /// Rows matching the query: filtered rows in client mode, the server
    /// total in server mode.
    pub fn total_count(&self) -> usize {
        match self.mode {
            Mode::Client => self.filtered.len(),
            Mode::Server { total_count } => total_count,
        }
    }

    /// Number of pages, at least one.
    pub fn page_count(&self) -> usize {
        page_count(self.total_count(), self.rows_per_page())
    }

    /// Current page, always within `[1, page_count]`.
    pub fn page(&self) -> usize {
        clamp_page(self.raw_page(), self.page_count())
    }

    /// Keyword as typed.
    pub fn keyword(&self) -> &str {
        self.config
            .controlled_keyword
            .as_deref()
            .unwrap_or(&self.keyword)
    }

    /// Keyword as last committed by the debounce.
    pub fn debounced_keyword(&self) -> &str {
        &self.debounced_keyword
    }

    /// Active sort.
    pub fn sort(&self) -> Option<&SortSpec> {
        self.sort.as_ref()
    }

    /// Active filters.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Whether setters are disabled.
    pub fn disabled(&self) -> bool {
        self.config.disabled
    }

    /// Range of the current page.
    pub fn from_to(&self) -> FromTo {
        let total = self.total_count();
        if total == 0 {
            return FromTo {
                from: 0,
                to: 0,
                total,
            };
        }
        let rpp = self.rows_per_page();
        let page = self.page();
        FromTo {
            from: ((page - 1) * rpp + 1).min(total),
            to: (page * rpp).min(total),
            total,
        }
    }

    /// Rows passing search and filters, in display order. In server mode,
    /// the rows as supplied.
    pub fn filtered_rows(&self) -> Vec<&T> {
        match self.mode {
            Mode::Client => self.filtered.iter().map(|&i| &self.rows[i]).collect(),
            Mode::Server { .. } => self.rows.iter().collect(),
        }
    }

    /// Rows of the current page. In server mode, the rows as supplied.
    pub fn page_rows(&self) -> Vec<&T> {
        match self.mode {
            Mode::Client => {
                let rpp = self.rows_per_page();
                let start = (self.page() - 1) * rpp;
                self.filtered
                    .iter()
                    .skip(start)
                    .take(rpp)
                    .map(|&i| &self.rows[i])
                    .collect()
            }
            Mode::Server { .. } => self.rows.iter().collect(),
        }
    }

    /// Index into [`Controller::rows`] of the row at `position` on the
    /// current page.
    pub fn page_row_index(&self, position: usize) -> Option<usize> {
        match self.mode {
            Mode::Client => {
                let start = (self.page() - 1) * self.rows_per_page();
                if position >= self.rows_per_page() {
                    return None;
                }
                self.filtered.get(start + position).copied()
            }
            Mode::Server { .. } => (position < self.rows.len()).then_some(position),
        }
    }

    /// The query as it would be sent to the server now.
    pub fn query(&self) -> Query {
        Query {
            page: self.page(),
            rows_per_page: self.rows_per_page(),
            keyword: self.debounced_keyword.clone(),
            sort: self.sort.clone(),
            filters: self.filters.clone(),
        }
    }

    // ---------------------------------------------------------------------
    // Setters
    // ---------------------------------------------------------------------

    /// Moves to `page`, clamped into range.
    pub fn set_page(&mut self, page: usize) {
        if self.disabled() {
            return;
        }
        let page = clamp_page(page, self.page_count());
        self.apply_page(page);
        self.emit_query();
    }

    fn apply_page(&mut self, page: usize) {
        if !self.page_controlled() {
            self.page = page;
        }
        if let Some(f) = &self.callbacks.on_page_change {
            f(page);
        }
    }

    /// Next page, if any.
    pub fn next_page(&mut self) {
        let page = self.page();
        if page < self.page_count() {
            self.set_page(page + 1);
        }
    }

    /// Previous page, if any.
    pub fn prev_page(&mut self) {
        let page = self.page();
        if page > 1 {
            self.set_page(page - 1);
        }
    }

    /// First page.
    pub fn first_page(&mut self) {
        self.set_page(1);
    }

    /// Last page.
    pub fn last_page(&mut self) {
        self.set_page(self.page_count());
    }

    /// Whether the current page is the first.
    pub fn on_first_page(&self) -> bool {
        self.page() == 1
    }

    /// Whether the current page is the last.
    pub fn on_last_page(&self) -> bool {
        self.page() == self.page_count()
    }

    /// Changes the page size and returns to the first page.
    pub fn set_rows_per_page(&mut self, rows_per_page: usize) {
        if self.disabled() {
            return;
        }
        let rows_per_page = self.config.sanitize_rows_per_page(rows_per_page);
        if !self.rows_per_page_controlled() {
            self.rows_per_page = rows_per_page;
        }
        if let Some(f) = &self.callbacks.on_rows_per_page_change {
            f(rows_per_page);
        }
        self.apply_page(1);
        // Page 1 is always in range, so there is nothing to correct.
        self.last_page_count = self.page_count();
        self.emit_when_committed(1, rows_per_page);
    }

    /// Changes the keyword. Client filtering updates at once; the returned
    /// command commits the debounced keyword for server queries.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_datatable::{Controller, JsonRow, Mode, TableConfig};
    /// use serde_json::json;
    ///
    /// let rows = JsonRow::try_from_values(vec![
    ///     json!({"id": 1, "name": "Ada"}),
    ///     json!({"id": 2, "name": "Grace"}),
    /// ])
    /// .unwrap();
    /// let mut c = Controller::new(Mode::Client, TableConfig::default())
    ///     .with_search_keys(["name"])
    ///     .with_rows(rows);
    ///
    /// let cmd = c.set_keyword("gra");
    /// assert!(cmd.is_some());
    /// assert_eq!(c.total_count(), 1);
    /// // the debounced keyword lands when the command's message comes back
    /// assert_eq!(c.debounced_keyword(), "");
    /// ```
    pub fn set_keyword(&mut self, keyword: impl Into<String>) -> Option<Cmd> {
        if self.disabled() {
            return None;
        }
        let keyword = keyword.into();
        if let Some(f) = &self.callbacks.on_keyword_change {
            f(&keyword);
        }
        if self.config.controlled_keyword.is_some() {
            // The host passes the keyword back through set_config.
            return None;
        }
        if keyword == self.keyword {
            return None;
        }
        self.keyword = keyword;
        self.recompute();
        self.reconcile_page();
        self.schedule_debounce()
    }

    /// Sets or clears the sort.
    pub fn set_sort(&mut self, sort: Option<SortSpec>) {
        if self.disabled() {
            return;
        }
        self.sort = sort;
        if let Some(f) = &self.callbacks.on_sort_change {
            f(self.sort.as_ref());
        }
        self.recompute();
        self.emit_query();
    }

    /// Sorts by `key`, flipping the direction if it is already the sort key.
    /// Returns the new direction, or `None` when disabled.
    pub fn toggle_sort(&mut self, key: &str) -> Option<SortDirection> {
        if self.disabled() {
            return None;
        }
        let direction = match &self.sort {
            Some(s) if s.key == key => s.direction.toggle(),
            _ => SortDirection::Asc,
        };
        self.set_sort(Some(SortSpec::new(key, direction)));
        Some(direction)
    }

    /// Replaces the filters and returns to the first page.
    pub fn set_filters(&mut self, filters: Vec<Filter>) {
        if self.disabled() {
            return;
        }
        self.filters = filters;
        if let Some(f) = &self.callbacks.on_filters_change {
            f(&self.filters);
        }
        self.recompute();
        self.apply_page(1);
        self.last_page_count = self.page_count();
        let rows_per_page = self.rows_per_page();
        self.emit_when_committed(1, rows_per_page);
    }

    /// Adds a filter, replacing any existing filter on the same key.
    pub fn add_filter(&mut self, filter: Filter) {
        let mut filters: Vec<Filter> = self
            .filters
            .iter()
            .filter(|f| f.key != filter.key)
            .cloned()
            .collect();
        filters.push(filter);
        self.set_filters(filters);
    }

    /// Removes all filters.
    pub fn clear_filters(&mut self) {
        if !self.filters.is_empty() {
            self.set_filters(Vec::new());
        }
    }

    // ---------------------------------------------------------------------
    // Messages
    // ---------------------------------------------------------------------

    /// The debounce message the pending timer will deliver, if any.
    pub fn pending_debounce(&self) -> Option<DebounceMsg> {
        self.debounce_pending.then_some(DebounceMsg {
            id: self.id,
            tag: self.debounce_tag,
        })
    }

    /// Commits the debounced keyword if `msg` is the latest debounce.
    pub fn apply_debounce(&mut self, msg: &DebounceMsg) -> bool {
        if msg.id != self.id || msg.tag != self.debounce_tag || !self.debounce_pending {
            return false;
        }
        self.debounce_pending = false;
        self.debounced_keyword = self.keyword().to_string();
        debug!("keyword settled: {:?}", self.debounced_keyword);
        self.emit_query();
        true
    }

    /// Handles debounce messages.
    pub fn update(&mut self, msg: &Msg) -> Option<Cmd> {
        if let Some(debounce) = msg.downcast_ref::<DebounceMsg>() {
            self.apply_debounce(debounce);
        }
        None
    }

    fn schedule_debounce(&mut self) -> Option<Cmd> {
        self.debounce_tag += 1;
        if self.config.debounce.is_zero() {
            self.debounce_pending = true;
            let msg = DebounceMsg {
                id: self.id,
                tag: self.debounce_tag,
            };
            self.apply_debounce(&msg);
            return None;
        }
        self.debounce_pending = true;
        let id = self.id;
        let tag = self.debounce_tag;
        Some(bubbletea_tick(self.config.debounce, move |_| {
            Box::new(DebounceMsg { id, tag }) as Msg
        }))
    }

    // ---------------------------------------------------------------------
    // Internals
    // ---------------------------------------------------------------------

    fn recompute(&mut self) {
        if self.mode.is_server() {
            self.filtered.clear();
            return;
        }
        let keyword = self.keyword().to_string();
        self.filtered = derive_indices(
            &self.rows,
            &self.search_keys,
            &keyword,
            &self.filters,
            self.sort.as_ref(),
        );
    }

    /// Pulls the page back into range when the page count changed. Runs only
    /// on page-count changes so it never fights an explicit page request.
    fn reconcile_page(&mut self) {
        let count = self.page_count();
        if count == self.last_page_count {
            return;
        }
        self.last_page_count = count;
        let raw = self.raw_page();
        if raw > count || raw == 0 {
            let page = clamp_page(raw, count);
            debug!("page {raw} out of range after page count became {count}; moving to {page}");
            self.apply_page(page);
        }
    }

    /// Emits unless a proposed page or page size is still waiting on the
    /// host. The host's `set_config` emits once both are committed.
    fn emit_when_committed(&mut self, page: usize, rows_per_page: usize) {
        let page_pending = self.page_controlled() && self.page() != page;
        let size_pending = self.rows_per_page_controlled() && self.rows_per_page() != rows_per_page;
        if page_pending || size_pending {
            debug!("query held until the host commits page {page}, {rows_per_page} rows");
            return;
        }
        self.emit_query();
    }

    fn emit_query(&mut self) {
        if !self.mode.is_server() {
            return;
        }
        let Some(f) = self.callbacks.on_query_change.clone() else {
            return;
        };
        let query = self.query();
        let signature = query.signature();
        if self.last_signature.as_deref() == Some(signature.as_str()) {
            return;
        }
        debug!("query change: {signature}");
        self.last_signature = Some(signature);
        f(&query);
    }
}
