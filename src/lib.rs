#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/bubbletea-datatable/")]

//! # bubbletea-datatable
//!
//! A headless data table for [bubbletea-rs](https://github.com/joshka/bubbletea-rs)
//! applications: pagination, sorting, searching, filtering, column resizing,
//! synchronized horizontal scrolling, row virtualization, summary rows and
//! infinite loading.
//!
//! ## Overview
//!
//! The table state lives in plain structs that follow the Elm Architecture:
//! hosts feed messages into `update()` and draw `view()`. Timing is expressed
//! as [`Cmd`](bubbletea_rs::Cmd)s: search debouncing and the once-per-frame
//! coalescing of resize and scroll updates come back to the table as messages
//! carrying the id of the component that scheduled them, so stale messages
//! are dropped.
//!
//! Data either stays on the client ([`Mode::Client`]), where the table
//! filters, sorts and slices it, or comes from a server ([`Mode::Server`]),
//! where every query change is reported through [`Callbacks`] and the host
//! supplies the current page and total count.
//!
//! ## Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`Table`] | Paginated table with toolbar, summary and row actions |
//! | [`InfiniteTable`] | Table that loads more rows when scrolled to the end |
//! | [`Controller`] | Query state and page derivation without any rendering |
//! | [`ColumnWidths`] | Per-column widths and drag resizing |
//! | [`ScrollSync`] | Frame-coalesced scroll position |
//! | [`InfiniteScroll`] | Load-more trigger watching a sentinel |
//! | [`Paginator`] | Page indicator and rows-per-page selector |
//!
//! ## Quick Start
//!
//! ```rust
//! use bubbletea_datatable::prelude::*;
//! use serde_json::json;
//!
//! let rows = JsonRow::try_from_values(vec![
//!     json!({"id": 1, "name": "Ada", "team": "core"}),
//!     json!({"id": 2, "name": "Grace", "team": "infra"}),
//!     json!({"id": 3, "name": "Linus", "team": "core"}),
//! ])
//! .unwrap();
//!
//! let mut table = Table::try_new(vec![
//!     ColumnDef::field("name", "Name").sortable(),
//!     ColumnDef::field("team", "Team"),
//! ])
//! .unwrap()
//! .with_rows(rows);
//!
//! table
//!     .add_filter(Filter::new("team", FilterOp::Equals, "core"))
//!     .unwrap();
//! assert_eq!(table.page_rows().len(), 2);
//! ```
//!
//! ## Key Bindings
//!
//! Bindings use the type-safe [`key`] module and can be replaced field by
//! field on [`TableKeyMap`]:
//!
//! ```rust
//! use bubbletea_datatable::key::{Binding, KeyMap};
//! use bubbletea_datatable::table::TableKeyMap;
//! use crossterm::event::KeyCode;
//!
//! let mut keymap = TableKeyMap::default();
//! keymap.search = Binding::new(vec![KeyCode::Char('f')]).with_help("f", "search");
//! assert_eq!(keymap.short_help().len(), 4);
//! ```

pub mod cell;
pub mod column;
pub mod controller;
pub mod error;
pub mod export;
pub mod frame;
pub mod infinite;
pub mod infinite_table;
pub mod key;
pub mod paginator;
pub mod query;
pub mod resize;
pub mod row;
pub mod scroll;
pub mod summary;
pub mod table;
pub mod toolbar;
pub mod virtualize;

pub use column::{ColumnDef, ColumnKey, TextAlign};
pub use controller::{Callbacks, Controller, DebounceMsg, FromTo, Mode, TableConfig};
pub use error::{Error, Result};
pub use export::{ExportRequest, ExportScope, ExportType};
pub use frame::FrameMsg;
pub use infinite::{InfiniteScroll, LoadState};
pub use infinite_table::InfiniteTable;
pub use key::{Binding, KeyMap, KeyPress};
pub use paginator::Paginator;
pub use query::{Filter, FilterOp, Query, SortDirection, SortSpec};
pub use resize::ColumnWidths;
pub use row::{CellValue, JsonRow, RowId, TableRow};
pub use scroll::{ScrollMetrics, ScrollSync};
pub use summary::{SummaryConfig, SummaryItem, SummaryLine};
pub use table::{RowAction, Table, TableKeyMap, TableStyles};
pub use toolbar::ToolbarConfig;
pub use virtualize::{VirtualOptions, VirtualRange};

/// Prelude module for convenient imports.
///
/// ```rust
/// use bubbletea_datatable::prelude::*;
/// ```
///
/// Brings in the table types, column and row definitions, query types and
/// the key binding traits.
pub mod prelude {
    pub use crate::column::{ColumnDef, ColumnKey, TextAlign};
    pub use crate::controller::{Callbacks, Controller, Mode, TableConfig};
    pub use crate::error::Error;
    pub use crate::export::{ExportRequest, ExportScope, ExportType};
    pub use crate::infinite_table::InfiniteTable;
    pub use crate::key::{Binding, KeyMap, KeyPress};
    pub use crate::query::{Filter, FilterOp, Query, SortDirection, SortSpec};
    pub use crate::row::{CellValue, JsonRow, RowId, TableRow};
    pub use crate::scroll::ScrollMetrics;
    pub use crate::summary::{SummaryConfig, SummaryItem, SummaryLine};
    pub use crate::table::{RowAction, Table, TableKeyMap, TableStyles};
    pub use crate::toolbar::ToolbarConfig;
    pub use crate::virtualize::VirtualOptions;
}
