//! Column definitions.

use crate::error::{Error, Result};
use crate::query::SortDirection;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Width used when a column declares no width or one that cannot be parsed.
pub const DEFAULT_COLUMN_WIDTH: f64 = 160.0;

/// Predicate deciding whether a cell renders as disabled.
pub type DisabledFn<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;
/// Custom cell renderer.
pub type RenderFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
/// Per-column sort change callback.
pub type SortChangeFn = Arc<dyn Fn(SortDirection) + Send + Sync>;

/// Stable identity of a column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColumnKey {
    /// Column bound to a row field of the same name.
    Field(String),
    /// Column with no backing field, rendered by a custom renderer. The
    /// string is the column's own stable id.
    Custom(String),
}

impl ColumnKey {
    /// The stable id, for both variants.
    pub fn id(&self) -> &str {
        match self {
            Self::Field(k) | Self::Custom(k) => k,
        }
    }

    /// The row field this column reads, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Field(k) => Some(k),
            Self::Custom(_) => None,
        }
    }
}

/// Horizontal alignment of cell content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    /// Flush left.
    #[default]
    Left,
    /// Centered.
    Center,
    /// Flush right.
    Right,
}

/// Describes one logical column.
///
/// ```rust
/// use bubbletea_datatable::column::{ColumnDef, TextAlign};
/// use bubbletea_datatable::row::JsonRow;
///
/// let amount: ColumnDef<JsonRow> = ColumnDef::field("amount", "Amount")
///     .with_width("120px")
///     .with_align(TextAlign::Right)
///     .sortable();
/// assert_eq!(amount.initial_width(), 120.0);
/// ```
pub struct ColumnDef<T> {
    /// Stable key.
    pub key: ColumnKey,
    /// Header text.
    pub title: String,
    /// Declared width, e.g. `"120px"` or `"120"`.
    pub width: Option<String>,
    /// Alignment of header and cells.
    pub text_align: TextAlign,
    /// Whether the header toggles sorting.
    pub sort: bool,
    /// Current sort direction shown in the header.
    pub sort_direction: Option<SortDirection>,
    /// Hidden columns keep their state but are not rendered.
    pub hidden: bool,
    /// Optional per-cell disabled predicate.
    pub disabled: Option<DisabledFn<T>>,
    /// Optional custom renderer.
    pub render: Option<RenderFn<T>>,
    /// Optional sort change callback.
    pub on_sort_change: Option<SortChangeFn>,
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            title: self.title.clone(),
            width: self.width.clone(),
            text_align: self.text_align,
            sort: self.sort,
            sort_direction: self.sort_direction,
            hidden: self.hidden,
            disabled: self.disabled.clone(),
            render: self.render.clone(),
            on_sort_change: self.on_sort_change.clone(),
        }
    }
}

impl<T> fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnDef")
            .field("key", &self.key)
            .field("title", &self.title)
            .field("width", &self.width)
            .field("text_align", &self.text_align)
            .field("sort", &self.sort)
            .field("sort_direction", &self.sort_direction)
            .field("hidden", &self.hidden)
            .field("disabled", &self.disabled.is_some())
            .field("render", &self.render.is_some())
            .finish()
    }
}

impl<T> ColumnDef<T> {
    fn with_key(key: ColumnKey, title: impl Into<String>) -> Self {
        Self {
            key,
            title: title.into(),
            width: None,
            text_align: TextAlign::Left,
            sort: false,
            sort_direction: None,
            hidden: false,
            disabled: None,
            render: None,
            on_sort_change: None,
        }
    }

    /// A column bound to the row field `key`.
    pub fn field(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self::with_key(ColumnKey::Field(key.into()), title)
    }

    /// A custom column with its own stable `id`, rendered by `render`.
    pub fn custom(
        id: impl Into<String>,
        title: impl Into<String>,
        render: impl Fn(&T) -> String + Send + Sync + 'static,
    ) -> Self {
        let mut col = Self::with_key(ColumnKey::Custom(id.into()), title);
        col.render = Some(Arc::new(render));
        col
    }

    /// Sets the declared width.
    pub fn with_width(mut self, width: impl Into<String>) -> Self {
        self.width = Some(width.into());
        self
    }

    /// Sets the alignment.
    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.text_align = align;
        self
    }

    /// Marks the column sortable.
    pub fn sortable(mut self) -> Self {
        self.sort = true;
        self
    }

    /// Sets the sort direction shown in the header.
    pub fn with_sort_direction(mut self, direction: SortDirection) -> Self {
        self.sort_direction = Some(direction);
        self
    }

    /// Hides the column.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Installs a disabled predicate.
    pub fn with_disabled(mut self, f: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.disabled = Some(Arc::new(f));
        self
    }

    /// Installs a custom renderer.
    pub fn with_render(mut self, f: impl Fn(&T) -> String + Send + Sync + 'static) -> Self {
        self.render = Some(Arc::new(f));
        self
    }

    /// Installs a sort change callback.
    pub fn on_sort_change(mut self, f: impl Fn(SortDirection) + Send + Sync + 'static) -> Self {
        self.on_sort_change = Some(Arc::new(f));
        self
    }

    /// Stable id of the column.
    pub fn id(&self) -> &str {
        self.key.id()
    }

    /// Width the column starts with, from its declaration.
    pub fn initial_width(&self) -> f64 {
        self.width
            .as_deref()
            .map_or(DEFAULT_COLUMN_WIDTH, parse_width)
    }

    /// Whether `row` renders disabled in this column.
    pub fn is_disabled(&self, row: &T) -> bool {
        self.disabled.as_ref().is_some_and(|f| f(row))
    }
}

/// Parses a declared width such as `"120px"` or `"120"`. Anything else,
/// including non-positive values, yields [`DEFAULT_COLUMN_WIDTH`].
pub fn parse_width(raw: &str) -> f64 {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    match number.parse::<f64>() {
        Ok(w) if w.is_finite() && w > 0.0 => w,
        _ => DEFAULT_COLUMN_WIDTH,
    }
}

/// Checks that every column has a distinct stable key.
///
/// # Errors
///
/// Returns [`Error::DuplicateColumnKey`] naming the first repeated key.
pub fn validate_columns<T>(columns: &[ColumnDef<T>]) -> Result<()> {
    let mut seen = HashSet::new();
    for col in columns {
        if !seen.insert(col.id()) {
            return Err(Error::DuplicateColumnKey(col.id().to_string()));
        }
    }
    Ok(())
}
