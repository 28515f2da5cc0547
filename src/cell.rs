//! Cell rendering.
//!
//! Maps a column definition and a row to the text shown in one cell. Text
//! is measured by display width with escape sequences ignored; text that
//! does not fit is cut at a grapheme boundary, ends in [`ELLIPSIS`] and
//! keeps its full form as a tooltip.

use crate::column::{ColumnDef, ColumnKey, TextAlign};
use crate::row::{cell_to_string, RowId, TableRow};
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Marks truncated text.
pub const ELLIPSIS: &str = "…";

/// Text of the row shown when there is nothing to display.
pub const DEFAULT_EMPTY_TEXT: &str = "No data";

/// A rendered cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellView {
    /// Text padded to the cell width.
    pub text: String,
    /// Alignment used for padding.
    pub align: TextAlign,
    /// Whether the column's disabled predicate holds for the row.
    pub disabled: bool,
    /// Whether the content was wider than the cell.
    pub overflow: bool,
    /// The untruncated text, present only when the content overflowed.
    pub tooltip: Option<String>,
}

/// Renders `row`'s cell for `column` into `width` display columns.
///
/// Field columns show the cell value unless a render function is set.
/// Custom columns without a render function are blank.
pub fn render_cell<T: TableRow>(column: &ColumnDef<T>, row: &T, width: usize) -> CellView {
    let raw = match (&column.render, &column.key) {
        (Some(render), _) => render(row),
        (None, ColumnKey::Field(key)) => cell_to_string(&row.cell(key)),
        (None, ColumnKey::Custom(_)) => String::new(),
    };
    let (text, overflow) = fit(&raw, width);
    CellView {
        text: pad(&text, width, column.text_align),
        align: column.text_align,
        disabled: column.is_disabled(row),
        overflow,
        tooltip: overflow.then(|| plain(&raw)),
    }
}

/// The key a row is tracked by across re-renders.
pub fn row_key<T: TableRow>(row: &T) -> RowId {
    row.id()
}

/// `s` without escape sequences.
pub fn plain(s: &str) -> String {
    strip_ansi_escapes::strip_str(s)
}

/// Display width of `s`, ignoring escape sequences.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(plain(s).as_str())
}

/// Cuts `s` to at most `width` display columns. Returns the fitted text and
/// whether it was cut. Cut text loses its escape sequences.
pub fn fit(s: &str, width: usize) -> (String, bool) {
    if display_width(s) <= width {
        return (s.to_string(), false);
    }
    if width == 0 {
        return (String::new(), true);
    }
    let budget = width - 1;
    let mut used = 0;
    let mut out = String::new();
    for g in plain(s).graphemes(true) {
        let w = UnicodeWidthStr::width(g);
        if used + w > budget {
            break;
        }
        used += w;
        out.push_str(g);
    }
    out.push_str(ELLIPSIS);
    (out, true)
}

/// Pads `s` with spaces to exactly `width` columns using `align`.
pub fn pad(s: &str, width: usize, align: TextAlign) -> String {
    let w = display_width(s);
    if w >= width {
        return s.to_string();
    }
    let gap = width - w;
    let (left, right) = match align {
        TextAlign::Left => (0, gap),
        TextAlign::Right => (gap, 0),
        TextAlign::Center => (gap / 2, gap - gap / 2),
    };
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}
