//! Line rendering shared by [`Table`](super::Table) and
//! [`InfiniteTable`](crate::infinite_table::InfiniteTable).
//!
//! Every line of the scrolling region (header, body rows, summary lines) is
//! built as a list of segments laid out left to right. The same horizontal
//! window is cut out of each line, so header and summary columns stay
//! aligned with the body whatever the scroll offset.

use super::style::TableStyles;
use super::RowAction;
use crate::cell::{display_width, fit, pad, plain, render_cell};
use crate::column::{ColumnDef, TextAlign};
use crate::resize::{ColumnWidths, ROW_ACTION_WIDTH};
use crate::row::TableRow;
use crate::summary::{SummaryBlock, SummaryCellKind};
use lipgloss_extras::prelude::*;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Width units per terminal column when none is configured.
pub const DEFAULT_UNIT_WIDTH: f64 = 8.0;

const GAP: &str = " ";

/// Converts a width in units to terminal columns, at least one.
pub fn to_cols(width: f64, unit_width: f64) -> usize {
    let unit = if unit_width.is_finite() && unit_width > 0.0 {
        unit_width
    } else {
        DEFAULT_UNIT_WIDTH
    };
    ((width / unit).round() as usize).max(1)
}

struct Segment {
    text: String,
    style: Style,
}

/// Column geometry for one render pass.
pub(crate) struct Layout<'a, T> {
    columns: Vec<(&'a ColumnDef<T>, usize)>,
    actions: &'a [RowAction<T>],
    action_cols: usize,
    offset: usize,
    view_width: usize,
}

impl<'a, T: TableRow> Layout<'a, T> {
    /// Lays out the visible columns. `offset` is the horizontal scroll in
    /// terminal columns; a `view_width` of zero disables the cut.
    pub(crate) fn new(
        columns: &'a [ColumnDef<T>],
        widths: &ColumnWidths,
        actions: &'a [RowAction<T>],
        unit_width: f64,
        offset: usize,
        view_width: usize,
    ) -> Self {
        let columns = columns
            .iter()
            .filter(|c| !c.hidden)
            .map(|c| {
                let w = widths.width_of(c.id()).unwrap_or_else(|| c.initial_width());
                (c, to_cols(w, unit_width))
            })
            .collect();
        Self {
            columns,
            actions,
            action_cols: to_cols(ROW_ACTION_WIDTH, unit_width),
            offset,
            view_width,
        }
    }

    /// Full line width before cutting.
    pub(crate) fn total_width(&self) -> usize {
        let cells: usize = self.columns.iter().map(|(_, w)| w).sum::<usize>()
            + self.actions.len() * self.action_cols;
        let slots = self.columns.len() + self.actions.len();
        cells + slots.saturating_sub(1) * GAP.len()
    }

    pub(crate) fn header(&self, focused: Option<&str>, styles: &TableStyles) -> String {
        let mut segments: Vec<Segment> = self
            .columns
            .iter()
            .map(|(col, w)| {
                let mut title = col.title.clone();
                if let Some(dir) = col.sort_direction.filter(|_| col.sort) {
                    title = format!("{title} {}", dir.indicator());
                }
                let (title, _) = fit(&title, *w);
                let style = if focused == Some(col.id()) {
                    styles.focused_header.clone()
                } else {
                    styles.header.clone()
                };
                Segment {
                    text: pad(&title, *w, col.text_align),
                    style,
                }
            })
            .collect();
        segments.extend(self.actions.iter().map(|_| Segment {
            text: " ".repeat(self.action_cols),
            style: styles.header.clone(),
        }));
        self.compose(segments)
    }

    pub(crate) fn row(&self, row: &T, styles: &TableStyles) -> String {
        let mut segments: Vec<Segment> = self
            .columns
            .iter()
            .map(|(col, w)| {
                let view = render_cell(*col, row, *w);
                let style = if view.disabled {
                    styles.disabled_cell.clone()
                } else {
                    styles.cell.clone()
                };
                Segment {
                    text: view.text,
                    style,
                }
            })
            .collect();
        segments.extend(self.actions.iter().map(|action| {
            let label = format!("[{}]", action.label);
            let (label, _) = fit(&label, self.action_cols);
            let style = if action.is_disabled(row) {
                styles.disabled_cell.clone()
            } else {
                styles.action.clone()
            };
            Segment {
                text: pad(&label, self.action_cols, TextAlign::Center),
                style,
            }
        }));
        self.compose(segments)
    }

    pub(crate) fn summary(&self, block: &SummaryBlock, styles: &TableStyles) -> Vec<String> {
        block
            .rows
            .iter()
            .map(|line| {
                let mut segments: Vec<Segment> = self
                    .columns
                    .iter()
                    .map(|(col, w)| {
                        let cell = line.cells.iter().find(|c| c.column_key == col.id());
                        let (text, align) = match cell {
                            Some(c) if c.kind == SummaryCellKind::Label => {
                                (c.text.clone(), TextAlign::Left)
                            }
                            Some(c) => (c.text.clone(), col.text_align),
                            None => (String::new(), col.text_align),
                        };
                        let (text, _) = fit(&text, *w);
                        Segment {
                            text: pad(&text, *w, align),
                            style: styles.summary.clone(),
                        }
                    })
                    .collect();
                segments.extend(self.actions.iter().map(|_| Segment {
                    text: " ".repeat(self.action_cols),
                    style: styles.summary.clone(),
                }));
                self.compose(segments)
            })
            .collect()
    }

    /// One row spanning every column, with `text` centred in it.
    pub(crate) fn empty_row(&self, text: &str, styles: &TableStyles) -> String {
        let width = self.total_width().max(display_width(text));
        self.compose(vec![Segment {
            text: pad(text, width, TextAlign::Center),
            style: styles.empty.clone(),
        }])
    }

    fn compose(&self, segments: Vec<Segment>) -> String {
        let end = if self.view_width == 0 {
            usize::MAX
        } else {
            self.offset.saturating_add(self.view_width)
        };
        let mut out = String::new();
        let mut x = 0usize;
        let count = segments.len();
        for (i, seg) in segments.into_iter().enumerate() {
            let w = display_width(&seg.text);
            push_cut(&mut out, &seg.text, &seg.style, x, w, self.offset, end);
            x += w;
            if i + 1 < count {
                push_cut(&mut out, GAP, &Style::new(), x, GAP.len(), self.offset, end);
                x += GAP.len();
            }
        }
        out
    }
}

/// Appends the part of `text` (occupying `[x, x + w)`) that falls inside the
/// window `[start, end)`.
fn push_cut(out: &mut String, text: &str, style: &Style, x: usize, w: usize, start: usize, end: usize) {
    if w == 0 || x + w <= start || x >= end {
        return;
    }
    let visible = if x >= start && x + w <= end {
        text.to_string()
    } else {
        let from = start.saturating_sub(x);
        let to = (end - x).min(w);
        cut_string(&plain(text), from, to)
    };
    if visible.is_empty() {
        return;
    }
    if visible.trim().is_empty() {
        out.push_str(&visible);
    } else {
        out.push_str(&style.clone().render(&visible));
    }
}

/// The display columns `[start, end)` of `s`. A wide grapheme straddling
/// either edge is replaced by spaces so the result is exactly as wide as the
/// window it fills.
pub fn cut_string(s: &str, start: usize, end: usize) -> String {
    let mut out = String::new();
    let mut col = 0usize;
    for g in s.graphemes(true) {
        let w = UnicodeWidthStr::width(g);
        let g_end = col + w;
        if g_end <= start {
            col = g_end;
            continue;
        }
        if col >= end {
            break;
        }
        if col >= start && g_end <= end {
            out.push_str(g);
        } else {
            let covered = g_end.min(end) - col.max(start);
            out.push_str(&" ".repeat(covered));
        }
        col = g_end;
    }
    out
}

/// The body rows visible in a viewport `height` lines tall starting at line
/// `top`, given `pad_top` blank lines, the rendered `lines` and `pad_bottom`
/// blank lines. A zero `height` returns every line.
pub fn window(lines: &[String], pad_top: usize, pad_bottom: usize, top: usize, height: usize) -> Vec<String> {
    let total = pad_top + lines.len() + pad_bottom;
    let (from, to) = if height == 0 {
        (0, total)
    } else {
        let from = top.min(total.saturating_sub(height));
        (from, (from + height).min(total))
    };
    (from..to)
        .map(|i| {
            if i < pad_top {
                String::new()
            } else {
                lines.get(i - pad_top).cloned().unwrap_or_default()
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cut_string_ascii() {
        assert_eq!(cut_string("Hello World", 3, 8), "lo Wo");
        assert_eq!(cut_string("abc", 5, 9), "");
    }

    #[test]
    fn test_cut_string_wide_edges_become_spaces() {
        // 世 spans columns 6-7, 界 spans 8-9
        assert_eq!(cut_string("Hello 世界", 7, 9), "  ");
        assert_eq!(cut_string("Hello 世界", 6, 10), "世界");
    }

    #[test]
    fn test_to_cols() {
        assert_eq!(to_cols(160.0, 8.0), 20);
        assert_eq!(to_cols(60.0, 8.0), 8);
        assert_eq!(to_cols(1.0, 8.0), 1);
        assert_eq!(to_cols(160.0, 0.0), 20);
    }

    #[test]
    fn test_window_with_spacers() {
        let lines = vec!["a".to_string(), "b".to_string()];
        assert_eq!(window(&lines, 2, 1, 0, 0), vec!["", "", "a", "b", ""]);
        assert_eq!(window(&lines, 2, 1, 1, 3), vec!["", "a", "b"]);
        // past the end sticks to the bottom
        assert_eq!(window(&lines, 2, 1, 9, 2), vec!["b", ""]);
    }
}
