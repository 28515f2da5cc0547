//! Aggregate summary rows.
//!
//! A summary block is one or more lines rendered under the body. Each line
//! places its label in one column and an aggregate value in every column
//! named by one of its items. Values come from host-supplied totals when
//! present (server mode), otherwise they are summed over the filtered rows.
//!
//! When lines are pinned to the bottom of the viewport, each line gets a
//! bottom offset so the last line sits flush and earlier ones stack above it.

use crate::row::{cell_to_number, TableRow};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Formats an aggregate value.
pub type FormatFn = Arc<dyn Fn(f64) -> String + Send + Sync>;
/// Renders a line's label.
pub type LabelFn = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// One aggregated column in a summary line.
#[derive(Clone)]
pub struct SummaryItem {
    /// Column key to aggregate and to place the value under.
    pub key: String,
    /// Optional text shown before the value.
    pub label: Option<String>,
    /// Optional value formatter; defaults to [`format_number`].
    pub formatter: Option<FormatFn>,
}

impl fmt::Debug for SummaryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryItem")
            .field("key", &self.key)
            .field("label", &self.label)
            .field("formatter", &self.formatter.is_some())
            .finish()
    }
}

impl SummaryItem {
    /// Sums the column `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            label: None,
            formatter: None,
        }
    }

    /// Sets the label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the formatter.
    pub fn with_formatter(mut self, f: impl Fn(f64) -> String + Send + Sync + 'static) -> Self {
        self.formatter = Some(Arc::new(f));
        self
    }

    fn render(&self, value: f64) -> String {
        let formatted = match &self.formatter {
            Some(f) => f(value),
            None => format_number(value),
        };
        match &self.label {
            Some(label) => format!("{label} {formatted}"),
            None => formatted,
        }
    }
}

/// One summary line.
#[derive(Clone)]
pub struct SummaryLine {
    /// Label text, e.g. "Total".
    pub label: String,
    /// Column that holds the label; the first column when unset.
    pub label_column_key: Option<String>,
    /// Aggregated columns.
    pub items: Vec<SummaryItem>,
    /// Optional custom label renderer.
    pub label_cell: Option<LabelFn>,
}

impl fmt::Debug for SummaryLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummaryLine")
            .field("label", &self.label)
            .field("label_column_key", &self.label_column_key)
            .field("items", &self.items)
            .field("label_cell", &self.label_cell.is_some())
            .finish()
    }
}

impl SummaryLine {
    /// A line labelled `label`.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            label_column_key: None,
            items: Vec::new(),
            label_cell: None,
        }
    }

    /// Places the label in column `key`.
    pub fn with_label_column(mut self, key: impl Into<String>) -> Self {
        self.label_column_key = Some(key.into());
        self
    }

    /// Adds an item.
    pub fn with_item(mut self, item: SummaryItem) -> Self {
        self.items.push(item);
        self
    }

    /// Installs a custom label renderer.
    pub fn with_label_cell(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.label_cell = Some(Arc::new(f));
        self
    }

    fn item(&self, key: &str) -> Option<&SummaryItem> {
        self.items.iter().find(|i| i.key == key)
    }
}

/// Summary configuration.
#[derive(Debug, Clone)]
pub struct SummaryConfig {
    /// Whether the block is shown at all.
    pub enabled: bool,
    /// Lines, top to bottom.
    pub lines: Vec<SummaryLine>,
    /// Precomputed totals per line index, keyed by item key. Takes
    /// precedence over client-side sums.
    pub data: Vec<HashMap<String, f64>>,
    /// Pin the block to the bottom of the viewport.
    pub sticky: bool,
    /// Height of each summary line, used for sticky offsets.
    pub row_height: f64,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            lines: Vec::new(),
            data: Vec::new(),
            sticky: true,
            row_height: 1.0,
        }
    }
}

impl SummaryConfig {
    /// An enabled config with the given lines.
    pub fn new(lines: Vec<SummaryLine>) -> Self {
        Self {
            enabled: true,
            lines,
            ..Self::default()
        }
    }

    /// Supplies precomputed totals.
    pub fn with_data(mut self, data: Vec<HashMap<String, f64>>) -> Self {
        self.data = data;
        self
    }

    /// Sets the line height.
    pub fn with_row_height(mut self, row_height: f64) -> Self {
        self.row_height = row_height;
        self
    }

    /// Sets sticky positioning.
    pub fn sticky(mut self, sticky: bool) -> Self {
        self.sticky = sticky;
        self
    }
}

/// What a summary cell holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryCellKind {
    /// The line label.
    Label,
    /// An aggregate value.
    Value,
    /// Nothing.
    Empty,
}

/// A rendered summary cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryCell {
    /// Column the cell sits in.
    pub column_key: String,
    /// Text.
    pub text: String,
    /// Kind.
    pub kind: SummaryCellKind,
}

/// A rendered summary line.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    /// One cell per column.
    pub cells: Vec<SummaryCell>,
    /// Bottom offset when pinned; `None` when not sticky.
    pub bottom: Option<f64>,
}

/// The rendered summary block.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryBlock {
    /// Lines, top to bottom.
    pub rows: Vec<SummaryRow>,
}

impl SummaryBlock {
    /// Builds the block for `column_keys` (visible columns in order) over
    /// `rows` (the full filtered set, not just the current page).
    ///
    /// Returns `None` when disabled, when there are no lines, or when there
    /// is neither precomputed data nor any row to sum.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use bubbletea_datatable::summary::SummaryBlock;
    /// use bubbletea_datatable::{JsonRow, SummaryConfig, SummaryItem, SummaryLine};
    /// use serde_json::json;
    ///
    /// let rows = JsonRow::try_from_values(vec![
    ///     json!({"id": 1, "name": "Ada", "amount": 1200}),
    ///     json!({"id": 2, "name": "Grace", "amount": 34.5}),
    /// ])
    /// .unwrap();
    /// let refs: Vec<&JsonRow> = rows.iter().collect();
    /// let config = SummaryConfig::new(vec![
    ///     SummaryLine::new("Total").with_item(SummaryItem::new("amount")),
    /// ]);
    ///
    /// let block = SummaryBlock::build(&config, &["name", "amount"], &refs).unwrap();
    /// let cells = &block.rows[0].cells;
    /// assert_eq!(cells[0].text, "Total");
    /// assert_eq!(cells[1].text, "1,234.5");
    /// ```
    pub fn build<T: TableRow>(
        config: &SummaryConfig,
        column_keys: &[&str],
        rows: &[&T],
    ) -> Option<Self> {
        if !config.enabled || config.lines.is_empty() || column_keys.is_empty() {
            return None;
        }
        let has_data = config.data.iter().any(|d| !d.is_empty());
        if !has_data && rows.is_empty() {
            return None;
        }
        let offsets = sticky_offsets(config.lines.len(), config.row_height);
        let lines = config
            .lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let values = config
                    .data
                    .get(i)
                    .filter(|d| !d.is_empty())
                    .cloned()
                    .unwrap_or_else(|| aggregate(line, rows));
                SummaryRow {
                    cells: line_cells(line, column_keys, &values),
                    bottom: config.sticky.then_some(offsets[i]),
                }
            })
            .collect();
        Some(Self { rows: lines })
    }
}

fn line_cells(
    line: &SummaryLine,
    column_keys: &[&str],
    values: &HashMap<String, f64>,
) -> Vec<SummaryCell> {
    let label_key = line
        .label_column_key
        .as_deref()
        .filter(|k| column_keys.contains(k))
        .unwrap_or(column_keys[0]);
    column_keys
        .iter()
        .map(|&key| {
            if key == label_key {
                let text = match &line.label_cell {
                    Some(f) => f(&line.label),
                    None => line.label.clone(),
                };
                return SummaryCell {
                    column_key: key.to_string(),
                    text,
                    kind: SummaryCellKind::Label,
                };
            }
            match line.item(key) {
                Some(item) => SummaryCell {
                    column_key: key.to_string(),
                    text: item.render(values.get(key).copied().unwrap_or(0.0)),
                    kind: SummaryCellKind::Value,
                },
                None => SummaryCell {
                    column_key: key.to_string(),
                    text: String::new(),
                    kind: SummaryCellKind::Empty,
                },
            }
        })
        .collect()
}

/// Sums every item of `line` over `rows`.
pub fn aggregate<T: TableRow>(line: &SummaryLine, rows: &[&T]) -> HashMap<String, f64> {
    line.items
        .iter()
        .map(|item| {
            let sum = rows.iter().map(|r| cell_to_number(&r.cell(&item.key))).sum();
            (item.key.clone(), sum)
        })
        .collect()
}

/// Bottom offsets for `lines` pinned lines of height `row_height`: line `i`
/// sits `row_height * (lines - 1 - i)` above the bottom.
pub fn sticky_offsets(lines: usize, row_height: f64) -> Vec<f64> {
    (0..lines)
        .map(|i| row_height * (lines - 1 - i) as f64)
        .collect()
}

/// Formats a number with comma thousands separators and at most three
/// fraction digits, trailing zeros removed.
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = format!("{:.3}", value.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((&rounded, ""));
    let frac = frac_part.trim_end_matches('0');

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && (int_part != "0" || !frac.is_empty());
    let sign = if negative { "-" } else { "" };
    if frac.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::JsonRow;
    use proptest::prelude::*;
    use serde_json::json;

    fn rows() -> Vec<JsonRow> {
        JsonRow::try_from_values(vec![
            json!({"id": 1, "name": "a", "qty": 2, "amount": "1,000.5"}),
            json!({"id": 2, "name": "b", "qty": "x", "amount": 250}),
            json!({"id": 3, "name": "c", "qty": 3, "amount": null}),
        ])
        .unwrap()
    }

    const KEYS: [&str; 3] = ["name", "qty", "amount"];

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(999.0), "999");
        assert_eq!(format_number(1000.0), "1,000");
        assert_eq!(format_number(1234567.891), "1,234,567.891");
        assert_eq!(format_number(1250.5), "1,250.5");
        assert_eq!(format_number(-98765.4321), "-98,765.432");
        assert_eq!(format_number(-0.0001), "0");
        assert_eq!(format_number(f64::NAN), "0");
    }

    #[test]
    fn test_aggregate_coerces_cells() {
        let rows = rows();
        let refs: Vec<&JsonRow> = rows.iter().collect();
        let line = SummaryLine::new("Total")
            .with_item(SummaryItem::new("qty"))
            .with_item(SummaryItem::new("amount"));
        let sums = aggregate(&line, &refs);
        assert_eq!(sums["qty"], 5.0);
        assert_eq!(sums["amount"], 1250.5);
    }

    #[test]
    fn test_label_defaults_to_first_column() {
        let rows = rows();
        let refs: Vec<&JsonRow> = rows.iter().collect();
        let config = SummaryConfig::new(vec![
            SummaryLine::new("Total").with_item(SummaryItem::new("amount"))
        ]);
        let block = SummaryBlock::build(&config, &KEYS, &refs).unwrap();
        let cells = &block.rows[0].cells;
        assert_eq!(cells[0].kind, SummaryCellKind::Label);
        assert_eq!(cells[0].text, "Total");
        assert_eq!(cells[1].kind, SummaryCellKind::Empty);
        assert_eq!(cells[2].text, "1,250.5");
    }

    #[test]
    fn test_label_column_and_formatter() {
        let rows = rows();
        let refs: Vec<&JsonRow> = rows.iter().collect();
        let config = SummaryConfig::new(vec![SummaryLine::new("Sum")
            .with_label_column("qty")
            .with_label_cell(|l| format!("[{l}]"))
            .with_item(SummaryItem::new("amount").with_formatter(|v| format!("${v:.2}")))]);
        let block = SummaryBlock::build(&config, &KEYS, &refs).unwrap();
        let cells = &block.rows[0].cells;
        assert_eq!(cells[0].kind, SummaryCellKind::Empty);
        assert_eq!(cells[1].text, "[Sum]");
        assert_eq!(cells[2].text, "$1250.50");
    }

    #[test]
    fn test_unknown_label_column_falls_back_to_first() {
        let rows = rows();
        let refs: Vec<&JsonRow> = rows.iter().collect();
        let config = SummaryConfig::new(vec![SummaryLine::new("T").with_label_column("nope")]);
        let block = SummaryBlock::build(&config, &KEYS, &refs).unwrap();
        assert_eq!(block.rows[0].cells[0].kind, SummaryCellKind::Label);
    }

    #[test]
    fn test_precomputed_data_wins() {
        let rows = rows();
        let refs: Vec<&JsonRow> = rows.iter().collect();
        let config = SummaryConfig::new(vec![
            SummaryLine::new("Page").with_item(SummaryItem::new("amount").with_label("Σ")),
            SummaryLine::new("All").with_item(SummaryItem::new("amount")),
        ])
        .with_data(vec![HashMap::from([("amount".to_string(), 99_000.0)])]);
        let block = SummaryBlock::build(&config, &KEYS, &refs).unwrap();
        assert_eq!(block.rows[0].cells[2].text, "Σ 99,000");
        // Second line has no precomputed entry and is summed locally.
        assert_eq!(block.rows[1].cells[2].text, "1,250.5");
    }

    #[test]
    fn test_hidden_without_data() {
        let config = SummaryConfig::new(vec![SummaryLine::new("Total")]);
        assert!(SummaryBlock::build::<JsonRow>(&config, &KEYS, &[]).is_none());

        let disabled = SummaryConfig {
            enabled: false,
            ..config.clone()
        };
        let rows = rows();
        let refs: Vec<&JsonRow> = rows.iter().collect();
        assert!(SummaryBlock::build(&disabled, &KEYS, &refs).is_none());

        let with_data = config.with_data(vec![HashMap::from([("qty".to_string(), 1.0)])]);
        assert!(SummaryBlock::build::<JsonRow>(&with_data, &KEYS, &[]).is_some());
    }

    #[test]
    fn test_sticky_offsets_stack_upwards() {
        assert_eq!(sticky_offsets(3, 40.0), vec![80.0, 40.0, 0.0]);
        assert_eq!(sticky_offsets(1, 40.0), vec![0.0]);
        assert!(sticky_offsets(0, 40.0).is_empty());
    }

    #[test]
    fn test_non_sticky_rows_have_no_offset() {
        let rows = rows();
        let refs: Vec<&JsonRow> = rows.iter().collect();
        let config = SummaryConfig::new(vec![SummaryLine::new("T")]).sticky(false);
        let block = SummaryBlock::build(&config, &KEYS, &refs).unwrap();
        assert_eq!(block.rows[0].bottom, None);
    }

    proptest! {
        #[test]
        fn prop_sticky_lines_never_overlap(n in 1usize..12, row_height in 1.0f64..100.0) {
            let offsets = sticky_offsets(n, row_height);
            for (i, bottom) in offsets.iter().enumerate() {
                prop_assert!((bottom - row_height * (n - 1 - i) as f64).abs() < 1e-9);
            }
            for pair in offsets.windows(2) {
                // line i occupies [bottom, bottom + row_height)
                prop_assert!(pair[1] + row_height <= pair[0] + 1e-9);
            }
        }
    }
}
