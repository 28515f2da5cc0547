//! Pagination footer.
//!
//! Renders the footer line of a paginated table: the rows-per-page choice,
//! the `from-to of total` range and the page indicator. The page state
//! itself lives in the [`Controller`](crate::controller::Controller); this
//! module only draws it and owns the key bindings that move between pages.

use crate::controller::FromTo;
use crate::key::{Binding, KeyMap};
use crossterm::event::KeyCode;

/// How the page indicator is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Type {
    /// `3/10`.
    #[default]
    Arabic,
    /// `○ ○ • ○`, falling back to arabic past [`Paginator::max_dots`] pages.
    Dots,
}

/// Key bindings for page navigation.
#[derive(Debug, Clone)]
pub struct PaginatorKeyMap {
    /// Previous page.
    pub prev_page: Binding,
    /// Next page.
    pub next_page: Binding,
    /// First page.
    pub first_page: Binding,
    /// Last page.
    pub last_page: Binding,
    /// Cycles through the rows-per-page options.
    pub rows_per_page: Binding,
}

impl Default for PaginatorKeyMap {
    fn default() -> Self {
        Self {
            prev_page: Binding::new(vec![KeyCode::PageUp, KeyCode::Char('p')])
                .with_help("pgup/p", "prev page"),
            next_page: Binding::new(vec![KeyCode::PageDown, KeyCode::Char('n')])
                .with_help("pgdn/n", "next page"),
            first_page: Binding::new(vec![KeyCode::Home, KeyCode::Char('g')])
                .with_help("home/g", "first page"),
            last_page: Binding::new(vec![KeyCode::End, KeyCode::Char('G')])
                .with_help("end/G", "last page"),
            rows_per_page: Binding::new(vec![KeyCode::Char('r')]).with_help("r", "page size"),
        }
    }
}

impl KeyMap for PaginatorKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.prev_page, &self.next_page]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![
            vec![&self.prev_page, &self.next_page],
            vec![&self.first_page, &self.last_page, &self.rows_per_page],
        ]
    }
}

/// Footer renderer.
#[derive(Debug, Clone)]
pub struct Paginator {
    /// Indicator style.
    pub kind: Type,
    /// Dot for the current page.
    pub active_dot: String,
    /// Dot for every other page.
    pub inactive_dot: String,
    /// Format of the arabic indicator; the first `%d` is the page, the
    /// second the page count.
    pub arabic_format: String,
    /// Most pages drawn as dots.
    pub max_dots: usize,
    /// Text before the rows-per-page options.
    pub rows_per_page_label: String,
}

impl Default for Paginator {
    fn default() -> Self {
        Self {
            kind: Type::default(),
            active_dot: "•".to_string(),
            inactive_dot: "○".to_string(),
            arabic_format: "%d/%d".to_string(),
            max_dots: 10,
            rows_per_page_label: "Rows per page:".to_string(),
        }
    }
}

impl Paginator {
    /// A paginator with arabic numbering.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the indicator style.
    pub fn with_type(mut self, kind: Type) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the arabic format.
    pub fn with_arabic_format(mut self, format: impl Into<String>) -> Self {
        self.arabic_format = format.into();
        self
    }

    /// Sets the rows-per-page label.
    pub fn with_rows_per_page_label(mut self, label: impl Into<String>) -> Self {
        self.rows_per_page_label = label.into();
        self
    }

    /// The page indicator for 1-based `page` of `page_count`.
    pub fn indicator(&self, page: usize, page_count: usize) -> String {
        let page_count = page_count.max(1);
        match self.kind {
            Type::Dots if page_count <= self.max_dots => (1..=page_count)
                .map(|i| {
                    if i == page {
                        self.active_dot.as_str()
                    } else {
                        self.inactive_dot.as_str()
                    }
                })
                .collect::<Vec<_>>()
                .join(" "),
            _ => self
                .arabic_format
                .replacen("%d", &page.to_string(), 1)
                .replacen("%d", &page_count.to_string(), 1),
        }
    }

    /// The rows-per-page selector, the selected option in brackets.
    pub fn rows_per_page_view(&self, rows_per_page: usize, options: &[usize]) -> String {
        let opts: Vec<String> = options
            .iter()
            .map(|&o| {
                if o == rows_per_page {
                    format!("[{o}]")
                } else {
                    o.to_string()
                }
            })
            .collect();
        format!("{} {}", self.rows_per_page_label, opts.join(" "))
    }

    /// The full footer line.
    pub fn view(
        &self,
        page: usize,
        page_count: usize,
        rows_per_page: usize,
        options: &[usize],
        range: FromTo,
    ) -> String {
        let mut left = if page > 1 { "‹ " } else { "  " }.to_string();
        left.push_str(&self.indicator(page, page_count));
        left.push_str(if page < page_count { " ›" } else { "  " });
        format!(
            "{}  {}  {}",
            self.rows_per_page_view(rows_per_page, options),
            range,
            left
        )
    }
}

/// The option after `current`, wrapping around. Unknown values restart at the
/// first option.
pub fn next_rows_per_page(current: usize, options: &[usize]) -> Option<usize> {
    let first = *options.first()?;
    Some(
        options
            .iter()
            .position(|&o| o == current)
            .and_then(|i| options.get(i + 1).copied())
            .unwrap_or(first),
    )
}
