//! The query model: the single description of which rows should be visible.
//!
//! A [`Query`] carries the 1-based page, the page size, the search keyword,
//! an optional sort and any column filters. In server mode it is what gets
//! handed to the host to fetch a page; in client mode the controller applies
//! it to the rows it holds.

use crate::row::{cell_as_number, cell_to_string, CellValue};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default page-size choices offered by the pagination footer.
pub const DEFAULT_ROWS_PER_PAGE_OPTIONS: [usize; 4] = [10, 25, 50, 100];

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Smallest first.
    #[default]
    Asc,
    /// Largest first.
    Desc,
}

impl SortDirection {
    /// The opposite direction.
    pub fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Header indicator glyph.
    pub fn indicator(self) -> &'static str {
        match self {
            Self::Asc => "▲",
            Self::Desc => "▼",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => f.write_str("ASC"),
            Self::Desc => f.write_str("DESC"),
        }
    }
}

/// Which column the rows are ordered by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortSpec {
    /// Column key.
    pub key: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Creates a sort spec.
    pub fn new(key: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            key: key.into(),
            direction,
        }
    }
}

/// Comparison used by a column [`Filter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterOp {
    /// Case-insensitive substring match.
    Contains,
    /// Case-insensitive equality of the display text, or numeric equality.
    Equals,
    /// Negation of [`FilterOp::Equals`].
    NotEquals,
    /// Numeric greater-than. Non-numeric cells never match.
    GreaterThan,
    /// Numeric less-than. Non-numeric cells never match.
    LessThan,
}

/// A per-column filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    /// Column key the filter applies to.
    pub key: String,
    /// Comparison.
    pub op: FilterOp,
    /// Right-hand side, as entered by the user.
    pub value: String,
}

impl Filter {
    /// Creates a filter.
    pub fn new(key: impl Into<String>, op: FilterOp, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            op,
            value: value.into(),
        }
    }

    /// Shorthand for a `Contains` filter.
    pub fn contains(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(key, FilterOp::Contains, value)
    }

    /// Reports whether `cell` satisfies this filter.
    pub fn matches(&self, cell: &CellValue) -> bool {
        let text = cell_to_string(cell).to_lowercase();
        let needle = self.value.trim().to_lowercase();
        match self.op {
            FilterOp::Contains => text.contains(&needle),
            FilterOp::Equals => self.equals(cell, &text, &needle),
            FilterOp::NotEquals => !self.equals(cell, &text, &needle),
            FilterOp::GreaterThan => self.compare(cell).is_some_and(|(l, r)| l > r),
            FilterOp::LessThan => self.compare(cell).is_some_and(|(l, r)| l < r),
        }
    }

    fn equals(&self, cell: &CellValue, text: &str, needle: &str) -> bool {
        match self.compare(cell) {
            Some((l, r)) => (l - r).abs() < f64::EPSILON,
            None => text == needle,
        }
    }

    fn compare(&self, cell: &CellValue) -> Option<(f64, f64)> {
        let rhs = crate::row::parse_numeric(&self.value)?;
        let lhs = cell_as_number(cell)?;
        Some((lhs, rhs))
    }
}

/// Everything that determines which rows are visible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    /// 1-based page number.
    pub page: usize,
    /// Page size, at least 1.
    pub rows_per_page: usize,
    /// Search keyword.
    pub keyword: String,
    /// Active sort, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    /// Active column filters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            page: 1,
            rows_per_page: DEFAULT_ROWS_PER_PAGE_OPTIONS[0],
            keyword: String::new(),
            sort: None,
            filters: Vec::new(),
        }
    }
}

impl Query {
    /// A compact string identifying this query. Two queries with the same
    /// signature would fetch the same data.
    pub fn signature(&self) -> String {
        let sort = self
            .sort
            .as_ref()
            .map(|s| format!("{}:{}", s.key, s.direction))
            .unwrap_or_default();
        let filters: Vec<String> = self
            .filters
            .iter()
            .map(|f| format!("{}{:?}{}", f.key, f.op, f.value))
            .collect();
        format!(
            "{}|{}|{}|{}|{}",
            self.page,
            self.rows_per_page,
            self.keyword,
            sort,
            filters.join(",")
        )
    }
}

/// Number of pages needed for `total` rows, never less than one.
pub fn page_count(total: usize, rows_per_page: usize) -> usize {
    total.div_ceil(rows_per_page.max(1)).max(1)
}

/// Clamps a requested page into `[1, page_count]`.
pub fn clamp_page(page: usize, page_count: usize) -> usize {
    page.clamp(1, page_count.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_page_count_edges() {
        assert_eq!(page_count(0, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(100, 25), 4);
        assert_eq!(page_count(5, 0), 5);
    }

    #[test]
    fn test_clamp_page() {
        assert_eq!(clamp_page(0, 5), 1);
        assert_eq!(clamp_page(3, 5), 3);
        assert_eq!(clamp_page(9, 5), 5);
        assert_eq!(clamp_page(9, 0), 1);
    }

    #[test]
    fn test_filter_ops() {
        assert!(Filter::contains("name", "AD").matches(&json!("Ada")));
        assert!(!Filter::contains("name", "x").matches(&json!("Ada")));
        assert!(Filter::new("n", FilterOp::Equals, "10").matches(&json!(10.0)));
        assert!(Filter::new("n", FilterOp::Equals, "ada").matches(&json!("Ada")));
        assert!(Filter::new("n", FilterOp::NotEquals, "ada").matches(&json!("Bob")));
        assert!(Filter::new("n", FilterOp::GreaterThan, "5").matches(&json!("1,000")));
        assert!(!Filter::new("n", FilterOp::GreaterThan, "5").matches(&json!("abc")));
        assert!(Filter::new("n", FilterOp::LessThan, "5").matches(&json!(4)));
    }

    #[test]
    fn test_signature_distinguishes_sort() {
        let a = Query::default();
        let mut b = Query::default();
        b.sort = Some(SortSpec::new("name", SortDirection::Desc));
        assert_ne!(a.signature(), b.signature());
        assert_eq!(a.signature(), Query::default().signature());
    }

    #[test]
    fn test_query_serializes_camel_case() {
        let q = Query {
            page: 2,
            rows_per_page: 25,
            keyword: "abc".into(),
            sort: Some(SortSpec::new("amount", SortDirection::Desc)),
            filters: vec![],
        };
        let value = serde_json::to_value(&q).unwrap();
        assert_eq!(
            value,
            json!({"page": 2, "rowsPerPage": 25, "keyword": "abc", "sort": {"key": "amount", "direction": "DESC"}})
        );
    }

    proptest! {
        #[test]
        fn prop_page_always_within_bounds(total in 0usize..10_000, rpp in 1usize..500, requested in 0usize..1_000) {
            let count = page_count(total, rpp);
            prop_assert_eq!(count, std::cmp::max(1, total.div_ceil(rpp)));
            let page = clamp_page(requested, count);
            prop_assert!(page >= 1 && page <= count);
        }
    }
}
