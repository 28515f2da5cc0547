//! Client-side row derivation: keyword search, column filters and sorting.

use crate::query::{Filter, SortDirection, SortSpec};
use crate::row::{cell_as_number, cell_to_string, TableRow};
use std::cmp::Ordering;

/// Whether `row` matches `keyword` in any of `keys`.
///
/// The keyword is trimmed and compared case-insensitively against the string
/// form of each searched cell. An empty keyword matches every row.
pub fn matches_keyword<T: TableRow>(row: &T, keys: &[String], keyword: &str) -> bool {
    let needle = keyword.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    keys.iter()
        .any(|key| cell_to_string(&row.cell(key)).to_lowercase().contains(&needle))
}

/// Whether `row` satisfies every filter.
pub fn matches_filters<T: TableRow>(row: &T, filters: &[Filter]) -> bool {
    filters.iter().all(|f| f.matches(&row.cell(&f.key)))
}

/// Compares two rows on the sort column. Cells that are both numeric compare
/// as numbers; anything else compares by lowercase display text.
pub fn compare_rows<T: TableRow>(a: &T, b: &T, sort: &SortSpec) -> Ordering {
    let left = a.cell(&sort.key);
    let right = b.cell(&sort.key);
    let ordering = match (cell_as_number(&left), cell_as_number(&right)) {
        (Some(l), Some(r)) => l.partial_cmp(&r).unwrap_or(Ordering::Equal),
        _ => cell_to_string(&left)
            .to_lowercase()
            .cmp(&cell_to_string(&right).to_lowercase()),
    };
    match sort.direction {
        SortDirection::Asc => ordering,
        SortDirection::Desc => ordering.reverse(),
    }
}

/// Indices into `rows` that survive search and filters, in sorted order.
/// The sort is stable, so equal rows keep their input order.
pub fn derive_indices<T: TableRow>(
    rows: &[T],
    search_keys: &[String],
    keyword: &str,
    filters: &[Filter],
    sort: Option<&SortSpec>,
) -> Vec<usize> {
    let mut indices: Vec<usize> = rows
        .iter()
        .enumerate()
        .filter(|(_, row)| matches_keyword(*row, search_keys, keyword))
        .filter(|(_, row)| matches_filters(*row, filters))
        .map(|(i, _)| i)
        .collect();
    if let Some(sort) = sort {
        indices.sort_by(|&a, &b| compare_rows(&rows[a], &rows[b], sort));
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::FilterOp;
    use crate::row::JsonRow;
    use serde_json::json;

    fn rows() -> Vec<JsonRow> {
        JsonRow::try_from_values(vec![
            json!({"id": 1, "name": "Alice", "city": "Oslo", "amount": "1,200"}),
            json!({"id": 2, "name": "bob", "city": "Bergen", "amount": 90}),
            json!({"id": 3, "name": "Carol", "city": null, "amount": 300.5}),
            json!({"id": 4, "name": "alfred", "city": "Oslo", "amount": 90}),
        ])
        .unwrap()
    }

    fn keys(k: &[&str]) -> Vec<String> {
        k.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_keyword_is_trimmed_and_case_insensitive() {
        let rows = rows();
        let got = derive_indices(&rows, &keys(&["name"]), "  AL ", &[], None);
        assert_eq!(got, vec![0, 3]);
    }

    #[test]
    fn test_keyword_searches_any_key() {
        let rows = rows();
        let got = derive_indices(&rows, &keys(&["name", "city"]), "berg", &[], None);
        assert_eq!(got, vec![1]);
    }

    #[test]
    fn test_blank_keyword_keeps_everything() {
        let rows = rows();
        assert_eq!(
            derive_indices(&rows, &keys(&["name"]), "   ", &[], None),
            vec![0, 1, 2, 3]
        );
    }

    #[test]
    fn test_keyword_filter_is_idempotent() {
        let rows = rows();
        let first = derive_indices(&rows, &keys(&["name", "city"]), "o", &[], None);
        let second = derive_indices(&rows, &keys(&["name", "city"]), "o", &[], None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_numeric_sort_handles_formatted_strings() {
        let rows = rows();
        let sort = SortSpec::new("amount", SortDirection::Desc);
        let got = derive_indices(&rows, &[], "", &[], Some(&sort));
        assert_eq!(got, vec![0, 2, 1, 3]);
    }

    #[test]
    fn test_text_sort_is_case_insensitive_and_stable() {
        let rows = rows();
        let sort = SortSpec::new("city", SortDirection::Asc);
        let got = derive_indices(&rows, &[], "", &[], Some(&sort));
        // null city sorts as empty text; the two Oslo rows keep input order
        assert_eq!(got, vec![2, 1, 0, 3]);
    }

    #[test]
    fn test_filters_combine_with_keyword() {
        let rows = rows();
        let filters = vec![Filter::new("amount", FilterOp::LessThan, "100")];
        let got = derive_indices(&rows, &keys(&["city"]), "oslo", &filters, None);
        assert_eq!(got, vec![3]);
    }
}
