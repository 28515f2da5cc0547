//! Export hooks.
//!
//! The table never encodes files itself. Triggering an export hands the
//! host an [`ExportRequest`] describing what is on screen: the export kind,
//! whether the current page or the full result is wanted, and the active
//! keyword, sort and filters.

use crate::query::{Filter, SortSpec};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Kind of export. `Custom` covers host-defined kinds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    /// Comma-separated values.
    Csv,
    /// Spreadsheet.
    Excel,
    /// PDF document.
    Pdf,
    /// Printer.
    Print,
    /// Host-defined kind, named by the string.
    Custom(String),
}

impl fmt::Display for ExportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportType::Csv => f.write_str("csv"),
            ExportType::Excel => f.write_str("excel"),
            ExportType::Pdf => f.write_str("pdf"),
            ExportType::Print => f.write_str("print"),
            ExportType::Custom(name) => f.write_str(name),
        }
    }
}

/// The built-in export kinds, in toolbar order.
pub static DEFAULT_EXPORTS: Lazy<Vec<ExportType>> = Lazy::new(|| {
    vec![
        ExportType::Csv,
        ExportType::Excel,
        ExportType::Pdf,
        ExportType::Print,
    ]
});

/// Which rows an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportScope {
    /// Only the rows of the current page.
    #[default]
    Page,
    /// Every row matching the current keyword and filters.
    All,
}

/// What the host receives when an export is triggered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportRequest {
    /// Export kind.
    #[serde(rename = "type")]
    pub kind: ExportType,
    /// Rows covered.
    pub scope: ExportScope,
    /// Active search keyword.
    pub keyword: String,
    /// Active sort.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortSpec>,
    /// Active filters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<Filter>,
    /// Current page, 1-based.
    pub page: usize,
    /// Current page size.
    pub rows_per_page: usize,
}

/// Export callback.
pub type ExportFn = Arc<dyn Fn(&ExportRequest) + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::SortDirection;
    use serde_json::json;

    #[test]
    fn test_request_serializes_for_the_host() {
        let request = ExportRequest {
            kind: ExportType::Csv,
            scope: ExportScope::All,
            keyword: "oslo".into(),
            sort: Some(SortSpec::new("amount", SortDirection::Desc)),
            filters: vec![],
            page: 2,
            rows_per_page: 25,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["type"], json!("csv"));
        assert_eq!(value["scope"], json!("all"));
        assert_eq!(value["rowsPerPage"], json!(25));
        assert_eq!(value["sort"]["direction"], json!("DESC"));
        assert!(value.get("filters").is_none());
    }

    #[test]
    fn test_custom_kind_display() {
        assert_eq!(ExportType::Custom("xml".into()).to_string(), "xml");
        assert_eq!(DEFAULT_EXPORTS.len(), 4);
    }
}
