//! Toolbar: search field, export buttons and the column-visibility menu.

use crate::export::{ExportType, DEFAULT_EXPORTS};

/// Which toolbar parts are shown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarConfig {
    /// Show the search field.
    pub search: bool,
    /// Placeholder shown while the search field is empty.
    pub search_placeholder: String,
    /// Export kinds offered, in order.
    pub exports: Vec<ExportType>,
    /// Allow hiding and showing columns.
    pub column_visibility: bool,
}

impl Default for ToolbarConfig {
    fn default() -> Self {
        Self {
            search: true,
            search_placeholder: "Search...".to_string(),
            exports: Vec::new(),
            column_visibility: false,
        }
    }
}

impl ToolbarConfig {
    /// Search only, no exports.
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows or hides the search field.
    pub fn with_search(mut self, search: bool) -> Self {
        self.search = search;
        self
    }

    /// Sets the search placeholder.
    pub fn with_search_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.search_placeholder = placeholder.into();
        self
    }

    /// Sets the export kinds.
    pub fn with_exports(mut self, exports: Vec<ExportType>) -> Self {
        self.exports = exports;
        self
    }

    /// Offers csv, excel, pdf and print.
    pub fn with_default_exports(mut self) -> Self {
        self.exports = DEFAULT_EXPORTS.clone();
        self
    }

    /// Enables the column-visibility menu.
    pub fn with_column_visibility(mut self, enabled: bool) -> Self {
        self.column_visibility = enabled;
        self
    }

    /// Whether any part is shown at all.
    pub fn is_visible(&self) -> bool {
        self.search || !self.exports.is_empty() || self.column_visibility
    }
}

/// Editing state of the search field.
#[derive(Debug, Clone, Default)]
pub struct SearchField {
    focused: bool,
    value: String,
}

impl SearchField {
    /// Starts editing.
    pub fn focus(&mut self) {
        self.focused = true;
    }

    /// Stops editing; the text is kept.
    pub fn blur(&mut self) {
        self.focused = false;
    }

    /// Whether the field is being edited.
    pub fn focused(&self) -> bool {
        self.focused
    }

    /// Current text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replaces the text, e.g. when the keyword is controlled by the host.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Appends a character.
    pub fn push(&mut self, c: char) {
        self.value.push(c);
    }

    /// Removes the last character. Returns false when already empty.
    pub fn backspace(&mut self) -> bool {
        self.value.pop().is_some()
    }

    /// Empties the field.
    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Text to show: the value, or `placeholder` while empty and unfocused.
    pub fn display<'a>(&'a self, placeholder: &'a str) -> &'a str {
        if self.value.is_empty() && !self.focused {
            placeholder
        } else {
            &self.value
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_shows_search_only() {
        let config = ToolbarConfig::default();
        assert!(config.search);
        assert!(config.exports.is_empty());
        assert!(config.is_visible());
        assert!(!ToolbarConfig::new().with_search(false).is_visible());
    }

    #[test]
    fn test_default_exports() {
        let config = ToolbarConfig::new().with_default_exports();
        assert_eq!(config.exports[0], ExportType::Csv);
        assert_eq!(config.exports.len(), 4);
    }

    #[test]
    fn test_search_field_editing() {
        let mut field = SearchField::default();
        assert_eq!(field.display("Search..."), "Search...");
        field.focus();
        assert_eq!(field.display("Search..."), "");
        field.push('o');
        field.push('s');
        assert!(field.backspace());
        assert_eq!(field.value(), "o");
        field.clear();
        assert!(!field.backspace());
    }
}
