//! Default styles for table parts.

use lipgloss_extras::prelude::*;

/// Styles applied to each part of a rendered table.
#[derive(Debug, Clone)]
pub struct TableStyles {
    /// Toolbar line.
    pub toolbar: Style,
    /// Header cells.
    pub header: Style,
    /// The header cell that has keyboard focus.
    pub focused_header: Style,
    /// Body cells.
    pub cell: Style,
    /// Body cells whose column marks them disabled.
    pub disabled_cell: Style,
    /// Row-action cells.
    pub action: Style,
    /// Summary lines.
    pub summary: Style,
    /// The empty-state row.
    pub empty: Style,
    /// Pagination footer.
    pub footer: Style,
    /// Loading line of an infinite table.
    pub loading: Style,
}

impl Default for TableStyles {
    fn default() -> Self {
        let subdued = AdaptiveColor {
            Light: "#9B9B9B",
            Dark: "#5C5C5C",
        };
        Self {
            toolbar: Style::new().foreground(AdaptiveColor {
                Light: "#A49FA5",
                Dark: "#777777",
            }),
            header: Style::new().bold(true),
            focused_header: Style::new()
                .bold(true)
                .foreground(Color::from("230"))
                .background(Color::from("62")),
            cell: Style::new(),
            disabled_cell: Style::new().faint(true),
            action: Style::new().foreground(AdaptiveColor {
                Light: "#04B575",
                Dark: "#04B575",
            }),
            summary: Style::new().bold(true),
            empty: Style::new().foreground(AdaptiveColor {
                Light: "#909090",
                Dark: "#626262",
            }),
            footer: Style::new().foreground(subdued.clone()),
            loading: Style::new().foreground(subdued).italic(true),
        }
    }
}

impl TableStyles {
    /// Styles that leave text untouched.
    pub fn plain() -> Self {
        Self {
            toolbar: Style::new(),
            header: Style::new(),
            focused_header: Style::new(),
            cell: Style::new(),
            disabled_cell: Style::new(),
            action: Style::new(),
            summary: Style::new(),
            empty: Style::new(),
            footer: Style::new(),
            loading: Style::new(),
        }
    }
}
