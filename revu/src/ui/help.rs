//! Keybinding help overlay.
//!
//! Drawn inside the same `terminal.draw()` closure as the dashboard: `Clear`
//! erases the area first, then a bordered `Paragraph` lists the bindings. Any
//! key closes it.

use ratatui::{
    Frame,
    layout::Constraint,
    style::{Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::theme::Theme;

/// Renders the help overlay centred over the dashboard.
///
/// Skipped on terminals too small to hold it.
pub fn render_help_overlay(frame: &mut Frame, theme: &Theme) {
    let area = frame.area();
    if area.width < 40 || area.height < 12 {
        return;
    }

    let overlay_area = area.centered(Constraint::Percentage(70), Constraint::Percentage(80));
    frame.render_widget(Clear, overlay_area);

    let block = Block::bordered()
        .title(" Keys  (any key to close) ")
        .border_style(Style::default().fg(theme.border_active));

    frame.render_widget(
        Paragraph::new(help_text(theme)).block(block).wrap(Wrap { trim: false }),
        overlay_area,
    );
}

/// Binding rows as `(keys, description)`, grouped under section headings.
pub const BINDINGS: &[(&str, &[(&str, &str)])] = &[
    (
        "List",
        &[
            ("j / k, ↓ / ↑", "Move between files and comments"),
            ("Enter / →", "Open the selected comment, or expand/collapse a file"),
            ("Tab", "Expand/collapse the selected file"),
        ],
    ),
    (
        "Detail",
        &[
            ("Tab", "Switch focus between the list and the detail panel"),
            ("j / k", "Move (list focused) or scroll (detail focused)"),
            ("J / K, Shift-↓/↑", "Scroll the list without moving the cursor"),
            ("PgDn / PgUp, Ctrl-d / u", "Scroll the focused panel by 10 lines"),
            ("Esc / ←", "Back to the list panel, then to the list view"),
        ],
    ),
    (
        "General",
        &[
            ("c", "Copy the AI fix prompt to the clipboard"),
            ("mouse wheel", "Scroll the panel under the pointer"),
            ("?", "Show this help"),
            ("q, Ctrl-c", "Quit"),
        ],
    ),
];

fn help_text(theme: &Theme) -> Text<'static> {
    let mut lines = Vec::new();
    for (i, (section, rows)) in BINDINGS.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }
        lines.push(Line::from(Span::styled(
            *section,
            Style::default().fg(theme.heading).add_modifier(Modifier::BOLD),
        )));
        for (keys, what) in rows.iter() {
            lines.push(Line::from(vec![
                Span::styled(format!("  {keys:<24}"), Style::default().fg(theme.selection)),
                Span::raw(*what),
            ]));
        }
    }
    Text::from(lines)
}
