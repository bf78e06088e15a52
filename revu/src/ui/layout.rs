//! Layout arithmetic for the two screen layouts.
//!
//! Everything here is pure: it maps terminal dimensions and already-generated
//! panel lines to fixed-size rows. The list layout is one full-width panel; the
//! split layout is a left panel, a 3-column gutter, and a right panel. Each
//! panel reserves its last column for the scrollbar and the last terminal row
//! always holds the footer.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use revu_core::state::{clamp_scroll, Mode, Panel, SessionState};
use revu_core::types::SessionStatus;

use crate::theme::Theme;
use crate::ui::text::{pad_line, truncate_line};

/// Left panel share of the width in the split layout, in percent.
pub const LEFT_PERCENT: usize = 35;
/// Columns between the two panels: space, divider, space.
pub const GUTTER: usize = 3;

/// Braille spinner frames for the running indicator.
pub const SPINNER: [&str; 10] = [
    "⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏",
];
pub const DONE_GLYPH: &str = "✓";
pub const FAILED_GLYPH: &str = "✗";

/// Returns `(left, right)` panel widths for the split layout.
pub fn split_widths(width: usize) -> (usize, usize) {
    let left = width * LEFT_PERCENT / 100;
    let right = width.saturating_sub(left + GUTTER);
    (left, right)
}

/// Columns available to panel content once the scrollbar column is reserved.
pub fn content_width(panel_width: usize) -> usize {
    panel_width.saturating_sub(1)
}

/// The visible slice of one panel.
#[derive(Debug)]
pub struct Window {
    /// Exactly `height` rows, each exactly `width` columns.
    pub rows: Vec<Line<'static>>,
    /// The clamped scroll offset actually used.
    pub offset: usize,
}

/// Windows `lines` to `height` rows starting at the clamped `offset`, fits
/// every row to the panel width and paints the scrollbar column.
pub fn window(
    lines: Vec<Line<'static>>,
    offset: usize,
    height: usize,
    width: usize,
    theme: &Theme,
) -> Window {
    let total = lines.len();
    let offset = clamp_scroll(offset, total, height);
    if width == 0 {
        return Window { rows: vec![Line::default(); height], offset };
    }
    let inner = content_width(width);
    let thumb = scrollbar_thumb(total, height, offset);

    let mut rows: Vec<Line<'static>> = Vec::with_capacity(height);
    let mut visible = lines.into_iter().skip(offset);
    for row in 0..height {
        let mut line = pad_line(visible.next().unwrap_or_default(), inner);
        let bar = match thumb {
            Some((start, len)) if row >= start && row < start + len => {
                Span::styled("█", Style::default().fg(theme.scrollbar_thumb))
            }
            Some(_) => Span::styled("│", Style::default().fg(theme.scrollbar_track)),
            None => Span::raw(" "),
        };
        line.spans.push(bar);
        rows.push(line);
    }
    Window { rows, offset }
}

/// Thumb `(start, length)` in rows, or `None` when everything fits.
///
/// The thumb length is proportional to `height / total` and its start to
/// `offset / total`; it is at least one row and never runs past the track.
pub fn scrollbar_thumb(total: usize, height: usize, offset: usize) -> Option<(usize, usize)> {
    if height == 0 || total <= height {
        return None;
    }
    let len = (height * height / total).max(1);
    let start = (offset * height / total).min(height - len);
    Some((start, len))
}

/// Adjusts `offset` so `row` is inside a `height`-row window.
pub fn follow_row(offset: usize, row: usize, height: usize) -> usize {
    if height == 0 {
        return offset;
    }
    if row < offset {
        row
    } else if row >= offset + height {
        row + 1 - height
    } else {
        offset
    }
}

/// The glyph shown next to the summary and in the footer for `state.status`.
pub fn status_glyph(state: &SessionState, theme: &Theme) -> Span<'static> {
    match state.status {
        SessionStatus::Running => Span::styled(
            SPINNER[state.spinner_frame % SPINNER.len()],
            Style::default().fg(theme.status_running),
        ),
        SessionStatus::Completed => {
            Span::styled(DONE_GLYPH, Style::default().fg(theme.status_ok))
        }
        SessionStatus::Failed => {
            Span::styled(FAILED_GLYPH, Style::default().fg(theme.status_failed))
        }
    }
}

/// Builds the one-row footer: status on the left, key hints (or a pending
/// notice) after it, filled to `width` with the status bar background.
pub fn footer(state: &SessionState, theme: &Theme, width: usize) -> Line<'static> {
    let status_text = match state.status {
        SessionStatus::Running => " Analyzing ",
        SessionStatus::Completed => " Review complete ",
        SessionStatus::Failed => " Review failed ",
    };
    let mut spans = vec![
        Span::raw(" "),
        status_glyph(state, theme),
        Span::styled(status_text, Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("│ "),
    ];
    match &state.notice {
        Some(notice) => spans.push(Span::raw(notice.clone())),
        None => spans.push(Span::raw(key_hints(state))),
    }
    let line = truncate_line(Line::from(spans), width);
    pad_line(line, width).style(Style::default().bg(theme.status_bar_bg).fg(theme.status_bar_fg))
}

fn key_hints(state: &SessionState) -> &'static str {
    match (state.mode, state.focus) {
        (Mode::List, _) => "j/k move  enter open  tab expand  c copy prompt  ? help  q quit",
        (Mode::Detail, Panel::Left) => {
            "j/k move  J/K scroll  tab focus  enter detail  esc back  ? help  q quit"
        }
        (Mode::Detail, Panel::Right) => {
            "j/k scroll  pgup/pgdn page  tab focus  c copy prompt  esc back  q quit"
        }
    }
}
