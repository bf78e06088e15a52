//! Dashboard rendering.
//!
//! `compose` is a pure function from session state and terminal size to a
//! full screen of styled lines. `render` paints that screen into the frame and
//! hands the clamped scroll offsets back to the state, so the next key press
//! scrolls from where the user actually is.

pub mod code;
pub mod detail;
pub mod help;
pub mod layout;
pub mod list;
pub mod text;

use ratatui::{
    Frame,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};
use revu_core::state::{Mode, Panel, SessionState};

use crate::theme::Theme;
use layout::{content_width, follow_row, split_widths, window};

/// One composed frame.
#[derive(Debug)]
pub struct Screen {
    /// Exactly `height` rows of exactly `width` columns; the last is the footer.
    pub lines: Vec<Line<'static>>,
    pub left_scroll: usize,
    pub detail_scroll: usize,
}

/// Lays out the whole screen for a `width` x `height` terminal.
pub fn compose(state: &SessionState, theme: &Theme, width: u16, height: u16) -> Screen {
    let (width, height) = (width as usize, height as usize);
    if height == 0 {
        return Screen {
            lines: Vec::new(),
            left_scroll: state.left_scroll,
            detail_scroll: state.detail_scroll,
        };
    }
    let body = height - 1;

    let mut screen = match state.mode {
        Mode::List => {
            let left = left_panel(state, theme, width, body);
            Screen {
                lines: left.rows,
                left_scroll: left.offset,
                detail_scroll: state.detail_scroll,
            }
        }
        Mode::Detail => {
            let (left_w, right_w) = split_widths(width);
            let left = left_panel(state, theme, left_w, body);
            let right_lines = detail::detail_lines(state, theme, content_width(right_w));
            let right = window(right_lines, state.detail_scroll, body, right_w, theme);

            let divider_color = match state.focus {
                Panel::Left => theme.border_inactive,
                Panel::Right => theme.border_active,
            };
            let gutter = Span::styled(" │ ", Style::default().fg(divider_color));
            let lines = left
                .rows
                .into_iter()
                .zip(right.rows)
                .map(|(l, r)| {
                    let mut spans = l.spans;
                    spans.push(gutter.clone());
                    spans.extend(r.spans);
                    text::truncate_line(Line::from(spans), width)
                })
                .collect();
            Screen { lines, left_scroll: left.offset, detail_scroll: right.offset }
        }
    };
    screen.lines.push(layout::footer(state, theme, width));
    screen
}

fn left_panel(state: &SessionState, theme: &Theme, width: usize, height: usize) -> layout::Window {
    let panel = list::list_lines(state, theme, content_width(width));
    let offset = match (state.follow_cursor, panel.selected_row) {
        (true, Some(row)) => follow_row(state.left_scroll, row, height),
        _ => state.left_scroll,
    };
    window(panel.lines, offset, height, width, theme)
}

/// Paints one frame. The only place `terminal.draw()` content is produced.
pub fn render(frame: &mut Frame, state: &mut SessionState, theme: &Theme) {
    let area = frame.area();
    let screen = compose(state, theme, area.width, area.height);
    state.apply_viewport(screen.left_scroll, screen.detail_scroll);
    frame.render_widget(Paragraph::new(screen.lines), area);

    if state.show_help {
        help::render_help_overlay(frame, theme);
    }
}
