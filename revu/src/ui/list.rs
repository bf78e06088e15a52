//! File/comment list lines, shared by the list layout and the left panel of
//! the split layout.

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use revu_core::parser::ParsedComment;
use revu_core::state::{Cursor, Mode, Panel, SessionState};
use revu_core::text::{truncate, visible_width};
use revu_core::types::{FileGroup, SessionStatus, Severity};

use crate::theme::Theme;
use crate::ui::layout::status_glyph;
use crate::ui::text::truncate_line;

const CARET: &str = "❯ ";
const NO_CARET: &str = "  ";
const EXPANDED: &str = "▾ ";
const COLLAPSED: &str = "▸ ";
/// Indentation of comment rows under their file header.
const COMMENT_INDENT: &str = "    ";

/// Generated list content.
#[derive(Debug)]
pub struct ListPanel {
    pub lines: Vec<Line<'static>>,
    /// Row index of the selected file header or comment, if any.
    pub selected_row: Option<usize>,
}

/// Builds every list row for a panel `width` columns wide (scrollbar column
/// excluded). Rows are already fitted to `width`.
pub fn list_lines(state: &SessionState, theme: &Theme, width: usize) -> ListPanel {
    let mut lines = vec![
        hint_line(state, theme),
        divider(theme, width),
        summary_line(state, theme),
    ];
    let mut selected_row = None;
    let cursor = state.cursor();
    let active = state.mode == Mode::List || state.focus == Panel::Left;

    if state.files.is_empty() {
        let msg = match state.status {
            SessionStatus::Running => "  Waiting for review comments...",
            SessionStatus::Completed => "  No issues found.",
            SessionStatus::Failed => "  Review failed before any comments arrived.",
        };
        lines.push(Line::from(Span::styled(msg, Style::default().fg(theme.muted))));
    }

    for (file, group) in state.files.iter().enumerate() {
        let here = Cursor { file, comment: None };
        if here == cursor {
            selected_row = Some(lines.len());
        }
        lines.push(file_header(group, here == cursor, active, theme, width));
        if !group.expanded {
            continue;
        }
        for (idx, comment) in group.comments.iter().enumerate() {
            let here = Cursor { file, comment: Some(idx) };
            if here == cursor {
                selected_row = Some(lines.len());
            }
            let parsed = ParsedComment::for_comment(comment);
            lines.push(comment_row(&parsed, comment.resolved, here == cursor, active, theme));
        }
    }

    let lines = lines.into_iter().map(|l| truncate_line(l, width)).collect();
    ListPanel { lines, selected_row }
}

fn hint_line(state: &SessionState, theme: &Theme) -> Line<'static> {
    let files = state.changed_files.len();
    let added: usize = state.changed_files.iter().map(|f| f.added).sum();
    let deleted: usize = state.changed_files.iter().map(|f| f.deleted).sum();
    let noun = if files == 1 { "file" } else { "files" };
    Line::from(vec![
        Span::styled(format!(" {files} changed {noun} "), Style::default().fg(theme.muted)),
        Span::styled(format!("+{added}"), Style::default().fg(theme.diff_added)),
        Span::raw(" "),
        Span::styled(format!("-{deleted}"), Style::default().fg(theme.diff_removed)),
        Span::styled("  ·  showing all comments, ? for keys", Style::default().fg(theme.muted)),
    ])
}

fn divider(theme: &Theme, width: usize) -> Line<'static> {
    Line::from(Span::styled("─".repeat(width), Style::default().fg(theme.muted)))
}

fn summary_line(state: &SessionState, theme: &Theme) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!(" {} of {} comments resolved ", state.resolved_comments, state.total_comments),
            Style::default().fg(theme.heading).add_modifier(Modifier::BOLD),
        ),
        status_glyph(state, theme),
    ])
}

/// Per-severity comment counts in display order, zero counts omitted.
pub fn severity_counts(group: &FileGroup) -> Vec<(Severity, usize)> {
    let classes: Vec<Severity> =
        group.comments.iter().map(|c| ParsedComment::for_comment(c).severity_class()).collect();
    Severity::ALL
        .iter()
        .map(|&sev| (sev, classes.iter().filter(|&&c| c == sev).count()))
        .filter(|&(_, n)| n > 0)
        .collect()
}

fn file_header(
    group: &FileGroup,
    selected: bool,
    active: bool,
    theme: &Theme,
    width: usize,
) -> Line<'static> {
    let mut badges: Vec<Span<'static>> = Vec::new();
    for (sev, count) in severity_counts(group) {
        badges.push(Span::raw(" "));
        badges.push(Span::styled(
            count.to_string(),
            Style::default().fg(theme.severity(sev)).add_modifier(Modifier::BOLD),
        ));
    }
    let badge_width: usize = badges.iter().map(|s| s.width()).sum();

    let lead = CARET.chars().count() + EXPANDED.chars().count();
    let path_budget = width.saturating_sub(lead + badge_width + 1);
    let path = truncate(&group.path, path_budget);
    let used = lead + visible_width(&path);
    let gap = width.saturating_sub(used + badge_width);

    let mut spans = vec![
        caret(selected, theme),
        Span::styled(
            if group.expanded { EXPANDED } else { COLLAPSED },
            Style::default().fg(theme.muted),
        ),
        Span::styled(path, row_style(selected, active, theme).add_modifier(Modifier::BOLD)),
        Span::raw(" ".repeat(gap)),
    ];
    spans.extend(badges);
    Line::from(spans)
}

fn comment_row(
    parsed: &ParsedComment,
    resolved: bool,
    selected: bool,
    active: bool,
    theme: &Theme,
) -> Line<'static> {
    let letter = Severity::badge_letter(&parsed.severity);
    let mut title_style = row_style(selected, active, theme);
    if resolved {
        title_style = title_style.add_modifier(Modifier::CROSSED_OUT).fg(theme.muted);
    }
    Line::from(vec![
        caret(selected, theme),
        Span::raw(COMMENT_INDENT),
        Span::styled(
            format!("[{letter}]"),
            Style::default()
                .fg(theme.severity(parsed.severity_class()))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(parsed.title.clone(), title_style),
    ])
}

fn caret(selected: bool, theme: &Theme) -> Span<'static> {
    if selected {
        Span::styled(CARET, Style::default().fg(theme.selection).add_modifier(Modifier::BOLD))
    } else {
        Span::raw(NO_CARET)
    }
}

/// Selected rows are highlighted; the highlight dims while the other panel
/// has focus.
fn row_style(selected: bool, active: bool, theme: &Theme) -> Style {
    match (selected, active) {
        (true, true) => Style::default().fg(theme.selection).add_modifier(Modifier::BOLD),
        (true, false) => Style::default().fg(theme.selection),
        (false, _) => Style::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Color;
    use revu_core::types::Comment;

    fn comment(path: &str, line: u32, severity: &str, title: &str) -> Comment {
        Comment {
            id: format!("{path}:{line}"),
            file_path: path.into(),
            line_start: line,
            line_end: line,
            severity: severity.into(),
            confidence: String::new(),
            title: title.into(),
            content: String::new(),
            created_at: None,
            resolved: false,
        }
    }

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn header_shows_right_aligned_counts_per_severity() {
        let mut state = SessionState::new(Vec::new());
        state.merge_comments([
            comment("src/lib.rs", 1, "High", "a"),
            comment("src/lib.rs", 2, "Critical", "b"),
            comment("src/lib.rs", 3, "High", "c"),
        ]);
        let panel = list_lines(&state, &Theme::dark(), 40);
        let header = &panel.lines[3];
        assert!(text(header).ends_with(" 1 2"));
        assert_eq!(header.width(), 40);
        assert_eq!(panel.selected_row, Some(3));
        let colors: Vec<_> = header.spans.iter().rev().take(3).map(|s| s.style.fg).collect();
        assert_eq!(colors, [Some(Color::Yellow), None, Some(Color::Red)]);
    }

    #[test]
    fn long_paths_are_truncated_not_overflowed() {
        let mut state = SessionState::new(Vec::new());
        let path = "src/some/deeply/nested/module/with/a/very/long/name.rs";
        state.merge_comments([comment(path, 1, "Low", "x")]);
        let panel = list_lines(&state, &Theme::dark(), 30);
        assert!(panel.lines.iter().all(|l| l.width() <= 30));
        assert!(text(&panel.lines[3]).contains("..."));
    }

    #[test]
    fn collapsed_files_hide_their_comments() {
        let mut state = SessionState::new(Vec::new());
        state.merge_comments([comment("a.rs", 1, "Low", "hidden")]);
        let collapsed = list_lines(&state, &Theme::dark(), 60);
        assert!(!collapsed.lines.iter().any(|l| text(l).contains("hidden")));
        state.files[0].expanded = true;
        let expanded = list_lines(&state, &Theme::dark(), 60);
        assert!(expanded.lines.iter().any(|l| text(l).contains("[L] hidden")));
    }

    #[test]
    fn summary_reports_resolved_of_total() {
        let mut state = SessionState::new(Vec::new());
        let mut done = comment("a.rs", 1, "Low", "done");
        done.resolved = true;
        state.merge_comments([done, comment("a.rs", 2, "Low", "open")]);
        let panel = list_lines(&state, &Theme::dark(), 60);
        assert!(text(&panel.lines[2]).contains("1 of 2 comments resolved"));
    }

    #[test]
    fn empty_session_shows_waiting_message() {
        let state = SessionState::new(Vec::new());
        let panel = list_lines(&state, &Theme::dark(), 60);
        assert!(text(&panel.lines[3]).contains("Waiting"));
        assert_eq!(panel.selected_row, None);
    }
}
