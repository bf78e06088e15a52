//! Right-hand detail panel: the selected comment's parsed fields.

use std::sync::LazyLock;

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;
use revu_core::parser::ParsedComment;
use revu_core::state::SessionState;

use crate::theme::Theme;
use crate::ui::code;
use crate::ui::text::{truncate_line, wrap_line, Overflow};

/// Inline markdown: code spans, links, bold, italic.
static INLINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"`(?P<code>[^`]+)`|\[(?P<label>[^\]]+)\]\([^)]*\)|\*\*(?P<bold>[^*]+)\*\*|__(?P<bold2>[^_]+)__|\*(?P<italic>[^*\s][^*]*)\*|\b_(?P<italic2>[^_\s][^_]*)_\b",
    )
    .expect("inline markdown pattern")
});

const PROMPT_RULE: &str = "│ ";

/// Builds every detail line for a panel `width` columns wide (scrollbar
/// column excluded).
pub fn detail_lines(state: &SessionState, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let Some(comment) = state.current_comment() else {
        return vec![Line::from(Span::styled(
            " Select a comment to see its details.",
            Style::default().fg(theme.muted),
        ))];
    };
    let parsed = ParsedComment::for_comment(comment);
    let sev_color = theme.severity(parsed.severity_class());
    let mut out: Vec<Line<'static>> = Vec::new();

    let location = match (parsed.line_start, parsed.line_end) {
        (0, _) => comment.file_path.clone(),
        (start, end) if end > start => format!("{}:L{start}-{end}", comment.file_path),
        (start, _) => format!("{}:L{start}", comment.file_path),
    };
    out.push(truncate_line(
        Line::from(Span::styled(location, Style::default().fg(theme.muted))),
        width,
    ));
    out.push(Line::default());

    let title = Line::from(vec![
        Span::styled(
            format!("[{}] ", parsed.severity),
            Style::default().fg(sev_color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            parsed.title.clone(),
            Style::default().fg(sev_color).add_modifier(Modifier::BOLD),
        ),
    ]);
    out.extend(wrap_line(&title, width, Overflow::Truncate));

    if !parsed.description.is_empty() {
        out.push(Line::default());
        for raw in parsed.description.lines() {
            out.extend(wrap_line(&markdown_line(raw, theme), width, Overflow::Truncate));
        }
    }

    if let Some(block) = &parsed.code_suggestion {
        out.push(Line::default());
        out.push(section_heading("Suggested fix", theme));
        for line in code::highlight(block, &comment.file_path, theme) {
            out.extend(wrap_line(&line, width, Overflow::Truncate));
        }
    }

    if let Some(prompt) = &parsed.ai_prompt {
        out.push(Line::default());
        out.push(Line::from(vec![
            Span::styled(
                "Prompt for AI",
                Style::default().fg(theme.heading).add_modifier(Modifier::BOLD),
            ),
            Span::styled("  (c to copy)", Style::default().fg(theme.muted)),
        ]));
        let inner = width.saturating_sub(PROMPT_RULE.chars().count()).max(1);
        for raw in prompt.lines() {
            for wrapped in wrap_line(&Line::from(raw.to_owned()), inner, Overflow::Break) {
                let rule = Span::styled(PROMPT_RULE, Style::default().fg(theme.prompt_rule));
                let mut spans = vec![rule];
                spans.extend(wrapped.spans);
                out.push(Line::from(spans));
            }
        }
    }

    out
}

fn section_heading(title: &'static str, theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(title, Style::default().fg(theme.heading).add_modifier(Modifier::BOLD)))
}

/// Renders one markdown line: headings bold, emphasis markers replaced by
/// styling, inline code highlighted, links reduced to their label.
pub fn markdown_line(raw: &str, theme: &Theme) -> Line<'static> {
    let trimmed = raw.trim_start();
    if trimmed.starts_with('#') {
        let text = trimmed.trim_start_matches('#').trim();
        let mut line = inline_spans(text, theme, Style::default().add_modifier(Modifier::BOLD));
        line.spans.iter_mut().for_each(|s| s.style = s.style.fg(theme.heading));
        return line;
    }
    inline_spans(raw, theme, Style::default())
}

fn inline_spans(text: &str, theme: &Theme, base: Style) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut last = 0;
    for caps in INLINE.captures_iter(text) {
        let Some(m) = caps.get(0) else { continue };
        if m.start() > last {
            spans.push(Span::styled(text[last..m.start()].to_owned(), base));
        }
        let (content, style) = if let Some(code) = caps.name("code") {
            (code.as_str(), base.fg(theme.inline_code))
        } else if let Some(label) = caps.name("label") {
            (label.as_str(), base.add_modifier(Modifier::UNDERLINED))
        } else if let Some(bold) = caps.name("bold").or_else(|| caps.name("bold2")) {
            (bold.as_str(), base.add_modifier(Modifier::BOLD))
        } else if let Some(italic) = caps.name("italic").or_else(|| caps.name("italic2")) {
            (italic.as_str(), base.add_modifier(Modifier::ITALIC))
        } else {
            (m.as_str(), base)
        };
        spans.push(Span::styled(content.to_owned(), style));
        last = m.end();
    }
    if last < text.len() {
        spans.push(Span::styled(text[last..].to_owned(), base));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use revu_core::types::Comment;

    fn text(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    fn state_with(content: &str) -> SessionState {
        let mut state = SessionState::new(Vec::new());
        state.merge_comments([Comment {
            id: "1".into(),
            file_path: "src/a.ts".into(),
            line_start: 10,
            line_end: 12,
            severity: "High".into(),
            confidence: String::new(),
            title: "Leak".into(),
            content: content.into(),
            created_at: None,
            resolved: false,
        }]);
        state.files[0].expanded = true;
        state.selected_comment = Some(0);
        state
    }

    #[test]
    fn markdown_markers_become_styles() {
        let theme = Theme::dark();
        let line = markdown_line("Use **bold**, *soft*, `code()` and [docs](https://x.y).", &theme);
        assert_eq!(text(&line), "Use bold, soft, code() and docs.");
        let style_of = |t: &str| line.spans.iter().find(|s| s.content == t).map(|s| s.style);
        assert!(style_of("bold").unwrap().add_modifier.contains(Modifier::BOLD));
        assert!(style_of("soft").unwrap().add_modifier.contains(Modifier::ITALIC));
        assert_eq!(style_of("code()").unwrap().fg, Some(theme.inline_code));
    }

    #[test]
    fn snake_case_identifiers_are_not_italicised() {
        let line = markdown_line("call read_to_string here", &Theme::dark());
        assert_eq!(text(&line), "call read_to_string here");
    }

    #[test]
    fn header_shows_path_and_line_range() {
        let lines = detail_lines(&state_with("Body"), &Theme::dark(), 60);
        assert_eq!(text(&lines[0]), "src/a.ts:L10-12");
        assert_eq!(text(&lines[2]), "[High] Leak");
    }

    #[test]
    fn sections_render_in_order_and_fit_the_width() {
        let content = "The handle is never closed.\n\n\
            <details><summary>Suggested fix</summary>\n\n```ts\n-open()\n+using f = open()\n```\n</details>\n\
            <details><summary>Prompt for AI</summary>\n\n```\nClose the handle in src/a.ts around line 10 using a finally block that always runs\n```\n</details>";
        let lines = detail_lines(&state_with(content), &Theme::dark(), 30);
        let rendered: Vec<String> = lines.iter().map(text).collect();
        let fix = rendered.iter().position(|l| l == "Suggested fix").unwrap();
        let prompt = rendered.iter().position(|l| l.starts_with("Prompt for AI")).unwrap();
        assert!(fix < prompt);
        assert!(rendered[prompt + 1..].iter().all(|l| l.starts_with(PROMPT_RULE)));
        assert!(lines.iter().all(|l| l.width() <= 30));
        let prompt_words: String = rendered[prompt + 1..]
            .iter()
            .map(|l| l.trim_start_matches(PROMPT_RULE).to_owned())
            .collect::<Vec<_>>()
            .join(" ");
        assert!(prompt_words.contains("always runs"));
        assert!(!prompt_words.contains("..."));
    }

    #[test]
    fn no_selection_shows_placeholder() {
        let state = SessionState::new(Vec::new());
        let lines = detail_lines(&state, &Theme::dark(), 40);
        assert_eq!(lines.len(), 1);
    }
}
