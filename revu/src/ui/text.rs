//! Width-aware operations on styled ratatui `Line`s.
//!
//! These mirror `revu_core::text` but work on spans instead of raw escape
//! sequences: each span carries its own style, so cutting a line between two
//! characters can never leave styling open.

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use revu_core::text::ELLIPSIS;
use unicode_width::UnicodeWidthChar;

/// What to do with a single word wider than the wrap width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overflow {
    /// Cut it to fit and append an ellipsis.
    Truncate,
    /// Break it across as many lines as needed.
    Break,
}

type StyledChar = (char, Style);

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

fn flatten(line: &Line<'_>) -> Vec<StyledChar> {
    line.spans
        .iter()
        .flat_map(|span| {
            let style = line.style.patch(span.style);
            span.content.chars().map(move |c| (c, style))
        })
        .collect()
}

/// Rebuilds spans from styled characters, merging runs of equal style.
fn rebuild(chars: &[StyledChar]) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut run = String::new();
    let mut run_style: Option<Style> = None;
    for &(c, style) in chars {
        if run_style != Some(style) {
            if let Some(s) = run_style.take() {
                spans.push(Span::styled(std::mem::take(&mut run), s));
            }
            run_style = Some(style);
        }
        run.push(c);
    }
    if let Some(s) = run_style {
        spans.push(Span::styled(run, s));
    }
    Line::from(spans)
}

fn width_of(chars: &[StyledChar]) -> usize {
    chars.iter().map(|&(c, _)| char_width(c)).sum()
}

/// Longest prefix of `chars` that fits in `budget` columns.
fn take_columns(chars: &[StyledChar], budget: usize) -> &[StyledChar] {
    let mut used = 0;
    for (i, &(c, _)) in chars.iter().enumerate() {
        let w = char_width(c);
        if used + w > budget {
            return &chars[..i];
        }
        used += w;
    }
    chars
}

/// Fits `line` into `budget` columns. An over-budget line keeps its first
/// `budget - 3` columns followed by an unstyled `...`.
pub fn truncate_line(line: Line<'static>, budget: usize) -> Line<'static> {
    if line.width() <= budget {
        return line;
    }
    if budget < ELLIPSIS.len() {
        return Line::from(".".repeat(budget));
    }
    let chars = flatten(&line);
    let mut kept = take_columns(&chars, budget - ELLIPSIS.len()).to_vec();
    kept.push(('.', Style::default()));
    kept.push(('.', Style::default()));
    kept.push(('.', Style::default()));
    rebuild(&kept)
}

/// Right-pads `line` with spaces to exactly `width` columns, truncating first
/// if it is too wide.
pub fn pad_line(line: Line<'static>, width: usize) -> Line<'static> {
    let mut line = truncate_line(line, width);
    let gap = width.saturating_sub(line.width());
    if gap > 0 {
        line.spans.push(Span::raw(" ".repeat(gap)));
    }
    line
}

/// Greedily packs the words of `line` into lines of at most `width` columns.
///
/// Leading indentation is kept on the first line and whitespace between words
/// on the same line is preserved as written; whitespace at a break is dropped.
/// Always returns at least one line.
pub fn wrap_line(line: &Line<'_>, width: usize, overflow: Overflow) -> Vec<Line<'static>> {
    if width == 0 {
        return vec![Line::default()];
    }
    let chars = flatten(line);
    let indent_len = chars.iter().take_while(|(c, _)| c.is_whitespace()).count();
    let (indent, body) = chars.split_at(indent_len);

    let mut out: Vec<Vec<StyledChar>> = Vec::new();
    let mut current: Vec<StyledChar> = take_columns(indent, width).to_vec();
    let mut pending_gap: Vec<StyledChar> = Vec::new();

    for segment in segments(body) {
        if segment[0].0.is_whitespace() {
            pending_gap = segment.to_vec();
            continue;
        }
        let word_w = width_of(segment);
        let line_w = width_of(&current);
        let gap_w = if current.is_empty() { 0 } else { width_of(&pending_gap) };

        if line_w + gap_w + word_w <= width {
            if !current.is_empty() {
                current.extend_from_slice(&pending_gap);
            }
            current.extend_from_slice(segment);
        } else if word_w <= width {
            if current.iter().any(|(c, _)| !c.is_whitespace()) {
                out.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            current.extend_from_slice(segment);
        } else {
            if !current.is_empty() && current.iter().any(|(c, _)| !c.is_whitespace()) {
                out.push(std::mem::take(&mut current));
            } else {
                current.clear();
            }
            match overflow {
                Overflow::Truncate => {
                    out.push(flatten(&truncate_line(rebuild(segment), width)));
                }
                Overflow::Break => {
                    let mut rest = segment;
                    while width_of(rest) > width {
                        let mut head = take_columns(rest, width);
                        if head.is_empty() {
                            head = &rest[..1];
                        }
                        out.push(head.to_vec());
                        rest = &rest[head.len()..];
                    }
                    current.extend_from_slice(rest);
                }
            }
        }
        pending_gap.clear();
    }
    if !current.is_empty() || out.is_empty() {
        out.push(current);
    }
    out.iter().map(|chars| rebuild(chars)).collect()
}

/// Splits styled chars into alternating runs of whitespace and non-whitespace.
fn segments(chars: &[StyledChar]) -> Vec<&[StyledChar]> {
    let mut out = Vec::new();
    let mut start = 0;
    for i in 1..=chars.len() {
        if i == chars.len() || chars[i].0.is_whitespace() != chars[start].0.is_whitespace() {
            if start < i {
                out.push(&chars[start..i]);
            }
            start = i;
        }
    }
    out
}

/// Renders a line as an ANSI-escaped string for plain stdout output.
pub fn to_ansi(line: &Line<'_>) -> String {
    use crossterm::style::{Attribute, ContentStyle};

    let mut out = String::new();
    for span in &line.spans {
        let style = line.style.patch(span.style);
        let mut content = ContentStyle::new();
        content.foreground_color = style.fg.map(crossterm_color);
        content.background_color = style.bg.map(crossterm_color);
        for (modifier, attribute) in [
            (Modifier::BOLD, Attribute::Bold),
            (Modifier::DIM, Attribute::Dim),
            (Modifier::ITALIC, Attribute::Italic),
            (Modifier::UNDERLINED, Attribute::Underlined),
            (Modifier::REVERSED, Attribute::Reverse),
        ] {
            if style.add_modifier.contains(modifier) {
                content.attributes.set(attribute);
            }
        }
        if content == ContentStyle::new() {
            out.push_str(&span.content);
        } else {
            out.push_str(&content.apply(span.content.as_ref()).to_string());
        }
    }
    out
}

fn crossterm_color(color: Color) -> crossterm::style::Color {
    use crossterm::style::Color as C;
    match color {
        Color::Reset => C::Reset,
        Color::Black => C::Black,
        Color::Red => C::DarkRed,
        Color::Green => C::DarkGreen,
        Color::Yellow => C::DarkYellow,
        Color::Blue => C::DarkBlue,
        Color::Magenta => C::DarkMagenta,
        Color::Cyan => C::DarkCyan,
        Color::Gray => C::Grey,
        Color::DarkGray => C::DarkGrey,
        Color::LightRed => C::Red,
        Color::LightGreen => C::Green,
        Color::LightYellow => C::Yellow,
        Color::LightBlue => C::Blue,
        Color::LightMagenta => C::Magenta,
        Color::LightCyan => C::Cyan,
        Color::White => C::White,
        Color::Rgb(r, g, b) => C::Rgb { r, g, b },
        Color::Indexed(i) => C::AnsiValue(i),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Stylize;

    fn plain(line: &Line<'_>) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn truncation_keeps_styles_and_never_exceeds_budget() {
        let line = Line::from(vec!["[H] ".yellow(), "A rather long title".bold()]);
        for budget in 0..30 {
            let cut = truncate_line(line.clone(), budget);
            assert!(cut.width() <= budget, "budget {budget}: {:?}", plain(&cut));
        }
        let cut = truncate_line(line, 10);
        assert_eq!(plain(&cut), "[H] A r...");
        assert_eq!(cut.spans[0].style.fg, Some(Color::Yellow));
        assert_eq!(cut.spans.last().map(|s| s.style), Some(Style::default()));
    }

    #[test]
    fn short_lines_are_untouched() {
        let line = Line::from("fits");
        assert_eq!(truncate_line(line.clone(), 4), line);
    }

    #[test]
    fn wide_chars_count_double() {
        let cut = truncate_line(Line::from("日本語のテキスト"), 7);
        assert_eq!(plain(&cut), "日本...");
        assert!(cut.width() <= 7);
    }

    #[test]
    fn wrap_packs_words_greedily() {
        let lines = wrap_line(&Line::from("the quick brown fox jumps"), 10, Overflow::Truncate);
        let text: Vec<_> = lines.iter().map(plain).collect();
        assert_eq!(text, ["the quick", "brown fox", "jumps"]);
    }

    #[test]
    fn wrap_truncates_a_single_oversize_token() {
        let lines = wrap_line(&Line::from("abcdefghijklmnop"), 8, Overflow::Truncate);
        assert_eq!(lines.len(), 1);
        assert_eq!(plain(&lines[0]), "abcde...");
    }

    #[test]
    fn wrap_can_break_oversize_tokens_instead() {
        let lines = wrap_line(&Line::from("abcdefghij"), 4, Overflow::Break);
        let text: Vec<_> = lines.iter().map(plain).collect();
        assert_eq!(text, ["abcd", "efgh", "ij"]);
    }

    #[test]
    fn wrap_keeps_indentation_and_inner_spacing() {
        let lines = wrap_line(&Line::from("    let x  = 1;"), 40, Overflow::Truncate);
        assert_eq!(plain(&lines[0]), "    let x  = 1;");
        assert_eq!(wrap_line(&Line::default(), 10, Overflow::Truncate).len(), 1);
    }

    #[test]
    fn pad_fills_to_exact_width() {
        assert_eq!(pad_line(Line::from("ab"), 5).width(), 5);
        assert_eq!(pad_line(Line::from("abcdefgh"), 5).width(), 5);
    }

    #[test]
    fn ansi_output_wraps_styled_spans_only() {
        let line = Line::from(vec![Span::raw("plain "), "red".red()]);
        let ansi = to_ansi(&line);
        assert!(ansi.starts_with("plain "));
        assert!(ansi.contains("red"));
        assert!(ansi.contains('\u{1b}'));
        assert_eq!(revu_core::text::strip_ansi(&ansi), "plain red");
    }
}
