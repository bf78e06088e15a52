//! Best-effort coloring for suggested-fix code blocks.
//!
//! `+`/`-` prefixed lines take the diff add/remove colors. Other lines go
//! through syntect when the block's language tag or the comment's file
//! extension names a known syntax, and through a small keyword/string/number
//! heuristic otherwise.

use std::sync::LazyLock;

use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;
use revu_core::parser::CodeBlock;
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::{SyntaxReference, SyntaxSet};

use crate::theme::Theme;

static PS: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static TS: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?P<str>"(?:[^"\\]|\\.)*"|'(?:[^'\\]|\\.)*'|`[^`]*`)|(?P<num>\b\d[\d_]*(?:\.\d+)?\b)|(?P<word>[A-Za-z_][A-Za-z0-9_]*)"#,
    )
    .expect("token pattern")
});

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "case", "catch", "class", "const", "continue", "def", "else",
    "enum", "export", "extends", "false", "fn", "for", "from", "func", "function", "if", "impl",
    "import", "in", "interface", "let", "match", "mut", "new", "nil", "null", "pub", "return",
    "self", "static", "struct", "switch", "this", "throw", "trait", "true", "try", "type", "use",
    "var", "while", "yield",
];

/// Colors every line of `block`. `file_path` supplies the syntax when the
/// fence carried no usable language tag.
pub fn highlight(block: &CodeBlock, file_path: &str, theme: &Theme) -> Vec<Line<'static>> {
    let mut highlighter = find_syntax(block.language.as_deref(), file_path).and_then(|syntax| {
        let t = TS.themes.get("base16-ocean.dark").or_else(|| TS.themes.values().next())?;
        Some(HighlightLines::new(syntax, t))
    });

    block
        .code
        .lines()
        .map(|line| {
            if let Some(style) = diff_style(line, theme) {
                return Line::from(Span::styled(line.to_owned(), style));
            }
            match highlighter.as_mut() {
                Some(h) => syntect_line(line, h),
                None => heuristic_line(line, theme),
            }
        })
        .collect()
}

fn diff_style(line: &str, theme: &Theme) -> Option<Style> {
    if line.starts_with("+++") || line.starts_with("---") {
        return None;
    }
    match line.chars().next() {
        Some('+') => Some(Style::default().fg(theme.diff_added)),
        Some('-') => Some(Style::default().fg(theme.diff_removed)),
        _ => None,
    }
}

fn find_syntax(language: Option<&str>, file_path: &str) -> Option<&'static SyntaxReference> {
    let by_language = language
        .filter(|l| !l.eq_ignore_ascii_case("diff") && !l.eq_ignore_ascii_case("text"))
        .and_then(|l| PS.find_syntax_by_token(l));
    by_language.or_else(|| {
        let ext = file_path.rsplit_once('.').map(|(_, ext)| ext)?;
        PS.find_syntax_by_extension(ext)
    })
}

/// Converts one syntect-highlighted line to an owned ratatui `Line`. Only the
/// foreground and font style carry over so the panel background is kept.
fn syntect_line(line: &str, h: &mut HighlightLines<'_>) -> Line<'static> {
    use syntect::highlighting::FontStyle;

    let ranges = match h.highlight_line(line, &PS) {
        Ok(ranges) => ranges,
        Err(_) => return Line::from(line.to_owned()),
    };
    let spans: Vec<Span<'static>> = ranges
        .into_iter()
        .map(|(style, text)| {
            let mut s = Style::default();
            if style.foreground.a > 0 {
                s = s.fg(Color::Rgb(style.foreground.r, style.foreground.g, style.foreground.b));
            }
            if style.font_style.contains(FontStyle::BOLD) {
                s = s.add_modifier(Modifier::BOLD);
            }
            if style.font_style.contains(FontStyle::ITALIC) {
                s = s.add_modifier(Modifier::ITALIC);
            }
            Span::styled(text.to_owned(), s)
        })
        .collect();
    if spans.is_empty() { Line::from(line.to_owned()) } else { Line::from(spans) }
}

/// Colors strings, numbers, keywords and call sites.
pub fn heuristic_line(line: &str, theme: &Theme) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut last = 0;
    for caps in TOKEN.captures_iter(line) {
        let Some(m) = caps.get(0) else { continue };
        if m.start() > last {
            spans.push(Span::raw(line[last..m.start()].to_owned()));
        }
        let style = if caps.name("str").is_some() {
            Style::default().fg(theme.code_string)
        } else if caps.name("num").is_some() {
            Style::default().fg(theme.code_number)
        } else if KEYWORDS.contains(&m.as_str()) {
            Style::default().fg(theme.code_keyword)
        } else if line[m.end()..].trim_start().starts_with('(') {
            Style::default().fg(theme.code_call)
        } else {
            Style::default()
        };
        spans.push(Span::styled(m.as_str().to_owned(), style));
        last = m.end();
    }
    if last < line.len() {
        spans.push(Span::raw(line[last..].to_owned()));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span_fg(line: &Line<'_>, text: &str) -> Option<Color> {
        line.spans.iter().find(|s| s.content == text).and_then(|s| s.style.fg)
    }

    #[test]
    fn diff_prefixed_lines_get_add_and_remove_colors() {
        let theme = Theme::dark();
        let block = CodeBlock {
            language: Some("diff".into()),
            code: "-old()\n+new()\n ctx".into(),
        };
        let lines = highlight(&block, "notes.unknownext", &theme);
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].spans[0].style.fg, Some(theme.diff_removed));
        assert_eq!(lines[1].spans[0].style.fg, Some(theme.diff_added));
    }

    #[test]
    fn heuristic_colors_keywords_strings_numbers_and_calls() {
        let theme = Theme::dark();
        let line = heuristic_line(r#"let x = parse("42", 7);"#, &theme);
        assert_eq!(span_fg(&line, "let"), Some(theme.code_keyword));
        assert_eq!(span_fg(&line, "parse"), Some(theme.code_call));
        assert_eq!(span_fg(&line, "\"42\""), Some(theme.code_string));
        assert_eq!(span_fg(&line, "7"), Some(theme.code_number));
        assert_eq!(span_fg(&line, "x"), None);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, r#"let x = parse("42", 7);"#);
    }

    #[test]
    fn unknown_syntax_falls_back_to_heuristic() {
        let theme = Theme::dark();
        let block = CodeBlock { language: None, code: "return 1".into() };
        let lines = highlight(&block, "file.zzz-unknown", &theme);
        assert_eq!(span_fg(&lines[0], "return"), Some(theme.code_keyword));
    }

    #[test]
    fn known_extension_uses_syntect() {
        let theme = Theme::dark();
        let block = CodeBlock { language: None, code: "fn main() {}".into() };
        let lines = highlight(&block, "src/main.rs", &theme);
        let text: String = lines[0].spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text, "fn main() {}");
        assert!(lines[0].spans.iter().any(|s| matches!(s.style.fg, Some(Color::Rgb(..)))));
    }
}
