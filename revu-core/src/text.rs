//! ANSI-aware text measurement for terminal output.
//!
//! Escape sequences (CSI such as SGR colors, OSC such as hyperlinks, and
//! two-byte escapes) are carried through untouched but never count toward the
//! visible width, and are never split. Widths are terminal columns as reported
//! by `unicode-width`, so wide glyphs count double.

use unicode_width::UnicodeWidthChar;

/// Marker appended to truncated text.
pub const ELLIPSIS: &str = "...";

const RESET: &str = "\x1b[0m";

/// One lexical unit of a string that may contain escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    /// A complete escape sequence.
    Escape(&'a str),
    /// An escape sequence cut off by the end of the input.
    Incomplete,
    Text(char),
}

/// Splits `s` into escapes and visible characters.
fn segments(s: &str) -> impl Iterator<Item = Segment<'_>> {
    let bytes = s.as_bytes();
    let mut i = 0;
    std::iter::from_fn(move || {
        if i >= bytes.len() {
            return None;
        }
        if bytes[i] != 0x1b {
            let c = s[i..].chars().next()?;
            i += c.len_utf8();
            return Some(Segment::Text(c));
        }
        let start = i;
        let end = match bytes.get(i + 1) {
            // CSI: parameters/intermediates, then one final byte in 0x40..=0x7e.
            Some(b'[') => bytes[i + 2..]
                .iter()
                .position(|b| (0x40..=0x7e).contains(b))
                .map(|p| i + 2 + p + 1),
            // OSC: terminated by BEL or ST (ESC \).
            Some(b']') => {
                let mut j = i + 2;
                let mut found = None;
                while j < bytes.len() {
                    if bytes[j] == 0x07 {
                        found = Some(j + 1);
                        break;
                    }
                    if bytes[j] == 0x1b && bytes.get(j + 1) == Some(&b'\\') {
                        found = Some(j + 2);
                        break;
                    }
                    j += 1;
                }
                found
            }
            Some(b) if b.is_ascii() => Some(i + 2),
            _ => None,
        };
        match end {
            Some(end) => {
                i = end;
                Some(Segment::Escape(&s[start..end]))
            }
            None => {
                i = bytes.len();
                Some(Segment::Incomplete)
            }
        }
    })
}

fn char_width(c: char) -> usize {
    c.width().unwrap_or(0)
}

/// Returns `s` with every escape sequence removed.
pub fn strip_ansi(s: &str) -> String {
    segments(s)
        .filter_map(|seg| match seg {
            Segment::Text(c) => Some(c),
            _ => None,
        })
        .collect()
}

/// Number of terminal columns `s` occupies once escapes are ignored.
pub fn visible_width(s: &str) -> usize {
    segments(s)
        .map(|seg| match seg {
            Segment::Text(c) => char_width(c),
            _ => 0,
        })
        .sum()
}

fn is_sgr(escape: &str) -> bool {
    escape.starts_with("\x1b[") && escape.ends_with('m')
}

fn is_sgr_reset(escape: &str) -> bool {
    matches!(escape, "\x1b[m" | "\x1b[0m" | "\x1b[00m")
}

/// Truncates `s` to at most `budget` visible columns.
///
/// Text that fits is returned unchanged. Otherwise the first `budget - 3`
/// columns are kept, any styling still open at the cut is reset, and `...` is
/// appended. Budgets smaller than the ellipsis yield dots only.
pub fn truncate(s: &str, budget: usize) -> String {
    if visible_width(s) <= budget {
        return segments(s)
            .filter_map(|seg| match seg {
                Segment::Escape(e) => Some(e.to_owned()),
                Segment::Text(c) => Some(c.to_string()),
                Segment::Incomplete => None,
            })
            .collect();
    }
    if budget < ELLIPSIS.len() {
        return ".".repeat(budget);
    }
    let keep = budget - ELLIPSIS.len();
    let mut out = String::with_capacity(s.len().min(budget * 4));
    let mut used = 0;
    let mut styled = false;
    for seg in segments(s) {
        match seg {
            Segment::Escape(e) => {
                if is_sgr(e) {
                    styled = !is_sgr_reset(e);
                }
                out.push_str(e);
            }
            Segment::Text(c) => {
                let w = char_width(c);
                if used + w > keep {
                    break;
                }
                out.push(c);
                used += w;
            }
            Segment::Incomplete => {}
        }
    }
    if styled {
        out.push_str(RESET);
    }
    out.push_str(ELLIPSIS);
    out
}

/// Greedy word wrap on whitespace.
///
/// Tokens are packed while the line's visible width stays within `width`. A
/// single token wider than `width` is truncated onto its own line instead of
/// overflowing. Always returns at least one (possibly empty) line.
pub fn wrap(s: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;
    for token in s.split_whitespace() {
        let w = visible_width(token);
        if w > width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0;
            }
            lines.push(truncate(token, width));
            continue;
        }
        if current.is_empty() {
            current.push_str(token);
            current_width = w;
        } else if current_width + 1 + w <= width {
            current.push(' ');
            current.push_str(token);
            current_width += 1 + w;
        } else {
            lines.push(std::mem::replace(&mut current, token.to_owned()));
            current_width = w;
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Centers `s` in a field of `width` columns, truncating when it does not fit.
pub fn center(s: &str, width: usize) -> String {
    let w = visible_width(s);
    if w >= width {
        return truncate(s, width);
    }
    let left = (width - w) / 2;
    let right = width - w - left;
    format!("{}{}{}", " ".repeat(left), s, " ".repeat(right))
}

/// Truncates or right-pads `s` to exactly `width` visible columns.
pub fn fit(s: &str, width: usize) -> String {
    let mut out = truncate(s, width);
    let w = visible_width(&out);
    if w < width {
        out.push_str(&" ".repeat(width - w));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: &str = "\x1b[31m";

    /// Every ESC in `s` must begin a complete sequence.
    fn escapes_are_complete(s: &str) -> bool {
        segments(s).all(|seg| seg != Segment::Incomplete)
    }

    #[test]
    fn visible_width_ignores_sgr_and_osc() {
        let s = format!("{RED}abc{RESET} \x1b]8;;http://x\x07link\x1b]8;;\x07");
        assert_eq!(visible_width(&s), 8);
        assert_eq!(strip_ansi(&s), "abc link");
    }

    #[test]
    fn wide_glyphs_count_double() {
        assert_eq!(visible_width("日本"), 4);
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn truncate_plain_text_appends_ellipsis() {
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn truncate_styled_text_never_exceeds_budget() {
        let s = format!("{RED}the quick brown fox{RESET} jumps");
        for budget in 0..30 {
            let out = truncate(&s, budget);
            assert!(visible_width(&out) <= budget, "budget {budget}: {out:?}");
            assert!(escapes_are_complete(&out));
        }
    }

    #[test]
    fn truncate_closes_open_styling() {
        let s = format!("{RED}abcdefghij");
        let out = truncate(&s, 6);
        assert_eq!(out, format!("{RED}abc{RESET}..."));
    }

    #[test]
    fn truncate_drops_dangling_escape() {
        let out = truncate("abc\x1b[3", 10);
        assert_eq!(out, "abc");
        assert!(escapes_are_complete(&out));
    }

    #[test]
    fn tiny_budget_yields_dots() {
        assert_eq!(truncate("abcdef", 2), "..");
        assert_eq!(truncate("abcdef", 0), "");
    }

    #[test]
    fn wrap_packs_words_greedily() {
        let lines = wrap("one two three four", 9);
        assert_eq!(lines, vec!["one two", "three", "four"]);
    }

    #[test]
    fn wrap_long_token_produces_single_truncated_line() {
        let lines = wrap("abcdefghijklmnopqrstuvwxyz", 10);
        assert_eq!(lines, vec!["abcdefg..."]);
    }

    #[test]
    fn wrap_empty_input_is_one_empty_line() {
        assert_eq!(wrap("   ", 10), vec![String::new()]);
    }

    #[test]
    fn wrap_measures_visible_width_only() {
        let s = format!("{RED}red{RESET} words here");
        let lines = wrap(&s, 9);
        assert_eq!(lines.len(), 2);
        assert_eq!(strip_ansi(&lines[0]), "red words");
    }

    #[test]
    fn center_pads_both_sides() {
        assert_eq!(center("ab", 6), "  ab  ");
        assert_eq!(center("abc", 6), " abc  ");
    }

    #[test]
    fn fit_pads_or_truncates() {
        assert_eq!(fit("ab", 4), "ab  ");
        assert_eq!(fit("abcdefgh", 6), "abc...");
    }
}
