//! Comment metadata parser.
//!
//! Review comments arrive as free-form markdown with loosely structured
//! markers (`**Severity**: High`, `Line_Start: 10`, `<details>` sections for the
//! suggested fix and the AI prompt). Each field has its own extraction rule; a
//! rule that finds nothing falls back to a fixed default, so parsing never fails.
//! Marker keywords are matched case-insensitively and independently of order.

use std::sync::LazyLock;

use regex::Regex;

use crate::text;
use crate::types::{Comment, Severity};

/// Severity used when no marker is present.
pub const DEFAULT_SEVERITY: &str = "Medium";
/// Title used when neither a marker nor any description text is present.
pub const DEFAULT_TITLE: &str = "Issue Identified";
/// Visible-width budget for titles derived from the description.
pub const DERIVED_TITLE_WIDTH: usize = 60;

static SEVERITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bseverity\**[ \t]*:[ \t]*\**[ \t]*([A-Za-z]+)").expect("severity pattern")
});
static LINE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bline[_ ]?start\**[ \t]*:[ \t]*\**[ \t]*(\d+)").expect("line start pattern")
});
static LINE_END: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bline[_ ]?end\**[ \t]*:[ \t]*\**[ \t]*(\d+)").expect("line end pattern")
});
static TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)\btitle\**[ \t]*:[ \t]*\**[ \t]*(.+?)[ \t]*\**[ \t]*\r?$")
        .expect("title pattern")
});
static DETAILS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<details>\s*<summary>(.*?)</summary>(.*?)</details>")
        .expect("details pattern")
});
static FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([A-Za-z0-9_+.#-]*)[^\n]*\n(.*?)\n?[ \t]*```").expect("fence pattern")
});
static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));
static COPY_INSTRUCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[^\n]*copy this prompt[^\n]*(?:\n|$)").expect("copy line pattern")
});
static INLINE_PROMPT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)(?:\*\*)?prompt (?:for|to) fix with ai\**[ \t]*:[ \t]*\**[ \t]*(.*?)(?:\n[ \t]*\n[ \t]*(?:#|\*\*)|\z)",
    )
    .expect("inline prompt pattern")
});
static MARKER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?im)^[^\n]*\b(?:severity|title|line[_ ]?start|line[_ ]?end|confidence)\**[ \t]*:[^\n]*(?:\n|$)",
    )
    .expect("marker line pattern")
});
static BLANK_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n(?:[ \t]*\n){2,}").expect("blank run pattern"));

/// A fenced code block lifted out of a comment section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Info-string language tag (`diff`, `rust`, ...), if the fence had one.
    pub language: Option<String>,
    pub code: String,
}

/// Structured view of a comment's markdown body. Derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedComment {
    pub title: String,
    pub severity: String,
    pub line_start: u32,
    pub line_end: u32,
    pub description: String,
    pub code_suggestion: Option<CodeBlock>,
    pub ai_prompt: Option<String>,
}

impl ParsedComment {
    pub fn severity_class(&self) -> Severity {
        Severity::classify(&self.severity)
    }

    /// Parses `comment.content`, falling back to the service-supplied fields
    /// where the markdown carries no marker of its own.
    pub fn for_comment(comment: &Comment) -> Self {
        let (mut parsed, found) = extract(&comment.content);
        if !found.severity && !comment.severity.trim().is_empty() {
            parsed.severity = comment.severity.trim().to_owned();
        }
        if !found.title && !comment.title.trim().is_empty() {
            parsed.title = comment.title.trim().to_owned();
        }
        if !found.line_start {
            parsed.line_start = comment.line_start;
        }
        if !found.line_end {
            parsed.line_end = comment.line_end;
        }
        parsed
    }
}

/// Which markers were present in the source text.
#[derive(Debug, Default, Clone, Copy)]
struct Found {
    severity: bool,
    title: bool,
    line_start: bool,
    line_end: bool,
}

/// Parses a comment's raw markdown into its structured fields.
pub fn parse_comment_metadata(raw: &str) -> ParsedComment {
    extract(raw).0
}

fn extract(raw: &str) -> (ParsedComment, Found) {
    let mut found = Found::default();

    let severity = first_capture(&SEVERITY, raw)
        .inspect(|_| found.severity = true)
        .unwrap_or_else(|| DEFAULT_SEVERITY.to_owned());
    let line_start = first_capture(&LINE_START, raw)
        .inspect(|_| found.line_start = true)
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);
    let line_end = first_capture(&LINE_END, raw)
        .inspect(|_| found.line_end = true)
        .and_then(|n| n.parse().ok())
        .unwrap_or(0);

    let code_suggestion = section(raw, "suggested fix").and_then(|body| {
        let block = match fenced(&body) {
            Some(block) => block,
            None => CodeBlock { language: None, code: body.trim().to_owned() },
        };
        (!block.code.trim().is_empty()).then_some(block)
    });

    let ai_prompt = match section(raw, "prompt for ai") {
        Some(body) => {
            let text = match fenced(&body) {
                Some(block) => block.code,
                None => COPY_INSTRUCTION.replace_all(&body, "").into_owned(),
            };
            non_empty(text.trim())
        }
        None => INLINE_PROMPT
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .and_then(|m| non_empty(m.as_str().trim())),
    };

    let description = description(raw);

    let title = match first_capture(&TITLE, raw) {
        Some(title) => {
            found.title = true;
            title
        }
        None => derived_title(&description).unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
    };

    let parsed = ParsedComment {
        title,
        severity,
        line_start,
        line_end,
        description,
        code_suggestion,
        ai_prompt,
    };
    (parsed, found)
}

fn first_capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_owned())
        .filter(|s| !s.is_empty())
}

fn non_empty(s: &str) -> Option<String> {
    (!s.is_empty()).then(|| s.to_owned())
}

/// Body of the first `<details>` section whose summary contains `summary_needle`.
fn section(raw: &str, summary_needle: &str) -> Option<String> {
    DETAILS.captures_iter(raw).find_map(|caps| {
        let summary = TAG.replace_all(caps.get(1)?.as_str(), "").to_lowercase();
        summary
            .contains(summary_needle)
            .then(|| caps.get(2).map(|m| m.as_str().to_owned()).unwrap_or_default())
    })
}

/// The first fenced block inside `body`.
fn fenced(body: &str) -> Option<CodeBlock> {
    let caps = FENCE.captures(body)?;
    let language = caps.get(1).map(|m| m.as_str()).filter(|s| !s.is_empty()).map(str::to_owned);
    let code = caps.get(2).map(|m| m.as_str().to_owned()).unwrap_or_default();
    Some(CodeBlock { language, code })
}

/// Text left after removing all sections, the inline prompt, and marker lines.
fn description(raw: &str) -> String {
    let without_sections = DETAILS.replace_all(raw, "");
    let without_prompt = match INLINE_PROMPT.captures(&without_sections) {
        Some(caps) => {
            let start = caps.get(0).map_or(0, |m| m.start());
            let end = caps.get(1).map_or(start, |m| m.end());
            format!("{}{}", &without_sections[..start], &without_sections[end..])
        }
        None => without_sections.into_owned(),
    };
    let without_markers = MARKER_LINE.replace_all(&without_prompt, "");
    BLANK_RUN.replace_all(&without_markers, "\n\n").trim().to_owned()
}

/// First non-empty description line, stripped of heading/bold markers and
/// truncated for display.
fn derived_title(description: &str) -> Option<String> {
    description
        .lines()
        .map(|line| line.trim().trim_start_matches('#').replace("**", "").trim().to_owned())
        .find(|line| !line.is_empty())
        .map(|line| text::truncate(&line, DERIVED_TITLE_WIDTH))
}
