use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single review finding tied to a file and line range.
///
/// Owned by the review service; the session only ever reads it. `content` is the
/// raw markdown body that `parser::parse_comment_metadata` picks apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub file_path: String,
    #[serde(default)]
    pub line_start: u32,
    #[serde(default)]
    pub line_end: u32,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub confidence: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Set by the service when the finding was already addressed.
    #[serde(default)]
    pub resolved: bool,
}

/// The comments belonging to one file path, in arrival order.
///
/// Groups start collapsed and are created lazily the first time a comment for
/// the path is merged into the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileGroup {
    pub path: String,
    pub comments: Vec<Comment>,
    pub expanded: bool,
}

impl FileGroup {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), comments: Vec::new(), expanded: false }
    }

    /// Returns `true` when a comment with the same start line and title is present.
    pub fn contains_duplicate(&self, comment: &Comment) -> bool {
        self.comments
            .iter()
            .any(|c| c.line_start == comment.line_start && c.title == comment.title)
    }
}

/// Analysis state as reported by the review service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnalysisStatus {
    Running,
    Completed,
    Failed,
    Interrupted,
}

/// Session-level status shown in the summary line and footer.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    #[default]
    Running,
    Completed,
    Failed,
}

impl From<AnalysisStatus> for SessionStatus {
    fn from(status: AnalysisStatus) -> Self {
        match status {
            AnalysisStatus::Running => SessionStatus::Running,
            AnalysisStatus::Completed => SessionStatus::Completed,
            AnalysisStatus::Failed | AnalysisStatus::Interrupted => SessionStatus::Failed,
        }
    }
}

/// Change status of a file in the working tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeStatus {
    Added,
    Modified,
    Deleted,
    Untracked,
}

/// One entry of the diff provider's changed-file list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangedFile {
    pub path: String,
    pub status: ChangeStatus,
    pub added: usize,
    pub deleted: usize,
    /// Unified patch text for the file, when the provider computed one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
}

/// Canonical severity classes. Labels outside the four known values are kept
/// verbatim on the comment and fall into `Other` for styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Other,
}

impl Severity {
    /// Display order for badge counts.
    pub const ALL: [Severity; 5] =
        [Severity::Critical, Severity::High, Severity::Medium, Severity::Low, Severity::Other];

    /// Classifies a free-form severity label (case-insensitive).
    pub fn classify(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::Other,
        }
    }

    /// Single-letter badge, e.g. `H` for `High`. Unknown labels use their own
    /// first letter so "Info" still reads as `I`.
    pub fn badge_letter(label: &str) -> char {
        match Self::classify(label) {
            Severity::Critical => 'C',
            Severity::High => 'H',
            Severity::Medium => 'M',
            Severity::Low => 'L',
            Severity::Other => label
                .trim()
                .chars()
                .next()
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or('?'),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_classification_is_case_insensitive() {
        assert_eq!(Severity::classify("CRITICAL"), Severity::Critical);
        assert_eq!(Severity::classify(" high "), Severity::High);
        assert_eq!(Severity::classify("Info"), Severity::Other);
    }

    #[test]
    fn badge_letter_for_unknown_label_uses_first_letter() {
        assert_eq!(Severity::badge_letter("High"), 'H');
        assert_eq!(Severity::badge_letter("info"), 'I');
        assert_eq!(Severity::badge_letter(""), '?');
    }

    #[test]
    fn interrupted_analysis_maps_to_failed_session() {
        assert_eq!(SessionStatus::from(AnalysisStatus::Interrupted), SessionStatus::Failed);
        assert_eq!(SessionStatus::from(AnalysisStatus::Completed), SessionStatus::Completed);
    }

    #[test]
    fn comment_deserializes_with_missing_optional_fields() {
        let json = r#"{"id":"c1","filePath":"src/a.ts","lineStart":10,"title":"Leak"}"#;
        let c: Comment = serde_json::from_str(json).unwrap();
        assert_eq!(c.file_path, "src/a.ts");
        assert_eq!(c.line_start, 10);
        assert_eq!(c.line_end, 0);
        assert!(c.content.is_empty());
        assert!(!c.resolved);
    }
}
