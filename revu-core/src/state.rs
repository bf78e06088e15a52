//! Session state for one review session.
//!
//! A single `SessionState` is owned by the event loop. It is mutated only by
//! the navigation reducer (`nav::reduce`) and by the poll merge step
//! (`merge_comments` / `set_status`); the renderer reads it and hands back the
//! clamped scroll offsets through `apply_viewport`.

use tracing::debug;

use crate::types::{AnalysisStatus, ChangedFile, Comment, FileGroup, SessionStatus};

/// Which layout is on screen.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Single full-width file/comment list.
    #[default]
    List,
    /// Split view: list on the left, selected comment on the right.
    Detail,
}

/// Which panel receives scroll/navigation input in detail mode.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    #[default]
    Left,
    Right,
}

impl Panel {
    pub fn toggle(self) -> Self {
        match self {
            Panel::Left => Panel::Right,
            Panel::Right => Panel::Left,
        }
    }
}

/// A position in the flattened file/comment list.
///
/// `comment == None` means the file header itself is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub file: usize,
    pub comment: Option<usize>,
}

/// The canonical in-memory model of a review session.
#[derive(Debug, Default, Clone)]
pub struct SessionState {
    /// File groups in first-seen order; never re-sorted.
    pub files: Vec<FileGroup>,
    pub mode: Mode,
    pub focus: Panel,
    pub selected_file: usize,
    /// Selected comment within the selected file, `None` for the file header.
    pub selected_comment: Option<usize>,
    /// Lines scrolled past the top of the detail (right) panel.
    pub detail_scroll: usize,
    /// Lines scrolled past the top of the list / left panel.
    pub left_scroll: usize,
    /// Keep the selected list row in view on the next render. Cleared when the
    /// user scrolls the left panel explicitly.
    pub follow_cursor: bool,
    pub total_comments: usize,
    pub resolved_comments: usize,
    pub status: SessionStatus,
    pub spinner_frame: usize,
    /// Files submitted for review, as reported by the diff provider.
    pub changed_files: Vec<ChangedFile>,
    pub show_help: bool,
    /// One-shot footer message, cleared by the next key press.
    pub notice: Option<String>,
}

impl SessionState {
    pub fn new(changed_files: Vec<ChangedFile>) -> Self {
        Self {
            changed_files,
            follow_cursor: true,
            ..Self::default()
        }
    }

    /// Merges newly polled comments, skipping duplicates.
    ///
    /// A comment is a duplicate when its file group already holds a comment
    /// with the same start line and title. Returns the number of comments added.
    pub fn merge_comments<I>(&mut self, comments: I) -> usize
    where
        I: IntoIterator<Item = Comment>,
    {
        let mut added = 0;
        for comment in comments {
            let idx = match self.files.iter().position(|g| g.path == comment.file_path) {
                Some(idx) => idx,
                None => {
                    self.files.push(FileGroup::new(comment.file_path.clone()));
                    self.files.len() - 1
                }
            };
            let group = &mut self.files[idx];
            if group.contains_duplicate(&comment) {
                continue;
            }
            if comment.resolved {
                self.resolved_comments += 1;
            }
            group.comments.push(comment);
            self.total_comments += 1;
            added += 1;
        }
        if added > 0 {
            debug!(added, total = self.total_comments, "merged polled comments");
        }
        self.clamp_selection();
        added
    }

    /// Applies a status reported by the review service. Returns `true` when
    /// the session status changed.
    pub fn set_status(&mut self, status: AnalysisStatus) -> bool {
        let next = SessionStatus::from(status);
        let changed = self.status != next;
        self.status = next;
        changed
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn selected_group(&self) -> Option<&FileGroup> {
        self.files.get(self.selected_file)
    }

    /// The comment under the cursor, if the cursor is not on a file header.
    pub fn current_comment(&self) -> Option<&Comment> {
        let group = self.selected_group()?;
        group.comments.get(self.selected_comment?)
    }

    pub fn cursor(&self) -> Cursor {
        Cursor { file: self.selected_file, comment: self.selected_comment }
    }

    /// Every selectable row: each file header, followed by its comments when
    /// the file is expanded.
    pub fn cursor_items(&self) -> Vec<Cursor> {
        let mut items = Vec::new();
        for (file, group) in self.files.iter().enumerate() {
            items.push(Cursor { file, comment: None });
            if group.expanded {
                items.extend((0..group.comments.len()).map(|c| Cursor { file, comment: Some(c) }));
            }
        }
        items
    }

    /// Moves the cursor `delta` rows through the flattened list, clamping at
    /// both ends. Returns `true` when the selection changed; a change resets
    /// the detail scroll so new content starts at the top.
    pub fn move_cursor(&mut self, delta: isize) -> bool {
        let items = self.cursor_items();
        if items.is_empty() {
            return false;
        }
        let current = self.cursor();
        let pos = items.iter().position(|c| *c == current).unwrap_or(0);
        let target = pos.saturating_add_signed(delta).min(items.len() - 1);
        let next = items[target];
        self.follow_cursor = true;
        if next == current {
            return false;
        }
        self.selected_file = next.file;
        self.selected_comment = next.comment;
        self.detail_scroll = 0;
        true
    }

    /// Toggles the selected file's expansion. Collapsing moves the cursor back
    /// to the file header.
    pub fn toggle_selected_file(&mut self) -> bool {
        let Some(group) = self.files.get_mut(self.selected_file) else {
            return false;
        };
        group.expanded = !group.expanded;
        if !group.expanded && self.selected_comment.is_some() {
            self.selected_comment = None;
            self.detail_scroll = 0;
        }
        self.follow_cursor = true;
        true
    }

    /// Restores the selection invariants after files or comments change.
    pub fn clamp_selection(&mut self) {
        if self.files.is_empty() {
            self.selected_file = 0;
            self.selected_comment = None;
            return;
        }
        self.selected_file = self.selected_file.min(self.files.len() - 1);
        let group = &self.files[self.selected_file];
        if let Some(c) = self.selected_comment {
            if !group.expanded || c >= group.comments.len() {
                self.selected_comment = None;
            }
        }
    }

    /// Provisionally scrolls a panel; the renderer clamps against real content.
    pub fn scroll(&mut self, panel: Panel, delta: isize) {
        match panel {
            Panel::Left => {
                self.left_scroll = self.left_scroll.saturating_add_signed(delta);
                self.follow_cursor = false;
            }
            Panel::Right => {
                self.detail_scroll = self.detail_scroll.saturating_add_signed(delta);
            }
        }
    }

    /// Stores the scroll offsets the renderer actually used.
    pub fn apply_viewport(&mut self, left_scroll: usize, detail_scroll: usize) {
        self.left_scroll = left_scroll;
        self.detail_scroll = detail_scroll;
    }
}

/// Largest valid scroll offset for `total` lines in a `viewport`-high window.
pub fn max_scroll(total: usize, viewport: usize) -> usize {
    total.saturating_sub(viewport)
}

/// Clamps `offset` to `[0, max(0, total - viewport)]`.
pub fn clamp_scroll(offset: usize, total: usize, viewport: usize) -> usize {
    offset.min(max_scroll(total, viewport))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(path: &str, line: u32, title: &str) -> Comment {
        Comment {
            id: format!("{path}:{line}:{title}"),
            file_path: path.into(),
            line_start: line,
            line_end: line,
            severity: "High".into(),
            confidence: String::new(),
            title: title.into(),
            content: String::new(),
            created_at: None,
            resolved: false,
        }
    }

    #[test]
    fn merge_groups_by_path_in_first_seen_order() {
        let mut s = SessionState::new(Vec::new());
        let added = s.merge_comments([
            comment("b.rs", 1, "x"),
            comment("a.rs", 2, "y"),
            comment("b.rs", 3, "z"),
        ]);
        assert_eq!(added, 3);
        let paths: Vec<_> = s.files.iter().map(|g| g.path.as_str()).collect();
        assert_eq!(paths, ["b.rs", "a.rs"]);
        assert_eq!(s.files[0].comments.len(), 2);
    }

    #[test]
    fn duplicate_comment_is_not_counted_twice() {
        let mut s = SessionState::new(Vec::new());
        s.merge_comments([comment("a.rs", 10, "Leak")]);
        let mut again = comment("a.rs", 10, "Leak");
        again.id = "different-id".into();
        assert_eq!(s.merge_comments([again]), 0);
        assert_eq!(s.total_comments, 1);
        assert_eq!(s.files[0].comments.len(), 1);
        // Same title on another line is a distinct finding.
        assert_eq!(s.merge_comments([comment("a.rs", 11, "Leak")]), 1);
        assert_eq!(s.total_comments, 2);
    }

    #[test]
    fn resolved_comments_are_counted_on_merge() {
        let mut s = SessionState::new(Vec::new());
        let mut c = comment("a.rs", 1, "Done");
        c.resolved = true;
        s.merge_comments([c, comment("a.rs", 2, "Open")]);
        assert_eq!((s.resolved_comments, s.total_comments), (1, 2));
    }

    #[test]
    fn cursor_skips_collapsed_comments_and_clamps() {
        let mut s = SessionState::new(Vec::new());
        s.merge_comments([comment("a.rs", 1, "x"), comment("b.rs", 1, "y")]);
        assert!(s.move_cursor(1));
        assert_eq!(s.cursor(), Cursor { file: 1, comment: None });
        assert!(!s.move_cursor(1));
        assert!(s.move_cursor(-5));
        assert_eq!(s.cursor(), Cursor { file: 0, comment: None });
    }

    #[test]
    fn collapsing_returns_cursor_to_header() {
        let mut s = SessionState::new(Vec::new());
        s.merge_comments([comment("a.rs", 1, "x")]);
        s.toggle_selected_file();
        s.move_cursor(1);
        assert_eq!(s.selected_comment, Some(0));
        s.detail_scroll = 7;
        s.toggle_selected_file();
        assert_eq!(s.selected_comment, None);
        assert_eq!(s.detail_scroll, 0);
    }

    #[test]
    fn explicit_left_scroll_stops_following_cursor() {
        let mut s = SessionState::new(Vec::new());
        assert!(s.follow_cursor);
        s.scroll(Panel::Left, 3);
        assert!(!s.follow_cursor);
        s.scroll(Panel::Left, -10);
        assert_eq!(s.left_scroll, 0);
    }

    #[test]
    fn clamp_scroll_bounds() {
        assert_eq!(clamp_scroll(50, 20, 5), 15);
        assert_eq!(clamp_scroll(3, 4, 10), 0);
        assert_eq!(clamp_scroll(2, 20, 5), 2);
    }
}
