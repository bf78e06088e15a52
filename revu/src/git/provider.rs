//! `DiffProvider` over the working tree of a git repository.
//!
//! Compares the HEAD tree against the working directory (through the index),
//! so staged and unstaged edits both count, and includes untracked files with
//! their content. An unborn HEAD diffs against the empty tree.

use std::path::{Path, PathBuf};

use git2::{Delta, Diff, DiffOptions, Patch, Repository};
use revu_core::error::ServiceError;
use revu_core::service::DiffProvider;
use revu_core::types::{ChangeStatus, ChangedFile};
use tracing::debug;

pub struct GitDiffProvider {
    path: PathBuf,
}

impl GitDiffProvider {
    /// `path` may be anywhere inside the work tree; the repository is found
    /// by walking up.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DiffProvider for GitDiffProvider {
    fn changed_files(&self) -> Result<Vec<ChangedFile>, ServiceError> {
        let repo = Repository::discover(&self.path).map_err(diff_error)?;
        let head_tree = match repo.head() {
            Ok(head) => Some(head.peel_to_tree().map_err(diff_error)?),
            Err(_) => None,
        };

        let mut opts = DiffOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .show_untracked_content(true);
        let diff = repo
            .diff_tree_to_workdir_with_index(head_tree.as_ref(), Some(&mut opts))
            .map_err(diff_error)?;

        let files = extract_files(&diff)?;
        debug!(count = files.len(), "changed files collected");
        Ok(files)
    }
}

fn diff_error(e: git2::Error) -> ServiceError {
    ServiceError::Diff(e.message().to_owned())
}

/// One `ChangedFile` per delta, in diff (path) order, with line counts and
/// patch text taken from the per-file patch.
fn extract_files(diff: &Diff<'_>) -> Result<Vec<ChangedFile>, ServiceError> {
    let mut files = Vec::new();
    for (idx, delta) in diff.deltas().enumerate() {
        let status = match delta.status() {
            Delta::Added => ChangeStatus::Added,
            Delta::Deleted => ChangeStatus::Deleted,
            Delta::Untracked => ChangeStatus::Untracked,
            Delta::Modified
            | Delta::Renamed
            | Delta::Copied
            | Delta::Typechange
            | Delta::Conflicted => ChangeStatus::Modified,
            Delta::Unmodified | Delta::Ignored | Delta::Unreadable => continue,
        };
        let path = delta
            .new_file()
            .path()
            .or_else(|| delta.old_file().path())
            .unwrap_or(Path::new("unknown"))
            .to_string_lossy()
            .into_owned();

        let (added, deleted, patch) = match Patch::from_diff(diff, idx).map_err(diff_error)? {
            Some(mut patch) => {
                let (_, added, deleted) = patch.line_stats().map_err(diff_error)?;
                let text = patch
                    .to_buf()
                    .map_err(diff_error)?
                    .as_str()
                    .map(str::to_owned)
                    .filter(|s| !s.is_empty());
                (added, deleted, text)
            }
            None => (0, 0, None),
        };
        files.push(ChangedFile { path, status, added, deleted, patch });
    }
    Ok(files)
}
