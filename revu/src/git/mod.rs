//! Git integration for revu.
//!
//! `git2::Repository` is `!Send`, so the provider opens the repository inside
//! whichever call needs it and returns fully owned `ChangedFile`s. Callers on
//! the async runtime run it under `spawn_blocking`.
pub mod provider;

pub use provider::GitDiffProvider;
