//! Interfaces to the two external collaborators: the review service that
//! analyses a change set and streams back comments, and the diff provider that
//! lists what changed.
//!
//! The event loop is generic over `ReviewService` so tests can drive it with an
//! in-memory fake; the futures are `Send` because polls run in spawned tasks.

use std::future::Future;

use crate::error::ServiceError;
use crate::types::{AnalysisStatus, ChangedFile, Comment};

pub trait ReviewService: Send + Sync + 'static {
    /// Submits the change set and returns the opaque analysis id.
    fn submit_review(
        &self,
        files: &[ChangedFile],
    ) -> impl Future<Output = Result<String, ServiceError>> + Send;

    /// Returns every comment available so far. Safe to call repeatedly; each
    /// call is expected to return a superset of the previous one.
    fn poll_comments(
        &self,
        analysis_id: &str,
    ) -> impl Future<Output = Result<Vec<Comment>, ServiceError>> + Send;

    fn get_status(
        &self,
        analysis_id: &str,
    ) -> impl Future<Output = Result<AnalysisStatus, ServiceError>> + Send;

    /// Best-effort cancellation of the server-side analysis.
    fn stop_analysis(
        &self,
        analysis_id: &str,
    ) -> impl Future<Output = Result<(), ServiceError>> + Send;
}

/// Lists the files changed in the working tree, in a stable order.
pub trait DiffProvider {
    fn changed_files(&self) -> Result<Vec<ChangedFile>, ServiceError>;
}
