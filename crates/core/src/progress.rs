//! Progress reporting hooks.
//!
//! The pipeline never prints; callers inject a [`Reporter`] and render
//! progress however they like. All hooks default to no-ops.

use crate::job::{JobResult, Stage};

/// Observer for pipeline progress events.
///
/// Implementations must be `Sync`: `job_completed` is called from worker
/// threads as jobs finish, in completion order, not submission order.
pub trait Reporter: Sync {
    fn download_started(&self, _url: &str) {}

    /// Called per chunk while the patcher archive streams in. `total` is the
    /// expected size when the server reported one.
    fn download_progress(&self, _received: u64, _total: Option<u64>) {}

    fn download_finished(&self, _bytes: u64) {}

    fn stage_started(&self, _stage: Stage, _total: usize) {}

    /// `completed` counts all finished jobs in the stage so far, this one
    /// included; `completed / total` is the stage's fractional progress.
    fn job_completed(&self, _stage: Stage, _completed: usize, _total: usize, _result: &JobResult) {}
}

/// Reporter that discards all events.
pub struct NullReporter;

impl Reporter for NullReporter {}
