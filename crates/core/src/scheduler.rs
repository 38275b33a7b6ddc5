//! Bounded-parallel execution of a stage's jobs.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use crate::{
    error::Result,
    job::{FontJob, JobResult, Stage},
    progress::Reporter,
};

/// Success/failure accounting for one stage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StageStats {
    pub succeeded: usize,
    pub failed: usize,
}

impl StageStats {
    pub fn from_results(results: &[JobResult]) -> Self {
        let succeeded = results.iter().filter(|r| r.success).count();
        Self {
            succeeded,
            failed: results.len() - succeeded,
        }
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Run every job on a pool of `workers` threads and collect all results.
///
/// Jobs complete in no particular order and a failure never cancels its
/// siblings; the returned vector preserves submission order. Each completion
/// bumps a shared counter and reports `completed / total` progress.
pub fn run_stage<F>(
    stage: Stage,
    jobs: Vec<FontJob>,
    workers: usize,
    reporter: &dyn Reporter,
    exec: F,
) -> Result<Vec<JobResult>>
where
    F: Fn(FontJob) -> JobResult + Sync + Send,
{
    let total = jobs.len();
    reporter.stage_started(stage, total);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers.max(1))
        .build()?;

    let completed = AtomicUsize::new(0);
    let results = pool.install(|| {
        jobs.into_par_iter()
            .map(|job| {
                let result = exec(job);
                let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                reporter.job_completed(stage, done, total, &result);
                result
            })
            .collect()
    });

    Ok(results)
}

#[cfg(test)]
mod tests {
    use std::{path::PathBuf, sync::Mutex};

    use super::*;
    use crate::progress::NullReporter;

    fn job(name: &str) -> FontJob {
        FontJob {
            source: PathBuf::from(format!("/in/{name}.ttf")),
            output_dir: PathBuf::from("/out"),
            output_name: name.to_string(),
            stage: Stage::Ligature,
        }
    }

    fn exec(job: FontJob) -> JobResult {
        let success = !job.output_name.starts_with("bad");
        JobResult {
            job,
            success,
            diagnostics: String::new(),
            attempts: 1,
        }
    }

    #[derive(Default)]
    struct RecordingReporter {
        events: Mutex<Vec<(usize, usize)>>,
    }

    impl Reporter for RecordingReporter {
        fn job_completed(
            &self,
            _stage: Stage,
            completed: usize,
            total: usize,
            _result: &JobResult,
        ) {
            self.events.lock().unwrap().push((completed, total));
        }
    }

    #[test]
    fn failures_do_not_cancel_siblings() {
        let jobs = vec![job("a"), job("bad-b"), job("c"), job("bad-d"), job("e")];

        let results = run_stage(Stage::Ligature, jobs, 2, &NullReporter, exec).unwrap();

        assert_eq!(results.len(), 5);
        let stats = StageStats::from_results(&results);
        assert_eq!(stats.succeeded, 3);
        assert_eq!(stats.failed, 2);
        assert_eq!(stats.total(), 5);
        assert!(!stats.all_succeeded());
    }

    #[test]
    fn progress_counter_covers_every_completion() {
        let jobs: Vec<_> = (0..8).map(|i| job(&format!("f{i}"))).collect();
        let reporter = RecordingReporter::default();

        run_stage(Stage::Ligature, jobs, 3, &reporter, exec).unwrap();

        let mut completions: Vec<usize> = reporter
            .events
            .lock()
            .unwrap()
            .iter()
            .map(|(done, total)| {
                assert_eq!(*total, 8);
                *done
            })
            .collect();
        completions.sort_unstable();
        assert_eq!(completions, (1..=8).collect::<Vec<_>>());
    }

    #[test]
    fn empty_stage_completes_immediately() {
        let results = run_stage(Stage::Patch, Vec::new(), 4, &NullReporter, exec).unwrap();
        assert!(results.is_empty());
    }
}
