//! Console rendering of pipeline progress and the final summary.

use std::{
    sync::atomic::{AtomicU64, Ordering},
    time::Duration,
};

use fontpatch_core::{JobResult, Reporter, RunSummary, Stage, StageStats};

/// Println-based [`Reporter`]. Safe to share across worker threads.
pub struct ConsoleReporter {
    last_percent: AtomicU64,
    last_bytes: AtomicU64,
}

/// Byte interval between progress lines when the total size is unknown.
const BYTE_STEP: u64 = 8 * 1024 * 1024;

impl ConsoleReporter {
    pub fn new() -> Self {
        Self {
            last_percent: AtomicU64::new(0),
            last_bytes: AtomicU64::new(0),
        }
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl Reporter for ConsoleReporter {
    fn download_started(&self, url: &str) {
        println!("Downloading {url}");
        self.last_percent.store(0, Ordering::Relaxed);
        self.last_bytes.store(0, Ordering::Relaxed);
    }

    fn download_progress(&self, received: u64, total: Option<u64>) {
        match total {
            Some(total) if total > 0 => {
                let percent = received * 100 / total;
                let step = percent / 10 * 10;
                if step > self.last_percent.swap(step, Ordering::Relaxed) {
                    println!("  {percent}%");
                }
            }
            _ => {
                let step = received / BYTE_STEP;
                if step > self.last_bytes.swap(step, Ordering::Relaxed) {
                    println!("  {:.1} MB", received as f64 / 1024.0 / 1024.0);
                }
            }
        }
    }

    fn download_finished(&self, bytes: u64) {
        println!("  Downloaded ({:.2} MB)", bytes as f64 / 1024.0 / 1024.0);
    }

    fn stage_started(&self, stage: Stage, total: usize) {
        println!("\nRunning {stage} stage over {total} fonts");
    }

    fn job_completed(&self, _stage: Stage, completed: usize, total: usize, result: &JobResult) {
        let mark = if result.success { '✓' } else { '✗' };
        println!("  [{completed}/{total}] {mark} {}", result.job.source_name());
    }
}

pub fn print_summary(summary: &RunSummary, elapsed: Duration) {
    println!("\n═══════════════════════════════════════════════════════════════════════════════");
    println!("✨ Run complete in {:.2}s", elapsed.as_secs_f64());
    print_stage_line("ligature", &summary.stage1);
    print_stage_line("patch", &summary.stage2);
    println!("   Output files: {}", summary.outputs.len());
    for path in &summary.outputs {
        println!("     {}", path.display());
    }

    if !summary.failures.is_empty() {
        println!("\nFailed jobs:");
        for failure in &summary.failures {
            print_failure(failure);
        }
    }
    println!("═══════════════════════════════════════════════════════════════════════════════");
}

fn print_stage_line(name: &str, stats: &StageStats) {
    println!(
        "   {name}: {} succeeded, {} failed",
        stats.succeeded, stats.failed
    );
}

fn print_failure(failure: &JobResult) {
    eprintln!(
        "  ✗ [{}] {} ({} attempt{})",
        failure.job.stage,
        failure.job.source_name(),
        failure.attempts,
        if failure.attempts == 1 { "" } else { "s" }
    );
    for line in failure.diagnostics.lines().filter(|l| !l.trim().is_empty()) {
        eprintln!("      {line}");
    }
}
