//! Per-file invocation of the external transformation tools.
//!
//! Both stages run fontforge scripts as subprocesses. A job never aborts the
//! pipeline: spawn failures and non-zero exits all collapse into a failed
//! [`JobResult`] carrying the captured diagnostics.

use std::{
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

use log::{debug, warn};

use crate::config::PipelineConfig;

/// Pipeline stage a job belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Ligature,
    Patch,
}

impl Stage {
    pub const fn name(self) -> &'static str {
        match self {
            Stage::Ligature => "ligature",
            Stage::Patch => "patch",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One file to transform. Built by the orchestrator, consumed by a single
/// worker, never shared.
#[derive(Debug, Clone)]
pub struct FontJob {
    pub source: PathBuf,
    pub output_dir: PathBuf,
    pub output_name: String,
    pub stage: Stage,
}

impl FontJob {
    /// Source filename for progress and summary lines.
    pub fn source_name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }
}

/// Outcome of one job, including every attempt's diagnostics.
#[derive(Debug)]
pub struct JobResult {
    pub job: FontJob,
    pub success: bool,
    pub diagnostics: String,
    pub attempts: u32,
}

/// Locations of the fontforge executable and the two scripts it runs.
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub fontforge: PathBuf,
    pub ligaturize_script: PathBuf,
    pub patch_script: PathBuf,
}

impl ToolPaths {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            fontforge: config.fontforge.clone(),
            ligaturize_script: config.ligaturize_script(),
            patch_script: config.patch_script(),
        }
    }
}

/// Patcher failure text that has been seen to succeed on a second attempt
/// with `--quiet --force`. Matched as literal substrings of the captured
/// diagnostics.
const RETRY_MARKERS: [&str; 2] = [
    "Error while generating glyphs",
    "Error while generating font file",
];

/// Whether a failed patch attempt is worth exactly one more try.
pub fn should_retry(diagnostics: &str) -> bool {
    RETRY_MARKERS
        .iter()
        .any(|marker| diagnostics.contains(marker))
}

/// Run the ligature-injection tool over one font. Single attempt.
pub fn run_ligature(job: FontJob, tools: &ToolPaths) -> JobResult {
    let args = ligature_args(&job, tools);
    let (success, diagnostics) = invoke(&tools.fontforge, &args);
    if !success {
        warn!("ligature job failed for {}", job.source_name());
    }
    JobResult {
        job,
        success,
        diagnostics,
        attempts: 1,
    }
}

/// Run the symbol patcher over one font, retrying once with `--quiet --force`
/// when the diagnostics match a known transient failure.
pub fn run_patch(job: FontJob, tools: &ToolPaths, makegroups: i32) -> JobResult {
    let args = patch_args(&job, tools, makegroups, false);
    let (success, diagnostics) = invoke(&tools.fontforge, &args);
    if success {
        return JobResult {
            job,
            success: true,
            diagnostics,
            attempts: 1,
        };
    }
    if !should_retry(&diagnostics) {
        warn!("patch job failed for {}", job.source_name());
        return JobResult {
            job,
            success: false,
            diagnostics,
            attempts: 1,
        };
    }

    debug!("retrying patch with --quiet --force for {}", job.source_name());
    let args = patch_args(&job, tools, makegroups, true);
    let (success, retry_diagnostics) = invoke(&tools.fontforge, &args);
    if !success {
        warn!("patch retry failed for {}", job.source_name());
    }
    JobResult {
        job,
        success,
        diagnostics: format!("{diagnostics}\n{retry_diagnostics}"),
        attempts: 2,
    }
}

fn ligature_args(job: &FontJob, tools: &ToolPaths) -> Vec<OsString> {
    vec![
        "-lang".into(),
        "py".into(),
        "-script".into(),
        tools.ligaturize_script.clone().into(),
        job.source.clone().into(),
        "--output-dir".into(),
        job.output_dir.clone().into(),
        "--output-name".into(),
        job.output_name.clone().into(),
    ]
}

fn patch_args(job: &FontJob, tools: &ToolPaths, makegroups: i32, forced: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-script".into(),
        tools.patch_script.clone().into(),
        job.source.clone().into(),
        "--out".into(),
        job.output_dir.clone().into(),
        "--complete".into(),
        "--makegroups".into(),
        makegroups.to_string().into(),
    ];
    if forced {
        args.push("--quiet".into());
        args.push("--force".into());
    }
    args
}

/// Spawn the tool and capture its combined output. Spawn errors become a
/// failed result instead of propagating.
fn invoke(fontforge: &Path, args: &[OsString]) -> (bool, String) {
    match Command::new(fontforge)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
    {
        Ok(output) => {
            let mut diagnostics = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr);
            if !stderr.is_empty() {
                if !diagnostics.is_empty() {
                    diagnostics.push('\n');
                }
                diagnostics.push_str(&stderr);
            }
            (output.status.success(), diagnostics)
        }
        Err(e) => (
            false,
            format!("failed to spawn {}: {e}", fontforge.display()),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools() -> ToolPaths {
        ToolPaths {
            fontforge: PathBuf::from("/opt/missing/fontforge"),
            ligaturize_script: PathBuf::from("/work/Ligaturizer/ligaturize.py"),
            patch_script: PathBuf::from("/work/FontPatcher/font-patcher"),
        }
    }

    fn ligature_job() -> FontJob {
        FontJob {
            source: PathBuf::from("/work/Original/Hack-Bold.ttf"),
            output_dir: PathBuf::from("/work/Ligaturized"),
            output_name: "Hack".to_string(),
            stage: Stage::Ligature,
        }
    }

    fn as_strings(args: &[OsString]) -> Vec<String> {
        args.iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn ligature_argument_shape() {
        let args = as_strings(&ligature_args(&ligature_job(), &tools()));
        assert_eq!(
            args,
            [
                "-lang",
                "py",
                "-script",
                "/work/Ligaturizer/ligaturize.py",
                "/work/Original/Hack-Bold.ttf",
                "--output-dir",
                "/work/Ligaturized",
                "--output-name",
                "Hack",
            ]
        );
    }

    #[test]
    fn patch_argument_shape() {
        let job = FontJob {
            source: PathBuf::from("/work/Ligaturized/Hack.ttf"),
            output_dir: PathBuf::from("/work/Output"),
            output_name: "Hack".to_string(),
            stage: Stage::Patch,
        };

        let args = as_strings(&patch_args(&job, &tools(), 4, false));
        assert_eq!(
            args,
            [
                "-script",
                "/work/FontPatcher/font-patcher",
                "/work/Ligaturized/Hack.ttf",
                "--out",
                "/work/Output",
                "--complete",
                "--makegroups",
                "4",
            ]
        );

        let forced = as_strings(&patch_args(&job, &tools(), -1, true));
        assert_eq!(forced[7], "-1");
        assert_eq!(&forced[8..], ["--quiet", "--force"]);
    }

    #[test]
    fn retry_markers_match_substrings() {
        assert!(should_retry(
            "Traceback (most recent call last):\nError while generating glyphs for Hack"
        ));
        assert!(should_retry("Error while generating font file"));
        assert!(!should_retry("Segmentation fault"));
        assert!(!should_retry(""));
    }

    #[test]
    fn spawn_failure_becomes_failed_result() {
        let result = run_ligature(ligature_job(), &tools());
        assert!(!result.success);
        assert_eq!(result.attempts, 1);
        assert!(result.diagnostics.contains("failed to spawn"));
    }

    #[test]
    fn spawn_failure_on_patch_is_not_retried() {
        let job = FontJob {
            source: PathBuf::from("/work/Ligaturized/Hack.ttf"),
            output_dir: PathBuf::from("/work/Output"),
            output_name: "Hack".to_string(),
            stage: Stage::Patch,
        };
        let result = run_patch(job, &tools(), 4);
        assert!(!result.success);
        assert_eq!(result.attempts, 1);
    }
}
