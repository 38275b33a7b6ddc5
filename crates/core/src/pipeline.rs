//! Two-stage batch pipeline over a directory of fonts.
//!
//! Stage 1 injects ligatures into every input font; stage 2 patches the
//! stage-1 outputs with supplemental symbol glyphs. Only artifact acquisition
//! and an empty input directory are fatal; individual job failures are
//! collected into the run summary.

use std::{collections::HashMap, io::Cursor, path::PathBuf};

use log::{info, warn};

use crate::{
    cache,
    config::{PATCHER_URL, PipelineConfig},
    error::{Error, Result},
    io::{dir_contents, ensure_dir, list_fonts, recreate_dir},
    job::{self, FontJob, JobResult, Stage, ToolPaths},
    naming::normalize,
    progress::Reporter,
    scheduler::{StageStats, run_stage},
};

/// What a completed run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub stage1: StageStats,
    pub stage2: StageStats,
    /// Font files present in the output directory after stage 2.
    pub outputs: Vec<PathBuf>,
    /// Every failed job from both stages, with diagnostics.
    pub failures: Vec<JobResult>,
}

pub struct PipelineContext {
    config: PipelineConfig,
    tools: ToolPaths,
}

impl PipelineContext {
    pub fn new(config: PipelineConfig) -> Self {
        let tools = ToolPaths::from_config(&config);
        Self { config, tools }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the whole pipeline to completion.
    pub fn run(&self, reporter: &dyn Reporter) -> Result<RunSummary> {
        self.prepare_directories()?;
        self.acquire_patcher(reporter)?;
        let inputs = self.enumerate_inputs()?;

        let stage1_results = self.run_ligature_stage(inputs, reporter)?;

        // Stage 2 sees whatever actually landed on disk, not the nominal
        // input list; stage-1 failures only shrink it.
        let patch_inputs = list_fonts(&self.config.ligaturized_dir)?;
        let stage2_results = self.run_patch_stage(patch_inputs, reporter)?;

        self.summarize(stage1_results, stage2_results)
    }

    /// Output directories are rebuilt from scratch; the cache and the
    /// extracted patcher survive across runs.
    fn prepare_directories(&self) -> Result<()> {
        recreate_dir(&self.config.ligaturized_dir)?;
        recreate_dir(&self.config.output_dir)?;
        ensure_dir(&self.config.cache_dir)?;
        ensure_dir(&self.config.patcher_dir)
    }

    fn acquire_patcher(&self, reporter: &dyn Reporter) -> Result<()> {
        let bytes = cache::ensure(PATCHER_URL, &self.config.cache_path(), reporter)?;
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
        archive.extract(&self.config.patcher_dir)?;
        info!(
            "patcher ready in {}",
            self.config.patcher_dir.display()
        );
        Ok(())
    }

    fn enumerate_inputs(&self) -> Result<Vec<PathBuf>> {
        let fonts = list_fonts(&self.config.input_dir)?;
        if fonts.is_empty() {
            return Err(Error::NoFonts {
                dir: self.config.input_dir.clone(),
                contents: dir_contents(&self.config.input_dir),
            });
        }
        info!(
            "found {} font files in {}",
            fonts.len(),
            self.config.input_dir.display()
        );
        Ok(fonts)
    }

    fn run_ligature_stage(
        &self,
        inputs: Vec<PathBuf>,
        reporter: &dyn Reporter,
    ) -> Result<Vec<JobResult>> {
        let jobs = self.ligature_jobs(inputs);
        run_stage(Stage::Ligature, jobs, self.config.workers, reporter, |job| {
            job::run_ligature(job, &self.tools)
        })
    }

    fn ligature_jobs(&self, inputs: Vec<PathBuf>) -> Vec<FontJob> {
        let mut seen: HashMap<String, String> = HashMap::new();
        inputs
            .into_iter()
            .map(|source| {
                let filename = source
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                let output_name = normalize(&filename);
                if let Some(previous) = seen.insert(output_name.clone(), filename.clone()) {
                    warn!(
                        "{filename} and {previous} both normalize to '{output_name}'; \
                         the job finishing last wins"
                    );
                }
                FontJob {
                    source,
                    output_dir: self.config.ligaturized_dir.clone(),
                    output_name,
                    stage: Stage::Ligature,
                }
            })
            .collect()
    }

    fn run_patch_stage(
        &self,
        inputs: Vec<PathBuf>,
        reporter: &dyn Reporter,
    ) -> Result<Vec<JobResult>> {
        let jobs: Vec<FontJob> = inputs
            .into_iter()
            .map(|source| {
                // The patcher names its own output per the naming scheme;
                // the name here is only used for progress lines.
                let output_name = source
                    .file_stem()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                FontJob {
                    source,
                    output_dir: self.config.output_dir.clone(),
                    output_name,
                    stage: Stage::Patch,
                }
            })
            .collect();

        let makegroups = self.config.makegroups;
        run_stage(Stage::Patch, jobs, self.config.workers, reporter, |job| {
            job::run_patch(job, &self.tools, makegroups)
        })
    }

    fn summarize(
        &self,
        stage1: Vec<JobResult>,
        stage2: Vec<JobResult>,
    ) -> Result<RunSummary> {
        let outputs = list_fonts(&self.config.output_dir)?;
        let summary = RunSummary {
            stage1: StageStats::from_results(&stage1),
            stage2: StageStats::from_results(&stage2),
            outputs,
            failures: stage1
                .into_iter()
                .chain(stage2)
                .filter(|r| !r.success)
                .collect(),
        };
        info!(
            "run finished: {} ligaturized, {} patched, {} output files, {} failed jobs",
            summary.stage1.succeeded,
            summary.stage2.succeeded,
            summary.outputs.len(),
            summary.failures.len()
        );
        Ok(summary)
    }
}

/// Convenience wrapper for one-shot runs.
pub fn run(config: PipelineConfig, reporter: &dyn Reporter) -> Result<RunSummary> {
    PipelineContext::new(config).run(reporter)
}
