//! CLI definitions and command dispatch.

use std::{
    fs::remove_dir_all,
    path::{Path, PathBuf},
    time::Instant,
};

use anyhow::Result;
use clap::{Parser, Subcommand};
use fontpatch_core::{
    PipelineConfig, cache,
    config::{DEFAULT_MAKEGROUPS, DEFAULT_WORKERS, PATCHER_ARCHIVE, PATCHER_URL},
    pipeline,
};

use crate::report::{ConsoleReporter, print_summary};

#[derive(Parser)]
#[command(name = "fontpatch")]
#[command(about = "Ligaturize a directory of fonts, then patch in symbol glyphs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, clap::Args)]
pub struct RunArgs {
    #[arg(long, default_value = "Original")]
    pub input_dir: PathBuf,
    #[arg(long, default_value = "Ligaturized")]
    pub ligaturized_dir: PathBuf,
    #[arg(long, default_value = "Output")]
    pub output_dir: PathBuf,
    #[arg(long, default_value = "cache")]
    pub cache_dir: PathBuf,
    #[arg(long, default_value = "FontPatcher")]
    pub patcher_dir: PathBuf,
    #[arg(long, default_value = "Ligaturizer")]
    pub ligaturizer_dir: PathBuf,
    /// fontforge executable used for both stages.
    #[arg(long, default_value = "fontforge")]
    pub fontforge: PathBuf,
    /// Patcher output naming scheme.
    #[arg(long, default_value_t = DEFAULT_MAKEGROUPS,
          value_parser = clap::value_parser!(i32).range(-1..=6))]
    pub makegroups: i32,
    /// Worker pool size per stage.
    #[arg(short, long, default_value_t = DEFAULT_WORKERS)]
    pub jobs: usize,
}

impl RunArgs {
    fn into_config(self) -> PipelineConfig {
        PipelineConfig {
            input_dir: self.input_dir,
            ligaturized_dir: self.ligaturized_dir,
            output_dir: self.output_dir,
            cache_dir: self.cache_dir,
            patcher_dir: self.patcher_dir,
            ligaturizer_dir: self.ligaturizer_dir,
            fontforge: self.fontforge,
            makegroups: self.makegroups,
            workers: self.jobs,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full two-stage pipeline.
    Run {
        #[command(flatten)]
        args: RunArgs,
    },
    /// Fetch the patcher archive into the cache without running.
    Download {
        #[arg(long, default_value = "cache")]
        cache_dir: PathBuf,
    },
    /// Remove the stage output directories.
    Clean {
        #[arg(long, default_value = "Ligaturized")]
        ligaturized_dir: PathBuf,
        #[arg(long, default_value = "Output")]
        output_dir: PathBuf,
    },
}

impl Commands {
    pub fn run(self) -> Result<()> {
        match self {
            Commands::Run { args } => run_pipeline(args.into_config()),
            Commands::Download { cache_dir } => download(&cache_dir),
            Commands::Clean {
                ligaturized_dir,
                output_dir,
            } => clean(&ligaturized_dir, &output_dir),
        }
    }
}

fn run_pipeline(config: PipelineConfig) -> Result<()> {
    let start = Instant::now();

    println!("═══════════════════════════════════════════════════════════════════════════════");
    println!("fontpatch: {} -> {}", config.input_dir.display(), config.output_dir.display());
    println!("═══════════════════════════════════════════════════════════════════════════════");

    let reporter = ConsoleReporter::new();
    let summary = pipeline::run(config, &reporter)?;

    print_summary(&summary, start.elapsed());
    Ok(())
}

fn download(cache_dir: &Path) -> Result<()> {
    let path = cache_dir.join(PATCHER_ARCHIVE);
    let reporter = ConsoleReporter::new();
    let bytes = cache::ensure(PATCHER_URL, &path, &reporter)?;
    println!(
        "Patcher archive ready at {} ({:.2} MB)",
        path.display(),
        bytes.len() as f64 / 1024.0 / 1024.0
    );
    Ok(())
}

fn clean(ligaturized_dir: &Path, output_dir: &Path) -> Result<()> {
    let mut removed = 0;
    for dir in [ligaturized_dir, output_dir] {
        if dir.exists() {
            remove_dir_all(dir)?;
            println!("Removed {}", dir.display());
            removed += 1;
        } else {
            println!("Skipped {} (not found)", dir.display());
        }
    }
    println!("Cleaned {removed} directories");
    Ok(())
}
