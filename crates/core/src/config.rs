//! Configuration for a pipeline run.

use std::path::{Path, PathBuf};

/// FontPatcher release archive (latest).
pub const PATCHER_URL: &str =
    "https://github.com/ryanoasis/nerd-fonts/releases/latest/download/FontPatcher.zip";

/// Cached archive filename.
pub const PATCHER_ARCHIVE: &str = "FontPatcher.zip";

/// Ligaturize script, relative to the ligaturizer directory.
pub const LIGATURIZE_SCRIPT: &str = "ligaturize.py";

/// Patcher script, relative to the extracted archive.
pub const PATCH_SCRIPT: &str = "font-patcher";

/// Recognized font file extensions (matched case-insensitively).
pub const FONT_EXTENSIONS: [&str; 2] = ["ttf", "otf"];

/// Default worker pool size per stage.
pub const DEFAULT_WORKERS: usize = 4;

/// Default `--makegroups` naming scheme passed to the patcher.
pub const DEFAULT_MAKEGROUPS: i32 = 4;

/// Immutable settings for one pipeline run.
///
/// Constructed once at startup and shared read-only by every component.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Directory of input fonts. Read-only to the pipeline.
    pub input_dir: PathBuf,
    /// Stage-1 output directory. Recreated on every run.
    pub ligaturized_dir: PathBuf,
    /// Final output directory. Recreated on every run.
    pub output_dir: PathBuf,
    /// Directory holding the cached patcher archive.
    pub cache_dir: PathBuf,
    /// Directory the patcher archive is extracted into.
    pub patcher_dir: PathBuf,
    /// Directory containing the ligaturize script.
    pub ligaturizer_dir: PathBuf,
    /// fontforge executable used to run both scripts.
    pub fontforge: PathBuf,
    /// Patcher output naming scheme, -1..=6.
    pub makegroups: i32,
    /// Worker pool size per stage.
    pub workers: usize,
}

impl PipelineConfig {
    /// Default directory layout under `root`.
    pub fn from_root(root: &Path) -> Self {
        Self {
            input_dir: root.join("Original"),
            ligaturized_dir: root.join("Ligaturized"),
            output_dir: root.join("Output"),
            cache_dir: root.join("cache"),
            patcher_dir: root.join("FontPatcher"),
            ligaturizer_dir: root.join("Ligaturizer"),
            fontforge: PathBuf::from("fontforge"),
            makegroups: DEFAULT_MAKEGROUPS,
            workers: DEFAULT_WORKERS,
        }
    }

    pub fn cache_path(&self) -> PathBuf {
        self.cache_dir.join(PATCHER_ARCHIVE)
    }

    pub fn ligaturize_script(&self) -> PathBuf {
        self.ligaturizer_dir.join(LIGATURIZE_SCRIPT)
    }

    pub fn patch_script(&self) -> PathBuf {
        self.patcher_dir.join(PATCH_SCRIPT)
    }
}
