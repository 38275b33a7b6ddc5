//! Error types for the patching pipeline.

use std::{io, path::PathBuf, result};

/// Errors that abort a pipeline run.
///
/// Per-job failures are not errors; they are carried in
/// [`JobResult`](crate::job::JobResult) and surfaced in the run summary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Http {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to extract patcher archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("no font files found in {} (directory contains: {contents:?})", dir.display())]
    NoFonts { dir: PathBuf, contents: Vec<String> },

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;
