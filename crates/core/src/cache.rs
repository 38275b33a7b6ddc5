//! At-most-once acquisition of the patcher archive.

use std::{
    fs::read,
    io::{Read as _, Write as _},
    path::Path,
};

use log::{debug, info};
use tempfile::NamedTempFile;

use crate::{
    error::{Error, Result},
    io::ensure_dir,
    progress::Reporter,
};

const CHUNK_SIZE: usize = 64 * 1024;

/// Return the archive bytes, downloading only if `cache_path` is missing.
///
/// A failed download leaves the cache untouched; the file is written through a
/// temp file and renamed into place, so a partial download can never be
/// mistaken for a cached archive on a later run.
pub fn ensure(url: &str, cache_path: &Path, reporter: &dyn Reporter) -> Result<Vec<u8>> {
    ensure_with(url, cache_path, reporter, fetch)
}

/// [`ensure`] with the fetch function injected.
pub fn ensure_with<F>(
    url: &str,
    cache_path: &Path,
    reporter: &dyn Reporter,
    fetch: F,
) -> Result<Vec<u8>>
where
    F: FnOnce(&str, &dyn Reporter) -> Result<Vec<u8>>,
{
    if cache_path.exists() {
        debug!("using cached archive at {}", cache_path.display());
        return read(cache_path).map_err(|e| Error::io(cache_path, e));
    }

    let bytes = fetch(url, reporter)?;

    if let Some(parent) = cache_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent)?;
    }
    let dir = cache_path.parent().unwrap_or(Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    tmp.write_all(&bytes).map_err(|e| Error::io(tmp.path(), e))?;
    tmp.persist(cache_path)
        .map_err(|e| Error::io(cache_path, e.error))?;

    info!(
        "cached {} bytes from {url} at {}",
        bytes.len(),
        cache_path.display()
    );
    Ok(bytes)
}

fn fetch(url: &str, reporter: &dyn Reporter) -> Result<Vec<u8>> {
    reporter.download_started(url);

    let mut response = reqwest::blocking::get(url).map_err(|source| Error::Fetch {
        url: url.to_string(),
        source,
    })?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Http {
            url: url.to_string(),
            status,
        });
    }

    let total = response.content_length();
    let mut bytes = Vec::with_capacity(total.unwrap_or(0) as usize);
    let mut chunk = [0u8; CHUNK_SIZE];
    loop {
        let n = response.read(&mut chunk).map_err(|e| Error::io(url, e))?;
        if n == 0 {
            break;
        }
        bytes.extend_from_slice(&chunk[..n]);
        reporter.download_progress(bytes.len() as u64, total);
    }

    reporter.download_finished(bytes.len() as u64);
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use std::{fs::write, sync::atomic::{AtomicUsize, Ordering}};

    use super::*;
    use crate::progress::NullReporter;

    fn counting_fetch<'a>(
        calls: &'a AtomicUsize,
        payload: &'static [u8],
    ) -> impl FnOnce(&str, &dyn Reporter) -> Result<Vec<u8>> + 'a {
        move |_url, _reporter| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(payload.to_vec())
        }
    }

    #[test]
    fn cache_hit_skips_fetch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FontPatcher.zip");
        write(&path, b"archive").unwrap();

        let calls = AtomicUsize::new(0);
        let bytes = ensure_with(
            "http://unused",
            &path,
            &NullReporter,
            counting_fetch(&calls, b"fresh"),
        )
        .unwrap();

        assert_eq!(bytes, b"archive");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn miss_fetches_once_then_hits() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("FontPatcher.zip");

        let calls = AtomicUsize::new(0);
        for _ in 0..2 {
            let bytes = ensure_with(
                "http://example.invalid/FontPatcher.zip",
                &path,
                &NullReporter,
                counting_fetch(&calls, b"payload"),
            )
            .unwrap();
            assert_eq!(bytes, b"payload");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(read(&path).unwrap(), b"payload");
    }

    #[test]
    fn failed_fetch_leaves_cache_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("FontPatcher.zip");

        let result = ensure_with("http://unused", &path, &NullReporter, |url, _| {
            Err(Error::Http {
                url: url.to_string(),
                status: reqwest::StatusCode::NOT_FOUND,
            })
        });

        assert!(result.is_err());
        assert!(!path.exists());
    }
}
