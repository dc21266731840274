//! Package archive validation and extraction.
//!
//! Package artifacts are zip archives. Validation happens in two steps:
//! a magic-byte check before the archive is opened, then the central
//! directory parse — both failure modes report the content as malformed
//! rather than as a disk error.

use crate::error::{InstallError, Result};
use async_zip::base::read::seek::ZipFileReader;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File, OpenOptions};
use tokio::io::{AsyncReadExt, BufReader};
use tokio_util::compat::{FuturesAsyncReadCompatExt, TokioAsyncReadCompatExt};
use tracing::{debug, trace};

/// Extraction outcome counters.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractionSummary {
    /// Number of files written.
    pub files: usize,
    /// Total bytes written.
    pub bytes: u64,
}

/// Validate that `archive` looks like a zip before parsing it.
///
/// Accepts the local-file-header and empty-archive signatures.
pub async fn validate_archive(package: &str, archive: &Path) -> Result<()> {
    let mut file = File::open(archive)
        .await
        .map_err(|e| InstallError::io(archive, &e))?;
    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).await.is_err() {
        return Err(InstallError::malformed(package, "file shorter than a zip header"));
    }
    match magic {
        [0x50, 0x4b, 0x03, 0x04] | [0x50, 0x4b, 0x05, 0x06] => Ok(()),
        _ => Err(InstallError::malformed(package, "not a zip archive")),
    }
}

/// Extract a package archive into `dest`.
///
/// Entry paths are sanitized: separators normalized, `.`/`..` segments
/// dropped, and anything still escaping `dest` rejected.
pub async fn extract_package(
    package: &str,
    archive: &Path,
    dest: &Path,
) -> Result<ExtractionSummary> {
    validate_archive(package, archive).await?;

    let file = File::open(archive)
        .await
        .map_err(|e| InstallError::io(archive, &e))?;
    let reader = BufReader::new(file).compat();

    let mut zip = ZipFileReader::new(reader)
        .await
        .map_err(|e| InstallError::malformed(package, e.to_string()))?;

    fs::create_dir_all(dest)
        .await
        .map_err(|e| InstallError::io(dest, &e))?;

    let mut summary = ExtractionSummary::default();
    let entry_count = zip.file().entries().len();
    debug!(package, entries = entry_count, dest = %dest.display(), "extracting");

    for index in 0..entry_count {
        let entry = zip
            .file()
            .entries()
            .get(index)
            .ok_or_else(|| InstallError::malformed(package, format!("missing entry {index}")))?;

        let filename = entry
            .filename()
            .as_str()
            .map_err(|e| InstallError::malformed(package, format!("invalid entry name: {e}")))?;

        let Some(path) = sanitize_entry_path(filename) else {
            trace!(package, filename, "skipping empty entry path");
            continue;
        };

        let out_path = dest.join(&path);
        if !out_path.starts_with(dest) {
            return Err(InstallError::malformed(
                package,
                format!("entry escapes destination: {filename}"),
            ));
        }

        let is_dir = entry
            .dir()
            .map_err(|e| InstallError::malformed(package, e.to_string()))?;

        if is_dir {
            fs::create_dir_all(&out_path)
                .await
                .map_err(|e| InstallError::io(&out_path, &e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| InstallError::io(parent, &e))?;
        }

        let entry_reader = zip
            .reader_without_entry(index)
            .await
            .map_err(|e| InstallError::malformed(package, e.to_string()))?;

        let mut writer = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&out_path)
            .await
            .map_err(|e| InstallError::io(&out_path, &e))?;

        let written = tokio::io::copy(&mut entry_reader.compat(), &mut writer)
            .await
            .map_err(|e| InstallError::Extraction {
                path: out_path.clone(),
                message: e.to_string(),
            })?;

        summary.files += 1;
        summary.bytes += written;
    }

    debug!(package, files = summary.files, bytes = summary.bytes, "extraction complete");
    Ok(summary)
}

/// Normalize an archive entry name to a safe relative path.
fn sanitize_entry_path(filename: &str) -> Option<PathBuf> {
    let sanitized: PathBuf = filename
        .replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != "." && *segment != "..")
        .collect();
    if sanitized.as_os_str().is_empty() {
        None
    } else {
        Some(sanitized)
    }
}
