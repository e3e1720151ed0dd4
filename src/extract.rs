//! # Archive Extraction
//!
//! Pulls the entries matching a set of glob patterns out of a jar (zip)
//! archive into a staging directory. This is the first half of the
//! conflict-safe extractor; [`crate::placement`] merges the staged files into
//! their destination.
//!
//! ## Matching
//!
//! An entry matches when any pattern matches either its full path inside the
//! archive (`amd64/Linux/libcudf.so`) or its bare file name (`libcudf.so`).
//! `*` also matches `/`, so `*libcudf*.so*` selects the library wherever it
//! sits in the archive.
//!
//! ## Staging layout
//!
//! Archive directory structure is discarded: each matching entry lands in
//! its own numbered slot, `<staging>/<index>/<file name>`. Entries that share a
//! file name (the same library built for two layouts, say) therefore never
//! overwrite each other while staged. The merge step resolves them in archive
//! order.
//!
//! Whether an archive is corrupt or merely has nothing to offer is decided by
//! inspecting its entry list: an archive that cannot be opened is
//! [`Error::ExtractionFailed`], one that opens but has no matching entries is
//! [`Error::NoMatchingEntries`].

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob::Pattern;
use serde::Serialize;
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Input to [`extract`].
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub archive: PathBuf,
    pub patterns: Vec<String>,
    pub staging_dir: PathBuf,
}

impl ExtractionRequest {
    pub fn new(archive: impl Into<PathBuf>, patterns: Vec<String>, staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            archive: archive.into(),
            patterns,
            staging_dir: staging_dir.into(),
        }
    }
}

/// An archive entry written to the staging directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedFile {
    /// Full path of the entry inside the archive
    pub entry_name: String,
    /// File name the entry will have at its destination
    pub file_name: String,
    /// Where the entry was written
    pub staged_path: PathBuf,
}

/// An archive entry selected by the patterns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchedEntry {
    pub index: usize,
    pub entry_name: String,
    pub file_name: String,
    pub size: u64,
}

/// Compile glob patterns, failing on the first invalid one.
pub fn compile_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|p| Pattern::new(p.as_ref()).map_err(Error::Glob))
        .collect()
}

fn entry_matches(patterns: &[Pattern], entry_name: &str, file_name: &str) -> bool {
    patterns
        .iter()
        .any(|p| p.matches(entry_name) || p.matches(file_name))
}

fn open_archive(archive: &Path) -> Result<ZipArchive<fs::File>> {
    let file = fs::File::open(archive).map_err(|e| Error::ExtractionFailed {
        archive: archive.display().to_string(),
        message: format!("Failed to open archive: {e}"),
    })?;
    ZipArchive::new(file).map_err(|e| Error::ExtractionFailed {
        archive: archive.display().to_string(),
        message: format!("Invalid or corrupt archive: {e}"),
    })
}

fn scan(archive: &mut ZipArchive<fs::File>, archive_path: &Path, patterns: &[Pattern]) -> Result<Vec<MatchedEntry>> {
    let mut matched = Vec::new();
    for index in 0..archive.len() {
        let entry = archive.by_index(index).map_err(|e| Error::ExtractionFailed {
            archive: archive_path.display().to_string(),
            message: format!("Failed to read entry {index}: {e}"),
        })?;
        if entry.is_dir() {
            continue;
        }

        // Skip entries whose path would escape the staging slot
        let Some(enclosed) = entry.enclosed_name() else {
            log::warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        let Some(file_name) = enclosed.file_name().and_then(|n| n.to_str()) else {
            continue;
        };

        if entry_matches(patterns, entry.name(), file_name) {
            matched.push(MatchedEntry {
                index,
                entry_name: entry.name().to_string(),
                file_name: file_name.to_string(),
                size: entry.size(),
            });
        }
    }
    Ok(matched)
}

/// List the archive entries matching any pattern, without extracting.
pub fn matching_entries<S: AsRef<str>>(archive: &Path, patterns: &[S]) -> Result<Vec<MatchedEntry>> {
    let compiled = compile_patterns(patterns)?;
    let mut zip = open_archive(archive)?;
    scan(&mut zip, archive, &compiled)
}

/// Extract every matching entry into the staging directory.
///
/// Returns the staged files in archive order.
pub fn extract(request: &ExtractionRequest) -> Result<Vec<StagedFile>> {
    let compiled = compile_patterns(&request.patterns)?;
    let mut zip = open_archive(&request.archive)?;
    let matched = scan(&mut zip, &request.archive, &compiled)?;

    if matched.is_empty() {
        return Err(Error::NoMatchingEntries {
            archive: request.archive.display().to_string(),
            patterns: request.patterns.clone(),
        });
    }

    let mut staged = Vec::with_capacity(matched.len());
    for (slot, m) in matched.into_iter().enumerate() {
        let slot_dir = request.staging_dir.join(slot.to_string());
        fs::create_dir_all(&slot_dir)?;
        let staged_path = slot_dir.join(&m.file_name);

        let mut entry = zip.by_index(m.index).map_err(|e| Error::ExtractionFailed {
            archive: request.archive.display().to_string(),
            message: format!("Failed to read entry {}: {e}", m.entry_name),
        })?;
        let mut out = fs::File::create(&staged_path)?;
        io::copy(&mut entry, &mut out).map_err(|e| Error::ExtractionFailed {
            archive: request.archive.display().to_string(),
            message: format!("Failed to extract {}: {e}", m.entry_name),
        })?;

        log::debug!("Staged {} -> {}", m.entry_name, staged_path.display());
        staged.push(StagedFile {
            entry_name: m.entry_name,
            file_name: m.file_name,
            staged_path,
        });
    }

    Ok(staged)
}
