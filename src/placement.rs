//! # Conflict-Safe Placement
//!
//! Moves staged files into a flat destination directory without ever
//! replacing a file that is already there. For each staged file:
//!
//! - nothing of that name at the destination: the file is moved in
//!   ([`Outcome::Placed`]);
//! - a byte-identical file is already there: the staged copy is discarded
//!   ([`Outcome::AlreadyPresent`]);
//! - a different file is already there: the existing file is kept, the staged
//!   copy is discarded and the clash is recorded ([`Outcome::KeptExisting`]).
//!
//! The destination therefore never holds two versions of one name, and the
//! oldest file always wins.

use std::fs;
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{Error, Result};
use crate::extract::StagedFile;

/// What happened to one staged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    /// Moved into the destination
    Placed,
    /// An identical file was already present
    AlreadyPresent,
    /// A different file was already present and was kept
    KeptExisting,
}

/// One line of the placement report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlacedFile {
    pub file_name: String,
    /// Archive entry the file came from
    pub entry_name: String,
    pub destination: PathBuf,
    pub outcome: Outcome,
}

impl PlacedFile {
    pub fn is_conflict(&self) -> bool {
        self.outcome == Outcome::KeptExisting
    }
}

/// Files whose staged copy was rejected because it differed from the
/// existing one.
pub fn conflicts(placed: &[PlacedFile]) -> impl Iterator<Item = &PlacedFile> {
    placed.iter().filter(|p| p.is_conflict())
}

/// Compare two files byte for byte.
pub fn files_identical(a: &Path, b: &Path) -> io::Result<bool> {
    let (meta_a, meta_b) = (fs::metadata(a)?, fs::metadata(b)?);
    if meta_a.len() != meta_b.len() {
        return Ok(false);
    }

    let mut reader_a = BufReader::new(fs::File::open(a)?);
    let mut reader_b = BufReader::new(fs::File::open(b)?);
    let mut buf_a = [0u8; 8192];
    let mut buf_b = [0u8; 8192];
    loop {
        let n = reader_a.read(&mut buf_a)?;
        if n == 0 {
            return Ok(true);
        }
        reader_b.read_exact(&mut buf_b[..n])?;
        if buf_a[..n] != buf_b[..n] {
            return Ok(false);
        }
    }
}

/// Move a file, copying across filesystems when a rename is not possible.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to).map_err(|e| Error::Filesystem {
        message: format!(
            "Failed to place {} at {}: {}",
            from.display(),
            to.display(),
            e
        ),
    })?;
    fs::remove_file(from)?;
    Ok(())
}

/// Merge staged files into `dest`, in order.
pub fn merge_staged(staged: &[StagedFile], dest: &Path) -> Result<Vec<PlacedFile>> {
    fs::create_dir_all(dest)?;

    let mut report = Vec::with_capacity(staged.len());
    for file in staged {
        let destination = dest.join(&file.file_name);

        let outcome = if !destination.exists() {
            move_file(&file.staged_path, &destination)?;
            log::debug!("Placed {}", destination.display());
            Outcome::Placed
        } else if files_identical(&file.staged_path, &destination)? {
            fs::remove_file(&file.staged_path)?;
            log::debug!("{} already present", destination.display());
            Outcome::AlreadyPresent
        } else {
            fs::remove_file(&file.staged_path)?;
            log::info!(
                "Conflict: {} from {} differs from the existing file, keeping the existing one",
                file.file_name,
                file.entry_name
            );
            Outcome::KeptExisting
        };

        report.push(PlacedFile {
            file_name: file.file_name.clone(),
            entry_name: file.entry_name.clone(),
            destination,
            outcome,
        });
    }

    Ok(report)
}

/// Check that `required` is present in `dest`.
pub fn verify_required(dest: &Path, required: &str) -> Result<PathBuf> {
    let path = dest.join(required);
    if path.is_file() {
        Ok(path)
    } else {
        Err(Error::RequiredArtifactMissing {
            file: required.to_string(),
            dest: dest.display().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn stage(root: &Path, slot: usize, name: &str, content: &[u8]) -> StagedFile {
        let dir = root.join("staging").join(slot.to_string());
        fs::create_dir_all(&dir).unwrap();
        let staged_path = dir.join(name);
        fs::write(&staged_path, content).unwrap();
        StagedFile {
            entry_name: format!("lib/{name}"),
            file_name: name.to_string(),
            staged_path,
        }
    }

    #[test]
    fn test_merge_into_empty_destination() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("native-deps");
        let staged = vec![
            stage(temp.path(), 0, "libcudf.so", b"cudf"),
            stage(temp.path(), 1, "libnvcomp.so.1", b"nvcomp"),
        ];

        let report = merge_staged(&staged, &dest).unwrap();

        assert_eq!(report.len(), 2);
        assert!(report.iter().all(|p| p.outcome == Outcome::Placed));
        assert_eq!(fs::read(dest.join("libcudf.so")).unwrap(), b"cudf");
        assert_eq!(fs::read(dest.join("libnvcomp.so.1")).unwrap(), b"nvcomp");
        assert!(!staged[0].staged_path.exists());
    }

    #[test]
    fn test_identical_file_is_left_alone() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("libcudf.so"), b"C1").unwrap();

        let staged = vec![stage(temp.path(), 0, "libcudf.so", b"C1")];
        let report = merge_staged(&staged, &dest).unwrap();

        assert_eq!(report[0].outcome, Outcome::AlreadyPresent);
        assert_eq!(conflicts(&report).count(), 0);
        assert_eq!(fs::read(dest.join("libcudf.so")).unwrap(), b"C1");
        assert_eq!(fs::read_dir(&dest).unwrap().count(), 1);
        assert!(!staged[0].staged_path.exists());
    }

    #[test]
    fn test_different_file_keeps_existing_and_reports_once() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("libcudf.so"), b"C1").unwrap();

        let staged = vec![stage(temp.path(), 0, "libcudf.so", b"C2")];
        let report = merge_staged(&staged, &dest).unwrap();

        let found: Vec<_> = conflicts(&report).collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].file_name, "libcudf.so");
        assert_eq!(fs::read(dest.join("libcudf.so")).unwrap(), b"C1");
        assert!(!staged[0].staged_path.exists());
    }

    #[test]
    fn test_first_staged_wins_within_one_run() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        let staged = vec![
            stage(temp.path(), 0, "libnvcomp.so", b"first"),
            stage(temp.path(), 1, "libnvcomp.so", b"second"),
            stage(temp.path(), 2, "libnvcomp.so", b"first"),
        ];

        let report = merge_staged(&staged, &dest).unwrap();

        let outcomes: Vec<_> = report.iter().map(|p| p.outcome).collect();
        assert_eq!(
            outcomes,
            vec![Outcome::Placed, Outcome::KeptExisting, Outcome::AlreadyPresent]
        );
        assert_eq!(fs::read(dest.join("libnvcomp.so")).unwrap(), b"first");
    }

    #[test]
    fn test_conflict_is_logged_at_info() {
        testing_logger::setup();
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("dest");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("libcudf.so"), b"old").unwrap();

        let staged = vec![stage(temp.path(), 0, "libcudf.so", b"new!")];
        merge_staged(&staged, &dest).unwrap();

        testing_logger::validate(|captured_logs| {
            // Callers report conflicts from the returned outcomes, so the log
            // stays below the default warn level.
            assert!(captured_logs.iter().all(|l| l.level != log::Level::Warn));
            let conflicts: Vec<_> = captured_logs
                .iter()
                .filter(|l| l.body.starts_with("Conflict:"))
                .collect();
            assert_eq!(conflicts.len(), 1);
            assert_eq!(conflicts[0].level, log::Level::Info);
            assert!(conflicts[0].body.contains("libcudf.so"));
            assert!(conflicts[0].body.contains("keeping the existing one"));
        });
    }

    #[test]
    fn test_files_identical() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        let c = temp.path().join("c");
        let big: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        let mut other = big.clone();
        other[19_999] ^= 1;
        fs::write(&a, &big).unwrap();
        fs::write(&b, &big).unwrap();
        fs::write(&c, &other).unwrap();

        assert!(files_identical(&a, &b).unwrap());
        assert!(!files_identical(&a, &c).unwrap());
    }

    #[test]
    fn test_files_identical_different_lengths() {
        let temp = TempDir::new().unwrap();
        let a = temp.path().join("a");
        let b = temp.path().join("b");
        fs::write(&a, b"abc").unwrap();
        fs::write(&b, b"abcd").unwrap();
        assert!(!files_identical(&a, &b).unwrap());
    }

    #[test]
    fn test_verify_required_present() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("libcudf.so"), b"x").unwrap();
        let path = verify_required(temp.path(), "libcudf.so").unwrap();
        assert_eq!(path, temp.path().join("libcudf.so"));
    }

    #[test]
    fn test_verify_required_missing() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("libcudf_extra.so"), b"x").unwrap();
        match verify_required(temp.path(), "libcudf.so").unwrap_err() {
            Error::RequiredArtifactMissing { file, .. } => assert_eq!(file, "libcudf.so"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
