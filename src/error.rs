//! # Error Handling
//!
//! This module defines the centralized error type for the `native-deps`
//! library. It uses `thiserror` to build a single `Error` enum covering every
//! anticipated failure mode, each variant carrying enough context to tell the
//! user what went wrong.
//!
//! ## Key Components
//!
//! - **`Error`**: every failure the library can report. The variants map onto
//!   the steps of a fetch run:
//!   - configuration: `ConfigMissing`, `MetadataRead`, `Template`
//!   - locating the artifact: `ArtifactNotFound`
//!   - extraction: `ExtractionFailed`, `NoMatchingEntries`
//!   - verification: `RequiredArtifactMissing`
//!   - companion checkout: `GitClone`, `GitCommand`
//!   - wrapped library errors: `Io`, `Regex`, `Glob`
//!
//! - **`Result<T>`**: a type alias for `std::result::Result<T, Error>`.
//!
//! Conflicts found while merging files are not errors. They are reported as
//! `KeptExisting` outcomes in the placement report (see
//! [`crate::placement`]).

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for native-deps operations
#[derive(Error, Debug)]
pub enum Error {
    /// A required configuration value was not provided by a flag, an
    /// environment variable or the project metadata file.
    #[error("Missing configuration value '{key}' (set {flag}, {env}, or define it in {source_file})")]
    ConfigMissing {
        key: String,
        flag: String,
        env: String,
        source_file: String,
    },

    /// The project metadata file could not be read or understood.
    #[error("Failed to read project metadata from {path}: {message}")]
    MetadataRead { path: String, message: String },

    /// A path template is malformed.
    ///
    /// May include the name of the problematic placeholder when applicable.
    #[error("Template error: {message}{}", variable.as_ref().map(|v| format!(" (placeholder: {})", v)).unwrap_or_default())]
    Template {
        message: String,
        /// The placeholder that caused the error, if applicable
        variable: Option<String>,
    },

    /// None of the candidate paths for an artifact exist.
    ///
    /// `tried` holds every candidate, in the order they were probed.
    #[error("Artifact {artifact} not found. Tried:{}", format_tried(tried))]
    ArtifactNotFound { artifact: String, tried: Vec<PathBuf> },

    /// The archive could not be opened or one of its entries could not be read.
    #[error("Extraction failed for {archive}: {message}")]
    ExtractionFailed { archive: String, message: String },

    /// The archive is readable but no entry matched any pattern.
    #[error("No entries in {archive} match any of: {}", patterns.join(", "))]
    NoMatchingEntries {
        archive: String,
        patterns: Vec<String>,
    },

    /// The required file is absent from the destination after merging.
    #[error("Required file {file} is missing from {dest}")]
    RequiredArtifactMissing { file: String, dest: String },

    /// An error occurred while cloning a Git repository.
    ///
    /// Includes the repository URL, branch, error message, and an
    /// optional hint for resolution.
    #[error("Git clone error for {url}@{r#ref}: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    GitClone {
        url: String,
        r#ref: String,
        message: String,
        /// Optional hint for how to resolve the clone issue
        hint: Option<String>,
    },

    /// An error occurred while executing a Git command.
    #[error("Git command failed in {dir}: {command} - {stderr}")]
    GitCommand {
        command: String,
        dir: String,
        stderr: String,
    },

    /// A filesystem operation on the destination directory failed.
    #[error("Filesystem operation error: {message}")]
    Filesystem { message: String },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A regular expression error, wrapped from `regex::Error`.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// A glob pattern error, wrapped from `glob::PatternError`.
    #[error("Glob pattern error: {0}")]
    Glob(#[from] glob::PatternError),
}

fn format_tried(tried: &[PathBuf]) -> String {
    if tried.is_empty() {
        return " (no applicable naming templates)".to_string();
    }
    tried
        .iter()
        .map(|p| format!("\n  - {}", p.display()))
        .collect()
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
