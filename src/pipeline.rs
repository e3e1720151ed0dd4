//! # Fetch Pipeline
//!
//! Runs one fetch from start to finish. A run moves through these stages:
//!
//! ```text
//! Idle -> Located -> Extracted -> Merged -> Verified
//! ```
//!
//! 1. **Locate**: find the artifact jar in the local repository.
//! 2. **Extract**: stage the entries that match the patterns.
//! 3. **Merge**: move staged files into the native-deps directory,
//!    keeping existing files on conflict.
//! 4. **Verify**: make sure the required library is present.
//!
//! A verified run then ensures the companion header checkout (if the plan
//! asks for one). Any failure stops the run with a [`Failed`] tagged with the
//! step that failed and the last stage reached. Nothing is retried: the
//! steps are idempotent and a rerun picks up where it makes sense.
//!
//! The staging directory is a temporary directory inside the target
//! directory, so moving staged files into place is a rename on the same
//! filesystem. It is removed when the run ends, whatever the outcome.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

use crate::artifact::{self, ArtifactKey, PathTemplate};
use crate::defaults::{
    DEFAULT_PATTERNS, DEFAULT_REQUIRED_FILE, DEFAULT_TEMPLATES, NATIVE_DEPS_DIR, STAGING_PREFIX,
};
use crate::error::{Error, Result};
use crate::extract::{self, ExtractionRequest};
use crate::placement::{self, PlacedFile};
use crate::repository::{CheckoutStatus, CompanionRepository, CompanionSpec};

/// Progress of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    Idle,
    Located,
    Extracted,
    Merged,
    Verified,
}

/// A unit of work that can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Locate,
    Extract,
    Merge,
    Verify,
    Checkout,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Locate => "locate",
            Step::Extract => "extract",
            Step::Merge => "merge",
            Step::Verify => "verify",
            Step::Checkout => "checkout",
        };
        f.write_str(name)
    }
}

/// A run that stopped on an error.
#[derive(Debug, Error)]
#[error("{step} step failed: {error}")]
pub struct Failed {
    pub step: Step,
    /// Last stage completed before the failure
    pub reached: Stage,
    #[source]
    pub error: Error,
}

/// Everything a run needs to know.
#[derive(Debug, Clone)]
pub struct FetchPlan {
    pub key: ArtifactKey,
    /// Root of the local package repository
    pub local_repo: PathBuf,
    pub templates: Vec<PathTemplate>,
    pub patterns: Vec<String>,
    /// Parent of the staging directory
    pub target_dir: PathBuf,
    /// Where extracted libraries end up
    pub native_dir: PathBuf,
    pub required: String,
    pub companion: Option<CompanionSpec>,
}

impl FetchPlan {
    /// A plan with the default templates, patterns and required file.
    pub fn new(key: ArtifactKey, local_repo: PathBuf, target_dir: PathBuf) -> Result<Self> {
        Ok(Self {
            key,
            local_repo,
            templates: artifact::parse_templates(DEFAULT_TEMPLATES)?,
            patterns: DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect(),
            native_dir: target_dir.join(NATIVE_DEPS_DIR),
            target_dir,
            required: DEFAULT_REQUIRED_FILE.to_string(),
            companion: None,
        })
    }

    pub fn with_templates(mut self, templates: Vec<PathTemplate>) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns = patterns;
        self
    }

    pub fn with_required(mut self, required: impl Into<String>) -> Self {
        self.required = required.into();
        self
    }

    pub fn with_companion(mut self, companion: CompanionSpec) -> Self {
        self.companion = Some(companion);
        self
    }
}

/// What a successful run did.
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub artifact: PathBuf,
    pub native_dir: PathBuf,
    pub placed: Vec<PlacedFile>,
    pub required: PathBuf,
    pub checkout: Option<CheckoutStatus>,
    pub stage: Stage,
}

impl FetchReport {
    /// Files whose archive copy was rejected in favour of the existing file.
    pub fn conflicts(&self) -> Vec<&PlacedFile> {
        placement::conflicts(&self.placed).collect()
    }
}

/// Tracks the stage reached so failures can be tagged.
struct Run {
    stage: Stage,
}

impl Run {
    fn advance(&mut self, stage: Stage) {
        log::info!("Stage: {:?} -> {:?}", self.stage, stage);
        self.stage = stage;
    }

    fn fail(&self, step: Step) -> impl FnOnce(Error) -> Failed {
        let reached = self.stage;
        move |error| Failed {
            step,
            reached,
            error,
        }
    }
}

/// Remove staging directories left behind by an interrupted run.
///
/// Returns how many were removed. Failures are logged, not returned.
pub fn sweep_stale_staging(target_dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(target_dir) else {
        return 0;
    };
    let mut removed = 0;
    for entry in entries.flatten() {
        let name = entry.file_name();
        let is_staging = name.to_string_lossy().starts_with(STAGING_PREFIX);
        if is_staging && entry.path().is_dir() {
            match fs::remove_dir_all(entry.path()) {
                Ok(()) => {
                    log::warn!("Removed stale staging directory {}", entry.path().display());
                    removed += 1;
                }
                Err(e) => log::warn!("Could not remove {}: {}", entry.path().display(), e),
            }
        }
    }
    removed
}

/// Execute a plan.
pub fn run(plan: &FetchPlan, companion: &CompanionRepository) -> std::result::Result<FetchReport, Failed> {
    let mut run = Run { stage: Stage::Idle };

    let artifact = artifact::locate(&plan.local_repo, &plan.key, &plan.templates)
        .into_result(&plan.key)
        .map_err(run.fail(Step::Locate))?;
    log::info!("Found {}", artifact.display());
    run.advance(Stage::Located);

    sweep_stale_staging(&plan.target_dir);
    let placed = extract_and_merge(plan, &artifact, &mut run)?;

    let required = placement::verify_required(&plan.native_dir, &plan.required)
        .map_err(run.fail(Step::Verify))?;
    run.advance(Stage::Verified);

    let checkout = match &plan.companion {
        Some(spec) => Some(
            companion
                .ensure_checkout(spec)
                .map_err(run.fail(Step::Checkout))?,
        ),
        None => None,
    };

    Ok(FetchReport {
        artifact,
        native_dir: plan.native_dir.clone(),
        placed,
        required,
        checkout,
        stage: run.stage,
    })
}

fn extract_and_merge(
    plan: &FetchPlan,
    archive: &Path,
    run: &mut Run,
) -> std::result::Result<Vec<PlacedFile>, Failed> {
    fs::create_dir_all(&plan.target_dir)
        .map_err(Error::from)
        .map_err(run.fail(Step::Extract))?;
    // Dropped on every return path, which deletes the directory.
    let staging = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(&plan.target_dir)
        .map_err(Error::from)
        .map_err(run.fail(Step::Extract))?;

    let request = ExtractionRequest::new(archive, plan.patterns.clone(), staging.path());
    let staged = extract::extract(&request).map_err(run.fail(Step::Extract))?;
    log::info!("Staged {} file(s)", staged.len());
    run.advance(Stage::Extracted);

    let placed = placement::merge_staged(&staged, &plan.native_dir).map_err(run.fail(Step::Merge))?;
    run.advance(Stage::Merged);

    if let Err(e) = staging.close() {
        log::warn!("Could not remove staging directory: {}", e);
    }
    Ok(placed)
}
