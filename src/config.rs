//! # Build Settings
//!
//! Resolves the handful of values a fetch run needs: the binding (jar)
//! version, the component version, the variant tag and the branch holding
//! the companion headers.
//!
//! Each value comes from the first source that provides it:
//!
//! 1. an explicit override (CLI flag, or its environment variable; clap
//!    merges the two before they reach this module),
//! 2. the project descriptor (`pom.xml`),
//! 3. for the header branch only, a value derived from the component version
//!    (`24.12.0` becomes `branch-24.12`).
//!
//! The descriptor is read only when it can supply a missing value. A run
//! whose versions and variant are all overridden does not need a `pom.xml`;
//! the branch is then derived. Commands that only look for the jar resolve
//! [`ArtifactSettings`] and need just the binding version and the variant.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::metadata::ProjectMetadata;

/// Where a configuration value is looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeySpec {
    /// Name in the project descriptor
    pub key: &'static str,
    pub flag: &'static str,
    pub env: &'static str,
}

pub const JNI_VERSION: KeySpec = KeySpec {
    key: "project.version",
    flag: "--jni-version",
    env: "JNI_VERSION",
};

pub const CUDF_VERSION: KeySpec = KeySpec {
    key: "cudf.version",
    flag: "--cudf-version",
    env: "CUDF_VERSION",
};

pub const CUDA_VARIANT: KeySpec = KeySpec {
    key: "cuda.version",
    flag: "--cuda-variant",
    env: "CUDA_VERSION",
};

pub const CUDF_BRANCH: KeySpec = KeySpec {
    key: "cudf.branch",
    flag: "--cudf-branch",
    env: "CUDF_BRANCH",
};

/// How a value was obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Origin {
    Override,
    Metadata,
    Derived,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Override => f.write_str("override"),
            Origin::Metadata => f.write_str("pom.xml"),
            Origin::Derived => f.write_str("derived"),
        }
    }
}

/// A resolved value and its origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Setting {
    pub value: String,
    pub origin: Origin,
}

impl Setting {
    fn new(value: String, origin: Origin) -> Self {
        Self { value, origin }
    }
}

/// Explicitly supplied values. `None` means "use the descriptor".
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub jni_version: Option<String>,
    pub cudf_version: Option<String>,
    pub cuda_variant: Option<String>,
    pub cudf_branch: Option<String>,
}

/// Resolved values needed to find the jar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSettings {
    pub jni_version: Setting,
    pub cuda_variant: Setting,
}

impl ArtifactSettings {
    /// Resolve the jar coordinates, reading `pom` only if an override is
    /// missing.
    pub fn load(overrides: &Overrides, pom: &Path) -> Result<Self> {
        let required = [&overrides.jni_version, &overrides.cuda_variant];
        let metadata = read_metadata(pom, &required, false)?;
        Self::resolve(overrides, metadata.as_ref(), pom)
    }

    pub fn resolve(
        overrides: &Overrides,
        metadata: Option<&ProjectMetadata>,
        pom: &Path,
    ) -> Result<Self> {
        Ok(Self {
            jni_version: require(&JNI_VERSION, &overrides.jni_version, metadata, pom)?,
            cuda_variant: require(&CUDA_VARIANT, &overrides.cuda_variant, metadata, pom)?,
        })
    }
}

/// Fully resolved configuration for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub jni_version: Setting,
    pub cudf_version: Setting,
    pub cuda_variant: Setting,
    pub cudf_branch: Setting,
}

impl Settings {
    /// Resolve settings, reading `pom` only if it can supply something.
    ///
    /// The pom is required when one of the versions or the variant has no
    /// override. With all three overridden, an existing pom is still consulted
    /// for the branch; a missing one is not an error and the branch is derived.
    pub fn load(overrides: &Overrides, pom: &Path) -> Result<Self> {
        let required = [
            &overrides.jni_version,
            &overrides.cudf_version,
            &overrides.cuda_variant,
        ];
        let branch_missing = !is_set(&overrides.cudf_branch);
        let metadata = read_metadata(pom, &required, branch_missing)?;
        Self::resolve(overrides, metadata.as_ref(), pom)
    }

    /// Resolve settings against already-parsed metadata.
    pub fn resolve(
        overrides: &Overrides,
        metadata: Option<&ProjectMetadata>,
        pom: &Path,
    ) -> Result<Self> {
        let jni_version = require(&JNI_VERSION, &overrides.jni_version, metadata, pom)?;
        let cudf_version = require(&CUDF_VERSION, &overrides.cudf_version, metadata, pom)?;
        let cuda_variant = require(&CUDA_VARIANT, &overrides.cuda_variant, metadata, pom)?;
        let cudf_branch = match lookup(&CUDF_BRANCH, &overrides.cudf_branch, metadata) {
            Some(branch) => branch,
            None => branch_for_version(&cudf_version.value)?
                .map(|b| Setting::new(b, Origin::Derived))
                .ok_or_else(|| missing(&CUDF_BRANCH, pom))?,
        };

        Ok(Self {
            jni_version,
            cudf_version,
            cuda_variant,
            cudf_branch,
        })
    }

    /// The subset that identifies the jar.
    pub fn artifact(&self) -> ArtifactSettings {
        ArtifactSettings {
            jni_version: self.jni_version.clone(),
            cuda_variant: self.cuda_variant.clone(),
        }
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_ref().is_some_and(|v| !v.trim().is_empty())
}

/// Read the pom when a required value has no override, or when an optional
/// one is missing and the pom exists.
fn read_metadata(
    pom: &Path,
    required: &[&Option<String>],
    optional_missing: bool,
) -> Result<Option<ProjectMetadata>> {
    let required_missing = required.iter().any(|v| !is_set(v));
    if !required_missing && !(optional_missing && pom.is_file()) {
        return Ok(None);
    }
    log::debug!("Reading project metadata from {}", pom.display());
    ProjectMetadata::from_file(pom).map(Some)
}

fn lookup(
    spec: &KeySpec,
    value: &Option<String>,
    metadata: Option<&ProjectMetadata>,
) -> Option<Setting> {
    if let Some(v) = value.as_ref().filter(|v| !v.trim().is_empty()) {
        return Some(Setting::new(v.trim().to_string(), Origin::Override));
    }
    metadata
        .and_then(|m| m.property(spec.key))
        .map(|v| Setting::new(v, Origin::Metadata))
}

fn require(
    spec: &KeySpec,
    value: &Option<String>,
    metadata: Option<&ProjectMetadata>,
    pom: &Path,
) -> Result<Setting> {
    lookup(spec, value, metadata).ok_or_else(|| missing(spec, pom))
}

fn missing(spec: &KeySpec, pom: &Path) -> Error {
    Error::ConfigMissing {
        key: spec.key.to_string(),
        flag: spec.flag.to_string(),
        env: spec.env.to_string(),
        source_file: pom.display().to_string(),
    }
}

/// Release branch for a version: `24.12.0-SNAPSHOT` becomes `branch-24.12`.
///
/// Returns `None` when the version does not start with `<major>.<minor>`.
pub fn branch_for_version(version: &str) -> Result<Option<String>> {
    let re = Regex::new(r"^(\d+)\.(\d+)")?;
    Ok(re
        .captures(version.trim())
        .map(|c| format!("branch-{}.{}", &c[1], &c[2])))
}

/// Resolve a path relative to `base` unless it is already absolute.
pub fn resolve_path(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
