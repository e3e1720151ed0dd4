//! # CLI Command Implementations
//!
//! This module contains the implementation for each subcommand of the
//! `native-deps` command-line tool. Each subcommand is defined in its own file.
//!
//! ## Structure
//!
//! Each command module typically contains:
//! - An `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and performs the
//!   command's logic.
//!
//! The arguments shared by `fetch`, `locate` and `ls` live here in
//! [`ArtifactArgs`] and [`PatternArgs`] and are flattened into each command.
//! Every value that can come from `pom.xml` also has an environment variable;
//! clap applies flag-over-environment precedence before the library falls
//! back to the pom.

pub mod clean;
pub mod completions;
pub mod fetch;
pub mod locate;
pub mod ls;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use native_deps::artifact::{self, ArtifactKey, PathTemplate};
use native_deps::config::{ArtifactSettings, Overrides, Settings};
use native_deps::defaults::{
    self, DEFAULT_ARTIFACT, DEFAULT_GROUP, DEFAULT_PATTERNS, DEFAULT_POM_FILENAME,
    DEFAULT_TEMPLATES,
};
use native_deps::suggestions;

/// Identify the artifact and where to look for it.
#[derive(Args, Debug, Clone)]
pub struct ArtifactArgs {
    /// Project descriptor holding the versions.
    #[arg(long, value_name = "FILE", env = "NATIVE_DEPS_POM", default_value = DEFAULT_POM_FILENAME)]
    pub pom: PathBuf,

    /// Root of the local Maven repository.
    ///
    /// Defaults to `~/.m2/repository`.
    #[arg(long, value_name = "DIR", env = "MAVEN_LOCAL_REPO")]
    pub local_repo: Option<PathBuf>,

    /// Version of the jar (defaults to the pom's project version).
    #[arg(long, value_name = "VERSION", env = "JNI_VERSION")]
    pub jni_version: Option<String>,

    /// Version of the native component (defaults to the `cudf.version` property).
    #[arg(long, value_name = "VERSION", env = "CUDF_VERSION")]
    pub cudf_version: Option<String>,

    /// Variant tag of the jar, e.g. cuda12 (defaults to the `cuda.version` property).
    #[arg(long, value_name = "VARIANT", env = "CUDA_VERSION")]
    pub cuda_variant: Option<String>,

    /// Branch of the header repository (defaults to the `cudf.branch`
    /// property, then to `branch-<major>.<minor>` of the component version).
    #[arg(long, value_name = "BRANCH", env = "CUDF_BRANCH")]
    pub cudf_branch: Option<String>,

    /// Group id of the jar.
    #[arg(long, value_name = "GROUP", default_value = DEFAULT_GROUP)]
    pub group: String,

    /// Artifact id of the jar.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_ARTIFACT)]
    pub artifact: String,

    /// Platform classifier appended to the variant, e.g. arm64.
    #[arg(long, value_name = "CLASSIFIER")]
    pub classifier: Option<String>,

    /// Naming template to try, in order (repeatable; replaces the defaults).
    ///
    /// Placeholders: {group}, {group_path}, {name}, {version}, {variant}, {classifier}.
    #[arg(long = "template", value_name = "TEMPLATE")]
    pub templates: Vec<String>,
}

/// Select archive entries.
#[derive(Args, Debug, Clone)]
pub struct PatternArgs {
    /// Glob pattern matched against entry paths and file names (repeatable;
    /// replaces the defaults).
    #[arg(long = "pattern", value_name = "GLOB")]
    pub patterns: Vec<String>,
}

impl PatternArgs {
    pub fn patterns(&self) -> Vec<String> {
        if self.patterns.is_empty() {
            DEFAULT_PATTERNS.iter().map(|p| p.to_string()).collect()
        } else {
            self.patterns.clone()
        }
    }
}

/// Everything needed to find the jar.
pub struct Resolved {
    pub key: ArtifactKey,
    pub local_repo: PathBuf,
    pub templates: Vec<PathTemplate>,
}

impl ArtifactArgs {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            jni_version: self.jni_version.clone(),
            cudf_version: self.cudf_version.clone(),
            cuda_variant: self.cuda_variant.clone(),
            cudf_branch: self.cudf_branch.clone(),
        }
    }

    pub fn local_repo(&self) -> PathBuf {
        self.local_repo
            .clone()
            .unwrap_or_else(defaults::default_local_repo)
    }

    pub fn templates(&self) -> Result<Vec<PathTemplate>> {
        let parsed = if self.templates.is_empty() {
            artifact::parse_templates(DEFAULT_TEMPLATES)
        } else {
            artifact::parse_templates(&self.templates)
        };
        parsed.map_err(|e| suggestions::explain(e, None))
    }

    /// Resolve every setting a full fetch needs.
    pub fn settings(&self) -> Result<Settings> {
        Settings::load(&self.overrides(), &self.pom).map_err(|e| suggestions::explain(e, None))
    }

    /// Resolve just the jar coordinates and build the artifact key.
    pub fn resolve(&self) -> Result<Resolved> {
        let settings = ArtifactSettings::load(&self.overrides(), &self.pom)
            .map_err(|e| suggestions::explain(e, None))?;
        self.resolve_with(&settings)
    }

    /// Build the artifact key from already-resolved coordinates.
    pub fn resolve_with(&self, settings: &ArtifactSettings) -> Result<Resolved> {
        let templates = self.templates()?;
        let key = ArtifactKey::new(
            self.group.clone(),
            self.artifact.clone(),
            settings.jni_version.value.clone(),
            settings.cuda_variant.value.clone(),
            self.classifier.clone(),
        );
        log::debug!("Resolved {} with {:?}", key, settings);
        Ok(Resolved {
            key,
            local_repo: self.local_repo(),
            templates,
        })
    }
}

impl Resolved {
    /// Find the jar, failing with every candidate tried.
    pub fn locate(&self) -> Result<PathBuf> {
        artifact::locate(&self.local_repo, &self.key, &self.templates)
            .into_result(&self.key)
            .map_err(|e| suggestions::explain(e, Some(&self.key)))
    }
}
