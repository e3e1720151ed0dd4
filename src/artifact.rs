//! # Artifact Locator
//!
//! Finds a prebuilt artifact in the local package cache. An [`ArtifactKey`]
//! identifies the artifact; a list of [`PathTemplate`]s describes the naming
//! conventions to try, highest priority first. [`locate`] probes each rendered
//! path in order and returns the first one that exists.
//!
//! Only exact templated paths are considered: there is no directory scan and
//! no fuzzy matching. Probing is read-only.
//!
//! ## Templates
//!
//! Templates are paths relative to the repository root with these
//! placeholders:
//!
//! | placeholder    | value                                  |
//! |----------------|----------------------------------------|
//! | `{group}`      | group id as written (`com.nvidia`)     |
//! | `{group_path}` | group id with `.` replaced by `/`      |
//! | `{name}`       | component name                         |
//! | `{version}`    | version string                         |
//! | `{variant}`    | variant tag (`cuda12`)                 |
//! | `{classifier}` | platform classifier, when the key has one |
//!
//! A template that uses `{classifier}` is skipped for keys without a
//! classifier; it never renders a path with an empty segment.

use std::fmt;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{Error, Result};

/// Placeholders a template may use.
pub const PLACEHOLDERS: &[&str] = &[
    "group",
    "group_path",
    "name",
    "version",
    "variant",
    "classifier",
];

/// Identifies one artifact in the local package cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArtifactKey {
    group: String,
    name: String,
    version: String,
    variant: String,
    classifier: Option<String>,
}

impl ArtifactKey {
    pub fn new(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
        variant: impl Into<String>,
        classifier: Option<String>,
    ) -> Self {
        Self {
            group: group.into(),
            name: name.into(),
            version: version.into(),
            variant: variant.into(),
            classifier: classifier.filter(|c| !c.is_empty()),
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn variant(&self) -> &str {
        &self.variant
    }

    pub fn classifier(&self) -> Option<&str> {
        self.classifier.as_deref()
    }

    /// Maven-style coordinate (`group:name:version:variant[-classifier]`).
    pub fn coordinate(&self) -> String {
        match &self.classifier {
            Some(c) => format!(
                "{}:{}:{}:{}-{}",
                self.group, self.name, self.version, self.variant, c
            ),
            None => format!(
                "{}:{}:{}:{}",
                self.group, self.name, self.version, self.variant
            ),
        }
    }

    fn value(&self, placeholder: &str) -> Option<String> {
        match placeholder {
            "group" => Some(self.group.clone()),
            "group_path" => Some(self.group.replace('.', "/")),
            "name" => Some(self.name.clone()),
            "version" => Some(self.version.clone()),
            "variant" => Some(self.variant.clone()),
            "classifier" => self.classifier.clone(),
            _ => None,
        }
    }
}

impl fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coordinate())
    }
}

/// A naming convention for an artifact, validated on construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathTemplate {
    raw: String,
}

impl PathTemplate {
    /// Parse a template, rejecting unknown or unterminated placeholders.
    pub fn new(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Err(Error::Template {
                message: "template is empty".to_string(),
                variable: None,
            });
        }

        let placeholder = Regex::new(r"\{([^{}]*)\}")?;
        for caps in placeholder.captures_iter(raw) {
            let name = &caps[1];
            if !PLACEHOLDERS.contains(&name) {
                return Err(Error::Template {
                    message: format!("Unknown placeholder in '{}'", raw),
                    variable: Some(name.to_string()),
                });
            }
        }

        let leftover = placeholder.replace_all(raw, "");
        if leftover.contains('{') || leftover.contains('}') {
            return Err(Error::Template {
                message: format!("Unbalanced braces in '{}'", raw),
                variable: None,
            });
        }

        Ok(Self {
            raw: raw.to_string(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Substitute the key into the template.
    ///
    /// Returns `None` when the template needs a value the key does not have.
    pub fn render(&self, key: &ArtifactKey) -> Option<PathBuf> {
        let mut rendered = self.raw.clone();
        for name in PLACEHOLDERS {
            let token = format!("{{{}}}", name);
            if rendered.contains(&token) {
                let value = key.value(name)?;
                rendered = rendered.replace(&token, &value);
            }
        }
        Some(PathBuf::from(rendered))
    }
}

/// Parse a list of template strings.
pub fn parse_templates<S: AsRef<str>>(raw: &[S]) -> Result<Vec<PathTemplate>> {
    raw.iter().map(|t| PathTemplate::new(t.as_ref())).collect()
}

/// Outcome of a locator probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// The first candidate that exists.
    Found(PathBuf),
    /// Every candidate probed, in priority order. None of them exist.
    NotFound(Vec<PathBuf>),
}

impl Located {
    /// Convert into a `Result`, turning `NotFound` into
    /// [`Error::ArtifactNotFound`].
    pub fn into_result(self, key: &ArtifactKey) -> Result<PathBuf> {
        match self {
            Located::Found(path) => Ok(path),
            Located::NotFound(tried) => Err(Error::ArtifactNotFound {
                artifact: key.coordinate(),
                tried,
            }),
        }
    }
}

/// Render every applicable template under `root`, in priority order.
pub fn candidate_paths(root: &Path, key: &ArtifactKey, templates: &[PathTemplate]) -> Vec<PathBuf> {
    templates
        .iter()
        .filter_map(|t| t.render(key))
        .map(|relative| root.join(relative))
        .collect()
}

/// Return the first candidate path that is an existing file.
pub fn locate(root: &Path, key: &ArtifactKey, templates: &[PathTemplate]) -> Located {
    let mut tried = Vec::new();
    for candidate in candidate_paths(root, key, templates) {
        log::debug!("Probing {}", candidate.display());
        if candidate.is_file() {
            return Located::Found(candidate);
        }
        tried.push(candidate);
    }
    Located::NotFound(tried)
}
