//! Project metadata read from a Maven `pom.xml`.
//!
//! Only two things are needed from the descriptor: the project's own version
//! and the `<properties>` block. The file is parsed with `xot`; when it is not
//! well-formed XML a text-pattern fallback picks the same values out with
//! regular expressions, so a half-edited descriptor still yields its versions.
//!
//! Property values may refer to other properties with `${name}`, including
//! `${project.version}`; [`ProjectMetadata::property`] expands them.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use regex::Regex;
use xot::{Node, Xot};

use crate::error::{Error, Result};

/// Guards against reference cycles such as `a=${b}`, `b=${a}`.
const MAX_EXPANSION_DEPTH: usize = 8;

/// Values extracted from a project descriptor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectMetadata {
    /// `/project/version`
    pub version: Option<String>,
    /// `/project/properties/*`
    pub properties: BTreeMap<String, String>,
}

impl ProjectMetadata {
    /// Read and parse a descriptor from disk.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::MetadataRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::parse(&text, path)
    }

    /// Parse descriptor text. `origin` is only used in diagnostics.
    pub fn parse(text: &str, origin: &Path) -> Result<Self> {
        match parse_xml(text) {
            Ok(Some(metadata)) => Ok(metadata),
            Ok(None) => Err(Error::MetadataRead {
                path: origin.display().to_string(),
                message: "root element is not <project>".to_string(),
            }),
            Err(reason) => {
                log::warn!(
                    "{} is not well-formed XML ({}), falling back to text matching",
                    origin.display(),
                    reason
                );
                parse_text(text)
            }
        }
    }

    /// Look up a value by name with `${...}` references expanded.
    ///
    /// `project.version` resolves to the project version.
    pub fn property(&self, name: &str) -> Option<String> {
        let raw = self.raw(name)?;
        self.expand(raw, 0)
    }

    fn raw(&self, name: &str) -> Option<&str> {
        if name == "project.version" {
            self.version.as_deref()
        } else {
            self.properties.get(name).map(String::as_str)
        }
    }

    fn expand(&self, value: &str, depth: usize) -> Option<String> {
        if !value.contains("${") {
            return Some(value.to_string());
        }
        if depth >= MAX_EXPANSION_DEPTH {
            log::warn!("Giving up expanding '{}': references nest too deeply", value);
            return None;
        }

        let mut out = String::with_capacity(value.len());
        let mut rest = value;
        while let Some(start) = rest.find("${") {
            out.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let end = after.find('}')?;
            let referenced = self.raw(&after[..end])?;
            out.push_str(&self.expand(referenced, depth + 1)?);
            rest = &after[end + 1..];
        }
        out.push_str(rest);
        Some(out)
    }

    /// The project version with references expanded.
    pub fn project_version(&self) -> Option<String> {
        self.property("project.version")
    }
}

fn child_elements<'a>(xot: &'a Xot, node: Node) -> impl Iterator<Item = Node> + 'a {
    xot.children(node).filter(move |n| xot.is_element(*n))
}

fn local_name(xot: &Xot, node: Node) -> Option<&str> {
    xot.element(node).map(|e| xot.name_ns_str(e.name()).0)
}

fn text_of(xot: &Xot, node: Node) -> Option<String> {
    xot.text_content_str(node)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `Err` when the text is not XML, `Ok(None)` when the root is not a project.
fn parse_xml(text: &str) -> std::result::Result<Option<ProjectMetadata>, String> {
    let mut xot = Xot::new();
    let doc = xot.parse(text).map_err(|e| e.to_string())?;

    let Some(project) = child_elements(&xot, doc).next() else {
        return Ok(None);
    };
    if local_name(&xot, project) != Some("project") {
        return Ok(None);
    }

    let mut metadata = ProjectMetadata::default();
    for child in child_elements(&xot, project) {
        match local_name(&xot, child) {
            Some("version") => metadata.version = text_of(&xot, child),
            Some("properties") => {
                for prop in child_elements(&xot, child) {
                    if let (Some(name), Some(value)) = (local_name(&xot, prop), text_of(&xot, prop)) {
                        metadata.properties.insert(name.to_string(), value);
                    }
                }
            }
            _ => {}
        }
    }
    Ok(Some(metadata))
}

/// Pattern-based extraction for descriptors that do not parse as XML.
fn parse_text(text: &str) -> Result<ProjectMetadata> {
    let comments = Regex::new(r"(?s)<!--.*?-->")?;
    let text = comments.replace_all(text, "");

    let mut metadata = ProjectMetadata::default();

    let properties = Regex::new(r"(?s)<properties>(.*?)</properties>")?;
    let property = Regex::new(r"<([A-Za-z_][\w.\-]*)>\s*([^<]*?)\s*</([A-Za-z_][\w.\-]*)>")?;
    if let Some(block) = properties.captures(&text) {
        for caps in property.captures_iter(&block[1]) {
            if caps[1] == caps[3] && !caps[2].is_empty() {
                metadata
                    .properties
                    .insert(caps[1].to_string(), caps[2].to_string());
            }
        }
    }

    // The project version is the first <version> outside the <parent>,
    // <dependencies>, <dependencyManagement>, <build>, <profiles> and
    // <properties> sections.
    let nested = Regex::new(
        r"(?s)<(parent|dependencies|dependencyManagement|build|plugins|profiles|properties)>.*?</(parent|dependencies|dependencyManagement|build|plugins|profiles|properties)>",
    )?;
    let top_level = nested.replace_all(&text, "");
    let version = Regex::new(r"<version>\s*([^<]+?)\s*</version>")?;
    metadata.version = version.captures(&top_level).map(|c| c[1].to_string());

    Ok(metadata)
}
