//! # Error Suggestions
//!
//! This module turns library errors into messages that say what went wrong
//! AND how to fix it. Each hint is printed on its own `hint:` line after the
//! error.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use native_deps::suggestions;
//!
//! // Instead of:
//! let jar = located.into_result(&key)?;
//!
//! // Use:
//! let jar = located
//!     .into_result(&key)
//!     .map_err(|e| suggestions::explain(e, Some(&key)))?;
//! ```

use crate::artifact::{ArtifactKey, PLACEHOLDERS};
use crate::error::Error;
use crate::pipeline::Failed;

/// The `mvn` command that downloads `key` into the local repository.
pub fn install_command(key: &ArtifactKey) -> String {
    let classifier = match key.classifier() {
        Some(c) => format!("{}-{}", key.variant(), c),
        None => key.variant().to_string(),
    };
    format!(
        "mvn dependency:get -Dartifact={}:{}:{}:jar:{}",
        key.group(),
        key.name(),
        key.version(),
        classifier
    )
}

/// Hints for `error`. `key` is the artifact being fetched, when known.
pub fn hints(error: &Error, key: Option<&ArtifactKey>) -> Vec<String> {
    match error {
        Error::ConfigMissing { flag, env, key: name, .. } => vec![
            format!("Pass {flag} <VALUE> on the command line"),
            format!("Export {env}=<VALUE>"),
            format!("Or define <{name}> in the project's pom.xml"),
        ],
        Error::MetadataRead { .. } => vec![
            "Run from the project root or point --pom (NATIVE_DEPS_POM) at its pom.xml".to_string(),
            "Values given with flags or environment variables do not need a pom.xml".to_string(),
        ],
        Error::Template { variable: Some(name), .. } => {
            let mut hints = Vec::new();
            if let Some(similar) = find_similar(name, PLACEHOLDERS) {
                hints.push(format!("Did you mean '{{{similar}}}'?"));
            }
            hints.push(format!("Valid placeholders are: {}", PLACEHOLDERS.join(", ")));
            hints
        }
        Error::Template { .. } => {
            vec!["Placeholders are written as {name}; braces must be balanced".to_string()]
        }
        Error::ArtifactNotFound { .. } => {
            let mut hints = Vec::new();
            if let Some(key) = key {
                hints.push(format!("Download it with: {}", install_command(key)));
            }
            hints.push("Or build and install the jar locally with: mvn install".to_string());
            hints.push(
                "Check --jni-version and --cuda-variant, or --local-repo if you use a non-default repository"
                    .to_string(),
            );
            hints
        }
        Error::ExtractionFailed { .. } => vec![
            "The jar may be truncated or corrupt; delete it and download it again".to_string(),
        ],
        Error::NoMatchingEntries { .. } => {
            let mut hints = vec![
                "The jar may be built for a different platform or version".to_string(),
                "List its contents with: native-deps ls --pattern '*'".to_string(),
            ];
            if let Some(key) = key {
                hints.push(format!(
                    "This jar is {}; check --cuda-variant and --classifier",
                    key.coordinate()
                ));
            }
            hints
        }
        Error::RequiredArtifactMissing { file, .. } => vec![
            format!("Make sure a --pattern selects {file}"),
            "Use --require to check for a different file".to_string(),
        ],
        Error::GitClone { .. } => vec![
            "Pass --no-clone to skip the header checkout".to_string(),
        ],
        Error::GitCommand { .. } => vec![
            "Delete the checkout directory and run again".to_string(),
        ],
        Error::Glob(_) => vec![
            "Use * to match any characters (including /) and ? for one character".to_string(),
            "Use [abc] for character classes, [!abc] to negate".to_string(),
        ],
        Error::Filesystem { .. } | Error::Io(_) | Error::Regex(_) => Vec::new(),
    }
}

/// Wrap `error` with its hints.
pub fn explain(error: Error, key: Option<&ArtifactKey>) -> anyhow::Error {
    let hints = hints(&error, key);
    anyhow::anyhow!(with_hints(error.to_string(), &hints))
}

/// Wrap a failed pipeline run with the hints for its error.
pub fn fetch_failed(failed: Failed, key: &ArtifactKey) -> anyhow::Error {
    let hints = hints(&failed.error, Some(key));
    anyhow::anyhow!(with_hints(failed.to_string(), &hints))
}

fn with_hints(mut message: String, hints: &[String]) -> String {
    if !hints.is_empty() {
        message.push('\n');
        for hint in hints {
            message.push_str("\nhint: ");
            message.push_str(hint);
        }
    }
    message
}

/// Split a message built by [`explain`] into the error text and its hints.
pub fn split_hints(message: &str) -> (&str, Vec<&str>) {
    match message.find("\n\nhint: ") {
        Some(at) => {
            let hints = message[at + 2..]
                .lines()
                .filter_map(|line| line.strip_prefix("hint: "))
                .collect();
            (&message[..at], hints)
        }
        None => (message, Vec::new()),
    }
}

/// Find a similar string from a list of candidates using edit distance.
///
/// Returns Some(candidate) if a close match is found (edit distance <= 2).
fn find_similar<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .filter_map(|&candidate| {
            let distance = edit_distance(input, candidate);
            if distance <= 2 && distance < input.len() {
                Some((candidate, distance))
            } else {
                None
            }
        })
        .min_by_key(|(_, distance)| *distance)
        .map(|(candidate, _)| candidate)
}

/// Calculate the Levenshtein edit distance between two strings.
fn edit_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    let mut prev: Vec<usize> = (0..=b_len).collect();
    let mut current = vec![0usize; b_len + 1];
    for i in 1..=a_len {
        current[0] = i;
        for j in 1..=b_len {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            current[j] = (prev[j] + 1)
                .min(current[j - 1] + 1)
                .min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b_len]
}
