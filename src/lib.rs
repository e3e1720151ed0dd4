//! # Native Dependencies Library
//!
//! This library provides the core functionality of the `native-deps`
//! command-line tool: it pulls prebuilt native libraries out of a jar in the
//! local Maven repository and places them where a native build expects them,
//! next to a shallow checkout of the companion header repository.
//!
//! ## Quick Example
//!
//! ```
//! use native_deps::artifact::{self, ArtifactKey};
//! use native_deps::defaults::DEFAULT_TEMPLATES;
//!
//! let key = ArtifactKey::new("com.nvidia", "spark-rapids-jni", "24.12.0", "cuda12", None);
//! let templates = artifact::parse_templates(DEFAULT_TEMPLATES).unwrap();
//!
//! let candidates = artifact::candidate_paths("/m2".as_ref(), &key, &templates);
//! assert_eq!(
//!     candidates[0],
//!     std::path::Path::new("/m2/com/nvidia/spark-rapids-jni/24.12.0/spark-rapids-jni-24.12.0-cuda12.jar")
//! );
//! ```
//!
//! ## Core Concepts
//!
//! - **Settings (`config`, `metadata`)**: versions and the header branch,
//!   taken from flags, environment variables or `pom.xml`.
//! - **Artifact Locator (`artifact`)**: turns an [`artifact::ArtifactKey`]
//!   into candidate paths using naming templates and returns the first one
//!   that exists.
//! - **Extraction (`extract`)**: copies matching archive entries into a
//!   staging directory, flattening their paths.
//! - **Placement (`placement`)**: merges staged files into the destination.
//!   An existing file is never overwritten; differing content is reported as
//!   a conflict.
//! - **Companion Checkout (`repository`, `git`)**: shallow clone of the
//!   header repository, reused when already present.
//!
//! ## Execution Flow
//!
//! [`pipeline::run`] ties the pieces together:
//!
//! 1.  **Locate** the jar.
//! 2.  **Extract** matching entries to staging.
//! 3.  **Merge** staged files into `target/native-deps`.
//! 4.  **Verify** the required library is present.
//! 5.  **Checkout** the companion repository.
//!
//! Every step is idempotent, so the answer to a failed run is to fix the
//! cause and run again.

pub mod artifact;
pub mod config;
pub mod defaults;
pub mod error;
pub mod extract;
pub mod git;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod placement;
pub mod repository;
pub mod suggestions;

#[cfg(test)]
mod artifact_proptest;
