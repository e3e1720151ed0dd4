//! Default values for native-deps configuration.
//!
//! This module provides centralized default values used across commands,
//! ensuring consistency and avoiding duplication.

use std::path::PathBuf;

/// Default project metadata file, relative to the working directory.
pub const DEFAULT_POM_FILENAME: &str = "pom.xml";

/// Default build output directory.
pub const DEFAULT_TARGET_DIR: &str = "target";

/// Directory under the target directory that receives extracted libraries.
pub const NATIVE_DEPS_DIR: &str = "native-deps";

/// Directory under the target directory that holds the header checkout.
pub const COMPANION_DIR: &str = "cudf-repo";

/// Prefix of the temporary staging directories created during extraction.
pub const STAGING_PREFIX: &str = ".native-deps-staging";

pub const DEFAULT_GROUP: &str = "com.nvidia";
pub const DEFAULT_ARTIFACT: &str = "spark-rapids-jni";

/// Library that must be present after a successful merge.
pub const DEFAULT_REQUIRED_FILE: &str = "libcudf.so";

pub const DEFAULT_COMPANION_URL: &str = "https://github.com/rapidsai/cudf.git";

/// Glob patterns selecting the native libraries inside the jar.
pub const DEFAULT_PATTERNS: &[&str] = &["*libcudf*.so*", "*libnvcomp*.so*"];

/// Artifact naming conventions, in priority order.
pub const DEFAULT_TEMPLATES: &[&str] = &[
    "{group_path}/{name}/{version}/{name}-{version}-{variant}-{classifier}.jar",
    "{group_path}/{name}/{version}/{name}-{version}-{variant}.jar",
    "{group_path}/{name}/{version}/{name}-{version}.jar",
];

/// Returns the default local Maven repository.
///
/// Resolves to `~/.m2/repository`. Falls back to `.m2/repository` in the
/// current directory if the home directory cannot be determined.
///
/// This can be overridden by the `--local-repo` CLI flag or the
/// `MAVEN_LOCAL_REPO` environment variable.
pub fn default_local_repo() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".m2")
        .join("repository")
}
