//! Shared test utilities for the CLI end-to-end tests.
//!
//! A [`TestFixture`] is a temporary project directory with a `pom.xml`, a
//! private local Maven repository (`m2/`) and a `target/` directory. Commands
//! created through the fixture run inside it with every configuration
//! environment variable cleared, so the host environment cannot leak in.
//!
//! ## Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new()
//!         .with_pom(poms::STANDARD)
//!         .with_jar(&[("lib/libcudf.so", "cudf")]);
//!     fixture.command().arg("locate").assert().success();
//! }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};

use assert_fs::prelude::*;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::poms;
    pub use super::TestFixture;
    #[allow(unused_imports)]
    pub use super::{JAR_PATH, STANDARD_ENTRIES};
}

/// Environment variables the CLI reads configuration from.
pub const CONFIG_ENV_VARS: &[&str] = &[
    "JNI_VERSION",
    "CUDF_VERSION",
    "CUDA_VERSION",
    "CUDF_BRANCH",
    "NATIVE_DEPS_POM",
    "MAVEN_LOCAL_REPO",
    "RUST_LOG",
];

/// Where the standard pom's jar lives inside the local repository.
#[allow(dead_code)]
pub const JAR_PATH: &str = "com/nvidia/spark-rapids-jni/24.12.0/spark-rapids-jni-24.12.0-cuda12.jar";

/// A jar with both libraries nested under `lib/`.
#[allow(dead_code)]
pub const STANDARD_ENTRIES: &[(&str, &str)] = &[
    ("META-INF/MANIFEST.MF", "Manifest-Version: 1.0\n"),
    ("lib/libcudf.so", "cudf library"),
    ("lib/libnvcomp.so.1", "nvcomp library"),
    ("com/nvidia/spark/rapids/jni/Native.class", "class"),
];

/// Project descriptors for testing.
#[allow(dead_code)]
pub mod poms {
    /// A pom with every value the CLI needs.
    pub const STANDARD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <groupId>com.nvidia</groupId>
  <artifactId>spark-rapids-jni</artifactId>
  <version>24.12.0</version>
  <properties>
    <cuda.version>cuda12</cuda.version>
    <cudf.version>${project.version}</cudf.version>
  </properties>
</project>
"#;

    /// A pom without the `cudf.version` property.
    pub const WITHOUT_CUDF_VERSION: &str = r#"<project>
  <version>24.12.0</version>
  <properties>
    <cuda.version>cuda12</cuda.version>
  </properties>
</project>
"#;
}

/// A temporary project directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Write `pom.xml` with the given content.
    pub fn with_pom(self, content: &str) -> Self {
        self.temp_dir
            .child("pom.xml")
            .write_str(content)
            .expect("Failed to write pom.xml");
        self
    }

    /// Publish a jar with the given entries at [`JAR_PATH`].
    pub fn with_jar(self, entries: &[(&str, &str)]) -> Self {
        self.with_jar_at(JAR_PATH, entries)
    }

    /// Publish a jar with the given entries at `relative` inside the local repository.
    pub fn with_jar_at(self, relative: &str, entries: &[(&str, &str)]) -> Self {
        let path = self.local_repo().join(relative);
        write_jar(&path, entries);
        self
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Pretend the header repository was already cloned.
    pub fn with_checkout(self) -> Self {
        self.temp_dir
            .child("target/cudf-repo/.git")
            .create_dir_all()
            .expect("Failed to create checkout");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn local_repo(&self) -> PathBuf {
        self.path().join("m2")
    }

    pub fn native_dir(&self) -> PathBuf {
        self.path().join("target/native-deps")
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// A command running in the fixture with a clean environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("native-deps");
        cmd.current_dir(self.path());
        for var in CONFIG_ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.env("NO_COLOR", "1");
        cmd
    }

    /// A command for `subcommand` pointed at the fixture's local repository.
    pub fn run(&self, subcommand: &str) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg(subcommand).arg("--local-repo").arg(self.local_repo());
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a zip archive with the given entries, creating parent directories.
#[allow(dead_code)]
pub fn write_jar(path: &Path, entries: &[(&str, &str)]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("Failed to create jar directory");
    }
    let file = std::fs::File::create(path).expect("Failed to create jar");
    let mut zip = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    for (name, content) in entries {
        zip.start_file(*name, options).expect("Failed to start entry");
        zip.write_all(content.as_bytes()).expect("Failed to write entry");
    }
    zip.finish().expect("Failed to finish jar");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_with_jar() {
        let fixture = TestFixture::new().with_jar(STANDARD_ENTRIES);
        assert!(fixture.local_repo().join(JAR_PATH).is_file());
    }

    #[test]
    fn test_fixture_with_checkout() {
        let fixture = TestFixture::new().with_checkout();
        assert!(fixture.path().join("target/cudf-repo/.git").is_dir());
    }
}
