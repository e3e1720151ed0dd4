//! # Fetch Command Implementation
//!
//! Runs the whole pipeline: locate the jar, extract the matching native
//! libraries into `<target>/native-deps`, verify the required library and
//! shallow-clone the header repository into `<target>/cudf-repo`.
//!
//! Existing files at the destination are never overwritten. A file whose
//! content differs from the archive copy is kept and reported as a warning;
//! the command still succeeds.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use native_deps::config::{self, Settings};
use native_deps::defaults::{COMPANION_DIR, DEFAULT_COMPANION_URL, DEFAULT_REQUIRED_FILE, DEFAULT_TARGET_DIR};
use native_deps::output::OutputConfig;
use native_deps::pipeline::{self, FetchPlan, FetchReport};
use native_deps::placement::Outcome;
use native_deps::repository::{
    CheckoutStatus, CompanionRepository, CompanionSpec, DefaultGitOperations, GitOperations,
};
use native_deps::suggestions;

use super::{ArtifactArgs, PatternArgs};

/// Extract native libraries and check out the companion headers
#[derive(Args, Debug)]
pub struct FetchArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    #[command(flatten)]
    pub patterns: PatternArgs,

    /// Build output directory; libraries go to `<DIR>/native-deps`.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_TARGET_DIR)]
    pub target_dir: PathBuf,

    /// File that must be present after extraction.
    #[arg(long, value_name = "FILE", default_value = DEFAULT_REQUIRED_FILE)]
    pub require: String,

    /// URL of the header repository.
    #[arg(long, value_name = "URL", default_value = DEFAULT_COMPANION_URL)]
    pub repo_url: String,

    /// Limit the header checkout to this path (repeatable).
    #[arg(long = "sparse-path", value_name = "PATH")]
    pub sparse_paths: Vec<String>,

    /// Skip the header checkout.
    #[arg(long)]
    pub no_clone: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,

    /// Suppress progress output; errors and conflict warnings are still shown.
    #[arg(short, long)]
    pub quiet: bool,
}

/// Shows a spinner while cloning.
struct ProgressGitOperations {
    inner: DefaultGitOperations,
    output: Option<OutputConfig>,
}

impl GitOperations for ProgressGitOperations {
    fn clone_shallow(
        &self,
        url: &str,
        branch: &str,
        target_dir: &Path,
        sparse_paths: &[String],
    ) -> native_deps::error::Result<()> {
        let spinner = self
            .output
            .as_ref()
            .map(|o| o.spinner(format!("Cloning {url} ({branch})")));
        let result = self
            .inner
            .clone_shallow(url, branch, target_dir, sparse_paths);
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }
        result
    }

    fn is_checkout(&self, dir: &Path) -> bool {
        self.inner.is_checkout(dir)
    }

    fn current_branch(&self, dir: &Path) -> native_deps::error::Result<String> {
        self.inner.current_branch(dir)
    }
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    settings: &'a Settings,
    report: &'a FetchReport,
}

/// Execute the `fetch` command.
pub fn execute(args: FetchArgs, output: &OutputConfig) -> Result<()> {
    let settings = args.artifact.settings()?;
    let resolved = args.artifact.resolve_with(&settings.artifact())?;
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    let target_dir = config::resolve_path(&cwd, &args.target_dir);

    let mut plan = FetchPlan::new(resolved.key.clone(), resolved.local_repo.clone(), target_dir.clone())
        .map_err(|e| suggestions::explain(e, None))?
        .with_templates(resolved.templates.clone())
        .with_patterns(args.patterns.patterns())
        .with_required(args.require.clone());
    if !args.no_clone {
        plan = plan.with_companion(CompanionSpec {
            url: args.repo_url.clone(),
            branch: settings.cudf_branch.value.clone(),
            dir: target_dir.join(COMPANION_DIR),
            sparse_paths: args.sparse_paths.clone(),
        });
    }

    let show_progress = !args.quiet && !args.json;
    if show_progress {
        print_settings(output, &settings);
    }

    let companion = CompanionRepository::with_operations(Box::new(ProgressGitOperations {
        inner: DefaultGitOperations,
        output: show_progress.then(|| output.clone()),
    }));
    let report = pipeline::run(&plan, &companion)
        .map_err(|failed| suggestions::fetch_failed(failed, &plan.key))?;

    if args.json {
        let json = JsonOutput {
            settings: &settings,
            report: &report,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
        return Ok(());
    }

    // Conflicts are reported even in quiet mode.
    for conflict in report.conflicts() {
        eprintln!(
            "{}",
            output.warning(&format!(
                "kept existing {} ({} in the jar differs)",
                conflict.destination.display(),
                conflict.entry_name
            ))
        );
    }

    if !args.quiet {
        print_report(output, &report);
    }
    Ok(())
}

fn print_settings(output: &OutputConfig, settings: &Settings) {
    let rows = [
        ("jni", &settings.jni_version),
        ("cudf", &settings.cudf_version),
        ("variant", &settings.cuda_variant),
        ("branch", &settings.cudf_branch),
    ];
    let summary: Vec<String> = rows
        .iter()
        .map(|(name, s)| format!("{} {} {}", name, s.value, output.dim(&format!("({})", s.origin))))
        .collect();
    println!("{}", output.status("Resolved", &summary.join(", ")));
}

fn print_report(output: &OutputConfig, report: &FetchReport) {
    println!("{}", output.status("Found", &report.artifact.display().to_string()));

    for placed in &report.placed {
        let label = match placed.outcome {
            Outcome::Placed => "Placed",
            Outcome::AlreadyPresent => "Unchanged",
            Outcome::KeptExisting => "Kept",
        };
        println!("{}", output.status(label, &placed.file_name));
    }

    let required = report
        .required
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    println!("{}", output.status("Verified", &required));

    match &report.checkout {
        Some(CheckoutStatus::Cloned { dir }) => {
            println!("{}", output.status("Cloned", &dir.display().to_string()))
        }
        Some(CheckoutStatus::Reused { dir }) => {
            println!("{}", output.status("Reused", &dir.display().to_string()))
        }
        None => println!("{}", output.status("Skipped", "header checkout")),
    }

    let count = |outcome: Outcome| report.placed.iter().filter(|p| p.outcome == outcome).count();
    println!(
        "{}",
        output.status(
            "Finished",
            &format!(
                "{} placed, {} unchanged, {} conflict(s) in {}",
                count(Outcome::Placed),
                count(Outcome::AlreadyPresent),
                count(Outcome::KeptExisting),
                report.native_dir.display()
            )
        )
    );
}
