//! # Clean Command Implementation
//!
//! Removes what `fetch` created under the target directory: the extracted
//! libraries, the header checkout and any staging directory left behind by an
//! interrupted run. The next `fetch` starts from scratch.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use native_deps::defaults::{COMPANION_DIR, DEFAULT_TARGET_DIR, NATIVE_DEPS_DIR};
use native_deps::output::OutputConfig;
use native_deps::pipeline;

/// Remove extracted libraries and the header checkout
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Build output directory used by fetch.
    #[arg(long, value_name = "DIR", default_value = DEFAULT_TARGET_DIR)]
    pub target_dir: PathBuf,

    /// Leave the header checkout in place.
    #[arg(long)]
    pub keep_checkout: bool,

    /// Show what would be removed without removing anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the `clean` command.
pub fn execute(args: CleanArgs, output: &OutputConfig) -> Result<()> {
    let mut targets = vec![args.target_dir.join(NATIVE_DEPS_DIR)];
    if !args.keep_checkout {
        targets.push(args.target_dir.join(COMPANION_DIR));
    }

    let mut removed = 0;
    for dir in targets.iter().filter(|d| d.exists()) {
        if args.dry_run {
            println!("{}", output.status("Would remove", &dir.display().to_string()));
            continue;
        }
        fs::remove_dir_all(dir).with_context(|| format!("Failed to remove {}", dir.display()))?;
        println!("{}", output.status("Removed", &dir.display().to_string()));
        removed += 1;
    }

    if !args.dry_run {
        removed += pipeline::sweep_stale_staging(&args.target_dir);
    }

    if removed == 0 && !args.dry_run {
        println!("Nothing to clean in {}", args.target_dir.display());
    }
    Ok(())
}
