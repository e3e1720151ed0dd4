//! # Locate Command Implementation
//!
//! Prints the path of the artifact jar in the local repository. With
//! `--all`, every candidate path is listed in priority order together with
//! whether it exists, which helps when a naming template does not match.

use anyhow::Result;
use clap::Args;

use native_deps::artifact;
use native_deps::output::OutputConfig;

use super::ArtifactArgs;

/// Print the path of the artifact jar
#[derive(Args, Debug)]
pub struct LocateArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    /// List every candidate path instead of only the one found.
    #[arg(long)]
    pub all: bool,
}

/// Execute the `locate` command.
pub fn execute(args: LocateArgs, output: &OutputConfig) -> Result<()> {
    let resolved = args.artifact.resolve()?;

    if args.all {
        let candidates =
            artifact::candidate_paths(&resolved.local_repo, &resolved.key, &resolved.templates);
        for candidate in &candidates {
            let marker = if candidate.is_file() {
                output.symbol("✓", "[found]  ")
            } else {
                output.symbol("·", "[missing]")
            };
            println!("{} {}", marker, candidate.display());
        }
        // Still fail when nothing exists, with the same message as a plain locate.
        resolved.locate()?;
        return Ok(());
    }

    let jar = resolved.locate()?;
    println!("{}", jar.display());
    Ok(())
}
