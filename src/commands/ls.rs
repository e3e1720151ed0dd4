//! # Ls Command Implementation
//!
//! This module implements the `ls` subcommand, which lists the archive
//! entries a `fetch` would extract, without writing anything.
//!
//! ## Functionality
//!
//! - **Entry Listing**: shows each matching entry and the file name it would
//!   get at the destination
//! - **Pattern Filtering**: uses the same `--pattern` options as `fetch`
//! - **Detailed Output**: optional long format showing entry sizes
//! - **Sorting**: entries can be sorted by archive order, name or size

use anyhow::Result;
use clap::{Args, ValueEnum};

use native_deps::extract::{self, MatchedEntry};
use native_deps::output::OutputConfig;
use native_deps::suggestions;

use super::{ArtifactArgs, PatternArgs};

/// List the archive entries a fetch would extract
#[derive(Args, Debug)]
pub struct LsArgs {
    #[command(flatten)]
    pub artifact: ArtifactArgs,

    #[command(flatten)]
    pub patterns: PatternArgs,

    /// Use long listing format showing entry sizes.
    #[arg(short, long)]
    pub long: bool,

    /// Sort order for the listing.
    #[arg(short, long, value_enum, default_value = "archive")]
    pub sort: SortOrder,

    /// Show only the number of matching entries.
    #[arg(long)]
    pub count: bool,

    /// Print the entries as JSON.
    #[arg(long)]
    pub json: bool,
}

/// Sort order options for the listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum SortOrder {
    /// Keep the order of the archive
    #[default]
    Archive,
    /// Sort alphabetically by file name
    Name,
    /// Sort by uncompressed size
    Size,
}

/// Execute the `ls` command.
pub fn execute(args: LsArgs, output: &OutputConfig) -> Result<()> {
    let resolved = args.artifact.resolve()?;
    let jar = resolved.locate()?;
    let patterns = args.patterns.patterns();

    let mut entries = extract::matching_entries(&jar, &patterns)
        .map_err(|e| suggestions::explain(e, Some(&resolved.key)))?;
    sort_entries(&mut entries, args.sort);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    if args.count {
        println!("{}", entries.len());
        return Ok(());
    }

    if entries.is_empty() {
        println!("No entries in {} match: {}", jar.display(), patterns.join(", "));
        return Ok(());
    }

    for entry in &entries {
        if args.long {
            println!(
                "{:>10} {} {}",
                format_size(entry.size),
                entry.entry_name,
                output.dim(&format!("-> {}", entry.file_name))
            );
        } else {
            println!("{}", entry.entry_name);
        }
    }

    let total: u64 = entries.iter().map(|e| e.size).sum();
    println!();
    println!("{} entr{}, {} total", entries.len(), if entries.len() == 1 { "y" } else { "ies" }, format_size(total));
    Ok(())
}

fn sort_entries(entries: &mut [MatchedEntry], order: SortOrder) {
    match order {
        SortOrder::Archive => entries.sort_by_key(|e| e.index),
        SortOrder::Name => entries.sort_by(|a, b| a.file_name.cmp(&b.file_name)),
        SortOrder::Size => entries.sort_by_key(|e| e.size),
    }
}

/// Format a byte count with a binary unit.
fn format_size(size: u64) -> String {
    const UNITS: &[&str] = &["B", "K", "M", "G"];
    let mut value = size as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{}B", size)
    } else {
        format!("{:.1}{}", value, UNITS[unit])
    }
}
