//! # Completions Command Implementation
//!
//! Writes a shell completion script for `native-deps` to stdout, generated
//! by `clap_complete` from the CLI definition.
//!
//! ```bash
//! native-deps completions bash > ~/.local/share/bash-completion/completions/native-deps
//! native-deps completions zsh > ~/.zfunc/_native-deps
//! native-deps completions fish > ~/.config/fish/completions/native-deps.fish
//! ```

use std::io;

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
