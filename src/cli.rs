//! CLI argument parsing and command dispatch

use anyhow::Result;
use clap::{Parser, Subcommand};

use native_deps::output::OutputConfig;

use crate::commands;

/// Native Dependencies - Fetch prebuilt native libraries for a local build
#[derive(Parser, Debug)]
#[command(name = "native-deps")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Colorize output (always, never, auto)
    #[arg(
        long,
        global = true,
        value_name = "WHEN",
        default_value = "auto",
        value_parser = ["auto", "always", "never"]
    )]
    color: String,

    /// Set log level (error, warn, info, debug, trace). RUST_LOG takes precedence
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        default_value = "warn",
        value_parser = ["off", "error", "warn", "info", "debug", "trace"]
    )]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract the native libraries and check out the companion headers
    Fetch(commands::fetch::FetchArgs),

    /// Print the path of the artifact jar in the local repository
    Locate(commands::locate::LocateArgs),

    /// List the archive entries a fetch would extract
    Ls(commands::ls::LsArgs),

    /// Remove extracted libraries and the header checkout
    Clean(commands::clean::CleanArgs),

    /// Generate shell completion scripts
    Completions(commands::completions::CompletionsArgs),
}

impl Cli {
    /// Output settings derived from `--color` and the environment.
    pub fn output_config(&self) -> OutputConfig {
        OutputConfig::from_env_and_flag(&self.color)
    }

    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        self.init_logging();
        let output = self.output_config();
        output.apply();

        match self.command {
            Commands::Fetch(args) => commands::fetch::execute(args, &output),
            Commands::Locate(args) => commands::locate::execute(args, &output),
            Commands::Ls(args) => commands::ls::execute(args, &output),
            Commands::Clean(args) => commands::clean::execute(args, &output),
            Commands::Completions(args) => commands::completions::execute(args),
        }
    }

    fn init_logging(&self) {
        let env = env_logger::Env::default().default_filter_or(self.log_level.as_str());
        // A logger may already be installed when running under a test harness.
        let _ = env_logger::Builder::from_env(env)
            .format_timestamp(None)
            .try_init();
    }
}
