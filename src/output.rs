//! # Output Configuration
//!
//! Controls how the CLI talks to the terminal: whether to use color and
//! symbols, and how status lines are formatted.
//!
//! ## Respecting User Preferences
//!
//! The module respects the following environment variables and flags:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Usage
//!
//! ```rust,ignore
//! use native_deps::output::OutputConfig;
//!
//! let out = OutputConfig::from_env_and_flag("auto");
//! println!("{}", out.status("placed", "libcudf.so"));
//! eprintln!("{}", out.warning("kept existing libcudf.so"));
//! ```

use std::env;
use std::time::Duration;

use console::{style, Style};
use indicatif::{ProgressBar, ProgressStyle};

/// Output configuration for controlling colors and symbols.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors and symbols should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// - `--color=always`: force colors on (overrides NO_COLOR)
    /// - `--color=never`: force colors off
    /// - `--color=auto`: detect based on environment
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // The presence of the variable (even if empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }

    /// Make `console` agree with this configuration for both streams.
    pub fn apply(&self) {
        console::set_colors_enabled(self.use_color);
        console::set_colors_enabled_stderr(self.use_color);
    }

    /// Create a configuration with colors always enabled.
    #[cfg(test)]
    pub fn with_color() -> Self {
        Self { use_color: true }
    }

    /// Create a configuration with colors always disabled.
    #[cfg(test)]
    pub fn without_color() -> Self {
        Self { use_color: false }
    }

    /// A right-aligned status label followed by a message, cargo style.
    pub fn status(&self, label: &str, message: &str) -> String {
        self.labelled(label, message, Style::new().green().bold())
    }

    pub fn warning(&self, message: &str) -> String {
        let marker = self.symbol("⚠", "warning:");
        self.labelled_raw(marker, message, Style::new().yellow().bold())
    }

    pub fn error(&self, message: &str) -> String {
        let marker = self.symbol("✗", "error:");
        self.labelled_raw(marker, message, Style::new().red().bold())
    }

    /// A `hint:` line.
    pub fn hint(&self, message: &str) -> String {
        if self.use_color {
            format!("{} {}", style("hint:").cyan(), message)
        } else {
            format!("hint: {}", message)
        }
    }

    /// Dimmed text when colors are on.
    pub fn dim(&self, text: &str) -> String {
        if self.use_color {
            style(text).dim().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn symbol<'a>(&self, fancy: &'a str, plain: &'a str) -> &'a str {
        emoji(self, fancy, plain)
    }

    /// A spinner for a long step, hidden when colors are off.
    pub fn spinner(&self, message: impl Into<String>) -> ProgressBar {
        if !self.use_color {
            return ProgressBar::hidden();
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.into());
        spinner.enable_steady_tick(Duration::from_millis(100));
        spinner
    }

    fn labelled(&self, label: &str, message: &str, label_style: Style) -> String {
        let padded = format!("{:>12}", label);
        if self.use_color {
            format!("{} {}", label_style.apply_to(padded), message)
        } else {
            format!("{} {}", padded, message)
        }
    }

    fn labelled_raw(&self, marker: &str, message: &str, marker_style: Style) -> String {
        if self.use_color {
            format!("{} {}", marker_style.apply_to(marker), message)
        } else {
            format!("{} {}", marker, message)
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Returns `emoji_str` when colors are enabled and `plain` otherwise.
pub fn emoji<'a>(config: &OutputConfig, emoji_str: &'a str, plain: &'a str) -> &'a str {
    if config.use_color {
        emoji_str
    } else {
        plain
    }
}
