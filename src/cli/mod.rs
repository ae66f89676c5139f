//! Command-line interface.
//!
//! Defines the clap surface and the [`CliRunner`] that dispatches
//! subcommands and owns colored terminal output.

use clap::{Args, Parser, Subcommand};
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    ExecutableCommand,
};
use is_terminal::IsTerminal;
use std::io;
use std::path::PathBuf;

pub mod commands;

use crate::error::ImpToolResult;
use crate::workflow::InitFlags;

/// Simple color support detection.
fn supports_color() -> bool {
    std::env::var("NO_COLOR").is_err()
        && (std::env::var("FORCE_COLOR").is_ok()
            || (io::stdout().is_terminal()
                && std::env::var("TERM")
                    .map(|term| !term.is_empty() && term != "dumb")
                    .unwrap_or(false)))
}

/// imptool command-line interface.
#[derive(Parser)]
#[command(
    name = "imptool",
    about = "Configuration tools for cloud-connected imp devices",
    version = env!("CARGO_PKG_VERSION")
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    pub directory: Option<PathBuf>,
}

/// Available CLI commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Configure the current directory as a device project
    Init(InitArgs),
}

/// Project initialization arguments.
#[derive(Args, Debug, Default)]
pub struct InitArgs {
    /// Overwrite an existing project configuration
    #[arg(long)]
    pub overwrite: bool,

    /// Do not overwrite local device and agent code with model code
    #[arg(long)]
    pub keep_code: bool,

    /// Do not overwrite local device code with model device code
    #[arg(long)]
    pub keep_device_code: bool,

    /// Do not overwrite local agent code with model agent code
    #[arg(long)]
    pub keep_agent_code: bool,
}

impl From<&InitArgs> for InitFlags {
    fn from(args: &InitArgs) -> Self {
        InitFlags {
            overwrite: args.overwrite,
            keep_code: args.keep_code,
            keep_device_code: args.keep_device_code,
            keep_agent_code: args.keep_agent_code,
        }
    }
}

/// Dispatches subcommands and formats user-facing output.
pub struct CliRunner {
    color_enabled: bool,
}

impl CliRunner {
    pub fn new(_cli: &Cli) -> Self {
        Self {
            color_enabled: supports_color(),
        }
    }

    /// Run the CLI command.
    pub async fn run(&mut self, command: Commands) -> ImpToolResult<()> {
        match command {
            Commands::Init(args) => commands::init::run(self, args).await,
        }
    }

    pub fn print_error(&self, message: &str) {
        self.print_colored(Color::Red, &format!("ERROR: {}", message));
    }

    fn print_colored(&self, color: Color, message: &str) {
        if self.color_enabled {
            let mut stdout = io::stdout();
            let _ = stdout
                .execute(SetForegroundColor(color))
                .and_then(|s| s.execute(Print(message)))
                .and_then(|s| s.execute(ResetColor))
                .and_then(|s| s.execute(Print("\n")));
        } else {
            println!("{}", message);
        }
    }
}
