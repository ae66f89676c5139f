//! CLI command implementations.
//!
//! Each subcommand lives in its own module and receives the
//! [`CliRunner`](crate::cli::CliRunner) for output plus its parsed
//! arguments.

pub mod init;
