// imptool library
//
// Command-line configuration tools for cloud-connected imp devices.
// The library crate exposes the building blocks of the CLI so that
// integration tests can drive the workflows with test doubles.

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod prompt;
pub mod workflow;

// Test doubles shared between unit and integration tests
pub mod testing;

// Re-export commonly used types
pub use api::{ApiError, BuildApi, Device, Model, Revision, RevisionContent};
pub use config::{ConfigError, ConfigStore, LocalConfig};
pub use error::{ImpToolError, ImpToolResult};
pub use workflow::{InitFlags, InitWorkflow, WorkflowError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
