//! Project initialization command.
//!
//! Wires the real collaborators (HTTP Build API client, stdin prompt,
//! on-disk config store) into the init workflow. Flag and pre-existing
//! config validation happens here, before the first prompt is shown.

use crate::api::{ApiConfig, HttpBuildApi};
use crate::cli::{CliRunner, InitArgs};
use crate::config::ConfigStore;
use crate::error::ImpToolResult;
use crate::prompt::StdinPrompt;
use crate::workflow::{self, InitFlags, InitWorkflow};

pub async fn run(_runner: &mut CliRunner, args: InitArgs) -> ImpToolResult<()> {
    let flags = InitFlags::from(&args);
    let project_dir = std::env::current_dir()?;

    let mut store = ConfigStore::open(&project_dir)?;
    workflow::preflight(&flags, &store)?;

    let mut api = HttpBuildApi::new(ApiConfig::default())?;
    let mut prompt = StdinPrompt::new();

    InitWorkflow::new(&mut api, &mut prompt, flags, &mut store, project_dir)
        .run()
        .await?;
    Ok(())
}
