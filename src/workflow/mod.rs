//! Interactive project-initialization workflow.
//!
//! The init wizard runs five stages strictly in order: credential
//! validation, model resolution, device discovery, output-file-path
//! selection, and finalization. Each stage completes (including its own
//! prompt and network round-trips) before the next starts; the shared
//! [`ConfigStore`] is mutated only by the active stage and persisted once
//! at the very end of a successful run.
//!
//! Recoverable problems (a rejected credential, empty required input, a
//! declined confirmation) loop the originating stage. Fatal problems
//! surface as [`WorkflowError`] and abort the run with the configuration
//! left unpersisted.

use crate::api::{ApiError, BuildApi};
use crate::config::{ConfigError, ConfigStore};
use crate::prompt::{Prompt, PromptField};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Device id used to probe whether a credential is accepted. The lookup is
/// expected to miss; only an authentication error is meaningful.
const CREDENTIAL_PROBE_DEVICE_ID: &str = "credential-probe";

/// Validated init command flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitFlags {
    /// Reconfigure even when a local config file already exists.
    pub overwrite: bool,
    /// Keep both local code files as they are.
    pub keep_code: bool,
    /// Keep the local device code file.
    pub keep_device_code: bool,
    /// Keep the local agent code file.
    pub keep_agent_code: bool,
}

impl InitFlags {
    /// Reject contradictory flag combinations. Runs before any prompt.
    pub fn validate(&self) -> Result<(), WorkflowError> {
        if self.keep_code && (self.keep_device_code || self.keep_agent_code) {
            return Err(WorkflowError::ConfigConflict(
                "option '--keep-code' cannot be combined with '--keep-device-code' \
                 or '--keep-agent-code'"
                    .to_string(),
            ));
        }
        Ok(())
    }

    /// Whether the device code file must be left untouched.
    fn skip_device_file(&self) -> bool {
        self.keep_code || self.keep_device_code
    }

    /// Whether the agent code file must be left untouched.
    fn skip_agent_file(&self) -> bool {
        self.keep_code || self.keep_agent_code
    }
}

/// Errors that abort the init workflow.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("{0}")]
    ConfigConflict(String),

    #[error("could not {action}: {source}")]
    Remote {
        action: &'static str,
        source: ApiError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    fn remote(action: &'static str) -> impl FnOnce(ApiError) -> WorkflowError {
        move |source| WorkflowError::Remote { action, source }
    }
}

/// Workflow stages, entered strictly in declaration order. An aborted run
/// is the `Err` return of [`InitWorkflow::run`]; there is no resumable
/// abort state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStage {
    ValidateCredential,
    ResolveModel,
    DiscoverDevices,
    SelectPaths,
    Finalize,
    Done,
}

/// Checks that must pass before the interactive pipeline starts.
pub fn preflight(flags: &InitFlags, store: &ConfigStore) -> Result<(), WorkflowError> {
    flags.validate()?;

    if store.local_exists() && !flags.overwrite {
        return Err(WorkflowError::ConfigConflict(format!(
            "{} already exists. Specify '--overwrite' to reconfigure this project",
            crate::config::CONFIG_FILE_NAME
        )));
    }

    Ok(())
}

/// Default device/agent file names derived from a model name: lowercased,
/// spaces replaced with underscores.
pub fn default_file_names(model_name: &str) -> (String, String) {
    let base = model_name.to_lowercase().replace(' ', "_");
    (format!("{}.device.nut", base), format!("{}.agent.nut", base))
}

/// The init wizard. Generic over the API client and the prompt so tests
/// can drive it with doubles.
pub struct InitWorkflow<'a, A: BuildApi, P: Prompt> {
    api: &'a mut A,
    prompt: &'a mut P,
    flags: InitFlags,
    store: &'a mut ConfigStore,
    project_dir: PathBuf,
}

impl<'a, A: BuildApi, P: Prompt> InitWorkflow<'a, A, P> {
    pub fn new(
        api: &'a mut A,
        prompt: &'a mut P,
        flags: InitFlags,
        store: &'a mut ConfigStore,
        project_dir: PathBuf,
    ) -> Self {
        Self {
            api,
            prompt,
            flags,
            store,
            project_dir,
        }
    }

    /// Run all stages to completion.
    pub async fn run(mut self) -> Result<(), WorkflowError> {
        let mut stage = InitStage::ValidateCredential;
        while stage != InitStage::Done {
            debug!(?stage, "entering init stage");
            stage = match stage {
                InitStage::ValidateCredential => {
                    self.validate_credential().await?;
                    InitStage::ResolveModel
                }
                InitStage::ResolveModel => {
                    self.resolve_model().await?;
                    InitStage::DiscoverDevices
                }
                InitStage::DiscoverDevices => {
                    self.discover_devices().await?;
                    InitStage::SelectPaths
                }
                InitStage::SelectPaths => {
                    self.select_paths()?;
                    InitStage::Finalize
                }
                InitStage::Finalize => {
                    self.finalize().await?;
                    InitStage::Done
                }
                InitStage::Done => InitStage::Done,
            };
        }
        Ok(())
    }

    /// Stage 1: prompt for an API key and validate it against the service.
    ///
    /// The stored key (project, else account) is offered as the default.
    /// Validation probes a device lookup with an id that cannot exist; a
    /// hit or a lookup miss both prove the credential works. A rejected
    /// credential re-prompts with no retry limit; any other remote failure
    /// aborts.
    async fn validate_credential(&mut self) -> Result<(), WorkflowError> {
        let default_key = self.store.default_api_key().map(str::to_string);

        loop {
            let label = match &default_key {
                Some(key) => format!("Build API key ({})", key),
                None => "Build API key".to_string(),
            };

            let entered = self.prompt.input(&label)?;
            let candidate = if entered.is_empty() {
                match &default_key {
                    Some(key) => key.clone(),
                    // No default to fall back on: ask again.
                    None => continue,
                }
            } else {
                entered
            };

            self.api.set_api_key(&candidate);
            match self.api.get_device(CREDENTIAL_PROBE_DEVICE_ID).await {
                Ok(_) => {}
                Err(err) if err.is_not_found() => {}
                Err(err) if err.is_authentication() => {
                    self.prompt.say("ERROR: Invalid API key, try again.");
                    continue;
                }
                Err(source) => {
                    return Err(WorkflowError::Remote {
                        action: "validate API key",
                        source,
                    })
                }
            }

            info!("API key validated");
            self.store.local.api_key = Some(candidate);
            return Ok(());
        }
    }

    /// Stage 2: resolve the user's input to a model, or line up creation.
    ///
    /// Resolution order: id lookup, then case-insensitive exact name match
    /// among search candidates, then an offer to create a model with that
    /// name. Creation itself is deferred to finalization so a declined
    /// later step never leaves an orphaned remote model. Every declined
    /// confirmation restarts the stage from the top.
    async fn resolve_model(&mut self) -> Result<(), WorkflowError> {
        loop {
            let input = self.prompt.input("Model id or name")?;
            if input.is_empty() {
                continue;
            }

            match self.api.get_model(&input).await {
                Ok(model) => {
                    if self.confirm_model(&model.name)? {
                        self.store.local.model_id = Some(model.id);
                        self.store.local.model_name = Some(model.name);
                        return Ok(());
                    }
                    continue;
                }
                Err(err) if err.is_not_found() => {}
                Err(source) => {
                    return Err(WorkflowError::Remote {
                        action: "look up model",
                        source,
                    })
                }
            }

            let candidates = self
                .api
                .search_models(&input)
                .await
                .map_err(WorkflowError::remote("search models"))?;

            // Explicit found-reference: the zero-match path must never
            // touch a candidate index.
            let matched = candidates
                .iter()
                .find(|model| model.name.eq_ignore_ascii_case(&input));

            match matched {
                Some(model) => {
                    if self.confirm_model(&model.name)? {
                        self.store.local.model_id = Some(model.id.clone());
                        self.store.local.model_name = Some(model.name.clone());
                        return Ok(());
                    }
                }
                None => {
                    let create = self
                        .prompt
                        .confirm_default_yes(&format!("Create new model '{}'", input))?;
                    if create {
                        self.store.local.model_id = None;
                        self.store.local.model_name = Some(input);
                        return Ok(());
                    }
                }
            }
        }
    }

    fn confirm_model(&mut self, name: &str) -> Result<bool, WorkflowError> {
        Ok(self
            .prompt
            .confirm_default_yes(&format!("Found a matching model '{}', use this", name))?)
    }

    /// Stage 3: record the devices already assigned to the resolved model.
    ///
    /// Skipped entirely for a model still pending creation. The returned
    /// set is re-filtered client-side against the resolved id, defending
    /// against a service that returns extra results. A query failure is
    /// non-fatal: warn and move on.
    async fn discover_devices(&mut self) -> Result<(), WorkflowError> {
        let model_id = match self.store.local.model_id.clone() {
            Some(id) => id,
            None => return Ok(()),
        };
        let model_name = self
            .store
            .local
            .model_name
            .clone()
            .unwrap_or_else(|| model_id.clone());

        let listed = match self.api.list_devices_for_model(&model_id).await {
            Ok(devices) => devices,
            Err(err) => {
                warn!(%err, model_id, "device listing failed");
                self.prompt.say(&format!(
                    "Warning: could not fetch devices assigned to '{}'.",
                    model_name
                ));
                return Ok(());
            }
        };

        let devices: Vec<String> = listed
            .into_iter()
            .filter(|device| device.model_id.as_deref() == Some(model_id.as_str()))
            .map(|device| device.id)
            .collect();

        let noun = if devices.len() == 1 { "device" } else { "devices" };
        self.prompt.say(&format!(
            "Found {} {} associated with '{}'.",
            devices.len(),
            noun,
            model_name
        ));
        self.store.local.devices = devices;
        Ok(())
    }

    /// Stage 4: choose the device/agent code file paths.
    ///
    /// Defaults derive from the model name; previously stored paths win
    /// over derived ones. Empty answers take the defaults. The two results
    /// land under distinct keys.
    fn select_paths(&mut self) -> Result<(), WorkflowError> {
        let model_name = self
            .store
            .local
            .model_name
            .clone()
            .ok_or_else(|| WorkflowError::Internal("no model name after resolution".to_string()))?;

        let (derived_device, derived_agent) = default_file_names(&model_name);
        let device_default = self
            .store
            .local
            .device_file
            .clone()
            .unwrap_or(derived_device);
        let agent_default = self.store.local.agent_file.clone().unwrap_or(derived_agent);

        let answers = self.prompt.multi(&[
            PromptField::new("Device code file", &device_default),
            PromptField::new("Agent code file", &agent_default),
        ])?;

        let pick = |answer: &str, default: String| {
            if answer.is_empty() {
                default
            } else {
                answer.to_string()
            }
        };
        self.store.local.device_file = Some(pick(&answers[0], device_default));
        self.store.local.agent_file = Some(pick(&answers[1], agent_default));
        Ok(())
    }

    /// Stage 5: retrieve code, write files, persist configuration.
    ///
    /// Existing model: fetch the newest revision (if any) and write the
    /// code files, honoring the keep flags. Pending model: create it now
    /// and write empty placeholders since no remote code exists yet. File
    /// writes complete before the configuration is persisted; nothing is
    /// rolled back on a late failure.
    async fn finalize(&mut self) -> Result<(), WorkflowError> {
        match self.store.local.model_id.clone() {
            Some(model_id) => {
                let revisions = self
                    .api
                    .list_revisions(&model_id)
                    .await
                    .map_err(WorkflowError::remote("fetch code revisions"))?;

                if let Some(newest) = revisions.first() {
                    let content = self
                        .api
                        .get_revision(&model_id, newest.version)
                        .await
                        .map_err(WorkflowError::remote("fetch code revisions"))?;

                    if !self.flags.skip_device_file() {
                        self.write_code_file(FileKind::Device, &content.device_code)?;
                    }
                    if !self.flags.skip_agent_file() {
                        self.write_code_file(FileKind::Agent, &content.agent_code)?;
                    }
                }
            }
            None => {
                let name = self.store.local.model_name.clone().ok_or_else(|| {
                    WorkflowError::Internal("no model name for pending creation".to_string())
                })?;
                let model = self
                    .api
                    .create_model(&name)
                    .await
                    .map_err(WorkflowError::remote("create model"))?;

                info!(model_id = %model.id, "created model");
                self.store.local.model_id = Some(model.id);
                self.store.local.model_name = Some(model.name);

                // Brand-new model: no remote code yet, start from blanks.
                self.write_code_file(FileKind::Device, "")?;
                self.write_code_file(FileKind::Agent, "")?;
            }
        }

        self.store.persist_local()?;

        self.prompt.say("Success! To add devices run:");
        self.prompt.say("   imptool devices --add <deviceId>");
        Ok(())
    }

    fn write_code_file(&self, kind: FileKind, content: &str) -> Result<(), WorkflowError> {
        let stored = match kind {
            FileKind::Device => self.store.local.device_file.as_deref(),
            FileKind::Agent => self.store.local.agent_file.as_deref(),
        };
        let path = stored.ok_or_else(|| {
            WorkflowError::Internal(format!("no {} file path after path selection", kind.label()))
        })?;

        let target = resolve_in(&self.project_dir, path);
        debug!(path = %target.display(), "writing {} code", kind.label());
        std::fs::write(target, content)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum FileKind {
    Device,
    Agent,
}

impl FileKind {
    fn label(&self) -> &'static str {
        match self {
            FileKind::Device => "device",
            FileKind::Agent => "agent",
        }
    }
}

/// Resolve a possibly relative user path against the project directory.
fn resolve_in(project_dir: &Path, path: &str) -> PathBuf {
    let candidate = Path::new(path);
    if candidate.is_absolute() {
        candidate.to_path_buf()
    } else {
        project_dir.join(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keep_code_conflicts_with_single_file_flags() {
        let conflict = InitFlags {
            keep_code: true,
            keep_device_code: true,
            ..Default::default()
        };
        assert!(conflict.validate().is_err());

        let conflict = InitFlags {
            keep_code: true,
            keep_agent_code: true,
            ..Default::default()
        };
        assert!(conflict.validate().is_err());
    }

    #[test]
    fn individual_keep_flags_are_valid_alone_and_together() {
        for flags in [
            InitFlags::default(),
            InitFlags {
                keep_code: true,
                ..Default::default()
            },
            InitFlags {
                keep_device_code: true,
                keep_agent_code: true,
                ..Default::default()
            },
        ] {
            assert!(flags.validate().is_ok());
        }
    }

    #[test]
    fn both_single_file_flags_skip_both_files() {
        let flags = InitFlags {
            keep_device_code: true,
            keep_agent_code: true,
            ..Default::default()
        };
        assert!(flags.skip_device_file());
        assert!(flags.skip_agent_file());
    }

    #[test]
    fn keep_device_code_only_skips_the_device_file() {
        let flags = InitFlags {
            keep_device_code: true,
            ..Default::default()
        };
        assert!(flags.skip_device_file());
        assert!(!flags.skip_agent_file());
    }

    #[test]
    fn file_name_defaults_derive_from_model_name() {
        let (device, agent) = default_file_names("My Model");
        assert_eq!(device, "my_model.device.nut");
        assert_eq!(agent, "my_model.agent.nut");

        let (device, _) = default_file_names("Office Temp Sensor");
        assert_eq!(device, "office_temp_sensor.device.nut");
    }

    #[test]
    fn relative_paths_resolve_against_the_project_dir() {
        let base = Path::new("/proj");
        assert_eq!(resolve_in(base, "a.nut"), PathBuf::from("/proj/a.nut"));
        assert_eq!(resolve_in(base, "/abs/a.nut"), PathBuf::from("/abs/a.nut"));
    }
}
