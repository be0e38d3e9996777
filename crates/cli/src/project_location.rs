use std::path::PathBuf;

use stockroom::Client;
use stockroom_core::{ClientConfig, read_or_default};
use tracing::debug;

use crate::commands::error::ProjectLocationError;

pub const CONFIG_FILE_NAME: &str = "stockroom.yaml";

#[derive(Debug, Clone)]
pub struct ProjectLocation {
    project_dir: PathBuf,
    override_profile: Option<String>,
}

impl ProjectLocation {
    pub fn new(project_dir: PathBuf) -> Self {
        Self { project_dir, override_profile: None }
    }

    pub fn override_profile(&mut self, profile: &str) {
        self.override_profile = Some(profile.to_string());
    }

    /// Reads stockroom.yaml from the project directory, falling back to defaults when absent.
    pub fn client_config(&self) -> Result<ClientConfig, ProjectLocationError> {
        let mut config =
            read_or_default(&self.project_dir.join(CONFIG_FILE_NAME)).map_err(|e| {
                ProjectLocationError::ProjectConfig(format!("Failed to read config: {}", e))
            })?;

        if let Some(profile) = &self.override_profile {
            config.credentials.profile = profile.clone();
        }

        Ok(config)
    }

    pub fn client(&self) -> Result<Client, ProjectLocationError> {
        let config = self.client_config()?;
        debug!(
            "Using api {} with credential profile '{}'",
            config.api.base_url, config.credentials.profile
        );
        Ok(Client::with_file_credentials(&config)?)
    }
}
