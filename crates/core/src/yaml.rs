use std::{
    env, fs,
    path::{Path, PathBuf},
};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_reissue_path() -> String {
    "/auth/reissue".to_string()
}

fn default_login_endpoint() -> String {
    "/auth/login".to_string()
}

fn default_logout_endpoint() -> String {
    "/auth/logout".to_string()
}

fn default_login_route() -> String {
    "/login".to_string()
}

fn default_landing_route() -> String {
    "/".to_string()
}

fn default_public_routes() -> Vec<String> {
    vec!["/login".to_string(), "/signup".to_string(), "/password".to_string()]
}

fn default_admin_role() -> String {
    "ROLE_ADMIN".to_string()
}

fn default_true() -> bool {
    true
}

fn default_profile() -> String {
    "default".to_string()
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_reissue_path")]
    pub reissue_path: String,
    #[serde(default = "default_login_endpoint")]
    pub login_path: String,
    #[serde(default = "default_logout_endpoint")]
    pub logout_path: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            reissue_path: default_reissue_path(),
            login_path: default_login_endpoint(),
            logout_path: default_logout_endpoint(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RoutesConfig {
    #[serde(default = "default_login_route")]
    pub login: String,
    #[serde(default = "default_landing_route")]
    pub landing: String,
    #[serde(default = "default_public_routes")]
    pub public: Vec<String>,
    #[serde(default = "default_admin_role")]
    pub admin_role: String,
    /// Turning this off lets any signed in user into admin-only routes.
    #[serde(default = "default_true")]
    pub enforce_admin_role: bool,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            login: default_login_route(),
            landing: default_landing_route(),
            public: default_public_routes(),
            admin_role: default_admin_role(),
            enforce_admin_role: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CredentialsConfig {
    #[serde(default = "default_profile")]
    pub profile: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub storage_dir: Option<PathBuf>,
}

impl Default for CredentialsConfig {
    fn default() -> Self {
        Self { profile: default_profile(), storage_dir: None }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    #[serde(default)]
    pub credentials: CredentialsConfig,
}

impl ClientConfig {
    pub fn validate(&self) -> Result<(), String> {
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://")
        {
            return Err(format!("api.base_url must be an http(s) url, got '{}'", self.api.base_url));
        }

        if self.api.timeout_ms == 0 {
            return Err("api.timeout_ms must be greater than 0".to_string());
        }

        for route in
            self.routes.public.iter().chain([&self.routes.login, &self.routes.landing])
        {
            if !route.starts_with('/') {
                return Err(format!("route '{}' must start with '/'", route));
            }
        }

        if !self.routes.public.contains(&self.routes.login) {
            return Err(format!(
                "routes.login '{}' must be one of the public routes",
                self.routes.login
            ));
        }

        if self.credentials.profile.trim().is_empty() {
            return Err("credentials.profile can not be empty".to_string());
        }

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum ReadYamlError {
    #[error("Can not find yaml")]
    CanNotFindYaml,

    #[error("Can not read yaml")]
    CanNotReadYaml,

    #[error("Config is invalid yaml and does not match the struct - {0}")]
    ConfigInvalidYaml(String),

    #[error("Environment variable {0} not found")]
    EnvironmentVariableNotFound(String),

    #[error("Config is invalid: {0}")]
    Invalid(String),
}

/// Substitutes `${VAR}` references with environment values.
fn substitute_env_variables(contents: &str) -> Result<String, ReadYamlError> {
    let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ReadYamlError::Invalid(e.to_string()))?;
    let mut missing = None;

    let result = re.replace_all(contents, |caps: &Captures| {
        let var_name = &caps[1];
        match env::var(var_name) {
            Ok(val) => val,
            Err(_) => {
                error!("Environment variable {} not found", var_name);
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            }
        }
    });

    match missing {
        Some(var_name) => Err(ReadYamlError::EnvironmentVariableNotFound(var_name)),
        None => Ok(result.into_owned()),
    }
}

/// Parses config yaml, substituting environment variables unless `raw_yaml` is set.
pub fn parse(contents: &str, raw_yaml: bool) -> Result<ClientConfig, ReadYamlError> {
    let substituted_contents =
        if raw_yaml { contents.to_string() } else { substitute_env_variables(contents)? };

    // an empty file is a config that takes every default
    let config: ClientConfig = if substituted_contents.trim().is_empty() {
        ClientConfig::default()
    } else {
        serde_yaml::from_str(&substituted_contents)
            .map_err(|e| ReadYamlError::ConfigInvalidYaml(e.to_string()))?
    };

    config.validate().map_err(ReadYamlError::Invalid)?;

    Ok(config)
}

/// Reads and parses the stockroom configuration yaml file.
pub fn read(file_path: &Path, raw_yaml: bool) -> Result<ClientConfig, ReadYamlError> {
    if !file_path.exists() {
        return Err(ReadYamlError::CanNotFindYaml);
    }

    let contents = fs::read_to_string(file_path).map_err(|_| ReadYamlError::CanNotReadYaml)?;

    parse(&contents, raw_yaml)
}

/// Like [`read`], but a missing file gives the default config.
pub fn read_or_default(file_path: &Path) -> Result<ClientConfig, ReadYamlError> {
    match read(file_path, false) {
        Err(ReadYamlError::CanNotFindYaml) => Ok(ClientConfig::default()),
        other => other,
    }
}
