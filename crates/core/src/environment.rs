use std::path::Path;

use dotenvy::{dotenv, from_path};

/// Loads environment variables from a .env file in the project directory.
///
/// Falls back to a .env in the working directory (or nothing) when the project has
/// none, so `${VAR}` references in `stockroom.yaml` can be filled from either.
pub fn load_env_from_project_path(project_path: &Path) {
    if from_path(project_path.join(".env")).is_err() {
        dotenv().ok();
    }
}
