use std::{env, path::PathBuf, str::FromStr};

#[cfg(feature = "jemalloc")]
use tikv_jemallocator::Jemalloc;

#[cfg(feature = "jemalloc")]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::Parser;
use stockroom::Client;
use stockroom_core::{load_env_from_project_path, setup_info_logger};

use crate::{
    cli_interface::{Cli, Commands, ProjectArgs},
    commands::{login, logout, navigate, request, status},
    error::CliError,
    project_location::ProjectLocation,
};

mod cli_interface;
mod commands;
mod console;
pub use console::{print_error_message, print_session_events};

mod error;
mod project_location;

fn resolve_path(override_path: &Option<String>) -> Result<PathBuf, String> {
    let path = match override_path {
        Some(path) => {
            PathBuf::from_str(path).map_err(|_| format!("Invalid path provided: '{}'", path))?
        }
        None => env::current_dir().map_err(|_| "Failed to get current directory.".to_string())?,
    };

    path.canonicalize().map_err(|e| format!("Failed to resolve path '{}': {}", path.display(), e))
}

fn create_client(project: &ProjectArgs) -> Result<Client, CliError> {
    let resolved_path = resolve_path(&project.path).inspect_err(|e| print_error_message(e))?;
    load_env_from_project_path(&resolved_path);

    let mut project_location = ProjectLocation::new(resolved_path);
    if let Some(profile) = &project.profile {
        project_location.override_profile(profile);
    }

    Ok(project_location.client().inspect_err(|e| print_error_message(&e.to_string()))?)
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    setup_info_logger();

    let project = match &cli.command {
        Commands::Login { project, .. }
        | Commands::Logout { project }
        | Commands::Status { project }
        | Commands::Request { project, .. }
        | Commands::Navigate { project, .. } => project,
    };

    let client = create_client(project)?;
    let mut events = client.subscribe();

    let result: Result<(), CliError> = match &cli.command {
        Commands::Login { email, .. } => login::handle_login(email, &client).await.map_err(Into::into),
        Commands::Logout { .. } => logout::handle_logout(&client).await.map_err(Into::into),
        Commands::Status { .. } => status::handle_status(&client).map_err(Into::into),
        Commands::Request { method, endpoint, body, .. } => {
            request::handle_request(*method, endpoint, body.as_deref(), &client)
                .await
                .map_err(Into::into)
        }
        Commands::Navigate { route, .. } => {
            navigate::handle_navigate(route, &client).map_err(Into::into)
        }
    };

    print_session_events(&mut events);

    result.inspect_err(|e| print_error_message(&format!("❌ {}", e)))
}
