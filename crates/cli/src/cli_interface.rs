use clap::{Args, Parser, Subcommand};

use crate::commands::request::HttpMethod;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Clone, Debug)]
pub struct ProjectArgs {
    /// optional - The project directory holding stockroom.yaml and .env, default is where the command is run.
    #[clap(long, short)]
    pub path: Option<String>,

    /// optional - Credential profile to use instead of the one in stockroom.yaml
    #[clap(long)]
    pub profile: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sign in and store the credential pair for the profile
    Login {
        #[command(flatten)]
        project: ProjectArgs,

        /// Account email address
        #[clap(long, short)]
        email: String,
    },
    /// Sign out and clear stored credentials
    Logout {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Show who is signed in and when the access token expires
    Status {
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Send an authenticated request to the backend
    Request {
        #[command(flatten)]
        project: ProjectArgs,

        /// HTTP method
        #[clap(value_enum)]
        method: HttpMethod,

        /// Endpoint relative to the api base url, e.g. `orders` or `/admin/lots`
        endpoint: String,

        /// optional - JSON request body
        #[clap(long, short)]
        body: Option<String>,
    },
    /// Check whether the current session may open a client route
    Navigate {
        #[command(flatten)]
        project: ProjectArgs,

        /// Client route, e.g. `/admin/orders`
        route: String,
    },
}
