pub mod authentication;
pub use authentication::{decode_claims, ClaimsError, TokenClaims, TokenPair};

mod environment;
pub use environment::load_env_from_project_path;

mod logger;
pub use logger::{setup_info_logger, setup_logger};

pub mod navigation;
pub use navigation::{GuardPolicy, NavigationDecision, NavigationGuard, RouteTable};

pub mod session;
pub use session::{
    CredentialStore, FileCredentialStore, MemoryCredentialStore, SessionError, SessionEvent,
    SessionManager,
};

mod yaml;
pub use yaml::{
    parse, read, read_or_default, ApiConfig, ClientConfig, CredentialsConfig, ReadYamlError,
    RoutesConfig,
};
