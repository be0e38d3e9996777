mod manager;
pub use manager::{SessionEvent, SessionManager};

mod store;
pub use store::{
    default_storage_dir, CredentialKey, CredentialStore, FileCredentialStore,
    MemoryCredentialStore, SessionError,
};
