mod api;
mod clients;

pub use api::{
    ApiBaseConfig, ApiResponse, ApiResult, ApiSdkError, AuthenticationApi, RefreshCoordinator,
    RefreshError, RequestDescriptor, http::HttpClient,
};
pub use clients::Client;
pub use stockroom_core::{
    ClientConfig, NavigationDecision, NavigationGuard, SessionEvent, SessionManager, TokenPair,
};
