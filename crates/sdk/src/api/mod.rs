mod authentication;
pub mod http;
mod refresh;
mod request;
mod types;

pub use authentication::AuthenticationApi;
pub use refresh::{RefreshCoordinator, RefreshError};
pub use request::RequestDescriptor;
pub use types::{ApiBaseConfig, ApiResponse, ApiResult, ApiSdkError};
