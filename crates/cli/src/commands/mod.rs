pub mod error;
pub mod login;
pub mod logout;
pub mod navigate;
pub mod request;
pub mod status;
