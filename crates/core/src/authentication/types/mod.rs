mod token;
pub use token::{AccessToken, RefreshToken};

mod token_pair;
pub use token_pair::TokenPair;
