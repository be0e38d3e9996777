mod claims;
pub use claims::{decode_claims, ClaimsError, TokenClaims};

pub mod types;
pub use types::TokenPair;
