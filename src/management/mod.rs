mod auth;

pub use auth::TokenManager;
pub use auth::access_token;
