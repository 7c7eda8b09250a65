pub mod access_jwt;
pub mod claims;
pub mod error;
pub mod factory;
pub mod gate;
pub mod jwks;
pub mod token;

pub use access_jwt::AuthService;
pub use claims::Claims;
pub use error::AuthError;
pub use factory::build_auth_service;
