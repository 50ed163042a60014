mod validator;

pub mod model;

pub use model::AuthenticatedUser;
pub use validator::JwtValidator;
