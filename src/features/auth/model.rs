use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Identity of the caller, taken from a verified Supabase access token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Supabase user id (`sub` claim); owns every prompt the user creates
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Postgres role the token was issued for, normally "authenticated"
    pub role: String,
}
