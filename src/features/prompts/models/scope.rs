use std::fmt;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::auth::AuthenticatedUser;
use crate::features::prompts::models::Prompt;
use crate::features::prompts::store::PromptStore;

/// The library a request reads from and writes into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptScope {
    /// Personal prompts: owned by the user and not attached to a team
    User { user_id: String },
    /// Team prompts; `user_id` is the member acting on the library
    Team { team_id: Uuid, user_id: String },
}

impl PromptScope {
    /// Pick the personal scope, or the team scope when the caller belongs to `team_id`
    pub async fn resolve(
        store: &dyn PromptStore,
        user: &AuthenticatedUser,
        team_id: Option<Uuid>,
    ) -> Result<Self> {
        let Some(team_id) = team_id else {
            return Ok(PromptScope::User {
                user_id: user.user_id.clone(),
            });
        };

        if !store.is_team_member(team_id, &user.user_id).await? {
            tracing::warn!(
                "User {} tried to access team {} without membership",
                user.user_id,
                team_id
            );
            return Err(AppError::Forbidden(
                "You are not a member of this team".to_string(),
            ));
        }

        Ok(PromptScope::Team {
            team_id,
            user_id: user.user_id.clone(),
        })
    }

    pub fn acting_user(&self) -> &str {
        match self {
            PromptScope::User { user_id } | PromptScope::Team { user_id, .. } => user_id,
        }
    }

    pub fn team_id(&self) -> Option<Uuid> {
        match self {
            PromptScope::User { .. } => None,
            PromptScope::Team { team_id, .. } => Some(*team_id),
        }
    }

    /// Whether a stored prompt is visible in this scope
    pub fn contains(&self, prompt: &Prompt) -> bool {
        match self {
            PromptScope::User { user_id } => prompt.team_id.is_none() && &prompt.user_id == user_id,
            PromptScope::Team { team_id, .. } => prompt.team_id == Some(*team_id),
        }
    }
}

impl fmt::Display for PromptScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptScope::User { user_id } => write!(f, "user:{}", user_id),
            PromptScope::Team { team_id, .. } => write!(f, "team:{}", team_id),
        }
    }
}
