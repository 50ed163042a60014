use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A row of the `prompts` table
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Prompt {
    pub id: Uuid,
    pub user_id: String,
    pub team_id: Option<Uuid>,
    pub name: String,
    pub prompt_text: String,
    pub description: Option<String>,
    pub model: String,
    pub tags: Vec<String>,
    pub is_public: bool,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Content of a prompt about to be stored; ownership comes from the scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRecord {
    pub name: String,
    pub prompt_text: String,
    pub description: Option<String>,
    pub model: String,
    pub tags: Vec<String>,
    pub is_public: bool,
}
