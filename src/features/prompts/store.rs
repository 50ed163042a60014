use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::prompts::models::{Prompt, PromptRecord, PromptScope};

/// Persistence used by the bulk import/export pipeline.
#[async_trait]
pub trait PromptStore: Send + Sync {
    /// Whether `user_id` belongs to `team_id`
    async fn is_team_member(&self, team_id: Uuid, user_id: &str) -> Result<bool>;

    /// Every prompt visible in `scope`, oldest first
    async fn list_in_scope(&self, scope: &PromptScope) -> Result<Vec<Prompt>>;

    /// Store `records` in one call and return how many rows were written
    async fn insert_batch(&self, scope: &PromptScope, records: &[PromptRecord]) -> Result<u64>;
}
