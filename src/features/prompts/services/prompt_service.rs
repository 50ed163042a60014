use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::prompts::dtos::{
    CreatePromptDto, PromptQueryParams, PromptResponseDto, UpdatePromptDto,
};
use crate::features::prompts::models::{Prompt, PromptRecord, PromptScope};
use crate::features::prompts::store::PromptStore;
use crate::shared::constants::DEFAULT_MODEL;

const PROMPT_COLUMNS: &str = "id, user_id, team_id, name, prompt_text, description, model, \
     tags, is_public, inserted_at, updated_at";

/// Restrict a query to rows visible in `scope`
fn push_scope_filter(qb: &mut QueryBuilder<'_, Postgres>, scope: &PromptScope) {
    match scope {
        PromptScope::User { user_id } => {
            qb.push("user_id = ")
                .push_bind(user_id.clone())
                .push(" AND team_id IS NULL");
        }
        PromptScope::Team { team_id, .. } => {
            qb.push("team_id = ").push_bind(*team_id);
        }
    }
}

/// Substring pattern for `ILIKE ... ESCAPE '\'` matching `term` literally
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Append search/model/tag conditions from the query string
fn push_query_filters(qb: &mut QueryBuilder<'_, Postgres>, params: &PromptQueryParams) {
    if let Some(search) = params.search_term() {
        let pattern = contains_pattern(search);
        qb.push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description ILIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR prompt_text ILIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    if let Some(model) = params.model_filter() {
        qb.push(" AND model = ").push_bind(model.to_string());
    }

    if let Some(tag) = params.tag_filter() {
        qb.push(" AND ").push_bind(tag.to_string()).push(" = ANY(tags)");
    }
}

/// `None` keeps the stored description, an empty string clears it
fn push_description_assignment(qb: &mut QueryBuilder<'_, Postgres>, description: Option<String>) {
    match description {
        None => qb.push("description = description"),
        Some(d) if d.is_empty() => qb.push("description = NULL"),
        Some(d) => qb.push("description = ").push_bind(d),
    };
}

fn push_order_and_page(qb: &mut QueryBuilder<'_, Postgres>, params: &PromptQueryParams) {
    qb.push(format!(
        " ORDER BY updated_at {}, id {} LIMIT ",
        params.sort.as_sql(),
        params.sort.as_sql()
    ))
    .push_bind(params.limit())
    .push(" OFFSET ")
    .push_bind(params.offset());
}

/// Prompt library backed by PostgreSQL
pub struct PromptService {
    pool: PgPool,
}

impl std::fmt::Debug for PromptService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PromptService")
            .field("pool", &"<PgPool>")
            .finish()
    }
}

impl PromptService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a prompt in `scope`
    pub async fn create(
        &self,
        scope: &PromptScope,
        dto: CreatePromptDto,
    ) -> Result<PromptResponseDto> {
        let prompt = sqlx::query_as::<_, Prompt>(&format!(
            r#"
            INSERT INTO prompts (user_id, team_id, name, prompt_text, description, model, tags, is_public)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            PROMPT_COLUMNS
        ))
        .bind(scope.acting_user())
        .bind(scope.team_id())
        .bind(&dto.name)
        .bind(&dto.prompt_text)
        .bind(&dto.description)
        .bind(dto.model.as_deref().unwrap_or(DEFAULT_MODEL))
        .bind(&dto.tags)
        .bind(dto.is_public)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create prompt in {}: {:?}", scope, e);
            AppError::Database(e)
        })?;

        tracing::info!("Prompt created: {} in {}", prompt.id, scope);
        Ok(PromptResponseDto::from(prompt))
    }

    /// Get a prompt by ID within `scope`
    pub async fn get_by_id(&self, scope: &PromptScope, id: Uuid) -> Result<PromptResponseDto> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM prompts WHERE id = ", PROMPT_COLUMNS));
        qb.push_bind(id).push(" AND ");
        push_scope_filter(&mut qb, scope);

        let prompt = qb
            .build_query_as::<Prompt>()
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("Prompt with id {} not found", id)))?;

        Ok(PromptResponseDto::from(prompt))
    }

    /// List prompts in `scope` with pagination and filters
    pub async fn list(
        &self,
        scope: &PromptScope,
        params: &PromptQueryParams,
    ) -> Result<(Vec<PromptResponseDto>, i64)> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM prompts WHERE ");
        push_scope_filter(&mut count_qb, scope);
        push_query_filters(&mut count_qb, params);

        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let mut qb = QueryBuilder::new(format!("SELECT {} FROM prompts WHERE ", PROMPT_COLUMNS));
        push_scope_filter(&mut qb, scope);
        push_query_filters(&mut qb, params);
        push_order_and_page(&mut qb, params);

        let prompts: Vec<Prompt> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok((
            prompts.into_iter().map(PromptResponseDto::from).collect(),
            total,
        ))
    }

    /// Search public prompts across all owners
    pub async fn search_public(
        &self,
        params: &PromptQueryParams,
    ) -> Result<(Vec<PromptResponseDto>, i64)> {
        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM prompts WHERE is_public = TRUE");
        push_query_filters(&mut count_qb, params);

        let total: i64 = count_qb
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)?;

        let mut qb = QueryBuilder::new(format!(
            "SELECT {} FROM prompts WHERE is_public = TRUE",
            PROMPT_COLUMNS
        ));
        push_query_filters(&mut qb, params);
        push_order_and_page(&mut qb, params);

        let prompts: Vec<Prompt> = qb
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok((
            prompts.into_iter().map(PromptResponseDto::from).collect(),
            total,
        ))
    }

    /// Partial update; absent fields keep their stored value
    pub async fn update(
        &self,
        scope: &PromptScope,
        id: Uuid,
        dto: UpdatePromptDto,
    ) -> Result<PromptResponseDto> {
        let mut qb = QueryBuilder::new("UPDATE prompts SET name = COALESCE(");
        qb.push_bind(dto.name)
            .push(", name), prompt_text = COALESCE(")
            .push_bind(dto.prompt_text)
            .push(", prompt_text), ");
        push_description_assignment(&mut qb, dto.description);
        qb.push(", model = COALESCE(")
            .push_bind(dto.model)
            .push(", model), tags = COALESCE(")
            .push_bind(dto.tags)
            .push(", tags), is_public = COALESCE(")
            .push_bind(dto.is_public)
            .push(", is_public), updated_at = NOW() WHERE id = ")
            .push_bind(id)
            .push(" AND ");
        push_scope_filter(&mut qb, scope);
        qb.push(format!(" RETURNING {}", PROMPT_COLUMNS));

        let prompt = qb
            .build_query_as::<Prompt>()
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or_else(|| AppError::NotFound(format!("Prompt with id {} not found", id)))?;

        Ok(PromptResponseDto::from(prompt))
    }

    /// Delete a prompt permanently
    pub async fn delete(&self, scope: &PromptScope, id: Uuid) -> Result<()> {
        let mut qb = QueryBuilder::new("DELETE FROM prompts WHERE id = ");
        qb.push_bind(id).push(" AND ");
        push_scope_filter(&mut qb, scope);

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Prompt with id {} not found",
                id
            )));
        }

        tracing::info!("Prompt deleted: {} in {}", id, scope);
        Ok(())
    }
}

#[async_trait]
impl PromptStore for PromptService {
    async fn is_team_member(&self, team_id: Uuid, user_id: &str) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM team_members WHERE team_id = $1 AND user_id = $2)",
        )
        .bind(team_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn list_in_scope(&self, scope: &PromptScope) -> Result<Vec<Prompt>> {
        let mut qb = QueryBuilder::new(format!("SELECT {} FROM prompts WHERE ", PROMPT_COLUMNS));
        push_scope_filter(&mut qb, scope);
        qb.push(" ORDER BY inserted_at ASC, id ASC");

        qb.build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to load prompts for {}: {:?}", scope, e);
                AppError::Database(e)
            })
    }

    async fn insert_batch(&self, scope: &PromptScope, records: &[PromptRecord]) -> Result<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut qb = QueryBuilder::new(
            "INSERT INTO prompts (user_id, team_id, name, prompt_text, description, model, tags, is_public) ",
        );
        qb.push_values(records, |mut row, record| {
            row.push_bind(scope.acting_user().to_string())
                .push_bind(scope.team_id())
                .push_bind(record.name.clone())
                .push_bind(record.prompt_text.clone())
                .push_bind(record.description.clone())
                .push_bind(record.model.clone())
                .push_bind(record.tags.clone())
                .push_bind(record.is_public);
        });
        qb.push(" RETURNING id");

        let ids: Vec<Uuid> = qb
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)?;

        Ok(ids.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::SortDirection;

    #[test]
    fn test_user_scope_filter_excludes_team_rows() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM prompts WHERE ");
        push_scope_filter(
            &mut qb,
            &PromptScope::User {
                user_id: "u1".to_string(),
            },
        );
        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM prompts WHERE user_id = $1 AND team_id IS NULL"
        );
    }

    #[test]
    fn test_team_scope_filter() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM prompts WHERE ");
        push_scope_filter(
            &mut qb,
            &PromptScope::Team {
                team_id: Uuid::new_v4(),
                user_id: "u1".to_string(),
            },
        );
        assert_eq!(qb.sql(), "SELECT 1 FROM prompts WHERE team_id = $1");
    }

    #[test]
    fn test_query_filters_and_paging() {
        let params = PromptQueryParams {
            page: 2,
            page_size: 20,
            search: Some("email".to_string()),
            model: Some("claude-3-opus".to_string()),
            tag: Some("sales".to_string()),
            sort: SortDirection::Asc,
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM prompts WHERE is_public = TRUE");
        push_query_filters(&mut qb, &params);
        push_order_and_page(&mut qb, &params);

        assert_eq!(
            qb.sql(),
            "SELECT 1 FROM prompts WHERE is_public = TRUE \
             AND (name ILIKE $1 ESCAPE '\\' OR description ILIKE $2 ESCAPE '\\' \
             OR prompt_text ILIKE $3 ESCAPE '\\') \
             AND model = $4 AND $5 = ANY(tags) \
             ORDER BY updated_at ASC, id ASC LIMIT $6 OFFSET $7"
        );
    }

    #[test]
    fn test_search_wildcards_match_literally() {
        assert_eq!(contains_pattern("email"), "%email%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b"), "%a\\_b%");
        assert_eq!(contains_pattern("c:\\tmp"), "%c:\\\\tmp%");
    }

    #[test]
    fn test_description_assignment() {
        let sql = |description: Option<&str>| {
            let mut qb = QueryBuilder::<Postgres>::new("UPDATE prompts SET ");
            push_description_assignment(&mut qb, description.map(str::to_string));
            qb.sql().to_string()
        };

        assert_eq!(sql(None), "UPDATE prompts SET description = description");
        assert_eq!(sql(Some("")), "UPDATE prompts SET description = NULL");
        assert_eq!(sql(Some("New")), "UPDATE prompts SET description = $1");
    }

    #[test]
    fn test_blank_filters_are_ignored() {
        let params = PromptQueryParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM prompts WHERE is_public = TRUE");
        push_query_filters(&mut qb, &params);
        assert_eq!(qb.sql(), "SELECT 1 FROM prompts WHERE is_public = TRUE");
    }
}
