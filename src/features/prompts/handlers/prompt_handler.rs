use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, RequestedTeam};
use crate::features::auth::AuthenticatedUser;
use crate::features::prompts::dtos::{
    CreatePromptDto, PromptQueryParams, PromptResponseDto, UpdatePromptDto,
};
use crate::features::prompts::models::PromptScope;
use crate::features::prompts::services::PromptService;
use crate::shared::types::{ApiResponse, Meta};

/// Create a prompt in the caller's library
#[utoipa::path(
    post,
    path = "/api/prompts",
    request_body = CreatePromptDto,
    params(
        ("X-Team-Id" = Option<Uuid>, Header, description = "Create in this team's library")
    ),
    responses(
        (status = 201, description = "Prompt created successfully", body = ApiResponse<PromptResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Not a member of the team")
    ),
    tag = "prompts",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn create_prompt(
    user: AuthenticatedUser,
    RequestedTeam(team_id): RequestedTeam,
    State(service): State<Arc<PromptService>>,
    AppJson(dto): AppJson<CreatePromptDto>,
) -> Result<(StatusCode, Json<ApiResponse<PromptResponseDto>>)> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let dto = dto.normalized().map_err(AppError::Validation)?;

    let scope = PromptScope::resolve(service.as_ref(), &user, team_id).await?;
    let prompt = service.create(&scope, dto).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(Some(prompt), None, None)),
    ))
}

/// Get a prompt by ID
#[utoipa::path(
    get,
    path = "/api/prompts/{id}",
    params(
        ("id" = Uuid, Path, description = "Prompt ID"),
        ("X-Team-Id" = Option<Uuid>, Header, description = "Read from this team's library")
    ),
    responses(
        (status = 200, description = "Prompt retrieved successfully", body = ApiResponse<PromptResponseDto>),
        (status = 404, description = "Prompt not found")
    ),
    tag = "prompts",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn get_prompt(
    user: AuthenticatedUser,
    RequestedTeam(team_id): RequestedTeam,
    State(service): State<Arc<PromptService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<PromptResponseDto>>> {
    let scope = PromptScope::resolve(service.as_ref(), &user, team_id).await?;
    let prompt = service.get_by_id(&scope, id).await?;
    Ok(Json(ApiResponse::success(Some(prompt), None, None)))
}

/// List prompts in the caller's library with pagination and filters
#[utoipa::path(
    get,
    path = "/api/prompts",
    params(
        PromptQueryParams,
        ("X-Team-Id" = Option<Uuid>, Header, description = "List this team's library")
    ),
    responses(
        (status = 200, description = "Prompts retrieved successfully", body = ApiResponse<Vec<PromptResponseDto>>)
    ),
    tag = "prompts",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn list_prompts(
    user: AuthenticatedUser,
    RequestedTeam(team_id): RequestedTeam,
    State(service): State<Arc<PromptService>>,
    Query(params): Query<PromptQueryParams>,
) -> Result<Json<ApiResponse<Vec<PromptResponseDto>>>> {
    let scope = PromptScope::resolve(service.as_ref(), &user, team_id).await?;
    let (prompts, total) = service.list(&scope, &params).await?;
    Ok(Json(ApiResponse::success(
        Some(prompts),
        None,
        Some(Meta::paginated(params.page, params.limit(), total)),
    )))
}

/// Update a prompt
#[utoipa::path(
    put,
    path = "/api/prompts/{id}",
    params(
        ("id" = Uuid, Path, description = "Prompt ID"),
        ("X-Team-Id" = Option<Uuid>, Header, description = "Update in this team's library")
    ),
    request_body = UpdatePromptDto,
    responses(
        (status = 200, description = "Prompt updated successfully", body = ApiResponse<PromptResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Prompt not found")
    ),
    tag = "prompts",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn update_prompt(
    user: AuthenticatedUser,
    RequestedTeam(team_id): RequestedTeam,
    State(service): State<Arc<PromptService>>,
    Path(id): Path<Uuid>,
    AppJson(dto): AppJson<UpdatePromptDto>,
) -> Result<Json<ApiResponse<PromptResponseDto>>> {
    dto.validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let dto = dto.normalized().map_err(AppError::Validation)?;

    let scope = PromptScope::resolve(service.as_ref(), &user, team_id).await?;
    let prompt = service.update(&scope, id, dto).await?;
    Ok(Json(ApiResponse::success(Some(prompt), None, None)))
}

/// Delete a prompt
#[utoipa::path(
    delete,
    path = "/api/prompts/{id}",
    params(
        ("id" = Uuid, Path, description = "Prompt ID"),
        ("X-Team-Id" = Option<Uuid>, Header, description = "Delete from this team's library")
    ),
    responses(
        (status = 200, description = "Prompt deleted successfully"),
        (status = 404, description = "Prompt not found")
    ),
    tag = "prompts",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn delete_prompt(
    user: AuthenticatedUser,
    RequestedTeam(team_id): RequestedTeam,
    State(service): State<Arc<PromptService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>> {
    let scope = PromptScope::resolve(service.as_ref(), &user, team_id).await?;
    service.delete(&scope, id).await?;
    Ok(Json(ApiResponse::success(
        None,
        Some("Prompt deleted".to_string()),
        None,
    )))
}

/// Search public prompts (no authentication)
#[utoipa::path(
    get,
    path = "/api/prompts/public",
    params(PromptQueryParams),
    responses(
        (status = 200, description = "Public prompts retrieved successfully", body = ApiResponse<Vec<PromptResponseDto>>)
    ),
    tag = "prompts"
)]
pub async fn search_public_prompts(
    State(service): State<Arc<PromptService>>,
    Query(params): Query<PromptQueryParams>,
) -> Result<Json<ApiResponse<Vec<PromptResponseDto>>>> {
    let (prompts, total) = service.search_public(&params).await?;
    Ok(Json(ApiResponse::success(
        Some(prompts),
        None,
        Some(Meta::paginated(params.page, params.limit(), total)),
    )))
}
