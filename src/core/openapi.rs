use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::prompt_transfer::{
    dtos as transfer_dtos, handlers as transfer_handlers, models as transfer_models,
};
use crate::features::prompts::{dtos as prompts_dtos, handlers as prompts_handlers};
use crate::shared::types::{ApiResponse, Meta, SortDirection};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Prompt library
        prompts_handlers::create_prompt,
        prompts_handlers::get_prompt,
        prompts_handlers::list_prompts,
        prompts_handlers::update_prompt,
        prompts_handlers::delete_prompt,
        prompts_handlers::search_public_prompts,
        // Bulk import / export
        transfer_handlers::bulk_import,
        transfer_handlers::bulk_export,
    ),
    components(
        schemas(
            Meta,
            SortDirection,
            // Prompts
            prompts_dtos::CreatePromptDto,
            prompts_dtos::UpdatePromptDto,
            prompts_dtos::PromptResponseDto,
            ApiResponse<prompts_dtos::PromptResponseDto>,
            ApiResponse<Vec<prompts_dtos::PromptResponseDto>>,
            // Transfer
            transfer_models::TransferFormat,
            transfer_dtos::BulkImportFormDto,
            transfer_dtos::ImportIssueKindDto,
            transfer_dtos::ImportIssueDto,
            transfer_dtos::ImportSummaryDto,
            ApiResponse<transfer_dtos::ImportSummaryDto>,
        )
    ),
    tags(
        (name = "prompts", description = "Prompt library of the caller or their team"),
        (name = "prompt-transfer", description = "Bulk CSV/JSON import and export"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Prompt Manage API",
        version = "0.1.0",
        description = "Prompt library, bulk import and export",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
