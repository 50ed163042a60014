use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use crate::features::prompts::models::Prompt;
use crate::shared::constants::{DEFAULT_MODEL, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use crate::shared::types::SortDirection;
use crate::shared::validation::clean_tags;

// Helper functions for defaults
fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

// Query params for listing prompts (own library or public search)
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
pub struct PromptQueryParams {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,

    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,

    /// Search in name, description or prompt text
    pub search: Option<String>,

    /// Exact model identifier, e.g. "gpt-4o"
    pub model: Option<String>,

    /// Only prompts carrying this tag
    pub tag: Option<String>,

    /// Sort direction by last update (default: desc)
    #[serde(default)]
    pub sort: SortDirection,
}

impl PromptQueryParams {
    pub fn offset(&self) -> i64 {
        (self.page.max(1) - 1) * self.limit()
    }

    pub fn limit(&self) -> i64 {
        self.page_size.clamp(1, MAX_PAGE_SIZE)
    }

    /// Search text with surrounding whitespace removed; blank means no search
    pub fn search_term(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }

    pub fn model_filter(&self) -> Option<&str> {
        non_blank(self.model.as_deref())
    }

    pub fn tag_filter(&self) -> Option<&str> {
        non_blank(self.tag.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

// Create request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePromptDto {
    #[validate(length(min = 1, max = 120))]
    pub name: String,

    #[validate(length(min = 1, max = 100000))]
    pub prompt_text: String,

    pub description: Option<String>,

    /// Defaults to "gpt-4o"
    #[validate(length(max = 100))]
    pub model: Option<String>,

    #[validate(length(max = 50))]
    #[serde(default)]
    pub tags: Vec<String>,

    #[serde(default)]
    pub is_public: bool,
}

impl CreatePromptDto {
    /// Trim text fields and fill defaults; fails when a required field is blank
    pub fn normalized(mut self) -> Result<Self, String> {
        self.name = self.name.trim().to_string();
        self.prompt_text = self.prompt_text.trim().to_string();
        if self.name.is_empty() {
            return Err("name must not be blank".to_string());
        }
        if self.prompt_text.is_empty() {
            return Err("prompt_text must not be blank".to_string());
        }
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.model = Some(
            self.model
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        );
        self.tags = clean_tags(&self.tags);
        Ok(self)
    }
}

// Update request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdatePromptDto {
    #[validate(length(min = 1, max = 120))]
    pub name: Option<String>,

    #[validate(length(min = 1, max = 100000))]
    pub prompt_text: Option<String>,

    /// A blank value clears the stored description
    pub description: Option<String>,

    #[validate(length(min = 1, max = 100))]
    pub model: Option<String>,

    #[validate(length(max = 50))]
    pub tags: Option<Vec<String>>,

    pub is_public: Option<bool>,
}

impl UpdatePromptDto {
    pub fn normalized(mut self) -> Result<Self, String> {
        for (field, value) in [
            ("name", &mut self.name),
            ("prompt_text", &mut self.prompt_text),
            ("model", &mut self.model),
        ] {
            if let Some(v) = value.as_mut() {
                *v = v.trim().to_string();
                if v.is_empty() {
                    return Err(format!("{} must not be blank", field));
                }
            }
        }
        // A blank description is kept as "" so the update clears it to NULL
        self.description = self.description.map(|d| d.trim().to_string());
        self.tags = self.tags.map(clean_tags);
        Ok(self)
    }
}

// Response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PromptResponseDto {
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

impl From<Prompt> for PromptResponseDto {
    fn from(p: Prompt) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            team_id: p.team_id,
            name: p.name,
            prompt_text: p.prompt_text,
            description: p.description,
            model: p.model,
            tags: p.tags,
            is_public: p.is_public,
            inserted_at: p.inserted_at,
            updated_at: p.updated_at,
        }
    }
}
