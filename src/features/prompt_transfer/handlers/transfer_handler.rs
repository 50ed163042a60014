use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Query, State,
    },
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::core::extractor::RequestedTeam;
use crate::features::auth::AuthenticatedUser;
use crate::features::prompt_transfer::dtos::{
    BulkImportFormDto, ExportQueryParams, ImportSummaryDto,
};
use crate::features::prompt_transfer::error::TransferError;
use crate::features::prompt_transfer::models::TransferFormat;
use crate::features::prompt_transfer::services::{ImportFile, TransferService};
use crate::shared::types::ApiResponse;

/// Import prompts from a CSV or JSON file
#[utoipa::path(
    post,
    path = "/api/prompts/bulk-import",
    request_body(content = BulkImportFormDto, content_type = "multipart/form-data"),
    params(
        ("X-Team-Id" = Option<Uuid>, Header, description = "Import into this team's library")
    ),
    responses(
        (status = 200, description = "Import finished; see counters for per-row results", body = ApiResponse<ImportSummaryDto>),
        (status = 400, description = "Malformed file or form"),
        (status = 403, description = "Not a member of the team"),
        (status = 408, description = "Import took too long"),
        (status = 413, description = "File larger than 10 MiB"),
        (status = 415, description = "File is not CSV or JSON, or does not match the declared format")
    ),
    tag = "prompt-transfer",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn bulk_import(
    user: AuthenticatedUser,
    RequestedTeam(team_id): RequestedTeam,
    State(service): State<Arc<TransferService>>,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<Json<ApiResponse<ImportSummaryDto>>> {
    let multipart = multipart
        .map_err(|e| AppError::BadRequest(format!("Expected a multipart form: {}", e.body_text())))?;

    let scope = service.resolve_scope(&user, team_id).await?;
    let (file, skip_duplicates) = read_import_form(multipart, service.max_file_size()).await?;

    let summary = service.import(&scope, file, skip_duplicates).await?;
    let message = format!(
        "Imported {} of {} prompts ({} skipped, {} errors)",
        summary.imported, summary.total, summary.skipped, summary.errors
    );

    Ok(Json(ApiResponse::success(
        Some(summary.into()),
        Some(message),
        None,
    )))
}

/// Download every prompt in the caller's library
#[utoipa::path(
    get,
    path = "/api/prompts/bulk-export",
    params(
        ExportQueryParams,
        ("X-Team-Id" = Option<Uuid>, Header, description = "Export this team's library")
    ),
    responses(
        (status = 200, description = "Export file", content(
            (String = "text/csv"),
            (String = "application/json")
        )),
        (status = 403, description = "Not a member of the team")
    ),
    tag = "prompt-transfer",
    security(
        ("bearer_auth" = [])
    )
)]
pub async fn bulk_export(
    user: AuthenticatedUser,
    RequestedTeam(team_id): RequestedTeam,
    State(service): State<Arc<TransferService>>,
    Query(params): Query<ExportQueryParams>,
) -> Result<Response> {
    let scope = service.resolve_scope(&user, team_id).await?;
    let file = service.export(&scope, params.format).await?;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

async fn read_import_form(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<(ImportFile, bool)> {
    let mut file: Option<ImportFile> = None;
    let mut declared_format: Option<TransferFormat> = None;
    let mut skip_duplicates = true;

    let form_error = |e: MultipartError| multipart_error(e, max_file_size);

    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let bytes = field.bytes().await.map_err(form_error)?;
                file = Some(ImportFile {
                    bytes: bytes.to_vec(),
                    file_name,
                    content_type,
                    declared_format: None,
                });
            }
            "format" => {
                let value = field.text().await.map_err(form_error)?;
                if !value.trim().is_empty() {
                    declared_format = Some(value.parse::<TransferFormat>()?);
                }
            }
            "skip_duplicates" | "skipDuplicates" => {
                let value = field.text().await.map_err(form_error)?;
                skip_duplicates = parse_flag(&value).ok_or_else(|| {
                    AppError::BadRequest(format!(
                        "skip_duplicates must be true or false, got '{}'",
                        value.trim()
                    ))
                })?;
            }
            _ => {}
        }
    }

    let mut file = file.ok_or_else(|| {
        AppError::BadRequest("Missing 'file' field in multipart form".to_string())
    })?;
    file.declared_format = declared_format;

    Ok((file, skip_duplicates))
}

fn multipart_error(err: MultipartError, max_file_size: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return TransferError::FileTooLarge {
            limit: max_file_size,
        }
        .into();
    }
    AppError::BadRequest(format!("Invalid multipart form: {}", err.body_text()))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "" | "true" | "1" | "on" | "yes" => Some(true),
        "false" | "0" | "off" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::TransferConfig;
    use crate::features::prompt_transfer::routes::routes;
    use crate::features::prompts::models::PromptScope;
    use crate::features::prompts::store::memory::InMemoryPromptStore;
    use crate::shared::constants::MAX_PROMPT_TEXT_LENGTH;
    use crate::shared::test_helpers::{with_test_user, TEST_USER_ID};
    use axum::http::{HeaderName, HeaderValue};
    use axum_test::multipart::{MultipartForm, Part};
    use axum_test::TestServer;
    use fake::faker::lorem::en::Sentence;
    use fake::Fake;
    use serde_json::Value;

    fn personal() -> PromptScope {
        PromptScope::User {
            user_id: TEST_USER_ID.to_string(),
        }
    }

    fn server(store: Arc<InMemoryPromptStore>) -> TestServer {
        let service = Arc::new(TransferService::new(store, TransferConfig::default()));
        TestServer::new(with_test_user(routes(service))).unwrap()
    }

    fn upload(bytes: impl Into<Vec<u8>>, file_name: &str, mime: &str) -> MultipartForm {
        MultipartForm::new().add_part(
            "file",
            Part::bytes(bytes.into())
                .file_name(file_name.to_string())
                .mime_type(mime.to_string()),
        )
    }

    fn counters(body: &Value) -> (u64, u64, u64, u64) {
        let data = &body["data"];
        (
            data["imported"].as_u64().unwrap(),
            data["skipped"].as_u64().unwrap(),
            data["errors"].as_u64().unwrap(),
            data["total"].as_u64().unwrap(),
        )
    }

    #[tokio::test]
    async fn test_csv_happy_path() {
        let store = Arc::new(InMemoryPromptStore::new());
        let response = server(store.clone())
            .post("/api/prompts/bulk-import")
            .multipart(upload(
                "name,prompt_text\n\"Email Subject\",\"Write 5 subject lines\"",
                "prompts.csv",
                "text/csv",
            ))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(counters(&body), (1, 0, 0, 1));
        assert_eq!(store.all()[0].name, "Email Subject");
    }

    #[tokio::test]
    async fn test_json_row_without_prompt_text_is_an_error() {
        let store = Arc::new(InMemoryPromptStore::new());
        let response = server(store.clone())
            .post("/api/prompts/bulk-import")
            .multipart(upload(r#"[{"name":"X"}]"#, "prompts.json", "application/json"))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(counters(&body), (0, 0, 1, 1));
        assert_eq!(body["data"]["issues"][0]["row"], 1);
        assert!(store.all().is_empty());
    }

    #[tokio::test]
    async fn test_case_insensitive_duplicate_is_skipped() {
        let store = Arc::new(InMemoryPromptStore::new());
        store.seed(&personal(), "X", "Y", false);

        let response = server(store.clone())
            .post("/api/prompts/bulk-import")
            .multipart(
                upload(r#"[{"name":"x","prompt_text":"y"}]"#, "prompts.json", "application/json")
                    .add_text("skip_duplicates", "true"),
            )
            .await;

        let body: Value = response.json();
        assert_eq!(counters(&body), (0, 1, 0, 1));
        assert_eq!(store.all().len(), 1);
    }

    #[tokio::test]
    async fn test_duplicates_imported_when_skipping_disabled() {
        let store = Arc::new(InMemoryPromptStore::new());
        store.seed(&personal(), "X", "Y", false);

        let response = server(store.clone())
            .post("/api/prompts/bulk-import")
            .multipart(
                upload(r#"[{"name":"x","prompt_text":"y"}]"#, "prompts.json", "application/json")
                    .add_text("skip_duplicates", "false"),
            )
            .await;

        let body: Value = response.json();
        assert_eq!(counters(&body), (1, 0, 0, 1));
        assert_eq!(store.all().len(), 2);
    }

    #[tokio::test]
    async fn test_imported_prompts_are_never_public() {
        let store = Arc::new(InMemoryPromptStore::new());
        let text: String = Sentence(3..8).fake();
        let file = serde_json::json!([{ "name": "Shared", "prompt_text": text, "is_public": true }]);

        server(store.clone())
            .post("/api/prompts/bulk-import")
            .multipart(upload(file.to_string(), "prompts.json", "application/json"))
            .await
            .assert_status_ok();

        let stored = store.all();
        assert_eq!(stored.len(), 1);
        assert!(!stored[0].is_public);
    }

    #[tokio::test]
    async fn test_oversized_file_is_rejected_before_parsing() {
        let store = Arc::new(InMemoryPromptStore::new());
        let response = server(store.clone())
            .post("/api/prompts/bulk-import")
            .multipart(upload(vec![b'a'; 11 * 1024 * 1024], "big.csv", "text/csv"))
            .await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert!(store.batch_sizes().is_empty());
    }

    #[tokio::test]
    async fn test_long_prompt_text_is_truncated() {
        let store = Arc::new(InMemoryPromptStore::new());
        let file = serde_json::json!({
            "name": "Long",
            "prompt_text": "a".repeat(MAX_PROMPT_TEXT_LENGTH + 1)
        });

        let response = server(store.clone())
            .post("/api/prompts/bulk-import")
            .multipart(upload(file.to_string(), "long.json", "application/json"))
            .await;

        let body: Value = response.json();
        assert_eq!(counters(&body), (1, 0, 0, 1));
        assert_eq!(
            store.all()[0].prompt_text.chars().count(),
            MAX_PROMPT_TEXT_LENGTH
        );
    }

    #[tokio::test]
    async fn test_format_mismatch_is_unsupported_media_type() {
        let response = server(Arc::new(InMemoryPromptStore::new()))
            .post("/api/prompts/bulk-import")
            .multipart(
                upload("name,prompt_text\nA,B\n", "prompts.csv", "text/csv")
                    .add_text("format", "json"),
            )
            .await;

        response.assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let response = server(Arc::new(InMemoryPromptStore::new()))
            .post("/api/prompts/bulk-import")
            .multipart(upload("[{\"name\":", "prompts.json", "application/json"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_file_field_is_bad_request() {
        let response = server(Arc::new(InMemoryPromptStore::new()))
            .post("/api/prompts/bulk-import")
            .multipart(MultipartForm::new().add_text("format", "csv"))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_team_import_requires_membership() {
        let team_id = Uuid::new_v4();
        let store = Arc::new(InMemoryPromptStore::new());
        let server = server(store.clone());
        let team_header = HeaderName::from_static("x-team-id");
        let team_value = HeaderValue::from_str(&team_id.to_string()).unwrap();

        server
            .post("/api/prompts/bulk-import")
            .add_header(team_header.clone(), team_value.clone())
            .multipart(upload("name,prompt_text\nA,B\n", "prompts.csv", "text/csv"))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        assert!(store.all().is_empty());

        store.add_member(team_id, TEST_USER_ID);
        server
            .post("/api/prompts/bulk-import")
            .add_header(team_header, team_value)
            .multipart(upload("name,prompt_text\nA,B\n", "prompts.csv", "text/csv"))
            .await
            .assert_status_ok();

        let stored = store.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].team_id, Some(team_id));
    }

    #[tokio::test]
    async fn test_export_csv_sets_download_headers() {
        let store = Arc::new(InMemoryPromptStore::new());
        store.seed(&personal(), "Greeting", "Say hi, warmly", true);

        let response = server(store)
            .get("/api/prompts/bulk-export")
            .add_query_param("format", "csv")
            .await;

        response.assert_status_ok();
        assert_eq!(
            response.header(header::CONTENT_TYPE),
            "text/csv; charset=utf-8"
        );
        let disposition = response.header(header::CONTENT_DISPOSITION);
        let disposition = disposition.to_str().unwrap();
        assert!(disposition.starts_with("attachment; filename=\"prompts-export-"));
        assert!(disposition.ends_with(".csv\""));

        let text = response.text();
        assert!(text.contains("\"Say hi, warmly\""));
        assert!(text.contains(",true,"));
    }

    #[tokio::test]
    async fn test_export_then_import_round_trip() {
        let store = Arc::new(InMemoryPromptStore::new());
        for i in 0..5 {
            let text: String = Sentence(5..12).fake();
            store.seed(&personal(), &format!("Prompt {}", i), &text, i % 2 == 0);
        }
        let server = server(store.clone());

        let exported = server.get("/api/prompts/bulk-export").await;
        exported.assert_status_ok();
        assert_eq!(exported.header(header::CONTENT_TYPE), "application/json");
        let bytes = exported.as_bytes().to_vec();

        let response = server
            .post("/api/prompts/bulk-import")
            .multipart(upload(bytes, "prompts-export.json", "application/json"))
            .await;

        let body: Value = response.json();
        assert_eq!(counters(&body), (0, 5, 0, 5));
        assert_eq!(store.all().len(), 5);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag(" TRUE "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag(""), Some(true));
        assert_eq!(parse_flag("maybe"), None);
    }
}
