use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::prompt_transfer::models::{
    ImportIssue, ImportSummary, IssueKind, TransferFormat,
};

/// Multipart body accepted by the import endpoint (documentation only)
#[allow(dead_code)]
#[derive(ToSchema)]
pub struct BulkImportFormDto {
    /// CSV or JSON file, at most 10 MiB
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    /// Overrides format detection from the file name
    pub format: Option<TransferFormat>,
    /// Skip rows matching an existing prompt by name and text (default: true)
    pub skip_duplicates: Option<bool>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImportIssueKindDto {
    Validation,
    Persistence,
}

impl From<IssueKind> for ImportIssueKindDto {
    fn from(kind: IssueKind) -> Self {
        match kind {
            IssueKind::Validation => ImportIssueKindDto::Validation,
            IssueKind::Persistence => ImportIssueKindDto::Persistence,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportIssueDto {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<usize>,
    pub kind: ImportIssueKindDto,
    pub message: String,
}

impl From<ImportIssue> for ImportIssueDto {
    fn from(issue: ImportIssue) -> Self {
        Self {
            row: issue.row,
            batch: issue.batch,
            kind: issue.kind.into(),
            message: issue.message,
        }
    }
}

/// Result panel of a bulk import
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ImportSummaryDto {
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
    pub total: usize,
    /// First problems encountered, at most 100
    pub issues: Vec<ImportIssueDto>,
}

impl From<ImportSummary> for ImportSummaryDto {
    fn from(summary: ImportSummary) -> Self {
        Self {
            imported: summary.imported,
            skipped: summary.skipped,
            errors: summary.errors,
            total: summary.total,
            issues: summary.issues.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ExportQueryParams {
    /// `csv` or `json` (default: json)
    #[serde(default)]
    pub format: TransferFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_dto_serialization() {
        let dto = ImportSummaryDto::from(ImportSummary {
            imported: 1,
            skipped: 0,
            errors: 1,
            total: 2,
            issues: vec![ImportIssue::invalid_row(2, "missing name")],
        });

        let json = serde_json::to_value(&dto).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "imported": 1,
                "skipped": 0,
                "errors": 1,
                "total": 2,
                "issues": [{ "row": 2, "kind": "validation", "message": "missing name" }]
            })
        );
    }
}
