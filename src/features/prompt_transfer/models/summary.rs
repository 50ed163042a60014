use crate::features::prompts::models::PromptRecord;
use crate::shared::constants::MAX_REPORTED_ISSUES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    /// A row lacked a required field
    Validation,
    /// A batch could not be stored
    Persistence,
}

/// One problem worth showing in the import results panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportIssue {
    /// 1-based data row (header excluded)
    pub row: Option<usize>,
    /// 1-based batch number
    pub batch: Option<usize>,
    pub kind: IssueKind,
    pub message: String,
}

impl ImportIssue {
    pub fn invalid_row(row: usize, message: impl Into<String>) -> Self {
        Self {
            row: Some(row),
            batch: None,
            kind: IssueKind::Validation,
            message: message.into(),
        }
    }

    pub fn failed_batch(batch: usize, message: impl Into<String>) -> Self {
        Self {
            row: None,
            batch: Some(batch),
            kind: IssueKind::Persistence,
            message: message.into(),
        }
    }
}

/// Issue list that stops growing once it holds `MAX_REPORTED_ISSUES` entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueLog(Vec<ImportIssue>);

impl IssueLog {
    pub fn push(&mut self, issue: ImportIssue) {
        if self.0.len() < MAX_REPORTED_ISSUES {
            self.0.push(issue);
        }
    }

    pub fn extend(&mut self, other: IssueLog) {
        for issue in other.0 {
            self.push(issue);
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<ImportIssue> {
        self.0
    }
}

/// What the parser made of an upload
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub candidates: Vec<PromptRecord>,
    pub invalid_row_count: usize,
    /// Every data row seen, valid or not
    pub total: usize,
    pub issues: IssueLog,
}

/// Counters returned to the client once an import finishes.
///
/// `total == imported + skipped + errors` always holds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
    pub total: usize,
    pub issues: Vec<ImportIssue>,
}
