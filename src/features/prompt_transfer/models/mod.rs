mod format;
mod summary;

pub use format::{resolve_format, TransferFormat};
pub use summary::{ImportIssue, ImportSummary, IssueKind, IssueLog, ParseOutcome};
