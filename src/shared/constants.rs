/// Default page size for pagination
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Maximum page size allowed
pub const MAX_PAGE_SIZE: i64 = 100;

// =============================================================================
// PROMPT LIMITS
// =============================================================================

/// Longest prompt name, in characters
pub const MAX_NAME_LENGTH: usize = 120;

/// Longest prompt text, in characters
pub const MAX_PROMPT_TEXT_LENGTH: usize = 100_000;

/// Model assigned when a prompt does not name one
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// Longest model identifier accepted on create/update
pub const MAX_MODEL_LENGTH: usize = 100;

/// Most tags a single prompt may carry on create/update
pub const MAX_TAGS: usize = 50;

// =============================================================================
// BULK TRANSFER
// =============================================================================

/// Largest accepted import file (10 MiB)
pub const MAX_IMPORT_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Rows persisted per storage call during import
pub const IMPORT_BATCH_SIZE: usize = 100;

/// Row-level issues echoed back in an import summary
pub const MAX_REPORTED_ISSUES: usize = 100;
