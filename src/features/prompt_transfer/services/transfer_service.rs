use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::core::config::TransferConfig;
use crate::core::error::{AppError, Result};
use crate::features::auth::AuthenticatedUser;
use crate::features::prompt_transfer::models::{ImportSummary, TransferFormat};
use crate::features::prompts::models::PromptScope;
use crate::features::prompts::store::PromptStore;
use crate::shared::constants::IMPORT_BATCH_SIZE;

use super::batch_writer::BatchWriter;
use super::deduplicator::deduplicate;
use super::exporter::{export_prompts, ExportFile};
use super::import_parser::{ImportFile, ImportParser};

/// Runs bulk imports and exports against a prompt store
pub struct TransferService {
    store: Arc<dyn PromptStore>,
    config: TransferConfig,
}

impl TransferService {
    pub fn new(store: Arc<dyn PromptStore>, config: TransferConfig) -> Self {
        Self { store, config }
    }

    pub fn max_file_size(&self) -> usize {
        self.config.max_file_size
    }

    pub async fn resolve_scope(
        &self,
        user: &AuthenticatedUser,
        team_id: Option<Uuid>,
    ) -> Result<PromptScope> {
        PromptScope::resolve(self.store.as_ref(), user, team_id).await
    }

    /// Parse, deduplicate and store an uploaded file.
    ///
    /// Fails with `Timeout` once the size-based deadline passes; batches
    /// stored before that point stay stored.
    pub async fn import(
        &self,
        scope: &PromptScope,
        file: ImportFile,
        skip_duplicates: bool,
    ) -> Result<ImportSummary> {
        let deadline = self.config.import_timeout(file.bytes.len());

        match tokio::time::timeout(deadline, self.run_import(scope, file, skip_duplicates)).await
        {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(
                    "Import for {} exceeded {}s deadline",
                    scope,
                    deadline.as_secs()
                );
                Err(AppError::Timeout(format!(
                    "Import did not finish within {} seconds. Rows already saved are kept; \
                     retry with skip_duplicates enabled to import the rest",
                    deadline.as_secs()
                )))
            }
        }
    }

    async fn run_import(
        &self,
        scope: &PromptScope,
        file: ImportFile,
        skip_duplicates: bool,
    ) -> Result<ImportSummary> {
        let started = Instant::now();

        let parsed = ImportParser::new(self.config.max_file_size).parse(&file)?;
        drop(file);

        let existing = if skip_duplicates {
            self.store.list_in_scope(scope).await?
        } else {
            Vec::new()
        };
        let dedup = deduplicate(parsed.candidates, &existing, skip_duplicates);

        let written = BatchWriter::new(self.store.as_ref(), IMPORT_BATCH_SIZE)
            .write(scope, &dedup.to_insert)
            .await;

        let mut issues = parsed.issues;
        issues.extend(written.issues);

        let summary = ImportSummary {
            imported: written.imported,
            skipped: dedup.skipped_count,
            errors: parsed.invalid_row_count + written.errors,
            total: parsed.total,
            issues: issues.into_vec(),
        };

        tracing::info!(
            "Import for {}: total={} imported={} skipped={} errors={} in {}ms",
            scope,
            summary.total,
            summary.imported,
            summary.skipped,
            summary.errors,
            started.elapsed().as_millis()
        );

        Ok(summary)
    }

    /// Serialize every prompt in `scope`, oldest first
    pub async fn export(&self, scope: &PromptScope, format: TransferFormat) -> Result<ExportFile> {
        let started = Instant::now();
        let prompts = self.store.list_in_scope(scope).await?;
        let file = export_prompts(&prompts, format, Utc::now().date_naive())?;

        tracing::info!(
            "Export for {}: {} prompts as {} ({} bytes) in {}ms",
            scope,
            file.record_count,
            format,
            file.bytes.len(),
            started.elapsed().as_millis()
        );

        Ok(file)
    }
}
