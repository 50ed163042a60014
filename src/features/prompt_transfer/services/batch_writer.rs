use crate::features::prompt_transfer::models::{ImportIssue, IssueLog};
use crate::features::prompts::models::{PromptRecord, PromptScope};
use crate::features::prompts::store::PromptStore;

/// Counters produced by persisting deduplicated records
#[derive(Debug, Clone, Default)]
pub struct WriteOutcome {
    pub imported: usize,
    pub errors: usize,
    pub issues: IssueLog,
}

/// Stores records in fixed-size chunks, one storage call per chunk.
///
/// Chunks run one after another. A chunk that fails is counted as errors in
/// full and the next chunk is still attempted.
pub struct BatchWriter<'a> {
    store: &'a dyn PromptStore,
    batch_size: usize,
}

impl<'a> BatchWriter<'a> {
    pub fn new(store: &'a dyn PromptStore, batch_size: usize) -> Self {
        Self {
            store,
            batch_size: batch_size.max(1),
        }
    }

    pub async fn write(&self, scope: &PromptScope, records: &[PromptRecord]) -> WriteOutcome {
        let mut outcome = WriteOutcome::default();

        for (index, chunk) in records.chunks(self.batch_size).enumerate() {
            let batch = index + 1;
            match self.store.insert_batch(scope, chunk).await {
                Ok(written) => {
                    let written = (written as usize).min(chunk.len());
                    outcome.imported += written;

                    let rejected = chunk.len() - written;
                    if rejected > 0 {
                        tracing::warn!(
                            "Batch {} for {} stored {} of {} rows",
                            batch,
                            scope,
                            written,
                            chunk.len()
                        );
                        outcome.errors += rejected;
                        outcome.issues.push(ImportIssue::failed_batch(
                            batch,
                            format!("{} of {} rows were not stored", rejected, chunk.len()),
                        ));
                    }
                }
                Err(e) => {
                    tracing::warn!(
                        "Batch {} ({} rows) for {} failed: {}",
                        batch,
                        chunk.len(),
                        scope,
                        e
                    );
                    outcome.errors += chunk.len();
                    outcome.issues.push(ImportIssue::failed_batch(
                        batch,
                        format!("{} rows could not be saved", chunk.len()),
                    ));
                }
            }
        }

        outcome
    }
}
