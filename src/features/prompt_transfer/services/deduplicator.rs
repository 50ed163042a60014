use std::collections::HashSet;

use crate::features::prompts::models::{Prompt, PromptRecord};

/// Candidates that survived duplicate filtering
#[derive(Debug, Clone, Default)]
pub struct DedupOutcome {
    pub to_insert: Vec<PromptRecord>,
    pub skipped_count: usize,
}

fn dedup_key(name: &str, prompt_text: &str) -> (String, String) {
    (
        name.trim().to_lowercase(),
        prompt_text.trim().to_lowercase(),
    )
}

/// Drop candidates whose name and text match a stored prompt, ignoring case
/// and surrounding whitespace.
///
/// Only `existing` is consulted, so repeated rows inside one upload are all
/// kept. With `skip_duplicates` off every candidate passes through.
pub fn deduplicate(
    candidates: Vec<PromptRecord>,
    existing: &[Prompt],
    skip_duplicates: bool,
) -> DedupOutcome {
    if !skip_duplicates {
        return DedupOutcome {
            to_insert: candidates,
            skipped_count: 0,
        };
    }

    let known: HashSet<(String, String)> = existing
        .iter()
        .map(|p| dedup_key(&p.name, &p.prompt_text))
        .collect();

    let (duplicates, to_insert): (Vec<_>, Vec<_>) = candidates
        .into_iter()
        .partition(|c| known.contains(&dedup_key(&c.name, &c.prompt_text)));

    DedupOutcome {
        to_insert,
        skipped_count: duplicates.len(),
    }
}
