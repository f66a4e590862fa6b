//! Content statistics: item counts per content type and language, and
//! translation coverage relative to English.

use crate::content::{ContentAccessor, ContentType};
use crate::i18n::Language;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Snapshot of what the content tree holds.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStats {
    /// Items across every content type and language
    pub total_items: usize,

    pub by_content_type: BTreeMap<ContentType, BTreeMap<Language, usize>>,

    pub by_language: BTreeMap<Language, usize>,

    /// Percentage (0-100) of English items that exist in each language
    pub coverage: BTreeMap<Language, f64>,

    /// Directories that exist but could not be listed
    pub errors: Vec<String>,
}

impl ContentStats {
    /// English item count across all content types.
    pub fn source_items(&self) -> usize {
        self.by_language.get(&Language::En).copied().unwrap_or(0)
    }
}

/// Walk every (content type, language) directory and count items.
///
/// Missing directories count as empty. Unreadable directories are recorded
/// in `errors` and count as empty.
pub async fn collect_stats(accessor: &dyn ContentAccessor) -> ContentStats {
    let mut by_content_type = BTreeMap::new();
    let mut by_language: BTreeMap<Language, usize> = Language::ALL.iter().map(|l| (*l, 0)).collect();
    let mut covered: BTreeMap<Language, usize> = BTreeMap::new();
    let mut errors = Vec::new();
    let mut total_items = 0;

    for content_type in ContentType::ALL {
        let mut per_language = BTreeMap::new();
        let mut english: BTreeSet<String> = BTreeSet::new();

        for language in Language::ALL {
            let slugs = match accessor.list_slugs_or_empty(content_type, language).await {
                Ok(slugs) => slugs,
                Err(e) => {
                    warn!("Failed to list {}/{}: {}", content_type, language, e);
                    errors.push(format!("{}/{}: {}", content_type, language, e));
                    Vec::new()
                }
            };

            if language.is_canonical() {
                english = slugs.iter().cloned().collect();
            } else {
                let present = slugs.iter().filter(|slug| english.contains(*slug)).count();
                *covered.entry(language).or_insert(0) += present;
            }

            total_items += slugs.len();
            *by_language.entry(language).or_insert(0) += slugs.len();
            per_language.insert(language, slugs.len());
        }

        by_content_type.insert(content_type, per_language);
    }

    let source_total = by_language.get(&Language::En).copied().unwrap_or(0);
    let coverage = Language::ALL
        .iter()
        .map(|language| {
            let pct = if source_total == 0 {
                0.0
            } else if language.is_canonical() {
                100.0
            } else {
                let present = covered.get(language).copied().unwrap_or(0);
                (present as f64 / source_total as f64) * 100.0
            };
            (*language, pct)
        })
        .collect();

    ContentStats {
        total_items,
        by_content_type,
        by_language,
        coverage,
        errors,
    }
}
