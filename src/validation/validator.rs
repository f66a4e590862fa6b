//! Translation completeness validation across the content type × language matrix.

use crate::content::{collect_stats, ContentAccessor, ContentType};
use crate::error::{ContentError, Result};
use crate::i18n::Language;
use crate::validation::{
    ConsistencyChecker, ConsistencyOptions, IssueKind, MissingTranslationReport, Severity,
    ValidationReport, ValidationResult,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Health of the content loading pipeline itself, as opposed to the
/// completeness of the content it loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineHealth {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

/// Compares English slugs against every target language.
#[derive(Clone)]
pub struct ContentValidator {
    accessor: Arc<dyn ContentAccessor>,
    checker: ConsistencyChecker,
}

impl ContentValidator {
    pub fn new(accessor: Arc<dyn ContentAccessor>, options: ConsistencyOptions) -> Self {
        let checker = ConsistencyChecker::new(Arc::clone(&accessor), options);
        Self { accessor, checker }
    }

    pub fn checker(&self) -> &ConsistencyChecker {
        &self.checker
    }

    /// Validate every content type.
    ///
    /// A content type whose English directory cannot be listed is skipped with
    /// a warning and contributes nothing to the totals.
    pub async fn validate_all_translations(&self) -> ValidationReport {
        self.validate_content_types(&ContentType::ALL).await
    }

    /// Validate a single content type.
    pub async fn validate_content_type(&self, content_type: ContentType) -> ValidationReport {
        self.validate_content_types(&[content_type]).await
    }

    async fn validate_content_types(&self, content_types: &[ContentType]) -> ValidationReport {
        let source = Language::canonical();
        let mut results = Vec::new();
        let mut warnings = Vec::new();

        for &content_type in content_types {
            let slugs = match self.accessor.list_slugs(content_type, source).await {
                Ok(slugs) => slugs,
                Err(e @ ContentError::MissingDirectory { .. }) => {
                    warn!("No English content for {}, skipping: {}", content_type, e);
                    warnings.push(format!("Skipped {}: {}", content_type, e));
                    continue;
                }
                Err(e) => {
                    warn!("Failed to scan {}, skipping: {}", content_type, e);
                    warnings.push(format!("Skipped {}: {}", content_type, e));
                    continue;
                }
            };

            debug!("Validating {} {} items", slugs.len(), content_type);
            for slug in slugs {
                results.push(self.validate_item(content_type, &slug).await);
            }
        }

        let report = ValidationReport::from_results(content_types, results, warnings);
        info!(
            "Validation complete: {} items, {} valid, {} invalid",
            report.total_content, report.valid_content, report.invalid_content
        );
        report
    }

    /// Re-check one English item without rescanning the tree.
    pub async fn validate_single_content(
        &self,
        english_slug: &str,
        content_type: ContentType,
    ) -> Result<ValidationResult> {
        let source = Language::canonical();
        if !self.accessor.exists(content_type, source, english_slug).await {
            return Err(ContentError::NotFound {
                content_type,
                language: source,
                slug: english_slug.to_string(),
            });
        }

        Ok(self.validate_item(content_type, english_slug).await)
    }

    /// Items with at least one missing language, grouped by content type.
    pub async fn generate_missing_translation_report(&self) -> Vec<MissingTranslationReport> {
        self.validate_all_translations().await.missing_translations
    }

    /// Smoke-test the loader: statistics must be collectable, English
    /// content must exist, and the first item of each type must load.
    pub async fn validate_content_loading_pipeline(&self) -> PipelineHealth {
        let stats = collect_stats(self.accessor.as_ref()).await;
        let mut errors = stats.errors.clone();

        if stats.source_items() == 0 {
            errors.push("No English content found for any content type".to_string());
        }

        let source = Language::canonical();
        for content_type in ContentType::ALL {
            // Listing failures are already in stats.errors
            let Ok(slugs) = self.accessor.list_slugs_or_empty(content_type, source).await else {
                continue;
            };
            if let Some(sample) = slugs.first() {
                if let Err(e) = self.accessor.load(content_type, source, sample).await {
                    errors.push(format!("Failed to load {}/{}/{}: {}", content_type, source, sample, e));
                }
            }
        }

        if !errors.is_empty() {
            warn!("Content loading pipeline has {} errors", errors.len());
        }

        PipelineHealth {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    async fn validate_item(&self, content_type: ContentType, english_slug: &str) -> ValidationResult {
        let source = Language::canonical();
        let mut missing = Vec::new();
        let mut structural = Vec::new();
        let mut outdated = Vec::new();

        let english = match self.accessor.load(content_type, source, english_slug).await {
            Ok(content) => Some(content),
            Err(e) => {
                warn!("Failed to read {}/{}/{}: {}", content_type, source, english_slug, e);
                structural.push(format!("{}: Failed to read content: {}", source, e));
                None
            }
        };

        for language in Language::targets() {
            let Some(english) = &english else {
                if !self.accessor.exists(content_type, language, english_slug).await {
                    missing.push(language);
                }
                continue;
            };

            match self
                .checker
                .check_translation(content_type, english_slug, language, english)
                .await
            {
                None => missing.push(language),
                Some(issues) => {
                    for issue in issues {
                        if issue.kind == IssueKind::StaleDate {
                            outdated.push(language);
                        } else if issue.severity == Severity::Error {
                            structural.push(format!("{}: {}", language, issue.description));
                        }
                    }
                }
            }
        }

        ValidationResult::new(content_type, english_slug, missing, structural, outdated)
    }
}
