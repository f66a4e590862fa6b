//! Validation result and report types, serialized in the dashboard's camelCase shape.

use crate::content::ContentType;
use crate::i18n::Language;
use serde::Serialize;
use std::collections::BTreeMap;

/// Translation completeness of one English item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub content_type: ContentType,
    pub english_slug: String,
    /// `missing_languages` and `structural_inconsistencies` are both empty
    pub is_valid: bool,
    pub missing_languages: Vec<Language>,
    pub structural_inconsistencies: Vec<String>,
    pub outdated_translations: Vec<Language>,
}

impl ValidationResult {
    pub fn new(
        content_type: ContentType,
        english_slug: impl Into<String>,
        missing_languages: Vec<Language>,
        structural_inconsistencies: Vec<String>,
        outdated_translations: Vec<Language>,
    ) -> Self {
        let is_valid = missing_languages.is_empty() && structural_inconsistencies.is_empty();
        Self {
            content_type,
            english_slug: english_slug.into(),
            is_valid,
            missing_languages,
            structural_inconsistencies,
            outdated_translations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingTranslationEntry {
    pub english_slug: String,
    pub missing_languages: Vec<Language>,
}

/// Missing translations for one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissingTranslationReport {
    pub content_type: ContentType,
    /// Missing (slug, language) pairs
    pub total_missing: usize,
    pub missing_translations: Vec<MissingTranslationEntry>,
}

impl MissingTranslationReport {
    fn from_results<'a>(
        content_type: ContentType,
        results: impl Iterator<Item = &'a ValidationResult>,
    ) -> Self {
        let missing_translations: Vec<_> = results
            .filter(|r| r.content_type == content_type && !r.missing_languages.is_empty())
            .map(|r| MissingTranslationEntry {
                english_slug: r.english_slug.clone(),
                missing_languages: r.missing_languages.clone(),
            })
            .collect();

        Self {
            content_type,
            total_missing: missing_translations
                .iter()
                .map(|entry| entry.missing_languages.len())
                .sum(),
            missing_translations,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationSummary {
    /// Items scanned per content type
    pub by_content_type: BTreeMap<ContentType, usize>,
    /// Missing translations per target language
    pub by_language: BTreeMap<Language, usize>,
}

/// Aggregate over every scanned content type.
///
/// Contains no timestamps, so repeated runs over an unchanged tree serialize
/// identically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub total_content: usize,
    pub valid_content: usize,
    pub invalid_content: usize,
    pub results: Vec<ValidationResult>,
    pub missing_translations: Vec<MissingTranslationReport>,
    pub summary: ValidationSummary,
    /// Partial scan failures (content types skipped)
    pub warnings: Vec<String>,
}

impl ValidationReport {
    pub fn from_results(
        content_types: &[ContentType],
        mut results: Vec<ValidationResult>,
        warnings: Vec<String>,
    ) -> Self {
        // Stable order regardless of how the scan was executed
        results.sort_by(|a, b| {
            a.content_type
                .cmp(&b.content_type)
                .then_with(|| a.english_slug.cmp(&b.english_slug))
        });

        let valid_content = results.iter().filter(|r| r.is_valid).count();

        let mut summary = ValidationSummary {
            by_content_type: content_types.iter().map(|ct| (*ct, 0)).collect(),
            by_language: Language::targets().into_iter().map(|l| (l, 0)).collect(),
        };
        for result in &results {
            *summary.by_content_type.entry(result.content_type).or_insert(0) += 1;
            for language in &result.missing_languages {
                *summary.by_language.entry(*language).or_insert(0) += 1;
            }
        }

        let missing_translations = content_types
            .iter()
            .map(|ct| MissingTranslationReport::from_results(*ct, results.iter()))
            .collect();

        Self {
            total_content: results.len(),
            valid_content,
            invalid_content: results.len() - valid_content,
            results,
            missing_translations,
            summary,
            warnings,
        }
    }
}
