//! Structural consistency checks between English content and its translations.
//!
//! Only items present in both languages are compared; missing translations
//! are the validator's concern and are never re-flagged here.

use crate::content::{ContentAccessor, ContentType, ParsedContent};
use crate::error::{ContentError, Result};
use crate::i18n::Language;
use crate::validation::BodyStructure;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Frontmatter keys every translation must carry.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "title",
    "description",
    "language",
    "category",
    "template",
    "publishDate",
];

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warning, Severity::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    MissingField,
    LanguageMismatch,
    SectionCountMismatch,
    LinkCountMismatch,
    StaleDate,
    ReadError,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingField => "missing-field",
            IssueKind::LanguageMismatch => "language-mismatch",
            IssueKind::SectionCountMismatch => "section-count-mismatch",
            IssueKind::LinkCountMismatch => "link-count-mismatch",
            IssueKind::StaleDate => "stale-date",
            IssueKind::ReadError => "read-error",
        }
    }
}

/// One divergence between a translation and its English source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyIssue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub severity: Severity,
    pub content_type: ContentType,
    pub english_slug: String,
    pub language: Language,
    pub description: String,
}

impl ConsistencyIssue {
    fn new(
        kind: IssueKind,
        severity: Severity,
        content_type: ContentType,
        english_slug: &str,
        language: Language,
        description: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            content_type,
            english_slug: english_slug.to_string(),
            language,
            description: description.into(),
        }
    }

    fn read_error(
        content_type: ContentType,
        english_slug: &str,
        language: Language,
        error: &ContentError,
    ) -> Self {
        Self::new(
            IssueKind::ReadError,
            Severity::Error,
            content_type,
            english_slug,
            language,
            format!("Failed to read content: {}", error),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencySummary {
    /// Issue counts per scanned content type
    pub by_content_type: BTreeMap<ContentType, usize>,
    pub by_language: BTreeMap<Language, usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyReport {
    /// Translation pairs compared
    pub total_checked: usize,
    pub total_issues: usize,
    pub issues_by_severity: BTreeMap<Severity, usize>,
    pub issues_by_type: BTreeMap<String, usize>,
    pub issues: Vec<ConsistencyIssue>,
    pub summary: ConsistencySummary,
    /// Content types that could not be scanned
    pub warnings: Vec<String>,
}

impl ConsistencyReport {
    fn build(
        content_types: &[ContentType],
        total_checked: usize,
        issues: Vec<ConsistencyIssue>,
        warnings: Vec<String>,
    ) -> Self {
        let mut issues_by_severity: BTreeMap<Severity, usize> =
            Severity::ALL.iter().map(|s| (*s, 0)).collect();
        let mut issues_by_type: BTreeMap<String, usize> = BTreeMap::new();
        let mut summary = ConsistencySummary {
            by_content_type: content_types.iter().map(|ct| (*ct, 0)).collect(),
            by_language: Language::ALL.iter().map(|l| (*l, 0)).collect(),
        };

        for issue in &issues {
            *issues_by_severity.entry(issue.severity).or_insert(0) += 1;
            *issues_by_type
                .entry(issue.kind.as_str().to_string())
                .or_insert(0) += 1;
            *summary.by_content_type.entry(issue.content_type).or_insert(0) += 1;
            *summary.by_language.entry(issue.language).or_insert(0) += 1;
        }

        Self {
            total_checked,
            total_issues: issues.len(),
            issues_by_severity,
            issues_by_type,
            issues,
            summary,
            warnings,
        }
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues_by_severity.get(&severity).copied().unwrap_or(0)
    }
}

/// Tunables for the comparison rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConsistencyOptions {
    /// English newer than the translation by more than this is stale
    pub staleness_threshold_days: i64,

    /// Allowed difference in section counts
    pub section_tolerance: usize,
}

impl Default for ConsistencyOptions {
    fn default() -> Self {
        Self {
            staleness_threshold_days: 90,
            section_tolerance: 1,
        }
    }
}

#[derive(Default)]
struct ScanAccumulator {
    total_checked: usize,
    issues: Vec<ConsistencyIssue>,
    warnings: Vec<String>,
}

/// Compares every translation against its English baseline.
#[derive(Clone)]
pub struct ConsistencyChecker {
    accessor: Arc<dyn ContentAccessor>,
    options: ConsistencyOptions,
}

impl ConsistencyChecker {
    pub fn new(accessor: Arc<dyn ContentAccessor>, options: ConsistencyOptions) -> Self {
        Self { accessor, options }
    }

    pub fn options(&self) -> ConsistencyOptions {
        self.options
    }

    /// Check every content type.
    pub async fn check_all_content(&self) -> ConsistencyReport {
        let mut acc = ScanAccumulator::default();
        for content_type in ContentType::ALL {
            self.scan_content_type(content_type, &mut acc).await;
        }

        ConsistencyReport::build(&ContentType::ALL, acc.total_checked, acc.issues, acc.warnings)
    }

    /// Check a single content type; the summary lists only that type.
    pub async fn check_content_type(&self, content_type: ContentType) -> ConsistencyReport {
        let mut acc = ScanAccumulator::default();
        self.scan_content_type(content_type, &mut acc).await;

        ConsistencyReport::build(&[content_type], acc.total_checked, acc.issues, acc.warnings)
    }

    /// Spot-check one translation.
    ///
    /// Fails with `NotFound` when the English source does not exist. A missing
    /// translation yields no issues.
    pub async fn check_single_content(
        &self,
        english_slug: &str,
        content_type: ContentType,
        language: Language,
    ) -> Result<Vec<ConsistencyIssue>> {
        let english = match self
            .accessor
            .load(content_type, Language::canonical(), english_slug)
            .await
        {
            Ok(content) => content,
            Err(e) if e.is_not_found() => return Err(e),
            Err(e) => {
                return Ok(vec![ConsistencyIssue::read_error(
                    content_type,
                    english_slug,
                    Language::canonical(),
                    &e,
                )])
            }
        };

        if language.is_canonical() {
            return Ok(Vec::new());
        }

        Ok(self
            .check_translation(content_type, english_slug, language, &english)
            .await
            .unwrap_or_default())
    }

    /// Load and compare one translation, `None` when it does not exist.
    pub(crate) async fn check_translation(
        &self,
        content_type: ContentType,
        english_slug: &str,
        language: Language,
        english: &ParsedContent,
    ) -> Option<Vec<ConsistencyIssue>> {
        if !self.accessor.exists(content_type, language, english_slug).await {
            return None;
        }

        match self.accessor.load(content_type, language, english_slug).await {
            Ok(translation) => Some(self.compare(
                content_type,
                english_slug,
                language,
                english,
                &translation,
            )),
            Err(e) => {
                warn!(
                    "Failed to read {}/{}/{}: {}",
                    content_type, language, english_slug, e
                );
                Some(vec![ConsistencyIssue::read_error(
                    content_type,
                    english_slug,
                    language,
                    &e,
                )])
            }
        }
    }

    async fn scan_content_type(&self, content_type: ContentType, acc: &mut ScanAccumulator) {
        let source = Language::canonical();
        let slugs = match self.accessor.list_slugs(content_type, source).await {
            Ok(slugs) => slugs,
            Err(e) => {
                warn!("Skipping consistency check for {}: {}", content_type, e);
                acc.warnings
                    .push(format!("Skipped {}: {}", content_type, e));
                return;
            }
        };

        debug!("Checking {} {} items", slugs.len(), content_type);

        for slug in slugs {
            let english = match self.accessor.load(content_type, source, &slug).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Failed to read {}/{}/{}: {}", content_type, source, slug, e);
                    acc.issues
                        .push(ConsistencyIssue::read_error(content_type, &slug, source, &e));
                    continue;
                }
            };

            for language in Language::targets() {
                if let Some(issues) = self
                    .check_translation(content_type, &slug, language, &english)
                    .await
                {
                    acc.total_checked += 1;
                    acc.issues.extend(issues);
                }
            }
        }
    }

    /// Compare an existing translation against its English source.
    pub fn compare(
        &self,
        content_type: ContentType,
        english_slug: &str,
        language: Language,
        english: &ParsedContent,
        translation: &ParsedContent,
    ) -> Vec<ConsistencyIssue> {
        let mut issues = Vec::new();
        let issue = |kind, severity, description: String| {
            ConsistencyIssue::new(kind, severity, content_type, english_slug, language, description)
        };

        for field in REQUIRED_FIELDS {
            let present = translation
                .frontmatter
                .get(field)
                .map(|value| !value.is_null())
                .unwrap_or(false);
            if !present {
                issues.push(issue(
                    IssueKind::MissingField,
                    Severity::Error,
                    format!("Missing required frontmatter field '{}'", field),
                ));
            }
        }

        if let Some(declared) = translation.field_str("language") {
            if declared != language.code() {
                issues.push(issue(
                    IssueKind::LanguageMismatch,
                    Severity::Error,
                    format!(
                        "Frontmatter declares language '{}' but file is in the '{}' tree",
                        declared,
                        language.code()
                    ),
                ));
            }
        }

        let source_shape = BodyStructure::extract(&english.body);
        let target_shape = BodyStructure::extract(&translation.body);

        if source_shape.sections.abs_diff(target_shape.sections) > self.options.section_tolerance {
            issues.push(issue(
                IssueKind::SectionCountMismatch,
                Severity::Warning,
                format!(
                    "English has {} sections, translation has {}",
                    source_shape.sections, target_shape.sections
                ),
            ));
        }

        if source_shape.links != target_shape.links {
            issues.push(issue(
                IssueKind::LinkCountMismatch,
                Severity::Info,
                format!(
                    "English has {} links, translation has {}",
                    source_shape.links, target_shape.links
                ),
            ));
        }

        if let Some(days) = self.days_behind(english, translation) {
            issues.push(issue(
                IssueKind::StaleDate,
                Severity::Warning,
                format!(
                    "Translation is {} days behind the English source (threshold {} days)",
                    days, self.options.staleness_threshold_days
                ),
            ));
        }

        issues
    }

    fn days_behind(&self, english: &ParsedContent, translation: &ParsedContent) -> Option<i64> {
        let source = english.effective_date()?;
        let target = translation.effective_date()?;
        let lag = source - target;

        (lag > Duration::days(self.options.staleness_threshold_days)).then(|| lag.num_days())
    }
}
